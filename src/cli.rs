//! Command-line interface definitions for newsdeck.
//!
//! This module defines the CLI arguments and options using the `clap` crate,
//! plus the translation from parsed arguments into an initial set of
//! [`NewsFilters`]. The backend URL can also come from the environment.

use clap::Parser;

use crate::config::Config;
use crate::models::NewsFilters;

/// Command-line arguments for the newsdeck client.
///
/// Filter flags that are omitted fall back to the config file and then to
/// built-in defaults, so a bare `newsdeck` invocation browses the default
/// feed.
///
/// # Examples
///
/// ```sh
/// # Browse the default feed (US, English, all categories)
/// newsdeck
///
/// # Technology news from the UK, second page
/// newsdeck --country gb --category technology --page 2
///
/// # Interactive session against a remote backend
/// newsdeck -i --backend-url https://news.example.com
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Two-letter country code to browse (e.g. us, gb) [default: us]
    #[arg(short, long)]
    pub country: Option<String>,

    /// Category tag (business, technology, ...); omit to browse all categories
    #[arg(long)]
    pub category: Option<String>,

    /// Two-letter language code [default: en]
    #[arg(short, long)]
    pub language: Option<String>,

    /// Only articles published on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<chrono::NaiveDate>,

    /// Only articles published on or before this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: Option<chrono::NaiveDate>,

    /// Page to fetch [default: 1]
    #[arg(short, long)]
    pub page: Option<u32>,

    /// Articles per page [default: 12]
    #[arg(long)]
    pub limit: Option<u32>,

    /// Base URL of the news backend [default: http://localhost:4000]
    #[arg(long, env = "NEWSDECK_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Optional path to a YAML config file
    #[arg(long)]
    pub config: Option<String>,

    /// Start an interactive browsing session
    #[arg(short, long)]
    pub interactive: bool,

    /// Print the article list as JSON instead of cards
    #[arg(long)]
    pub json: bool,

    /// Never ask the backend to fetch fresh articles when a feed is empty
    #[arg(long)]
    pub no_refresh: bool,
}

impl Cli {
    /// Assemble the initial filters from CLI flags and resolved config.
    ///
    /// CLI flags win over config-file defaults. Codes are lowercased here so
    /// the rest of the client never sees `US` and `us` as different feeds.
    pub fn filters(&self, config: &Config) -> NewsFilters {
        NewsFilters {
            country: self
                .country
                .as_deref()
                .filter(|code| !code.is_empty())
                .map(str::to_lowercase)
                .unwrap_or_else(|| config.default_country.clone()),
            // An empty tag means "all categories", same as omitting the flag.
            category: self
                .category
                .as_deref()
                .filter(|tag| !tag.is_empty())
                .map(str::to_lowercase),
            language: self
                .language
                .as_deref()
                .filter(|code| !code.is_empty())
                .map(str::to_lowercase)
                .unwrap_or_else(|| config.default_language.clone()),
            start_date: self.from,
            end_date: self.to,
            page: self.page.unwrap_or(1).max(1),
            limit: self.limit.unwrap_or(config.limit).max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::default()
    }

    #[test]
    fn test_cli_defaults_to_empty_filters() {
        let cli = Cli::parse_from(["newsdeck"]);
        assert_eq!(cli.country, None);
        assert_eq!(cli.page, None);
        assert!(!cli.interactive);
        assert!(!cli.json);
        assert!(!cli.no_refresh);
    }

    #[test]
    fn test_cli_parses_filter_flags() {
        let cli = Cli::parse_from([
            "newsdeck",
            "--country",
            "gb",
            "--category",
            "technology",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
            "--page",
            "2",
        ]);

        assert_eq!(cli.country.as_deref(), Some("gb"));
        assert_eq!(cli.category.as_deref(), Some("technology"));
        assert_eq!(cli.from.unwrap().to_string(), "2024-01-01");
        assert_eq!(cli.to.unwrap().to_string(), "2024-01-31");
        assert_eq!(cli.page, Some(2));
    }

    #[test]
    fn test_cli_rejects_malformed_date() {
        let result = Cli::try_parse_from(["newsdeck", "--from", "January 1st"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["newsdeck", "-c", "jp", "-l", "en", "-p", "3", "-i"]);
        assert_eq!(cli.country.as_deref(), Some("jp"));
        assert_eq!(cli.language.as_deref(), Some("en"));
        assert_eq!(cli.page, Some(3));
        assert!(cli.interactive);
    }

    #[test]
    fn test_filters_fall_back_to_config_defaults() {
        let cli = Cli::parse_from(["newsdeck"]);
        let filters = cli.filters(&test_config());
        assert_eq!(filters.country, "us");
        assert_eq!(filters.language, "en");
        assert_eq!(filters.category, None);
        assert_eq!(filters.page, 1);
        assert_eq!(filters.limit, 12);
    }

    #[test]
    fn test_filters_prefer_cli_flags_and_lowercase_codes() {
        let cli = Cli::parse_from(["newsdeck", "--country", "DE", "--category", "Sports"]);
        let filters = cli.filters(&test_config());
        assert_eq!(filters.country, "de");
        assert_eq!(filters.category.as_deref(), Some("sports"));
    }

    #[test]
    fn test_filters_clamp_page_and_limit() {
        let cli = Cli::parse_from(["newsdeck", "--page", "0", "--limit", "0"]);
        let filters = cli.filters(&test_config());
        assert_eq!(filters.page, 1);
        assert_eq!(filters.limit, 1);
    }

    #[test]
    fn test_filters_treat_empty_category_as_all() {
        let cli = Cli::parse_from(["newsdeck", "--category", ""]);
        let filters = cli.filters(&test_config());
        assert_eq!(filters.category, None);
    }
}
