//! Runtime configuration assembled from three layers.
//!
//! Precedence, lowest to highest:
//! 1. Built-in defaults (a backend on `localhost:4000`, the US English feed)
//! 2. An optional YAML config file passed via `--config`
//! 3. CLI flags and environment variables
//!
//! The config file shape is [`ConfigFile`]; every key is optional. The
//! resolved [`Config`] carries the backend URL already validated and
//! normalized, so the rest of the client can concatenate paths onto it
//! without ceremony.

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::catalog;
use crate::cli::Cli;
use crate::error::ConfigError;

/// Backend used when neither the config file nor the environment names one.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:4000";

/// Feed browsed when no country is configured or passed.
pub const DEFAULT_COUNTRY: &str = "us";

/// Language used when none is configured or passed.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Articles per page unless overridden.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the news backend. Validated, trailing slash stripped.
    pub backend_url: String,
    /// Country browsed when the command line names none.
    pub default_country: String,
    /// Language used when the command line names none.
    pub default_language: String,
    /// Articles per page when the command line names no limit.
    pub limit: u32,
    /// Per-request timeout for backend calls.
    pub request_timeout: Duration,
    /// Delay between an accepted refresh and the follow-up query.
    pub retry_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            default_country: DEFAULT_COUNTRY.to_string(),
            default_language: DEFAULT_LANGUAGE.to_string(),
            limit: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

/// On-disk YAML configuration. Every key is optional.
///
/// ```yaml
/// backend_url: https://news.example.com
/// default_country: gb
/// default_language: en
/// limit: 20
/// request_timeout_secs: 10
/// retry_delay_ms: 2000
/// ```
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ConfigFile {
    pub backend_url: Option<String>,
    pub default_country: Option<String>,
    pub default_language: Option<String>,
    pub limit: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub retry_delay_ms: Option<u64>,
}

impl ConfigFile {
    /// Parse the YAML text of a config file. An empty document is treated
    /// as a file with no keys set.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    fn load(path: &str) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }
}

impl Config {
    /// Resolve the configuration for this invocation.
    ///
    /// Reads the config file when `--config` names one, then folds in the
    /// CLI/environment backend URL. Unknown default country or language
    /// codes are accepted with a warning; the backend is the authority on
    /// what it can serve.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match cli.config.as_deref() {
            Some(path) => {
                debug!(path, "loading config file");
                ConfigFile::load(path)?
            }
            None => ConfigFile::default(),
        };
        Self::from_parts(&file, cli.backend_url.as_deref())
    }

    /// Pure merge of the precedence layers, separated out for tests.
    fn from_parts(file: &ConfigFile, cli_backend_url: Option<&str>) -> Result<Self, ConfigError> {
        let raw_url = cli_backend_url
            .or(file.backend_url.as_deref())
            .unwrap_or(DEFAULT_BACKEND_URL);
        let backend_url = normalize_backend_url(raw_url)?;

        let default_country = file
            .default_country
            .as_deref()
            .unwrap_or(DEFAULT_COUNTRY)
            .to_lowercase();
        let default_language = file
            .default_language
            .as_deref()
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_lowercase();

        if catalog::country(&default_country).is_none() {
            warn!(country = %default_country, "default country is not in the known catalog");
        }
        if catalog::language(&default_language).is_none() {
            warn!(language = %default_language, "default language is not in the known catalog");
        }

        Ok(Self {
            backend_url,
            default_country,
            default_language,
            limit: file.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
            request_timeout: Duration::from_secs(
                file.request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            retry_delay: Duration::from_millis(
                file.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS),
            ),
        })
    }
}

/// Validate a backend base URL and strip any trailing slash.
///
/// Endpoint paths are later appended with plain string formatting, so the
/// normalized form never ends in `/`.
fn normalize_backend_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme {
            url: raw.to_string(),
            scheme: parsed.scheme().to_string(),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}
