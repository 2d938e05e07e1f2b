//! Data models for articles, filters, and backend payloads.
//!
//! This module defines the structures shared by the whole client:
//! - [`Article`]: a cached news article as stored by the backend
//! - [`NewsFilters`]: the full set of browsing filters plus pagination
//! - [`FilterUpdate`]: a partial change applied to [`NewsFilters`]
//! - [`NewsResponse`] / [`NewsPage`]: raw and cleaned read-endpoint payloads
//! - [`RefreshRequest`]: body of a manual-refresh request
//! - [`FetchStatus`]: the lifecycle of the current fetch cycle
//!
//! Serde renames follow the backend's wire format (`_id`, `pubDate`,
//! `totalPages`), so serializing an [`Article`] back out reproduces the
//! JSON the backend sent.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_COUNTRY, DEFAULT_LANGUAGE, DEFAULT_PAGE_SIZE};

/// Wire value of the `status` query parameter. Only articles the backend
/// considers active are ever requested.
const STATUS_ACTIVE: &str = "active";

/// A cached news article as returned by the backend's read endpoint.
///
/// Every field except `title` and `link` is routinely missing from real
/// aggregator data, so the struct is lenient: absent fields decode to
/// empty strings, empty vectors, or `None` rather than failing the whole
/// page. Renderers apply their own fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// Backend document id.
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Headline, as published.
    #[serde(default)]
    pub title: String,
    /// Short summary or lede. Often missing.
    #[serde(default)]
    pub description: Option<String>,
    /// URL of the original story.
    #[serde(default)]
    pub link: String,
    /// Header image URL. Often missing.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Identifier of the publishing outlet. Often missing.
    #[serde(default)]
    pub source_id: Option<String>,
    /// Category tags assigned by the aggregator.
    #[serde(default)]
    pub category: Vec<String>,
    /// Publication timestamp exactly as the backend stored it.
    ///
    /// Upstream aggregators are not consistent about the format, so the raw
    /// string is kept and parsed lazily via [`Article::published_at`].
    #[serde(rename = "pubDate", default)]
    pub pub_date: Option<String>,
}

impl Article {
    /// Parse the raw `pubDate` into a UTC timestamp.
    ///
    /// Accepts RFC 3339 (`2024-01-15T10:30:00Z`), the space-separated form
    /// aggregators commonly emit (`2024-01-15 10:30:00`, assumed UTC), and a
    /// bare date. Returns `None` when the field is missing or unparseable.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.pub_date.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return Some(parsed.and_utc());
        }
        if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(parsed.and_hms_opt(0, 0, 0)?.and_utc());
        }
        None
    }
}

/// The full set of browsing filters plus pagination.
///
/// One value of this struct describes exactly one read query. Mutation goes
/// through [`NewsFilters::apply`] so the page-reset rule cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsFilters {
    /// Two-letter country code, lowercase.
    pub country: String,
    /// Category tag. `None` browses all categories.
    pub category: Option<String>,
    /// Two-letter language code, lowercase.
    pub language: String,
    /// Only articles published on or after this date.
    pub start_date: Option<NaiveDate>,
    /// Only articles published on or before this date.
    pub end_date: Option<NaiveDate>,
    /// 1-based page number.
    pub page: u32,
    /// Articles per page.
    pub limit: u32,
}

impl Default for NewsFilters {
    fn default() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            category: None,
            language: DEFAULT_LANGUAGE.to_string(),
            start_date: None,
            end_date: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl NewsFilters {
    /// Merge a partial update into the filters.
    ///
    /// Changing any field other than `page` jumps back to page 1, because the
    /// old page number is meaningless against a different result set. An
    /// explicit `page` in the same update is applied afterwards and wins.
    /// Setting a field to the value it already holds does not count as a
    /// change and does not reset the page.
    ///
    /// Returns whether anything actually changed; callers skip the re-query
    /// for a no-op update.
    pub fn apply(&mut self, update: FilterUpdate) -> bool {
        let mut changed = false;

        if let Some(country) = update.country {
            if country != self.country {
                self.country = country;
                changed = true;
            }
        }
        if let Some(category) = update.category {
            if category != self.category {
                self.category = category;
                changed = true;
            }
        }
        if let Some(language) = update.language {
            if language != self.language {
                self.language = language;
                changed = true;
            }
        }
        if let Some(start_date) = update.start_date {
            if start_date != self.start_date {
                self.start_date = start_date;
                changed = true;
            }
        }
        if let Some(end_date) = update.end_date {
            if end_date != self.end_date {
                self.end_date = end_date;
                changed = true;
            }
        }

        if changed {
            self.page = 1;
        }
        if let Some(page) = update.page {
            let page = page.max(1);
            if page != self.page {
                self.page = page;
                changed = true;
            }
        }
        changed
    }

    /// Render the filters as read-endpoint query parameters.
    ///
    /// `country`, `language`, `status=active`, `page`, and `limit` are always
    /// present. `category`, `startDate`, and `endDate` are omitted entirely
    /// when unset; the backend treats absence as "no constraint".
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("country", self.country.clone()),
            ("language", self.language.clone()),
            ("status", STATUS_ACTIVE.to_string()),
        ];
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(start_date) = self.start_date {
            params.push(("startDate", start_date.to_string()));
        }
        if let Some(end_date) = self.end_date {
            params.push(("endDate", end_date.to_string()));
        }
        params.push(("page", self.page.to_string()));
        params.push(("limit", self.limit.to_string()));
        params
    }
}

/// A partial change to [`NewsFilters`].
///
/// Outer `None` means "leave this field alone". For the optional filter
/// fields the payload is itself an `Option`, so `Some(None)` clears the
/// field: `category: Some(None)` switches back to browsing all categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub country: Option<String>,
    pub category: Option<Option<String>>,
    pub language: Option<String>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub page: Option<u32>,
}

/// Raw payload of the read endpoint, in wire shape.
///
/// Error responses reuse the same shape with `success: false` (or no
/// `success` at all) and an `error` message, so this struct doubles as the
/// decoder for failure bodies.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub results: Vec<Article>,
    #[serde(rename = "totalPages")]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A successfully decoded page of articles, ready for the browser core.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsPage {
    pub articles: Vec<Article>,
    /// Total page count, when the backend paginates the result set.
    pub total_pages: Option<u32>,
}

/// Body of a manual-refresh request.
///
/// The backend fetches fresh articles for one country/language pair;
/// `category` is `null` when the reader browses all categories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RefreshRequest {
    pub country: String,
    pub category: Option<String>,
    pub language: String,
}

impl RefreshRequest {
    /// Build the refresh body for the currently active filters.
    pub fn from_filters(filters: &NewsFilters) -> Self {
        Self {
            country: filters.country.clone(),
            category: filters.category.clone(),
            language: filters.language.clone(),
        }
    }
}

/// Lifecycle of the current fetch cycle.
///
/// `Loading` covers the whole empty-result refresh dance: the status does
/// not flap back to `Ready` between the refresh request and the retried
/// query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    /// No query issued yet.
    #[default]
    Idle,
    /// A read query (possibly with a refresh cycle) is outstanding.
    Loading,
    /// The last cycle failed; the payload is the reader-facing message.
    Error(String),
    /// The last cycle completed. The article list may still be empty.
    Ready,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filters() -> NewsFilters {
        NewsFilters::default()
    }

    #[test]
    fn test_article_decodes_wire_format() {
        let json = r#"{
            "_id": "65a1b2c3",
            "title": "Markets rally",
            "description": "Stocks climbed on Monday.",
            "link": "https://example.com/markets-rally",
            "image_url": "https://example.com/img.jpg",
            "source_id": "example_wire",
            "category": ["business", "top"],
            "pubDate": "2024-01-15 10:30:00",
            "country": ["us"],
            "status": "active"
        }"#;

        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.id, "65a1b2c3");
        assert_eq!(article.title, "Markets rally");
        assert_eq!(article.category, vec!["business", "top"]);
        assert_eq!(article.pub_date.as_deref(), Some("2024-01-15 10:30:00"));
    }

    #[test]
    fn test_article_tolerates_sparse_payload() {
        let article: Article = serde_json::from_str(r#"{"title": "Bare"}"#).unwrap();
        assert_eq!(article.id, "");
        assert_eq!(article.description, None);
        assert!(article.category.is_empty());
        assert_eq!(article.published_at(), None);
    }

    #[test]
    fn test_article_serializes_back_to_wire_names() {
        let article = Article {
            id: "abc".to_string(),
            title: "T".to_string(),
            description: None,
            link: "https://example.com".to_string(),
            image_url: None,
            source_id: None,
            category: vec![],
            pub_date: Some("2024-01-15 10:30:00".to_string()),
        };
        let json = serde_json::to_string(&article).unwrap();
        assert!(json.contains(r#""_id":"abc""#));
        assert!(json.contains(r#""pubDate":"2024-01-15 10:30:00""#));
    }

    #[test]
    fn test_published_at_accepts_common_formats() {
        let mut article = Article {
            id: String::new(),
            title: String::new(),
            description: None,
            link: String::new(),
            image_url: None,
            source_id: None,
            category: vec![],
            pub_date: Some("2024-01-15T10:30:00Z".to_string()),
        };
        let rfc3339 = article.published_at().unwrap();
        assert_eq!(rfc3339.to_rfc3339(), "2024-01-15T10:30:00+00:00");

        article.pub_date = Some("2024-01-15 10:30:00".to_string());
        assert_eq!(article.published_at(), Some(rfc3339));

        article.pub_date = Some("2024-01-15".to_string());
        let midnight = article.published_at().unwrap();
        assert_eq!(
            midnight.format("%Y-%m-%d %H:%M").to_string(),
            "2024-01-15 00:00"
        );

        article.pub_date = Some("next Tuesday".to_string());
        assert_eq!(article.published_at(), None);
    }

    #[test]
    fn test_apply_resets_page_on_filter_change() {
        let mut f = filters();
        f.page = 4;
        let changed = f.apply(FilterUpdate {
            country: Some("gb".to_string()),
            ..FilterUpdate::default()
        });
        assert!(changed);
        assert_eq!(f.country, "gb");
        assert_eq!(f.page, 1);
    }

    #[test]
    fn test_apply_keeps_page_on_no_op_change() {
        let mut f = filters();
        f.page = 4;
        let changed = f.apply(FilterUpdate {
            country: Some(DEFAULT_COUNTRY.to_string()),
            ..FilterUpdate::default()
        });
        assert!(!changed);
        assert_eq!(f.page, 4);
    }

    #[test]
    fn test_apply_page_only_does_not_reset() {
        let mut f = filters();
        f.apply(FilterUpdate {
            page: Some(3),
            ..FilterUpdate::default()
        });
        assert_eq!(f.page, 3);
        assert_eq!(f.country, DEFAULT_COUNTRY);
    }

    #[test]
    fn test_apply_clamps_page_to_one() {
        let mut f = filters();
        f.apply(FilterUpdate {
            page: Some(0),
            ..FilterUpdate::default()
        });
        assert_eq!(f.page, 1);
    }

    #[test]
    fn test_apply_clears_category_with_inner_none() {
        let mut f = filters();
        f.category = Some("business".to_string());
        f.page = 2;
        f.apply(FilterUpdate {
            category: Some(None),
            ..FilterUpdate::default()
        });
        assert_eq!(f.category, None);
        assert_eq!(f.page, 1);
    }

    #[test]
    fn test_query_params_omit_unset_filters() {
        let f = filters();
        let params = f.query_params();
        assert!(params.contains(&("country", "us".to_string())));
        assert!(params.contains(&("language", "en".to_string())));
        assert!(params.contains(&("status", "active".to_string())));
        assert!(params.contains(&("page", "1".to_string())));
        assert!(params.contains(&("limit", "12".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "category"));
        assert!(!params.iter().any(|(k, _)| *k == "startDate"));
        assert!(!params.iter().any(|(k, _)| *k == "endDate"));
    }

    #[test]
    fn test_query_params_include_set_filters() {
        let mut f = filters();
        f.category = Some("technology".to_string());
        f.start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        f.end_date = NaiveDate::from_ymd_opt(2024, 1, 31);
        let params = f.query_params();
        assert!(params.contains(&("category", "technology".to_string())));
        assert!(params.contains(&("startDate", "2024-01-01".to_string())));
        assert!(params.contains(&("endDate", "2024-01-31".to_string())));
    }

    #[test]
    fn test_refresh_request_serializes_null_category() {
        let request = RefreshRequest {
            country: "us".to_string(),
            category: None,
            language: "en".to_string(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"country":"us","category":null,"language":"en"}"#);
    }

    #[test]
    fn test_news_response_decodes_without_total_pages() {
        let json = r#"{"success": true, "results": []}"#;
        let response: NewsResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        assert!(response.results.is_empty());
        assert_eq!(response.total_pages, None);
    }

    #[test]
    fn test_news_response_decodes_error_body() {
        let json = r#"{"error": "country not supported"}"#;
        let response: NewsResponse = serde_json::from_str(json).unwrap();
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("country not supported"));
    }
}
