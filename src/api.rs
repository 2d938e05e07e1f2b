//! HTTP client for the news backend.
//!
//! This module provides the interface for communicating with the backend's
//! two endpoints: the read endpoint serving cached articles and the
//! manual-refresh endpoint that asks the backend to pull fresh ones.
//!
//! # Architecture
//!
//! The module uses a trait-based design for flexibility:
//! - [`NewsBackend`]: core trait defining the two backend calls
//! - [`BackendClient`]: `reqwest`-backed implementation against a real server
//!
//! Session code holds a `dyn NewsBackend`, so tests substitute a scripted
//! backend without touching the network.
//!
//! # Decoding rules
//!
//! For the read endpoint, in order:
//! - HTTP 429 maps to [`ApiError::RateLimited`] before the body is touched
//! - any other non-2xx maps to [`ApiError::Status`], carrying the backend's
//!   `error` message when the body had one
//! - a 2xx body that is not valid JSON maps to [`ApiError::Payload`]
//! - a decoded body with `success: false` maps to [`ApiError::Rejected`]
//!
//! The refresh endpoint is fire-and-forget: any 2xx counts as accepted and
//! the body is not inspected further.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::models::{NewsFilters, NewsPage, NewsResponse, RefreshRequest};
use crate::utils::truncate_for_log;

/// Read path for cached articles.
const NEWS_PATH: &str = "/api/news";

/// Write path asking the backend to pull fresh articles.
const REFRESH_PATH: &str = "/api/news/fetch-manual";

/// Longest body slice that ever lands in a log line.
const BODY_LOG_LIMIT: usize = 256;

/// The two backend calls the browser core needs.
#[async_trait]
pub trait NewsBackend: Send + Sync {
    /// Fetch one page of cached articles matching `filters`.
    async fn fetch_news(&self, filters: &NewsFilters) -> ApiResult<NewsPage>;

    /// Ask the backend to pull fresh articles for the filtered feed.
    ///
    /// Success only means the backend accepted the job; new articles become
    /// visible through a later [`NewsBackend::fetch_news`] call.
    async fn request_refresh(&self, request: &RefreshRequest) -> ApiResult<()>;
}

/// [`NewsBackend`] implementation backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client against the configured backend.
    pub fn new(config: &Config) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("newsdeck/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: config.backend_url.clone(),
        })
    }
}

#[async_trait]
impl NewsBackend for BackendClient {
    #[instrument(
        level = "info",
        skip_all,
        fields(country = %filters.country, language = %filters.language, page = filters.page)
    )]
    async fn fetch_news(&self, filters: &NewsFilters) -> ApiResult<NewsPage> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(format!("{}{}", self.base_url, NEWS_PATH))
            .query(&filters.query_params())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "read query rate limited"
            );
            return Err(ApiError::RateLimited);
        }

        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<NewsResponse>(&body)
                .ok()
                .and_then(|decoded| decoded.error);
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                body = %truncate_for_log(&body, BODY_LOG_LIMIT),
                "read query failed"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let decoded: NewsResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(
                error = %e,
                body = %truncate_for_log(&body, BODY_LOG_LIMIT),
                "read query payload did not decode"
            );
            ApiError::Payload(e)
        })?;

        if !decoded.success {
            warn!(error = ?decoded.error, "backend reported failure for read query");
            return Err(ApiError::Rejected {
                message: decoded.error,
            });
        }

        info!(
            count = decoded.results.len(),
            total_pages = ?decoded.total_pages,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "read query succeeded"
        );
        Ok(NewsPage {
            articles: decoded.results,
            total_pages: decoded.total_pages,
        })
    }

    #[instrument(
        level = "info",
        skip_all,
        fields(country = %request.country, language = %request.language)
    )]
    async fn request_refresh(&self, request: &RefreshRequest) -> ApiResult<()> {
        let t0 = Instant::now();
        let response = self
            .client
            .post(format!("{}{}", self.base_url, REFRESH_PATH))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "refresh request rate limited"
            );
            return Err(ApiError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<NewsResponse>(&body)
                .ok()
                .and_then(|decoded| decoded.error);
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                body = %truncate_for_log(&body, BODY_LOG_LIMIT),
                "refresh request failed"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "refresh request accepted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CONNECTION_FAILED_MSG;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BackendClient {
        let config = Config {
            backend_url: server.uri(),
            ..Config::default()
        };
        BackendClient::new(&config).unwrap()
    }

    fn article_json(id: &str) -> serde_json::Value {
        json!({
            "_id": id,
            "title": format!("Story {id}"),
            "description": "Something happened.",
            "link": format!("https://example.com/{id}"),
            "source_id": "example_wire",
            "category": ["technology"],
            "pubDate": "2024-01-15 10:30:00"
        })
    }

    #[tokio::test]
    async fn test_fetch_news_decodes_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .and(query_param("country", "us"))
            .and(query_param("language", "en"))
            .and(query_param("status", "active"))
            .and(query_param("page", "1"))
            .and(query_param("limit", "12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "results": [article_json("a1"), article_json("a2")],
                "totalPages": 3
            })))
            .mount(&server)
            .await;

        let page = client_for(&server)
            .fetch_news(&NewsFilters::default())
            .await
            .unwrap();

        assert_eq!(page.articles.len(), 2);
        assert_eq!(page.articles[0].id, "a1");
        assert_eq!(page.total_pages, Some(3));
    }

    #[tokio::test]
    async fn test_fetch_news_sends_optional_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .and(query_param("category", "technology"))
            .and(query_param("startDate", "2024-01-01"))
            .and(query_param("endDate", "2024-01-31"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "results": []
            })))
            .mount(&server)
            .await;

        let mut filters = NewsFilters::default();
        filters.category = Some("technology".to_string());
        filters.start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        filters.end_date = NaiveDate::from_ymd_opt(2024, 1, 31);

        let page = client_for(&server).fetch_news(&filters).await.unwrap();
        assert!(page.articles.is_empty());
        assert_eq!(page.total_pages, None);
    }

    #[tokio::test]
    async fn test_fetch_news_maps_429_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_news(&NewsFilters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::RateLimited));
    }

    #[tokio::test]
    async fn test_fetch_news_surfaces_backend_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"error": "database offline"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_news(&NewsFilters::default())
            .await
            .unwrap_err();
        match &err {
            ApiError::Status { status, message } => {
                assert_eq!(*status, 500);
                assert_eq!(message.as_deref(), Some("database offline"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.user_message(), "database offline");
    }

    #[tokio::test]
    async fn test_fetch_news_rejected_when_success_false() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "country not supported"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_news(&NewsFilters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected { .. }));
        assert_eq!(err.user_message(), "country not supported");
    }

    #[tokio::test]
    async fn test_fetch_news_payload_error_on_garbage_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_news(&NewsFilters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Payload(_)));
        assert_eq!(err.user_message(), CONNECTION_FAILED_MSG);
    }

    #[tokio::test]
    async fn test_fetch_news_transport_error_when_backend_is_down() {
        // Bind to an OS-assigned port, then free it so nothing answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let dead_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let config = Config {
            backend_url: dead_url,
            ..Config::default()
        };
        let err = BackendClient::new(&config)
            .unwrap()
            .fetch_news(&NewsFilters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.user_message(), CONNECTION_FAILED_MSG);
    }

    #[tokio::test]
    async fn test_request_refresh_posts_wire_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/news/fetch-manual"))
            .and(body_json(json!({
                "country": "us",
                "category": null,
                "language": "en"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let request = RefreshRequest::from_filters(&NewsFilters::default());
        client_for(&server).request_refresh(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_request_refresh_maps_429_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/news/fetch-manual"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let request = RefreshRequest::from_filters(&NewsFilters::default());
        let err = client_for(&server)
            .request_refresh(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::RateLimited));
    }

    #[tokio::test]
    async fn test_request_refresh_failure_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/news/fetch-manual"))
            .respond_with(
                ResponseTemplate::new(502).set_body_json(json!({"error": "upstream fetch failed"})),
            )
            .mount(&server)
            .await;

        let request = RefreshRequest::from_filters(&NewsFilters::default());
        let err = client_for(&server)
            .request_refresh(&request)
            .await
            .unwrap_err();
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message.as_deref(), Some("upstream fetch failed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
