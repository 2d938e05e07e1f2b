//! Error types for backend communication and configuration loading.
//!
//! Failures fall into two families:
//! - [`ApiError`]: anything that goes wrong while talking to the news backend
//! - [`ConfigError`]: problems assembling the runtime configuration
//!
//! [`ApiError`] distinguishes transport failures from rate limiting and from
//! requests the backend itself rejected, because each surfaces a different
//! message to the reader. [`ApiError::user_message`] performs that mapping.

use thiserror::Error;

/// Message shown when the backend cannot be reached or returns garbage.
pub const CONNECTION_FAILED_MSG: &str = "Backend server connection failed.";

/// Message shown when the backend answers with HTTP 429.
pub const RATE_LIMITED_MSG: &str = "Rate limit reached. Please wait a moment and try again.";

/// Message shown when a manual-refresh request fails.
pub const REFRESH_FAILED_MSG: &str = "Could not update database with new articles.";

/// Convenience alias for backend call results.
pub type ApiResult<T> = Result<T, ApiError>;

/// Everything that can go wrong while talking to the news backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a usable HTTP response: DNS failure,
    /// connection refused, timeout, TLS trouble.
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered HTTP 429. Kept separate from [`ApiError::Status`]
    /// so the reader sees a wait-and-retry hint instead of a generic failure.
    #[error("rate limited by backend (HTTP 429)")]
    RateLimited,

    /// A non-2xx response other than 429. Carries the backend's own error
    /// message when the body contained one.
    #[error("backend returned HTTP {status}: {}", message.as_deref().unwrap_or("no detail"))]
    Status { status: u16, message: Option<String> },

    /// A 2xx response whose body reported `success: false`.
    #[error("backend rejected the request: {}", message.as_deref().unwrap_or("no detail"))]
    Rejected { message: Option<String> },

    /// A 2xx response whose body could not be decoded at all.
    #[error("backend payload could not be decoded: {0}")]
    Payload(#[from] serde_json::Error),
}

impl ApiError {
    /// The message a failed read query surfaces to the reader.
    ///
    /// Backend-provided messages win when present; rate limiting gets its
    /// dedicated hint; everything else collapses to the generic connection
    /// failure text.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::RateLimited => RATE_LIMITED_MSG.to_string(),
            ApiError::Status {
                message: Some(msg), ..
            }
            | ApiError::Rejected {
                message: Some(msg), ..
            } => msg.clone(),
            _ => CONNECTION_FAILED_MSG.to_string(),
        }
    }
}

/// Problems assembling the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read from disk.
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file was not valid YAML for the expected shape.
    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The backend base URL did not parse as an absolute URL.
    #[error("invalid backend base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The backend base URL parsed, but with a scheme other than http(s).
    #[error("unsupported scheme {scheme:?} in backend base URL {url:?}")]
    UnsupportedScheme { url: String, scheme: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_user_message() {
        assert_eq!(ApiError::RateLimited.user_message(), RATE_LIMITED_MSG);
    }

    #[test]
    fn test_backend_message_wins_when_present() {
        let err = ApiError::Status {
            status: 500,
            message: Some("database offline".to_string()),
        };
        assert_eq!(err.user_message(), "database offline");

        let err = ApiError::Rejected {
            message: Some("unsupported country".to_string()),
        };
        assert_eq!(err.user_message(), "unsupported country");
    }

    #[test]
    fn test_bare_status_falls_back_to_generic_message() {
        let err = ApiError::Status {
            status: 502,
            message: None,
        };
        assert_eq!(err.user_message(), CONNECTION_FAILED_MSG);
    }

    #[test]
    fn test_payload_error_falls_back_to_generic_message() {
        let bad = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert_eq!(ApiError::Payload(bad).user_message(), CONNECTION_FAILED_MSG);
    }

    #[test]
    fn test_display_includes_backend_detail() {
        let err = ApiError::Status {
            status: 503,
            message: Some("maintenance window".to_string()),
        };
        let text = err.to_string();
        assert!(text.contains("503"));
        assert!(text.contains("maintenance window"));
    }
}
