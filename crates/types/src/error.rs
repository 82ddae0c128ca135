//! Unified error type for the teamleader workspace.
//!
//! Every failed call surfaces as exactly one of three kinds:
//! [`TeamleaderError::InvalidAccessToken`] (re-authorize),
//! [`TeamleaderError::TooManyRequests`] (retry later) and
//! [`TeamleaderError::Api`] (everything else).

use std::time::Duration;
use thiserror::Error;

/// Enumerates the error kinds a caller of the SDK can observe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TeamleaderError {
    /// No usable access token is available; the authorization flow must run again.
    #[error("{0}")]
    InvalidAccessToken(String),

    /// The API rejected the call with `429` and told us how long to wait.
    #[error("{message}")]
    TooManyRequests {
        message: String,
        status: u16,
        retry_after_secs: u64,
    },

    /// Any other failure, with the HTTP status when a response was received.
    #[error("{message}")]
    Api {
        message: String,
        status: Option<u16>,
    },
}

impl TeamleaderError {
    /// Generic failure without an HTTP status.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            status: None,
        }
    }

    /// Generic failure tied to an HTTP status code.
    pub fn api_with_status(message: impl Into<String>, status: u16) -> Self {
        Self::Api {
            message: message.into(),
            status: Some(status),
        }
    }

    /// The HTTP status that caused this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidAccessToken(_) => None,
            Self::TooManyRequests { status, .. } => Some(*status),
            Self::Api { status, .. } => *status,
        }
    }

    /// How long the API asked us to back off, for rate-limit errors.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::TooManyRequests {
                retry_after_secs, ..
            } => Some(Duration::from_secs(*retry_after_secs)),
            _ => None,
        }
    }

    /// Returns `true` if the error is likely transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TooManyRequests { .. } => true,
            Self::Api {
                status: Some(status),
                ..
            } => matches!(status, 408 | 500 | 502 | 503 | 504),
            Self::Api { status: None, .. } => true, // transport errors are retryable
            Self::InvalidAccessToken(_) => false,
        }
    }
}

impl From<serde_json::Error> for TeamleaderError {
    fn from(e: serde_json::Error) -> Self {
        Self::api(e.to_string())
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for TeamleaderError {
    fn from(e: sqlx::Error) -> Self {
        Self::api(format!("token store error: {e}"))
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, TeamleaderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_message_verbatim() {
        let err = TeamleaderError::api_with_status("Error 404: Not found", 404);
        assert_eq!(err.to_string(), "Error 404: Not found");

        let err = TeamleaderError::InvalidAccessToken("please re-authorize".into());
        assert_eq!(err.to_string(), "please re-authorize");
    }

    #[test]
    fn test_status() {
        assert_eq!(TeamleaderError::api("boom").status(), None);
        assert_eq!(
            TeamleaderError::api_with_status("x", 500).status(),
            Some(500)
        );
        let limited = TeamleaderError::TooManyRequests {
            message: "Error 429: slow down".into(),
            status: 429,
            retry_after_secs: 30,
        };
        assert_eq!(limited.status(), Some(429));
        assert_eq!(limited.retry_after(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid {{{").unwrap_err();
        let err: TeamleaderError = json_err.into();
        assert!(matches!(err, TeamleaderError::Api { status: None, .. }));
    }

    #[test]
    fn test_is_retryable() {
        assert!(
            TeamleaderError::TooManyRequests {
                message: String::new(),
                status: 429,
                retry_after_secs: 1
            }
            .is_retryable()
        );
        assert!(TeamleaderError::api_with_status("", 503).is_retryable());
        assert!(TeamleaderError::api("connection refused").is_retryable());
        assert!(!TeamleaderError::api_with_status("", 404).is_retryable());
        assert!(!TeamleaderError::api_with_status("", 401).is_retryable());
        assert!(!TeamleaderError::InvalidAccessToken(String::new()).is_retryable());
    }
}
