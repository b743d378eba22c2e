use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the GitLab client.
///
/// Tool code matches on the variant; the message text is for humans only.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GitLabError {
    /// HTTP 401. Never retried.
    #[error("Authentication failed. Check that the GitLab token is valid.")]
    Authentication,

    /// HTTP 404 for the requested API path.
    #[error("Resource not found: {path}")]
    NotFound { path: String },

    /// HTTP 429 that persisted through every retry attempt.
    #[error("Rate limit exceeded, retry after {:.1}s", retry_after.as_secs_f64())]
    RateLimit { retry_after: Duration },

    /// Any other failure. `status` is 0 when no HTTP response was received.
    #[error("GitLab API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Settings rejected before any request is made.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The HTTP client itself could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl GitLabError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// HTTP status associated with the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::RateLimit { .. } => Some(429),
            Self::Api { status, .. } if *status != 0 => Some(*status),
            _ => None,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication)
    }
}
