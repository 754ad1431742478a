//! Internal error types for the HTTP adapters.
//!
//! These errors are internal to `parley-http` and are mapped to core port
//! errors at the boundary.

use parley_core::{FeedProbeError, TtsPortError, UploadError};
use thiserror::Error;

/// Result type alias for HTTP adapter operations.
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors raised while talking to the backend.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The backend answered with a non-success status.
    #[error("Request failed with status {status}: {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// The backend answered with something we could not interpret.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl From<HttpError> for TtsPortError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status { status, .. } => Self::Status { status },
            HttpError::InvalidResponse { .. } | HttpError::JsonParse(_) => {
                Self::InvalidResponse(err.to_string())
            }
            HttpError::Network(ref e) if e.is_decode() => Self::InvalidResponse(err.to_string()),
            HttpError::Network(_) | HttpError::InvalidUrl(_) => Self::Network(err.to_string()),
        }
    }
}

impl From<HttpError> for FeedProbeError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status { status, .. } => Self::Status { status },
            HttpError::InvalidResponse { .. } | HttpError::JsonParse(_) => {
                Self::InvalidResponse(err.to_string())
            }
            HttpError::Network(ref e) if e.is_decode() => Self::InvalidResponse(err.to_string()),
            HttpError::Network(_) | HttpError::InvalidUrl(_) => Self::Unreachable(err.to_string()),
        }
    }
}

impl From<HttpError> for UploadError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status { status, .. } => Self::Rejected { status },
            HttpError::InvalidResponse { .. } | HttpError::JsonParse(_) => {
                Self::InvalidResponse(err.to_string())
            }
            HttpError::Network(_) | HttpError::InvalidUrl(_) => Self::Network(err.to_string()),
        }
    }
}
