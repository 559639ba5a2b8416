//! Error types for the Atlas API client.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by Atlas API operations.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// A required argument was missing or empty. Raised before any request is sent.
    #[error("invalid argument `{name}`: {reason}")]
    Argument {
        /// Name of the offending argument.
        name: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The request could not be sent or the response could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error (status {status}, code {}): {detail}", .error_code.as_deref().unwrap_or("none"))]
    Api {
        status: StatusCode,
        /// Atlas error code, e.g. `ATLAS_CUSTOM_ROLE_NOT_FOUND`.
        error_code: Option<String>,
        detail: String,
    },

    /// The response body was not the JSON we expected.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl AtlasError {
    pub(crate) fn argument(name: &'static str, reason: &'static str) -> Self {
        Self::Argument { name, reason }
    }

    /// HTTP status of an API error, if the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Result type for Atlas API operations.
pub type Result<T> = std::result::Result<T, AtlasError>;
