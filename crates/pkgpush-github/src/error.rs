//! Error types for GitHub API calls

use thiserror::Error;

/// Result type for GitHub API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Error types for GitHub API operations
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested resource does not exist on the remote
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Authentication failed (missing, expired, or insufficiently scoped token)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// The API rate limit was exhausted
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The remote rejected the request (validation failure, non-fast-forward
    /// ref update, and similar)
    #[error("API request failed with status {status}: {message}")]
    Api {
        /// HTTP status code returned by the remote
        status: u16,
        /// Error message parsed from the response body
        message: String,
    },

    /// Transport-level failure (connection, TLS, malformed response body)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Repository slug was not of the form `owner/name`
    #[error("Invalid repository slug '{0}', expected 'owner/name'")]
    InvalidSlug(String),

    /// A configured value could not be used as an HTTP header
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// Remote file content was not valid base64
    #[error("Failed to decode file content: {0}")]
    Decode(#[from] base64::DecodeError),
}

impl ApiError {
    /// True when the error represents a missing remote resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}
