//! Client error types.

use thiserror::Error;

/// Error type for API client operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller-supplied input was invalid; nothing was sent upstream.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Credentials were rejected by the service.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Transport-level failure (connection, DNS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx, non-auth response from the service.
    #[error("Upstream error: status {status}: {body}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The requested resource does not exist upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body did not match the expected wire contract.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns true if retrying the same request later might succeed.
    ///
    /// Only transport failures qualify; auth and upstream errors are
    /// surfaced without further retries within a refresh cycle.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
