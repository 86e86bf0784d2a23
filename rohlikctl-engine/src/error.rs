//! Engine error types.

use thiserror::Error;

use rohlikctl_client::ApiError;

/// Errors from configuration handling and engine assembly.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Credentials are missing or incomplete.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error reading or writing the config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API client error during engine assembly.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Errors returned by the action gateway.
///
/// `NoMatch` is distinct from validation and transport
/// failures so callers can react differently (announce "not found" vs.
/// report an error).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Caller input rejected before anything was sent upstream.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Search produced no results to act on.
    #[error("No product matched \"{query}\"")]
    NoMatch {
        /// The query that produced no results.
        query: String,
    },

    /// Underlying API failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}
