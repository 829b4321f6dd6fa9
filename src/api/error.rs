//! Error types for the HTTP layer.

use thiserror::Error;

/// Failure of a single backend call. Every variant is recoverable: it is
/// scoped to the call that produced it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never got a response (DNS, connect, timeout, reset).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend rejected the session token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Non-2xx response. `message` comes from the `{message}` body when present.
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// 2xx response whose body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Malformed(e.to_string())
    }
}
