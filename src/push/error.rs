//! Error types for the push subscription.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PushError {
    /// The feed is gone and no further events will arrive.
    #[error("Push feed closed")]
    Closed,

    /// A frame could not be decoded into an event.
    #[error("Bad push frame: {0}")]
    Frame(String),
}

impl From<serde_json::Error> for PushError {
    fn from(e: serde_json::Error) -> Self {
        PushError::Frame(e.to_string())
    }
}
