//! Error types for the order board.

use crate::api::ApiError;
use crate::framework::FrameworkError;
use thiserror::Error;

/// Errors that can occur during order board operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The backend call failed. Local state was left as it was.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A pushed record could not be turned into an order.
    #[error("Malformed order: {0}")]
    Malformed(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for OrderError {
    fn from(msg: String) -> Self {
        OrderError::ActorCommunicationError(msg)
    }
}

impl From<FrameworkError> for OrderError {
    fn from(e: FrameworkError) -> Self {
        OrderError::ActorCommunicationError(e.to_string())
    }
}
