//! Error types for the map picker.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PickerError {
    /// The picker actor has stopped.
    #[error("Map picker closed")]
    ActorClosed,
}
