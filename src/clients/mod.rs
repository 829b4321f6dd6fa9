//! Type-safe wrappers around the actors' channels.

pub mod actor_client;
pub mod order_client;
pub mod picker_client;

pub use actor_client::*;
pub use order_client::*;
pub use picker_client::*;
