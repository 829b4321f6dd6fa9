//! Startup, wiring and teardown.
//!
//! - [`OrderDesk`] mounts the order board of one restaurant and owns its push
//!   subscription.
//! - [`setup_tracing`] initializes logging.

pub mod order_desk;
pub mod tracing;

pub use order_desk::*;
pub use tracing::*;
