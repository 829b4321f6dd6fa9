//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. The output is compact and hides module paths.
//!
//! ## What Gets Traced
//!
//! - **Actor lifecycle**: board and picker startup, shutdown, final size
//! - **Board changes**: hydrate, insert, patch, remove, each with `id` and `size`
//! - **Client calls**: one span per `OrderClient` operation (`load_initial`,
//!   `set_status`, ...) carrying its arguments
//! - **Gestures**: editing mode changes, selected points and areas
//! - **Notices**: every toast the user is shown, at `info` or `error`
//!
//! ## Usage Examples
//!
//! ```bash
//! # Board changes and notices
//! RUST_LOG=info cargo run
//!
//! # Full payloads of pushed events and patches
//! RUST_LOG=debug cargo run
//!
//! # Only the framework's store operations
//! RUST_LOG=kitchen_desk::framework=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a new order followed by an approval looks like:
//!
//! ```text
//! INFO order_desk: Inserted entity_type="Order" id=o7 size=4
//! INFO order_desk: Notice text=New order received!
//! INFO set_status: Patched entity_type="Order" id=o7
//! INFO set_status: Status updated outcome=Applied
//! INFO set_status: Notice text=Order approved and moved to preparing
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Module paths add noise; entity_type says which store
        .compact() // Spans inline, e.g. "order_desk:set_status"
        .init();
}
