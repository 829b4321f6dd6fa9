//! # Kitchen Desk
//!
//! > **Headless core of a restaurant dashboard.**
//!
//! Two subsystems, each an actor in its own Tokio task:
//!
//! - the **order board**: a live view of a restaurant's active orders, fed by
//!   one bulk fetch plus a push stream, changed through the status API;
//! - the **map picker**: turns raw pointer and touch input into either a
//!   picked point (with a reverse-geocoded address) or a selected rectangle.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Actors instead of locks
//! Board state lives inside a generic [`ResourceActor`](framework::ResourceActor)
//! that processes one message at a time, so pushes, loads and status changes
//! never interleave half-way. Mutations that arrive before the first bulk load
//! are held back and replayed after it, in arrival order.
//!
//! ### 2. Outcomes vs errors
//! A duplicate `order:new` or an update for an unknown order is
//! [`Outcome::Ignored`](framework::Outcome), not an error. Errors are per-module
//! `thiserror` enums ([`ApiError`](api::ApiError), [`OrderError`](order_actor::OrderError),
//! [`PushError`](push::PushError), [`PickerError`](map_picker::PickerError))
//! and never leave local state half-changed. What the user should see goes out
//! as a [`Notice`](notice::Notice).
//!
//! ### 3. Pure gestures
//! [`GestureMachine`](map_picker::GestureMachine) is a plain value returning
//! effects. The [`MapPicker`](map_picker::MapPicker) actor owns the one armed
//! timer and the geocoder, so stale timers and read-only mode are decided in
//! one place.
//!
//! ### 4. Observability
//! `tracing` everywhere with structured fields. See [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! - [`framework`]: the generic store actor, its client and test mocks.
//! - [`model`]: wire records, normalized orders, statuses, addresses, filters.
//! - [`api`]: the backend contract, its `reqwest` client and scripted doubles.
//! - [`push`]: push events, Socket.IO frame decoding, the subscription guard.
//! - [`order_actor`] and [`clients`]: the board and the clients that drive it.
//! - [`map_picker`]: the gesture machine and picker actor.
//! - [`lifecycle`]: [`OrderDesk`](lifecycle::OrderDesk) mounting and teardown.
//! - [`config`], [`notice`]: environment settings and user notifications.
//!
//! ### Running the Demo
//!
//! ```bash
//! KITCHEN_RESTAURANT_ID=r1 RUST_LOG=info cargo run
//! ```

pub mod api;
pub mod clients;
pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod map_picker;
pub mod model;
pub mod notice;
pub mod order_actor;
pub mod push;
