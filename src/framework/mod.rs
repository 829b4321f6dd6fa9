//! Generic actor framework for synchronized collections.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that stored types implement (identity + patch merge)
//! - [`ResourceActor`] - Generic actor owning an ordered, hydratable collection
//! - [`ResourceClient`] - Typed async handle to a running actor
//! - [`Outcome`] / [`FrameworkError`] - Mutation outcomes and plumbing errors
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test clients without spawning full actors.

pub mod core;
pub mod mock;

pub use core::*;
