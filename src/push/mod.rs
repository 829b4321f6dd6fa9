//! Push stream of order events.
//!
//! A [`PushFeed`] hands out one receiver per subscription. The receiving end
//! is drained by a pump task whose lifetime is tied to a [`Subscription`]
//! guard: dropping or releasing the guard stops the pump, so a torn-down
//! board never receives events.

pub mod channel;
pub mod error;
pub mod frame;

pub use channel::*;
pub use error::*;
pub use frame::*;

use crate::model::RawOrder;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// `order:new`
    NewOrder(RawOrder),
    /// `order:update`, a partial record keyed by id.
    OrderUpdate(RawOrder),
}

impl PushEvent {
    pub fn order_id(&self) -> &str {
        match self {
            PushEvent::NewOrder(raw) | PushEvent::OrderUpdate(raw) => &raw.id,
        }
    }
}

/// Source of push events for one restaurant.
#[async_trait]
pub trait PushFeed: Send + Sync {
    async fn subscribe(&self, restaurant_id: &str) -> Result<mpsc::Receiver<PushEvent>, PushError>;
}

/// Scoped handle on a running pump. Stops it on release or drop.
#[derive(Debug)]
pub struct Subscription {
    restaurant_id: String,
    pump: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(restaurant_id: impl Into<String>, pump: JoinHandle<()>) -> Self {
        Self { restaurant_id: restaurant_id.into(), pump: Some(pump) }
    }

    pub fn restaurant_id(&self) -> &str {
        &self.restaurant_id
    }

    pub fn is_active(&self) -> bool {
        self.pump.as_ref().is_some_and(|pump| !pump.is_finished())
    }

    pub fn release(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
            info!(restaurant_id = %self.restaurant_id, "Unsubscribed from order events");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop();
    }
}
