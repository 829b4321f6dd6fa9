//! In-process push feed.
//!
//! A hub keyed by restaurant id. Whatever transport receives the backend's
//! frames (the demo binary reads them from stdin) publishes them here, and
//! every subscriber for that restaurant gets its own copy.

use super::{decode_frame, PushError, PushEvent, PushFeed};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const SUBSCRIBER_BUFFER: usize = 64;

type Subscribers = HashMap<String, Vec<mpsc::Sender<PushEvent>>>;

#[derive(Clone, Default)]
pub struct ChannelFeed {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl ChannelFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every live subscriber of `restaurant_id`.
    /// Returns how many received it.
    pub async fn publish(&self, restaurant_id: &str, event: PushEvent) -> usize {
        let targets = self.live_subscribers(restaurant_id);
        let mut delivered = 0;
        for target in targets {
            if target.send(event.clone()).await.is_ok() {
                delivered += 1;
            }
        }
        debug!(restaurant_id, delivered, "Published push event");
        delivered
    }

    /// Decode one Socket.IO frame and publish it. Frames that are not order
    /// events are skipped.
    pub async fn publish_frame(&self, restaurant_id: &str, frame: &str) -> Result<usize, PushError> {
        match decode_frame(frame)? {
            Some(event) => Ok(self.publish(restaurant_id, event).await),
            None => Ok(0),
        }
    }

    pub fn subscriber_count(&self, restaurant_id: &str) -> usize {
        self.live_subscribers(restaurant_id).len()
    }

    /// Senders whose receiver is still alive; closed ones are pruned.
    fn live_subscribers(&self, restaurant_id: &str) -> Vec<mpsc::Sender<PushEvent>> {
        let mut subscribers = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Subscriber table poisoned, recovering");
                poisoned.into_inner()
            }
        };
        let Some(senders) = subscribers.get_mut(restaurant_id) else {
            return Vec::new();
        };
        senders.retain(|sender| !sender.is_closed());
        senders.clone()
    }
}

#[async_trait]
impl PushFeed for ChannelFeed {
    async fn subscribe(&self, restaurant_id: &str) -> Result<mpsc::Receiver<PushEvent>, PushError> {
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_BUFFER);
        let mut subscribers = self.subscribers.lock().map_err(|_| PushError::Closed)?;
        subscribers.entry(restaurant_id.to_string()).or_default().push(sender);
        info!(restaurant_id, "Subscribed to order events");
        Ok(receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawOrder;

    #[tokio::test]
    async fn test_events_reach_only_their_restaurant() {
        let feed = ChannelFeed::new();
        let mut r1 = feed.subscribe("r1").await.unwrap();
        let mut r2 = feed.subscribe("r2").await.unwrap();

        let delivered = feed.publish("r1", PushEvent::NewOrder(RawOrder::default())).await;
        assert_eq!(delivered, 1);
        assert!(r1.try_recv().is_ok());
        assert!(r2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dropped_receivers_are_pruned() {
        let feed = ChannelFeed::new();
        let receiver = feed.subscribe("r1").await.unwrap();
        assert_eq!(feed.subscriber_count("r1"), 1);

        drop(receiver);
        assert_eq!(feed.subscriber_count("r1"), 0);
        assert_eq!(feed.publish_frame("r1", r#"42["order:update",{"id":"o1"}]"#).await.unwrap(), 0);
    }
}
