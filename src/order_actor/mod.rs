//! The order board: one [`ResourceActor`] holding the active orders of a
//! restaurant, driven through an [`OrderClient`].

pub mod entity;
pub mod error;

pub use error::*;

use crate::api::OrderApi;
use crate::clients::OrderClient;
use crate::framework::ResourceActor;
use crate::model::Order;
use crate::notice::Notifier;
use chrono::FixedOffset;
use std::sync::Arc;

const BOARD_BUFFER: usize = 64;

/// Creates a new order board actor and its client.
///
/// `offset` is the zone the display `date`/`time` fields are formatted in.
pub fn new(api: Arc<dyn OrderApi>, notifier: Notifier, offset: FixedOffset) -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(BOARD_BUFFER);
    let client = OrderClient::new(generic_client, api, notifier, offset);
    (actor, client)
}
