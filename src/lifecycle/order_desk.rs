use crate::api::OrderApi;
use crate::clients::OrderClient;
use crate::model::Order;
use crate::notice::Notifier;
use crate::order_actor::OrderError;
use crate::push::{PushEvent, PushFeed, Subscription};
use chrono::FixedOffset;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn, Instrument};

/// The order board of one restaurant while it is on screen.
///
/// `OrderDesk` is responsible for:
/// - **Startup**: spawning the board actor, subscribing to push events, and
///   starting the initial load, in that order, so no event is missed
/// - **Teardown**: releasing the push subscription whatever state the board
///   is in, then waiting for the board actor to stop
///
/// # Example
///
/// ```ignore
/// let mut desk = OrderDesk::mount("r1", api, &feed, notifier, offset).await;
/// desk.initial_load().await;
///
/// let pending = desk.orders().filter_by_tab(OrderStatus::Pending, "").await?;
/// desk.orders().approve("o1").await?;
///
/// desk.unmount().await?;
/// ```
pub struct OrderDesk {
    restaurant_id: String,
    orders: Option<OrderClient>,
    subscription: Option<Subscription>,
    initial_load: Option<JoinHandle<Result<Vec<Order>, OrderError>>>,
    board: Option<JoinHandle<()>>,
}

impl OrderDesk {
    /// Mount the board for `restaurant_id`.
    ///
    /// A feed that refuses the subscription is logged and the desk runs
    /// without live updates.
    pub async fn mount(
        restaurant_id: impl Into<String>,
        api: Arc<dyn OrderApi>,
        feed: &dyn PushFeed,
        notifier: Notifier,
        offset: FixedOffset,
    ) -> Self {
        let restaurant_id = restaurant_id.into();
        let span = tracing::info_span!("order_desk", restaurant_id = %restaurant_id);

        let (board_actor, orders) = crate::order_actor::new(api, notifier, offset);
        let board = tokio::spawn(board_actor.run().instrument(span.clone()));

        let subscription = match feed.subscribe(&restaurant_id).await {
            Ok(events) => {
                let pump = tokio::spawn(pump(events, orders.clone()).instrument(span.clone()));
                Some(Subscription::new(restaurant_id.clone(), pump))
            }
            Err(e) => {
                warn!(restaurant_id = %restaurant_id, error = %e, "Push subscription failed, running without live updates");
                None
            }
        };

        let initial_load = {
            let orders = orders.clone();
            let restaurant_id = restaurant_id.clone();
            tokio::spawn(async move { orders.load_initial(&restaurant_id).await }.instrument(span))
        };

        info!(restaurant_id = %restaurant_id, "Order desk mounted");
        Self {
            restaurant_id,
            orders: Some(orders),
            subscription,
            initial_load: Some(initial_load),
            board: Some(board),
        }
    }

    pub fn restaurant_id(&self) -> &str {
        &self.restaurant_id
    }

    /// The board client. Valid until [`unmount`](Self::unmount).
    pub fn orders(&self) -> &OrderClient {
        self.orders
            .as_ref()
            .unwrap_or_else(|| unreachable!("orders client is only taken by unmount"))
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }

    /// Wait for the initial load. `None` once it has already been collected.
    pub async fn initial_load(&mut self) -> Option<Result<Vec<Order>, OrderError>> {
        let handle = self.initial_load.take()?;
        Some(match handle.await {
            Ok(result) => result,
            Err(e) => Err(OrderError::ActorCommunicationError(format!("Initial load task failed: {e}"))),
        })
    }

    /// Tear the desk down.
    ///
    /// The subscription is released first and unconditionally. The board
    /// actor stops once every [`OrderClient`] clone is gone, so callers must
    /// not hold on to clones past this point.
    pub async fn unmount(mut self) -> Result<(), String> {
        info!(restaurant_id = %self.restaurant_id, "Unmounting order desk");
        self.release();

        if let Some(board) = self.board.take() {
            if let Err(e) = board.await {
                error!("Board actor failed: {:?}", e);
                return Err(format!("Board actor failed: {:?}", e));
            }
        }

        info!("Order desk unmounted");
        Ok(())
    }

    fn release(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.release();
        }
        if let Some(initial_load) = self.initial_load.take() {
            initial_load.abort();
        }
        self.orders = None;
    }
}

impl Drop for OrderDesk {
    fn drop(&mut self) {
        self.release();
    }
}

/// Feed push events to the board one at a time, in arrival order.
async fn pump(mut events: mpsc::Receiver<PushEvent>, orders: OrderClient) {
    while let Some(event) = events.recv().await {
        match orders.apply_push(event).await {
            Ok(outcome) => debug!(?outcome, "Push event handled"),
            Err(OrderError::Malformed(reason)) => warn!(%reason, "Push event dropped"),
            Err(e) => {
                warn!(error = %e, "Board unavailable, stopping push pump");
                break;
            }
        }
    }
    debug!("Push pump stopped");
}
