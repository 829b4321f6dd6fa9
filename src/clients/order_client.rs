use crate::api::OrderApi;
use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, Outcome, ResourceClient};
use crate::model::{Order, OrderFilter, OrderStatus, RawOrder};
use crate::notice::{Notice, Notifier};
use crate::order_actor::OrderError;
use crate::push::PushEvent;
use async_trait::async_trait;
use chrono::FixedOffset;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub const NOTICE_NEW_ORDER: &str = "New order received!";
pub const NOTICE_FETCH_FAILED: &str = "Failed to fetch orders";
pub const NOTICE_HISTORY_FAILED: &str = "Failed to fetch order history";
pub const NOTICE_STATUS_FAILED: &str = "Failed to update order status";
pub const NOTICE_APPROVED: &str = "Order approved and moved to preparing";
pub const NOTICE_APPROVE_FAILED: &str = "Failed to approve order";
pub const NOTICE_REJECTED: &str = "Order rejected";
pub const NOTICE_REJECT_FAILED: &str = "Failed to reject order";

/// Client for the order board.
///
/// Reads go straight to the board actor. Status changes go to the backend
/// first and touch the board only once the backend has accepted them.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    api: Arc<dyn OrderApi>,
    notifier: Notifier,
    offset: FixedOffset,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>, api: Arc<dyn OrderApi>, notifier: Notifier, offset: FixedOffset) -> Self {
        Self { inner, api, notifier, offset }
    }

    fn normalize(&self, raw: RawOrder) -> Order {
        Order::from_raw(raw, self.offset)
    }

    /// Fetch the active orders and hydrate the board with them.
    ///
    /// All or nothing: on failure the board is hydrated empty, so push events
    /// that arrived in the meantime still get applied, and the error is
    /// returned after the user has been told.
    #[instrument(skip(self))]
    pub async fn load_initial(&self, restaurant_id: &str) -> Result<Vec<Order>, OrderError> {
        match self.api.fetch_active(restaurant_id).await {
            Ok(raws) => {
                let orders: Vec<Order> = raws.into_iter().map(|raw| self.normalize(raw)).collect();
                let size = self.inner.hydrate(orders).await.map_err(Self::map_error)?;
                info!(size, "Orders loaded");
                self.inner.snapshot().await.map_err(Self::map_error)
            }
            Err(e) => {
                error!(error = %e, "Order fetch failed");
                self.inner.hydrate(Vec::new()).await.map_err(Self::map_error)?;
                self.notifier.notify(Notice::error(NOTICE_FETCH_FAILED));
                Err(e.into())
            }
        }
    }

    /// Apply one push event to the board.
    #[instrument(skip(self, event), fields(order_id = %event.order_id()))]
    pub async fn apply_push(&self, event: PushEvent) -> Result<Outcome, OrderError> {
        debug!(?event, "apply_push called");
        if event.order_id().trim().is_empty() {
            warn!("Dropping pushed order without an id");
            return Err(OrderError::Malformed("order without id".to_string()));
        }

        match event {
            PushEvent::NewOrder(raw) => {
                let outcome = self.inner.insert(self.normalize(raw)).await.map_err(Self::map_error)?;
                if outcome.is_applied() {
                    self.notifier.notify(Notice::success(NOTICE_NEW_ORDER));
                }
                Ok(outcome)
            }
            PushEvent::OrderUpdate(raw) => {
                let id = raw.id.clone();
                self.inner.patch(id, raw).await.map_err(Self::map_error)
            }
        }
    }

    /// Ask the backend to move an order to `status`, then mirror it locally.
    ///
    /// `dispatch` and `rejected` take the order off the board; any other
    /// status is written in place. On failure nothing local changes.
    #[instrument(skip(self))]
    pub async fn set_status(&self, order_id: &str, status: OrderStatus) -> Result<Outcome, OrderError> {
        let done = Notice::success(status_notice(&status));
        self.change_status(order_id, status, done, NOTICE_STATUS_FAILED).await
    }

    /// Accept a pending order: it moves to `preparing`.
    #[instrument(skip(self))]
    pub async fn approve(&self, order_id: &str) -> Result<Outcome, OrderError> {
        let done = Notice::success(NOTICE_APPROVED);
        self.change_status(order_id, OrderStatus::Preparing, done, NOTICE_APPROVE_FAILED)
            .await
    }

    /// Turn a pending order down: it leaves the board.
    #[instrument(skip(self))]
    pub async fn reject(&self, order_id: &str) -> Result<Outcome, OrderError> {
        let done = Notice::error(NOTICE_REJECTED);
        self.change_status(order_id, OrderStatus::Rejected, done, NOTICE_REJECT_FAILED)
            .await
    }

    async fn change_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        done: Notice,
        failed: &str,
    ) -> Result<Outcome, OrderError> {
        if let Err(e) = self.api.set_status(order_id, &status).await {
            error!(error = %e, "Status update rejected by backend");
            self.notifier.notify(Notice::error(failed));
            return Err(e.into());
        }

        let applied = if status.leaves_board() {
            self.inner.remove(order_id.to_string()).await
        } else {
            let patch = RawOrder::status_only(order_id, status);
            self.inner.patch(order_id.to_string(), patch).await
        };
        let outcome = applied.map_err(Self::map_error)?;

        info!(?outcome, "Status updated");
        self.notifier.notify(done);
        Ok(outcome)
    }

    /// Orders on `tab` matching `query`, in board order.
    #[instrument(skip(self))]
    pub async fn filter_by_tab(&self, tab: OrderStatus, query: &str) -> Result<Vec<Order>, OrderError> {
        let filter = OrderFilter::new(tab, query);
        self.inner
            .query(move |order| filter.matches(order))
            .await
            .map_err(Self::map_error)
    }

    /// Past orders, normalized the same way as the board. Not stored.
    #[instrument(skip(self))]
    pub async fn load_history(&self, restaurant_id: &str) -> Result<Vec<Order>, OrderError> {
        match self.api.fetch_history(restaurant_id).await {
            Ok(raws) => {
                let orders: Vec<Order> = raws.into_iter().map(|raw| self.normalize(raw)).collect();
                info!(size = orders.len(), "History loaded");
                Ok(orders)
            }
            Err(e) => {
                error!(error = %e, "History fetch failed");
                self.notifier.notify(Notice::error(NOTICE_HISTORY_FAILED));
                Err(e.into())
            }
        }
    }
}

/// What the user is told after a successful status change.
pub fn status_notice(status: &OrderStatus) -> String {
    match status {
        OrderStatus::Dispatch => "Order dispatched and moved to history".to_string(),
        other => format!("Order updated to {other}"),
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        OrderError::ActorCommunicationError(e.to_string())
    }
}
