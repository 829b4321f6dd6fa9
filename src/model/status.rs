use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Lifecycle status of an order.
///
/// `pending → preparing → ready → dispatch` and `pending → rejected` are the
/// transitions the backend accepts. Statuses outside that table still decode
/// (`delivered`, `cancelled`, or anything else as [`OrderStatus::Other`]) so a
/// surprising push payload is just a field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Dispatch,
    Delivered,
    Cancelled,
    Rejected,
    Other(String),
}

/// Tabs shown on the live board, in display order.
pub const ORDER_TABS: [OrderStatus; 3] = [OrderStatus::Pending, OrderStatus::Preparing, OrderStatus::Ready];

impl OrderStatus {
    /// The board tab named `name`, if the live board shows one.
    pub fn board_tab(name: &str) -> Option<OrderStatus> {
        let status: OrderStatus = name.parse().ok()?;
        ORDER_TABS.contains(&status).then_some(status)
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Dispatch => "dispatch",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Other(other) => other,
        }
    }

    /// Statuses that take an order off the live board.
    pub fn leaves_board(&self) -> bool {
        matches!(self, OrderStatus::Dispatch | OrderStatus::Rejected)
    }

    /// The forward step on the kitchen line, if any.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Dispatch),
            _ => None,
        }
    }

    /// Mirror of the backend's transition table. Only used to decide which
    /// buttons a view offers; the board itself trusts the backend.
    pub fn can_advance_to(&self, target: &OrderStatus) -> bool {
        self.next().as_ref() == Some(target)
            || (*self == OrderStatus::Pending && *target == OrderStatus::Rejected)
    }
}

impl FromStr for OrderStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "preparing" => OrderStatus::Preparing,
            "ready" => OrderStatus::Ready,
            "dispatch" => OrderStatus::Dispatch,
            "delivered" => OrderStatus::Delivered,
            "cancelled" => OrderStatus::Cancelled,
            "rejected" => OrderStatus::Rejected,
            _ => OrderStatus::Other(s.to_string()),
        })
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}
