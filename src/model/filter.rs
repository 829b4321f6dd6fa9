//! Filtered views over an order collection.

use crate::model::{Order, OrderStatus};
use chrono::{FixedOffset, NaiveDate};

/// A live-board tab plus the search box.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderFilter {
    pub tab: OrderStatus,
    pub query: String,
}

impl OrderFilter {
    pub fn new(tab: OrderStatus, query: impl Into<String>) -> Self {
        Self { tab, query: query.into() }
    }

    pub fn matches(&self, order: &Order) -> bool {
        order.status == self.tab && order.matches_query(&self.query)
    }
}

/// Search box plus an optional calendar day, for the history view.
///
/// `day` is compared against `placed_at` in `offset`, the same offset the
/// `date` display field was formatted in.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryFilter {
    pub query: String,
    pub day: Option<NaiveDate>,
    pub offset: FixedOffset,
}

impl HistoryFilter {
    pub fn new(offset: FixedOffset) -> Self {
        Self { query: String::new(), day: None, offset }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn on_day(mut self, day: NaiveDate) -> Self {
        self.day = Some(day);
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        let on_day = self
            .day
            .map_or(true, |day| order.placed_at.with_timezone(&self.offset).date_naive() == day);
        on_day && order.matches_query(&self.query)
    }

    pub fn apply<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        orders.iter().filter(|order| self.matches(order)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawOrder;
    use serde_json::json;

    fn order(value: serde_json::Value) -> Order {
        let raw: RawOrder = serde_json::from_value(value).unwrap();
        Order::from_raw(raw, FixedOffset::east_opt(0).unwrap())
    }

    #[test]
    fn test_tab_and_query_are_intersected() {
        let pending = order(json!({"id": "o1", "status": "pending", "customer": {"name": "Asha"}}));
        let other_pending = order(json!({"id": "o2", "status": "pending", "customer": {"name": "Ravi"}}));
        let preparing = order(json!({"id": "o3", "status": "preparing", "customer": {"name": "Asha"}}));

        let filter = OrderFilter::new(OrderStatus::Pending, "asha");
        assert!(filter.matches(&pending));
        assert!(!filter.matches(&other_pending));
        assert!(!filter.matches(&preparing));
    }

    #[test]
    fn test_history_day_uses_display_offset() {
        let late = order(json!({"id": "h1", "placedAt": "2026-10-18T20:00:00Z"}));
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let utc = HistoryFilter::new(FixedOffset::east_opt(0).unwrap()).on_day(day);
        let ist = HistoryFilter::new(FixedOffset::east_opt(19800).unwrap()).on_day(day);
        assert!(!utc.matches(&late));
        assert!(ist.matches(&late));
    }

    #[test]
    fn test_history_apply_keeps_order() {
        let orders = vec![
            order(json!({"id": "h1", "customer": {"name": "Asha"}})),
            order(json!({"id": "h2", "customer": {"name": "Ravi"}})),
            order(json!({"id": "h3", "customer": {"name": "Asha K"}})),
        ];
        let filter = HistoryFilter::new(FixedOffset::east_opt(0).unwrap()).with_query("asha");
        let ids: Vec<_> = filter.apply(&orders).iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["h1", "h3"]);
    }
}
