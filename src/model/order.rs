//! A normalized order as the board keeps it.
//!
//! Built from a [`RawOrder`] by [`Order::from_raw`]: addresses stay a tagged
//! [`Address`], numbers are numbers, and `placed_at` is kept as an instant
//! next to the preformatted `date`/`time` display strings.

use crate::model::address::{resolve_first, Address};
use crate::model::raw::{MenuItemRef, PartyRef, RawAddon, RawCustomer, RawItem, RawOrder};
use crate::model::OrderStatus;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::Serialize;

pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";
pub const UNKNOWN_ITEM: &str = "Unknown";
pub const DATE_UNAVAILABLE: &str = "Date not available";

const DATE_FORMAT: &str = "%b %d, %Y";
const TIME_FORMAT: &str = "%I:%M %p";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: String,
    pub customer: Customer,
    pub address: Option<Address>,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
    pub date: String,
    pub time: String,
    pub payment_type: Option<String>,
    pub payment_status: Option<String>,
    pub customer_notes: Option<String>,
    pub order_type: Option<String>,
    pub restaurant_id: Option<String>,
    pub restaurant: Option<PartyRef>,
    pub delivery_partner_id: Option<String>,
    pub delivery_partner: Option<PartyRef>,
    pub distance: Option<f64>,
    pub gst: Option<f64>,
    pub delivery_fee: Option<f64>,
    pub items_amount: Option<f64>,
    pub dp_accepted_at: Option<String>,
    pub dp_delivered_at: Option<String>,
    /// Total as reported by the backend, used when there are no items to sum.
    pub server_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub id: Option<String>,
    pub name: String,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub menu_item_id: Option<String>,
    pub name: Option<String>,
    pub quantity: u32,
    pub base_price: f64,
    pub total_price: Option<f64>,
    pub addons: Vec<Addon>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Addon {
    pub name: String,
    pub extra_price: f64,
}

impl Order {
    /// Normalize a wire record. Display fields are formatted in `offset`.
    pub fn from_raw(raw: RawOrder, offset: FixedOffset) -> Self {
        let placed_at = parse_instant(raw.placed_at.as_deref()).unwrap_or_else(Utc::now);
        let server_total = server_total(&raw);
        let local = placed_at.with_timezone(&offset);

        Self {
            id: raw.id,
            customer: Customer::from_raw(raw.customer, raw.customer_id),
            address: raw.address,
            items: raw.items.unwrap_or_default().into_iter().map(OrderItem::from_raw).collect(),
            status: raw.status.unwrap_or_default(),
            placed_at,
            date: local.format(DATE_FORMAT).to_string(),
            time: local.format(TIME_FORMAT).to_string(),
            payment_type: raw.payment_type,
            payment_status: raw.payment_status,
            customer_notes: raw.customer_notes,
            order_type: raw.order_type,
            restaurant_id: raw.restaurant_id,
            restaurant: raw.restaurant,
            delivery_partner_id: raw.delivery_partner_id,
            delivery_partner: raw.delivery_partner,
            distance: raw.distance,
            gst: raw.gst,
            delivery_fee: raw.delivery_fee,
            items_amount: raw.items_amount,
            dp_accepted_at: raw.dp_accepted_at,
            dp_delivered_at: raw.dp_delivered_at,
            server_total,
        }
    }

    /// Merge an update over this order. Fields absent from `patch` keep their
    /// current value; `date` and `time` are never touched so the card does not
    /// flicker when the payload carries a re-serialized timestamp.
    pub fn merge(&mut self, patch: RawOrder) {
        if patch.total_amount.is_some() || patch.total.is_some() || patch.items.is_some() {
            let total = server_total(&patch);
            if total != 0.0 {
                self.server_total = total;
            }
        }
        if let Some(customer) = patch.customer {
            self.customer = Customer::from_raw(Some(customer), patch.customer_id.or(self.customer.id.take()));
        } else if let Some(customer_id) = patch.customer_id {
            self.customer.id = Some(customer_id);
        }
        if let Some(items) = patch.items {
            self.items = items.into_iter().map(OrderItem::from_raw).collect();
        }
        if let Some(placed_at) = parse_instant(patch.placed_at.as_deref()) {
            self.placed_at = placed_at;
        }

        replace(&mut self.status, patch.status);
        replace_opt(&mut self.address, patch.address);
        replace_opt(&mut self.payment_type, patch.payment_type);
        replace_opt(&mut self.payment_status, patch.payment_status);
        replace_opt(&mut self.customer_notes, patch.customer_notes);
        replace_opt(&mut self.order_type, patch.order_type);
        replace_opt(&mut self.restaurant_id, patch.restaurant_id);
        replace_opt(&mut self.restaurant, patch.restaurant);
        replace_opt(&mut self.delivery_partner_id, patch.delivery_partner_id);
        replace_opt(&mut self.delivery_partner, patch.delivery_partner);
        replace_opt(&mut self.distance, patch.distance);
        replace_opt(&mut self.gst, patch.gst);
        replace_opt(&mut self.delivery_fee, patch.delivery_fee);
        replace_opt(&mut self.items_amount, patch.items_amount);
        replace_opt(&mut self.dp_accepted_at, patch.dp_accepted_at);
        replace_opt(&mut self.dp_delivered_at, patch.dp_delivered_at);
    }

    /// Items plus addons (both per unit), delivery fee and GST. Falls back to
    /// the backend's figure when the order carries no items.
    pub fn total(&self) -> f64 {
        if self.items.is_empty() {
            return self.server_total;
        }
        let items: f64 = self.items.iter().map(OrderItem::line_total).sum();
        items + self.delivery_fee.unwrap_or(0.0) + self.gst.unwrap_or(0.0)
    }

    /// Delivery address first, then the customer's saved one.
    pub fn display_address(&self) -> String {
        resolve_first([self.address.as_ref(), self.customer.address.as_ref()])
    }

    pub fn timestamp(&self) -> String {
        if self.date.is_empty() || self.time.is_empty() {
            DATE_UNAVAILABLE.to_string()
        } else {
            format!("{} {}", self.date, self.time)
        }
    }

    /// Case-insensitive match on order id, customer name or any item name.
    /// An empty query matches everything.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.id.to_lowercase().contains(&query)
            || self.customer.name.to_lowercase().contains(&query)
            || self
                .items
                .iter()
                .filter_map(|item| item.name.as_deref())
                .any(|name| name.to_lowercase().contains(&query))
    }

    pub fn card(&self) -> OrderCard {
        OrderCard {
            id: self.id.clone(),
            customer: self.customer.name.clone(),
            address: self.display_address(),
            items: self.items.iter().map(OrderItem::card_line).collect(),
            total: self.total(),
            status: self.status.clone(),
            timestamp: self.timestamp(),
        }
    }
}

impl Customer {
    fn from_raw(raw: Option<RawCustomer>, fallback_id: Option<String>) -> Self {
        let raw = raw.unwrap_or_default();
        Self {
            id: raw.id.or(fallback_id),
            name: raw.name.filter(|n| !n.is_empty()).unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
            address: raw.address,
        }
    }
}

impl OrderItem {
    fn from_raw(raw: RawItem) -> Self {
        let MenuItemRef { id: menu_ref_id, name: menu_name } = raw.menu_item.unwrap_or_default();
        Self {
            menu_item_id: raw.menu_item_id.or(menu_ref_id),
            name: menu_name.or(raw.name),
            quantity: raw.quantity.filter(|q| *q > 0.0).map(|q| q as u32).unwrap_or(0),
            base_price: raw.base_price.unwrap_or(0.0),
            total_price: raw.total_price,
            addons: raw.addons.unwrap_or_default().into_iter().map(Addon::from_raw).collect(),
        }
    }

    pub fn line_total(&self) -> f64 {
        let addons: f64 = self.addons.iter().map(|addon| addon.extra_price).sum();
        let quantity = f64::from(self.quantity);
        self.base_price * quantity + addons * quantity
    }

    fn card_line(&self) -> CardLine {
        CardLine {
            name: self.name.clone().unwrap_or_else(|| UNKNOWN_ITEM.to_string()),
            quantity: self.quantity,
            price: self.base_price,
            addons: self
                .addons
                .iter()
                .map(|addon| CardAddon { name: addon.name.clone(), price: addon.extra_price })
                .collect(),
        }
    }
}

impl Addon {
    fn from_raw(raw: RawAddon) -> Self {
        Self {
            name: raw.name.unwrap_or_default(),
            extra_price: raw.extra_price.filter(|p| *p != 0.0).or(raw.price).unwrap_or(0.0),
        }
    }
}

/// Display projection of an order for a board card or a details view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderCard {
    pub id: String,
    pub customer: String,
    pub address: String,
    pub items: Vec<CardLine>,
    pub total: f64,
    pub status: OrderStatus,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardLine {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    pub addons: Vec<CardAddon>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardAddon {
    pub name: String,
    pub price: f64,
}

/// `totalAmount`, else `total`, else the sum of item `totalPrice`s, else 0.
/// Zero counts as missing at every step.
fn server_total(raw: &RawOrder) -> f64 {
    let summed = raw
        .items
        .as_ref()
        .map(|items| items.iter().filter_map(|item| item.total_price).sum::<f64>());
    [raw.total_amount, raw.total, summed]
        .into_iter()
        .flatten()
        .find(|total| *total != 0.0)
        .unwrap_or(0.0)
}

fn parse_instant(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
                .map(|naive| naive.and_utc())
                .ok()
        })
}

fn replace<T>(slot: &mut T, incoming: Option<T>) {
    if let Some(value) = incoming {
        *slot = value;
    }
}

fn replace_opt<T>(slot: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn raw(value: serde_json::Value) -> RawOrder {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalizes_display_fields() {
        let order = Order::from_raw(
            raw(json!({
                "id": "o1",
                "placedAt": "2026-10-18T14:05:00.000Z",
                "customer": {"name": "Asha", "address": {"mappedAddress": "Sector 21"}}
            })),
            utc(),
        );
        assert_eq!(order.date, "Oct 18, 2026");
        assert_eq!(order.time, "02:05 PM");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.display_address(), "Sector 21");
        assert_eq!(order.timestamp(), "Oct 18, 2026 02:05 PM");
    }

    #[test]
    fn test_display_offset_shifts_date_and_time() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let order = Order::from_raw(raw(json!({"id": "o1", "placedAt": "2026-10-18T20:00:00Z"})), ist);
        assert_eq!(order.date, "Oct 19, 2026");
        assert_eq!(order.time, "01:30 AM");
    }

    #[test]
    fn test_missing_customer_defaults() {
        let order = Order::from_raw(raw(json!({"id": "o1"})), utc());
        assert_eq!(order.customer.name, UNKNOWN_CUSTOMER);
        assert_eq!(order.display_address(), crate::model::ADDRESS_UNAVAILABLE);
    }

    #[test]
    fn test_itemized_total_includes_addons_fee_and_gst() {
        let order = Order::from_raw(
            raw(json!({
                "id": "o1",
                "totalAmount": "1.00",
                "deliveryFee": 30,
                "gst": "12.5",
                "items": [
                    {"menuItem": {"name": "Thali"}, "quantity": 2, "basePrice": 100,
                     "addons": [{"name": "Papad", "extraPrice": 10}, {"name": "Raita", "price": 5}]},
                    {"menuItem": {"name": "Lassi"}, "quantity": "1", "basePrice": "40"}
                ]
            })),
            utc(),
        );
        // (100*2 + 15*2) + 40 + 30 + 12.5
        assert_eq!(order.total(), 312.5);
    }

    #[test]
    fn test_total_falls_back_to_server_figure_without_items() {
        let order = Order::from_raw(raw(json!({"id": "o1", "totalAmount": "0", "total": 180})), utc());
        assert_eq!(order.total(), 180.0);
    }

    #[test]
    fn test_merge_preserves_display_fields() {
        let mut order = Order::from_raw(
            raw(json!({"id": "o1", "status": "pending", "placedAt": "2026-10-18T14:05:00Z",
                       "customer": {"name": "Asha"}})),
            utc(),
        );
        order.merge(raw(json!({"id": "o1", "status": "preparing", "placedAt": "2026-10-19T09:00:00Z"})));

        assert_eq!(order.status, OrderStatus::Preparing);
        assert_eq!(order.date, "Oct 18, 2026");
        assert_eq!(order.time, "02:05 PM");
        assert_eq!(order.customer.name, "Asha");
    }

    #[test]
    fn test_merge_with_unknown_status_is_a_plain_update() {
        let mut order = Order::from_raw(raw(json!({"id": "o1"})), utc());
        order.merge(raw(json!({"id": "o1", "status": "on_hold"})));
        assert_eq!(order.status, OrderStatus::Other("on_hold".into()));
    }

    #[test]
    fn test_query_matches_id_customer_and_item_names() {
        let order = Order::from_raw(
            raw(json!({"id": "ORD-77", "customer": {"name": "Asha Rao"},
                       "items": [{"menuItem": {"name": "Masala Dosa"}, "quantity": 1}]})),
            utc(),
        );
        assert!(order.matches_query(""));
        assert!(order.matches_query("ord-7"));
        assert!(order.matches_query("RAO"));
        assert!(order.matches_query("dosa"));
        assert!(!order.matches_query("idli"));
    }

    #[test]
    fn test_card_projection() {
        let order = Order::from_raw(
            raw(json!({"id": "o1", "placedAt": "2026-10-18T14:05:00Z", "address": "Gate 2",
                       "items": [{"quantity": 3, "basePrice": 20}]})),
            utc(),
        );
        let card = order.card();
        assert_eq!(card.address, "Gate 2");
        assert_eq!(card.items[0].name, UNKNOWN_ITEM);
        assert_eq!(card.total, 60.0);
        assert_eq!(card.timestamp, "Oct 18, 2026 02:05 PM");
    }
}
