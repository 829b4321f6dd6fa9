//! Wire shape of an order, before normalization.
//!
//! The backend is loose about types: prices arrive as numbers or numeric
//! strings, addresses as strings or objects, and almost every field may be
//! missing or `null`. Everything except `id` is therefore optional here, which
//! also makes [`RawOrder`] usable as a partial update.

use crate::model::{Address, OrderStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    pub id: String,
    pub customer: Option<RawCustomer>,
    pub customer_id: Option<String>,
    pub address: Option<Address>,
    pub items: Option<Vec<RawItem>>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub total_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub total: Option<f64>,
    pub status: Option<OrderStatus>,
    pub placed_at: Option<String>,
    pub payment_type: Option<String>,
    pub payment_status: Option<String>,
    pub customer_notes: Option<String>,
    pub order_type: Option<String>,
    pub restaurant_id: Option<String>,
    pub restaurant: Option<PartyRef>,
    pub delivery_partner_id: Option<String>,
    pub delivery_partner: Option<PartyRef>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub gst: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub delivery_fee: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub items_amount: Option<f64>,
    pub dp_accepted_at: Option<String>,
    pub dp_delivered_at: Option<String>,
}

impl RawOrder {
    /// A patch that only moves the status.
    pub fn status_only(id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            id: id.into(),
            status: Some(status),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCustomer {
    pub id: Option<String>,
    pub name: Option<String>,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    pub menu_item_id: Option<String>,
    pub menu_item: Option<MenuItemRef>,
    /// History records sometimes flatten the menu item name onto the line.
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub base_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub total_price: Option<f64>,
    pub addons: Option<Vec<RawAddon>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAddon {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub extra_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuItemRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// `{id, name}` reference to a restaurant or a delivery partner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

pub(crate) mod lenient {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
        Other(IgnoredAny),
    }

    /// Number, numeric string, or nothing. Non-finite and unparseable values
    /// become `None` instead of failing the whole record.
    pub fn f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = Option::<NumberOrText>::deserialize(deserializer)?;
        Ok(match value {
            Some(NumberOrText::Number(n)) => Some(n),
            Some(NumberOrText::Text(text)) => text.trim().parse::<f64>().ok(),
            Some(NumberOrText::Other(_)) | None => None,
        }
        .filter(|n| n.is_finite()))
    }
}
