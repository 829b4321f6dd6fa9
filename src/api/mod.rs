//! Backend contract consumed by the board and the picker.
//!
//! The traits are the seam: [`RestClient`] talks to the real backend over
//! HTTP, [`mock`] provides scripted doubles for tests.

pub mod error;
pub mod mock;
pub mod rest;

pub use error::*;
pub use rest::*;

use crate::map_picker::LatLng;
use crate::model::{OrderStatus, RawOrder};
use async_trait::async_trait;
use serde::Deserialize;

/// Order reads and the status command.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// `GET /orders/restaurant/{id}`
    async fn fetch_active(&self, restaurant_id: &str) -> Result<Vec<RawOrder>, ApiError>;

    /// `GET /orders/restaurant/{id}/history`
    async fn fetch_history(&self, restaurant_id: &str) -> Result<Vec<RawOrder>, ApiError>;

    /// `PATCH /orders/{id}/status`
    async fn set_status(&self, order_id: &str, status: &OrderStatus) -> Result<(), ApiError>;
}

/// Coordinate to display name.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, at: LatLng) -> Result<String, ApiError>;
}

/// `{ "data": ... }` wrapper every backend response uses.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}
