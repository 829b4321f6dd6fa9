//! # REST Client
//!
//! `reqwest`-backed implementation of [`OrderApi`] and [`ReverseGeocoder`].
//! One request per call, no retries: a failure goes straight back to the
//! caller, which decides what the user sees.

use super::{ApiError, Envelope, OrderApi, ReverseGeocoder};
use crate::config::Config;
use crate::map_picker::LatLng;
use crate::model::{OrderStatus, RawOrder};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

#[derive(Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, ApiError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(config.api_url.clone(), config.auth_token.clone())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and read the whole body, mapping non-2xx statuses to errors.
    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            warn!("Session token rejected");
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(body)
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.send(self.request(Method::GET, path)).await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl OrderApi for RestClient {
    #[instrument(skip(self))]
    async fn fetch_active(&self, restaurant_id: &str) -> Result<Vec<RawOrder>, ApiError> {
        let orders: Vec<RawOrder> = self.get_data(&format!("/orders/restaurant/{restaurant_id}")).await?;
        debug!(count = orders.len(), "Fetched active orders");
        Ok(orders)
    }

    #[instrument(skip(self))]
    async fn fetch_history(&self, restaurant_id: &str) -> Result<Vec<RawOrder>, ApiError> {
        let orders: Vec<RawOrder> = self
            .get_data(&format!("/orders/restaurant/{restaurant_id}/history"))
            .await?;
        debug!(count = orders.len(), "Fetched order history");
        Ok(orders)
    }

    #[instrument(skip(self))]
    async fn set_status(&self, order_id: &str, status: &OrderStatus) -> Result<(), ApiError> {
        let builder = self
            .request(Method::PATCH, &format!("/orders/{order_id}/status"))
            .json(&json!({ "status": status }));
        self.send(builder).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    display_name: Option<String>,
}

#[async_trait]
impl ReverseGeocoder for RestClient {
    #[instrument(skip(self))]
    async fn reverse(&self, at: LatLng) -> Result<String, ApiError> {
        let builder = self
            .request(Method::GET, "/restaurants/reverse-geocode")
            .query(&[("lat", at.lat.to_string()), ("lon", at.lng.to_string())]);
        let body = self.send(builder).await?;
        parse_place(&body)
    }
}

fn parse_place(body: &str) -> Result<String, ApiError> {
    let envelope: Envelope<Place> = serde_json::from_str(body)?;
    envelope
        .data
        .display_name
        .ok_or_else(|| ApiError::Malformed("missing display_name".to_string()))
}

/// `message` from a JSON error body, or a generic fallback.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_place() {
        let body = r#"{"data":{"display_name":"Sector 21, Gandhinagar"}}"#;
        assert_eq!(parse_place(body).unwrap(), "Sector 21, Gandhinagar");
    }

    #[test]
    fn test_parse_place_rejects_missing_name_and_bad_json() {
        assert!(matches!(parse_place(r#"{"data":{}}"#), Err(ApiError::Malformed(_))));
        assert!(matches!(parse_place("<html>"), Err(ApiError::Malformed(_))));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message":"Order already dispatched"}"#), "Order already dispatched");
        assert_eq!(error_message("Bad Gateway"), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let client = RestClient::new("http://localhost:3000/api/", None).unwrap();
        assert_eq!(client.base_url, "http://localhost:3000/api");
    }
}
