//! # Backend Doubles
//!
//! Scripted stand-ins for [`OrderApi`] and [`ReverseGeocoder`].
//!
//! [`MockOrderApi`] works like an expectation queue: every call pops the next
//! expectation and panics if the call does not match. A response can be
//! supplied up front (`return_ok` / `return_err`) or held open
//! (`hold`) and released later by the test, which is how the tests
//! deliver push events while a bulk load is still in flight.

use super::{ApiError, OrderApi, ReverseGeocoder};
use crate::map_picker::LatLng;
use crate::model::{OrderStatus, RawOrder};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

enum Reply<T> {
    Ready(Result<T, ApiError>),
    Held(oneshot::Receiver<Result<T, ApiError>>),
}

impl<T> Reply<T> {
    async fn resolve(self) -> Result<T, ApiError> {
        match self {
            Reply::Ready(result) => result,
            Reply::Held(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(ApiError::Malformed("held reply dropped".to_string()))),
        }
    }
}

enum Expectation {
    FetchActive { restaurant_id: String, reply: Reply<Vec<RawOrder>> },
    FetchHistory { restaurant_id: String, reply: Reply<Vec<RawOrder>> },
    SetStatus { order_id: String, status: OrderStatus, reply: Reply<()> },
}

type Queue = Arc<Mutex<VecDeque<Expectation>>>;

#[derive(Clone, Default)]
pub struct MockOrderApi {
    expectations: Queue,
}

impl MockOrderApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_fetch_active(&self, restaurant_id: &str) -> ReplyBuilder<Vec<RawOrder>> {
        let restaurant_id = restaurant_id.to_string();
        ReplyBuilder::new(self.expectations.clone(), move |reply| Expectation::FetchActive { restaurant_id, reply })
    }

    pub fn expect_fetch_history(&self, restaurant_id: &str) -> ReplyBuilder<Vec<RawOrder>> {
        let restaurant_id = restaurant_id.to_string();
        ReplyBuilder::new(self.expectations.clone(), move |reply| Expectation::FetchHistory { restaurant_id, reply })
    }

    pub fn expect_set_status(&self, order_id: &str, status: OrderStatus) -> ReplyBuilder<()> {
        let order_id = order_id.to_string();
        ReplyBuilder::new(self.expectations.clone(), move |reply| Expectation::SetStatus { order_id, status, reply })
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.lock().len();
        if remaining != 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }

    fn next(&self) -> Option<Expectation> {
        self.lock().pop_front()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Expectation>> {
        self.expectations.lock().expect("expectation queue poisoned")
    }
}

#[async_trait]
impl OrderApi for MockOrderApi {
    async fn fetch_active(&self, restaurant_id: &str) -> Result<Vec<RawOrder>, ApiError> {
        match self.next() {
            Some(Expectation::FetchActive { restaurant_id: expected, reply }) => {
                assert_eq!(restaurant_id, expected, "fetch_active for unexpected restaurant");
                reply.resolve().await
            }
            _ => panic!("Unexpected fetch_active({restaurant_id})"),
        }
    }

    async fn fetch_history(&self, restaurant_id: &str) -> Result<Vec<RawOrder>, ApiError> {
        match self.next() {
            Some(Expectation::FetchHistory { restaurant_id: expected, reply }) => {
                assert_eq!(restaurant_id, expected, "fetch_history for unexpected restaurant");
                reply.resolve().await
            }
            _ => panic!("Unexpected fetch_history({restaurant_id})"),
        }
    }

    async fn set_status(&self, order_id: &str, status: &OrderStatus) -> Result<(), ApiError> {
        match self.next() {
            Some(Expectation::SetStatus { order_id: expected_id, status: expected_status, reply }) => {
                assert_eq!(order_id, expected_id, "set_status for unexpected order");
                assert_eq!(*status, expected_status, "set_status with unexpected status");
                reply.resolve().await
            }
            _ => panic!("Unexpected set_status({order_id}, {status})"),
        }
    }
}

/// Builder returned by the `expect_*` methods of [`MockOrderApi`].
pub struct ReplyBuilder<T> {
    expectations: Queue,
    build: Box<dyn FnOnce(Reply<T>) -> Expectation + Send>,
}

impl<T> ReplyBuilder<T> {
    fn new(expectations: Queue, build: impl FnOnce(Reply<T>) -> Expectation + Send + 'static) -> Self {
        Self { expectations, build: Box::new(build) }
    }

    pub fn return_ok(self, value: T) {
        self.push(Reply::Ready(Ok(value)));
    }

    pub fn return_err(self, error: ApiError) {
        self.push(Reply::Ready(Err(error)));
    }

    /// Leave the call pending until the returned sender is used.
    pub fn hold(self) -> oneshot::Sender<Result<T, ApiError>> {
        let (sender, receiver) = oneshot::channel();
        self.push(Reply::Held(receiver));
        sender
    }

    fn push(self, reply: Reply<T>) {
        let expectation = (self.build)(reply);
        self.expectations
            .lock()
            .expect("expectation queue poisoned")
            .push_back(expectation);
    }
}

/// Geocoder that gives the same answer by default and records what it was
/// asked. Individual calls can be scripted to answer late with their own text.
#[derive(Clone)]
pub struct ScriptedGeocoder {
    answer: Option<String>,
    script: Arc<Mutex<VecDeque<(Duration, String)>>>,
    calls: Arc<Mutex<Vec<LatLng>>>,
}

impl ScriptedGeocoder {
    pub fn answering(display_name: impl Into<String>) -> Self {
        Self { answer: Some(display_name.into()), script: Arc::default(), calls: Arc::default() }
    }

    /// Every lookup fails as if the body were not JSON.
    pub fn failing() -> Self {
        Self { answer: None, script: Arc::default(), calls: Arc::default() }
    }

    /// The next unscripted call waits `delay`, then answers `display_name`.
    pub fn then_after(self, delay: Duration, display_name: impl Into<String>) -> Self {
        self.script
            .lock()
            .expect("geocoder script poisoned")
            .push_back((delay, display_name.into()));
        self
    }

    pub fn calls(&self) -> Vec<LatLng> {
        self.calls.lock().expect("call log poisoned").clone()
    }
}

#[async_trait]
impl ReverseGeocoder for ScriptedGeocoder {
    async fn reverse(&self, at: LatLng) -> Result<String, ApiError> {
        self.calls.lock().expect("call log poisoned").push(at);
        let scripted = self.script.lock().expect("geocoder script poisoned").pop_front();
        if let Some((delay, display_name)) = scripted {
            tokio::time::sleep(delay).await;
            return Ok(display_name);
        }
        self.answer
            .clone()
            .ok_or_else(|| ApiError::Malformed("expected value at line 1 column 1".to_string()))
    }
}
