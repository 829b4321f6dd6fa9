//! # Mock Framework
//!
//! Utilities for testing store clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and the receiving end of its
//! channel, then [`expect_patch`] / [`expect_remove`] to assert what a wrapper
//! sent. [`MockClient`] offers the same with queued expectations and
//! [`MockClient::verify`].

use crate::framework::{ActorEntity, FrameworkError, Outcome, ResourceClient, ResourceRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

enum Expectation<T: ActorEntity> {
    Hydrate { response: Result<usize, FrameworkError> },
    Insert { response: Result<Outcome, FrameworkError> },
    Patch { id: T::Id, response: Result<Outcome, FrameworkError> },
    Remove { id: T::Id, response: Result<Outcome, FrameworkError> },
    Query { response: Result<Vec<T>, FrameworkError> },
}

/// A mock store client with expectation tracking.
///
/// # Example
/// ```ignore
/// let mut mock = MockClient::<Order>::new();
/// mock.expect_remove("o1".to_string()).return_ok(Outcome::Applied);
///
/// let client = mock.client();
/// // Use client in tests...
/// mock.verify(); // Ensures all expectations were met
/// ```
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> MockClient<T> {
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations = Arc::new(Mutex::new(VecDeque::new()));
        let expectations_clone = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = expectations_clone
                    .lock()
                    .expect("expectation queue poisoned")
                    .pop_front();

                match (request, expectation) {
                    (ResourceRequest::Hydrate { respond_to, .. }, Some(Expectation::Hydrate { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Insert { respond_to, .. }, Some(Expectation::Insert { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Patch { id, respond_to, .. }, Some(Expectation::Patch { id: expected, response })) => {
                        assert_eq!(id, expected, "patch sent for unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Remove { id, respond_to }, Some(Expectation::Remove { id: expected, response })) => {
                        assert_eq!(id, expected, "remove sent for unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Query { respond_to, .. }, Some(Expectation::Query { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        panic!("Unexpected request or expectation mismatch: {request:?}");
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    pub fn expect_hydrate(&mut self) -> ExpectationBuilder<T, usize> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Hydrate { response })
    }

    pub fn expect_insert(&mut self) -> ExpectationBuilder<T, Outcome> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Insert { response })
    }

    pub fn expect_patch(&mut self, id: T::Id) -> ExpectationBuilder<T, Outcome> {
        ExpectationBuilder::new(self.expectations.clone(), move |response| Expectation::Patch { id, response })
    }

    pub fn expect_remove(&mut self, id: T::Id) -> ExpectationBuilder<T, Outcome> {
        ExpectationBuilder::new(self.expectations.clone(), move |response| Expectation::Remove { id, response })
    }

    pub fn expect_query(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Query { response })
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().expect("expectation queue poisoned").len();
        if remaining != 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder returned by the `expect_*` methods of [`MockClient`].
pub struct ExpectationBuilder<T: ActorEntity, R> {
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
    build: Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    fn new(
        expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
        build: impl FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send + 'static,
    ) -> Self {
        Self { expectations, build: Box::new(build) }
    }

    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: FrameworkError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, FrameworkError>) {
        let expectation = (self.build)(response);
        self.expectations
            .lock()
            .expect("expectation queue poisoned")
            .push_back(expectation);
    }
}

// =============================================================================
// CHANNEL HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// Nothing answers the requests: the test plays the actor by hand, which makes
/// it easy to assert that a wrapper sent *nothing* (`receiver.try_recv()`).
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Next message must be a Patch request.
pub async fn expect_patch<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Patch, oneshot::Sender<Result<Outcome, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Patch { id, patch, respond_to }) => Some((id, patch, respond_to)),
        _ => None,
    }
}

/// Next message must be a Remove request.
pub async fn expect_remove<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Outcome, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Remove { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}
