//! # Core Actor Framework
//!
//! This module defines the generic building blocks for the board actors.
//!
//! ## Key Types
//!
//! - [`ActorEntity`]: The trait that all stored resource types must implement.
//! - [`ResourceActor`]: The generic actor that owns an ordered collection of entities.
//! - [`ResourceClient`]: The generic client for communicating with actors.
//! - [`FrameworkError`]: Plumbing errors (the actor went away).
//!
//! ## Hydration
//!
//! A `ResourceActor` starts *dry*: it has not yet received its first bulk load.
//! Mutations that arrive while dry (inserts, patches, removals) are parked in a
//! backlog together with their response channels and replayed, in arrival order,
//! immediately after the first [`ResourceRequest::Hydrate`]. Reads are answered
//! straight away against whatever the store holds.

use std::collections::VecDeque;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// Trait that any resource entity must implement to be managed by [`ResourceActor`].
///
/// # Architecture Note
/// The actor only needs two things from an entity: a stable identity and a way
/// to merge a partial update into itself. Normalization, display formatting and
/// everything else stays with the entity type.
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// A partial update merged over an existing instance.
    type Patch: Send + Sync + Debug;

    fn id(&self) -> &Self::Id;

    /// Merge `patch` over `self`. Must not fail: a patch is all-or-nothing
    /// at the granularity of one entity.
    fn apply_patch(&mut self, patch: Self::Patch);
}

// =============================================================================
// 2. THE GENERIC MESSAGES & ERRORS
// =============================================================================

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
}

/// What a mutation did to the store.
///
/// Duplicates and stale updates are not errors, they are `Ignored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        self == Outcome::Applied
    }
}

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Read-side predicate evaluated inside the actor.
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send>;

/// Message sent to a [`ResourceActor`].
///
/// The variants model the lifecycle of an entity inside a synchronized
/// collection: a bulk `Hydrate`, idempotent `Insert`, `Patch` by id, `Remove`
/// by id, and two reads.
pub enum ResourceRequest<T: ActorEntity> {
    Hydrate {
        items: Vec<T>,
        respond_to: Response<usize>,
    },
    Insert {
        item: T,
        respond_to: Response<Outcome>,
    },
    Patch {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<Outcome>,
    },
    Remove {
        id: T::Id,
        respond_to: Response<Outcome>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Query {
        filter: Filter<T>,
        respond_to: Response<Vec<T>>,
    },
}

impl<T: ActorEntity> ResourceRequest<T> {
    fn is_mutation(&self) -> bool {
        matches!(
            self,
            ResourceRequest::Insert { .. }
                | ResourceRequest::Patch { .. }
                | ResourceRequest::Remove { .. }
        )
    }

    fn kind(&self) -> &'static str {
        match self {
            ResourceRequest::Hydrate { .. } => "Hydrate",
            ResourceRequest::Insert { .. } => "Insert",
            ResourceRequest::Patch { .. } => "Patch",
            ResourceRequest::Remove { .. } => "Remove",
            ResourceRequest::Get { .. } => "Get",
            ResourceRequest::Query { .. } => "Query",
        }
    }
}

impl<T: ActorEntity> Debug for ResourceRequest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// The generic actor that manages an ordered collection of entities.
///
/// **Concurrency Model**:
/// The actor processes its messages *sequentially* in a loop, so the
/// collection needs no `Mutex`. Every caller sees the collection as it was
/// between two whole messages, never half-way through one.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    items: Vec<T>,
    hydrated: bool,
    backlog: VecDeque<ResourceRequest<T>>,
}

impl<T: ActorEntity> ResourceActor<T> {
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            items: Vec::new(),
            hydrated: false,
            backlog: VecDeque::new(),
        };
        (actor, ResourceClient::new(sender))
    }

    /// Runs the actor's event loop, processing messages until the channel closes.
    pub async fn run(mut self) {
        let entity_type = entity_type::<T>();
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            if !self.hydrated && msg.is_mutation() {
                debug!(entity_type, request = msg.kind(), backlog = self.backlog.len() + 1, "Deferred until hydrated");
                self.backlog.push_back(msg);
                continue;
            }
            self.handle(msg);
        }

        if !self.backlog.is_empty() {
            warn!(entity_type, backlog = self.backlog.len(), "Shutdown before hydration, dropping backlog");
        }
        info!(entity_type, size = self.items.len(), "Shutdown");
    }

    fn handle(&mut self, msg: ResourceRequest<T>) {
        let entity_type = entity_type::<T>();
        match msg {
            ResourceRequest::Hydrate { items, respond_to } => {
                self.items.clear();
                for item in items {
                    if self.position(item.id()).is_some() {
                        warn!(entity_type, id = %item.id(), "Duplicate id in bulk load, keeping first");
                        continue;
                    }
                    self.items.push(item);
                }
                self.hydrated = true;
                info!(entity_type, size = self.items.len(), "Hydrated");
                let _ = respond_to.send(Ok(self.items.len()));

                let backlog = std::mem::take(&mut self.backlog);
                if !backlog.is_empty() {
                    info!(entity_type, replayed = backlog.len(), "Replaying deferred mutations");
                }
                for deferred in backlog {
                    self.handle(deferred);
                }
            }
            ResourceRequest::Insert { item, respond_to } => {
                let outcome = if self.position(item.id()).is_some() {
                    debug!(entity_type, id = %item.id(), "Insert ignored, already present");
                    Outcome::Ignored
                } else {
                    let id = item.id().clone();
                    self.items.push(item);
                    info!(entity_type, %id, size = self.items.len(), "Inserted");
                    Outcome::Applied
                };
                let _ = respond_to.send(Ok(outcome));
            }
            ResourceRequest::Patch { id, patch, respond_to } => {
                debug!(entity_type, %id, ?patch, "Patch");
                let outcome = match self.position(&id) {
                    Some(index) => {
                        self.items[index].apply_patch(patch);
                        info!(entity_type, %id, "Patched");
                        Outcome::Applied
                    }
                    None => {
                        debug!(entity_type, %id, "Patch ignored, not present");
                        Outcome::Ignored
                    }
                };
                let _ = respond_to.send(Ok(outcome));
            }
            ResourceRequest::Remove { id, respond_to } => {
                let outcome = match self.position(&id) {
                    Some(index) => {
                        self.items.remove(index);
                        info!(entity_type, %id, size = self.items.len(), "Removed");
                        Outcome::Applied
                    }
                    None => {
                        debug!(entity_type, %id, "Remove ignored, not present");
                        Outcome::Ignored
                    }
                };
                let _ = respond_to.send(Ok(outcome));
            }
            ResourceRequest::Get { id, respond_to } => {
                let item = self.position(&id).map(|index| self.items[index].clone());
                debug!(entity_type, %id, found = item.is_some(), "Get");
                let _ = respond_to.send(Ok(item));
            }
            ResourceRequest::Query { filter, respond_to } => {
                let matched: Vec<T> = self.items.iter().filter(|item| filter(item)).cloned().collect();
                debug!(entity_type, matched = matched.len(), size = self.items.len(), "Query");
                let _ = respond_to.send(Ok(matched));
            }
        }
    }

    fn position(&self, id: &T::Id) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

/// Short type name for log fields ("Order" instead of "kitchen_desk::model::order::Order").
fn entity_type<T>() -> &'static str {
    std::any::type_name::<T>().split("::").last().unwrap_or("Unknown")
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

/// A type-safe client for interacting with a `ResourceActor`.
///
/// Holds only a sender, so cloning is cheap and clones can be shared across tasks.
pub struct ResourceClient<T: ActorEntity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: ActorEntity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<T: ActorEntity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Replace the whole collection. Returns the stored size.
    pub async fn hydrate(&self, items: Vec<T>) -> Result<usize, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Hydrate { items, respond_to }).await
    }

    pub async fn insert(&self, item: T) -> Result<Outcome, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Insert { item, respond_to }).await
    }

    pub async fn patch(&self, id: T::Id, patch: T::Patch) -> Result<Outcome, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Patch { id, patch, respond_to }).await
    }

    pub async fn remove(&self, id: T::Id) -> Result<Outcome, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Remove { id, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn query(
        &self,
        filter: impl Fn(&T) -> bool + Send + 'static,
    ) -> Result<Vec<T>, FrameworkError> {
        let filter: Filter<T> = Box::new(filter);
        self.request(|respond_to| ResourceRequest::Query { filter, respond_to }).await
    }

    /// The whole collection, in order.
    pub async fn snapshot(&self) -> Result<Vec<T>, FrameworkError> {
        self.query(|_| true).await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Ticket {
        id: String,
        label: String,
    }

    impl Ticket {
        fn new(id: &str, label: &str) -> Self {
            Self { id: id.to_string(), label: label.to_string() }
        }
    }

    impl ActorEntity for Ticket {
        type Id = String;
        type Patch = String;

        fn id(&self) -> &String {
            &self.id
        }

        fn apply_patch(&mut self, label: String) {
            self.label = label;
        }
    }

    fn spawn_actor() -> ResourceClient<Ticket> {
        let (actor, client) = ResourceActor::new(16);
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_insert_is_idempotent_per_id() {
        let client = spawn_actor();
        client.hydrate(vec![]).await.unwrap();

        assert_eq!(client.insert(Ticket::new("t1", "a")).await.unwrap(), Outcome::Applied);
        assert_eq!(client.insert(Ticket::new("t1", "b")).await.unwrap(), Outcome::Ignored);

        let all = client.snapshot().await.unwrap();
        assert_eq!(all, vec![Ticket::new("t1", "a")]);
    }

    #[tokio::test]
    async fn test_patch_and_remove_of_missing_id_are_ignored() {
        let client = spawn_actor();
        client.hydrate(vec![Ticket::new("t1", "a")]).await.unwrap();

        assert_eq!(client.patch("nope".into(), "x".into()).await.unwrap(), Outcome::Ignored);
        assert_eq!(client.remove("nope".into()).await.unwrap(), Outcome::Ignored);
        assert_eq!(client.snapshot().await.unwrap(), vec![Ticket::new("t1", "a")]);
    }

    #[tokio::test]
    async fn test_mutations_before_hydration_are_replayed_in_order() {
        let client = spawn_actor();

        let early_insert = {
            let client = client.clone();
            tokio::spawn(async move { client.insert(Ticket::new("t2", "early")).await })
        };
        let early_patch = {
            let client = client.clone();
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                client.patch("t1".into(), "patched".into()).await
            })
        };

        // Reads are answered while dry.
        tokio::task::yield_now().await;
        assert!(client.snapshot().await.unwrap().is_empty());

        client.hydrate(vec![Ticket::new("t1", "loaded")]).await.unwrap();

        assert_eq!(early_insert.await.unwrap().unwrap(), Outcome::Applied);
        assert_eq!(early_patch.await.unwrap().unwrap(), Outcome::Applied);
        assert_eq!(
            client.snapshot().await.unwrap(),
            vec![Ticket::new("t1", "patched"), Ticket::new("t2", "early")]
        );
    }

    #[tokio::test]
    async fn test_hydrate_drops_duplicate_ids() {
        let client = spawn_actor();
        let size = client
            .hydrate(vec![Ticket::new("t1", "a"), Ticket::new("t1", "b")])
            .await
            .unwrap();
        assert_eq!(size, 1);
        assert_eq!(client.get("t1".into()).await.unwrap(), Some(Ticket::new("t1", "a")));
    }

    #[tokio::test]
    async fn test_client_reports_closed_actor() {
        let (actor, client) = ResourceActor::<Ticket>::new(1);
        drop(actor);
        assert_eq!(client.snapshot().await, Err(FrameworkError::ActorClosed));
    }
}
