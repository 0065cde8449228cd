use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION (Entity trait with hooks)
// =============================================================================

/// Trait that any persisted entity must implement to be stored by [`ResourceActor`]
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Id: Ord + Copy + Send + Sync + Display + Debug;
    type CreatePayload: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Filter: Send + Sync + Debug;

    /// Get the ID of the entity
    fn id(&self) -> Self::Id;

    /// Construct the full Entity from the store-assigned ID and the payload
    fn from_create(id: Self::Id, payload: Self::CreatePayload) -> Self;

    // --- Lifecycle Hooks ---

    /// Merge a partial patch into the entity. Must never touch the id.
    fn on_update(&mut self, patch: Self::Patch);

    /// Whether the entity is selected by `filter`
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// `(field, value)` pairs that must be unique across the whole table
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

// =============================================================================
// 2. THE STORE ERRORS
// =============================================================================

/// Failure kinds reported by the data store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Unique constraint failed on the fields: ({0})")]
    UniqueViolation(String),
    #[error("Store engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("Unknown store error: {0}")]
    Unknown(String),
}

// =============================================================================
// 3. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Insert {
        payload: T::CreatePayload,
        respond_to: Response<T>,
    },
    Count {
        filter: T::Filter,
        respond_to: Response<usize>,
    },
    FindPage {
        filter: T::Filter,
        offset: usize,
        limit: usize,
        respond_to: Response<Vec<T>>,
    },
    FindById {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    FindByIds {
        ids: Vec<T::Id>,
        respond_to: Response<Vec<T>>,
    },
    UpdateFields {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<Option<T>>,
    },
    Shutdown,
}

// =============================================================================
// 4. THE GENERIC STORE ACTOR
// =============================================================================

/// In-memory table served by a single task. Rows are kept ordered by id, so
/// pages and batch lookups come back in ascending id order.
pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: BTreeMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: BTreeMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    #[instrument(name = "resource_store", skip(self))]
    pub async fn run(mut self) {
        info!("Store starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Insert { payload, respond_to } => {
                    let _ = respond_to.send(self.handle_insert(payload));
                }
                ResourceRequest::Count { filter, respond_to } => {
                    let count = self.store.values().filter(|item| item.matches(&filter)).count();
                    let _ = respond_to.send(Ok(count));
                }
                ResourceRequest::FindPage { filter, offset, limit, respond_to } => {
                    let page = self
                        .store
                        .values()
                        .filter(|item| item.matches(&filter))
                        .skip(offset)
                        .take(limit)
                        .cloned()
                        .collect();
                    let _ = respond_to.send(Ok(page));
                }
                ResourceRequest::FindById { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::FindByIds { ids, respond_to } => {
                    let mut items: Vec<T> =
                        ids.iter().filter_map(|id| self.store.get(id).cloned()).collect();
                    items.sort_by_key(|item| item.id());
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::UpdateFields { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                ResourceRequest::Shutdown => {
                    info!("Store shutting down");
                    break;
                }
            }
        }

        info!(rows = self.store.len(), "Store stopped");
    }

    fn handle_insert(&mut self, payload: T::CreatePayload) -> Result<T, StoreError> {
        let id = (self.next_id_fn)();
        let item = T::from_create(id, payload);
        self.check_unique(&item)?;
        self.store.insert(id, item.clone());
        debug!(id = %id, "Row inserted");
        Ok(item)
    }

    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<Option<T>, StoreError> {
        let Some(current) = self.store.get(&id) else {
            debug!(id = %id, "No row matched update");
            return Ok(None);
        };
        let mut updated = current.clone();
        updated.on_update(patch);
        self.check_unique(&updated)?;
        self.store.insert(id, updated.clone());
        debug!(id = %id, "Row updated");
        Ok(Some(updated))
    }

    /// Rejects `candidate` when another row already holds one of its unique values.
    fn check_unique(&self, candidate: &T) -> Result<(), StoreError> {
        let keys = candidate.unique_keys();
        if keys.is_empty() {
            return Ok(());
        }
        for other in self.store.values().filter(|other| other.id() != candidate.id()) {
            let taken = other.unique_keys();
            if let Some((field, _)) = keys.iter().find(|key| taken.contains(key)) {
                warn!(field = %field, "Unique constraint violated");
                return Err(StoreError::UniqueViolation((*field).to_string()));
            }
        }
        Ok(())
    }
}

// =============================================================================
// 5. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn call<R>(
        &self,
        request: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_| StoreError::EngineUnavailable("store actor closed".to_string()))?;
        response
            .await
            .map_err(|_| StoreError::EngineUnavailable("store actor dropped the request".to_string()))?
    }

    pub async fn insert(&self, payload: T::CreatePayload) -> Result<T, StoreError> {
        self.call(|respond_to| ResourceRequest::Insert { payload, respond_to }).await
    }

    pub async fn count(&self, filter: T::Filter) -> Result<usize, StoreError> {
        self.call(|respond_to| ResourceRequest::Count { filter, respond_to }).await
    }

    pub async fn find_page(
        &self,
        filter: T::Filter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<T>, StoreError> {
        self.call(|respond_to| ResourceRequest::FindPage { filter, offset, limit, respond_to })
            .await
    }

    pub async fn find_by_id(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        self.call(|respond_to| ResourceRequest::FindById { id, respond_to }).await
    }

    pub async fn find_by_ids(&self, ids: Vec<T::Id>) -> Result<Vec<T>, StoreError> {
        self.call(|respond_to| ResourceRequest::FindByIds { ids, respond_to }).await
    }

    /// Returns `None` when no row has `id`.
    pub async fn update_fields(&self, id: T::Id, patch: T::Patch) -> Result<Option<T>, StoreError> {
        self.call(|respond_to| ResourceRequest::UpdateFields { id, patch, respond_to }).await
    }

    pub async fn shutdown(&self) -> Result<(), StoreError> {
        debug!("Sending shutdown request");
        self.sender
            .send(ResourceRequest::Shutdown)
            .await
            .map_err(|_| StoreError::EngineUnavailable("store actor closed".to_string()))
    }
}

// =============================================================================
// 6. EXAMPLE USAGE (Test)
// =============================================================================
