use async_trait::async_trait;
use tokio::sync::watch;

use crate::application::errors::StoreError;
use crate::domain::entities::{Document, FieldUpdate, Filter};

/// Query results: document id paired with its body. The store returns them
/// in no particular order; callers sort.
pub type QueryRows = Vec<(String, Document)>;

/// DocumentStore trait - abstraction for the platform document store
///
/// Writes are atomic per document only; there are no cross-document
/// transactions. `ServerTime` sentinels in a write resolve against the
/// store's monotonic clock, so timestamps assigned by one instance are
/// strictly increasing.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document under an explicit id. Fails with `AlreadyExists`
    /// when the id is taken. Returns the stored document, sentinels resolved.
    async fn create(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<Document, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// All documents of a collection matching a single-field filter.
    async fn query(&self, collection: &str, filter: &Filter) -> Result<QueryRows, StoreError>;

    /// Apply a batch of field updates to one document, all-or-nothing.
    /// Fails with `Missing` when the document does not exist.
    async fn apply(
        &self,
        collection: &str,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> Result<(), StoreError>;

    /// Delete a document. Deleting an absent document is a no-op.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Watch one document. The subscription starts with the current state
    /// (`None` when absent) and re-delivers on every change.
    async fn watch_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Subscription<Option<Document>>, StoreError>;

    /// Watch a query. Each delivery is the full matching set, latest-wins:
    /// a slow reader skips intermediate states and sees the freshest one.
    async fn watch_query(
        &self,
        collection: &str,
        filter: Filter,
    ) -> Result<Subscription<QueryRows>, StoreError>;
}

/// Live handle onto a watched document or query.
///
/// Dropping the handle ends delivery; `cancel` just makes that explicit.
/// Reconnection is a fresh watch call, which starts from a full snapshot.
pub struct Subscription<T> {
    receiver: watch::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    pub fn new(receiver: watch::Receiver<T>) -> Self {
        Self { receiver }
    }

    /// Latest snapshot, immediately. Marks it seen, so the next `next`
    /// waits for a newer one.
    pub fn current(&mut self) -> T {
        self.receiver.borrow_and_update().clone()
    }

    /// Wait for a snapshot newer than the last one seen. `None` once the
    /// store side is gone.
    pub async fn next(&mut self) -> Option<T> {
        match self.receiver.changed().await {
            Ok(()) => Some(self.receiver.borrow_and_update().clone()),
            Err(_) => None,
        }
    }

    pub fn cancel(self) {}
}
