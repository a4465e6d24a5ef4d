//! In-memory document store implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{watch, Mutex, RwLock};

use crate::application::errors::StoreError;
use crate::domain::entities::{Document, FieldUpdate, Filter};
use crate::domain::traits::{DocumentStore, QueryRows, Subscription};

/// One collection's documents, keyed by id.
pub(crate) type Table = HashMap<String, Document>;

pub(crate) fn matching_rows(table: &Table, filter: &Filter) -> QueryRows {
    table
        .iter()
        .filter(|(_, document)| filter.matches(document))
        .map(|(id, document)| (id.clone(), document.clone()))
        .collect()
}

/// Clock for server-assigned timestamps. Stamps handed out by one instance
/// are strictly increasing even when wall time stalls.
pub(crate) struct ServerClock {
    last: Mutex<DateTime<Utc>>,
}

impl ServerClock {
    pub(crate) fn new() -> Self {
        Self {
            last: Mutex::new(DateTime::<Utc>::MIN_UTC),
        }
    }

    pub(crate) async fn stamp(&self) -> DateTime<Utc> {
        let mut last = self.last.lock().await;
        let now = Utc::now();
        let stamp = if now > *last {
            now
        } else {
            *last + Duration::microseconds(1)
        };
        *last = stamp;
        stamp
    }
}

struct DocumentWatcher {
    collection: String,
    id: String,
    sender: watch::Sender<Option<Document>>,
}

struct QueryWatcher {
    collection: String,
    filter: Filter,
    sender: watch::Sender<QueryRows>,
}

/// Fan-out point for live subscriptions.
///
/// Every mutation of a collection re-sends full snapshots to that
/// collection's watchers. Deliveries are latest-wins: a lagging reader
/// skips intermediate states. Watchers whose subscription was dropped are
/// pruned on the next notification pass.
pub(crate) struct WatchHub {
    documents: Mutex<Vec<DocumentWatcher>>,
    queries: Mutex<Vec<QueryWatcher>>,
}

impl WatchHub {
    pub(crate) fn new() -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) async fn watch_document(
        &self,
        collection: &str,
        id: &str,
        current: Option<Document>,
    ) -> Subscription<Option<Document>> {
        let (sender, receiver) = watch::channel(current);
        self.documents.lock().await.push(DocumentWatcher {
            collection: collection.to_string(),
            id: id.to_string(),
            sender,
        });
        Subscription::new(receiver)
    }

    pub(crate) async fn watch_query(
        &self,
        collection: &str,
        filter: Filter,
        current: QueryRows,
    ) -> Subscription<QueryRows> {
        let (sender, receiver) = watch::channel(current);
        self.queries.lock().await.push(QueryWatcher {
            collection: collection.to_string(),
            filter,
            sender,
        });
        Subscription::new(receiver)
    }

    /// Push the collection's new state to every live watcher of it.
    pub(crate) async fn notify(&self, collection: &str, table: &Table) {
        let mut documents = self.documents.lock().await;
        let before = documents.len();
        documents.retain(|watcher| !watcher.sender.is_closed());
        if documents.len() < before {
            tracing::debug!("Pruned {} closed document watcher(s)", before - documents.len());
        }
        for watcher in documents.iter() {
            if watcher.collection == collection {
                let _ = watcher.sender.send(table.get(&watcher.id).cloned());
            }
        }
        drop(documents);

        let mut queries = self.queries.lock().await;
        let before = queries.len();
        queries.retain(|watcher| !watcher.sender.is_closed());
        if queries.len() < before {
            tracing::debug!("Pruned {} closed query watcher(s)", before - queries.len());
        }
        for watcher in queries.iter() {
            if watcher.collection == collection {
                let _ = watcher.sender.send(matching_rows(table, &watcher.filter));
            }
        }
    }
}

/// In-memory document store, the development and test backend.
///
/// Documents live in per-collection hash tables behind one `RwLock`. A
/// write batch holds the lock for its whole application, keeping `apply`
/// atomic per document. Timestamps are assigned and watchers notified
/// under the same lock, so subscribers observe states in commit order.
#[derive(Clone)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Table>>>,
    hub: Arc<WatchHub>,
    clock: Arc<ServerClock>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            hub: Arc::new(WatchHub::new()),
            clock: Arc::new(ServerClock::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(
        &self,
        collection: &str,
        id: &str,
        mut document: Document,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().await;
        let table = collections.entry(collection.to_string()).or_default();
        if table.contains_key(id) {
            return Err(StoreError::AlreadyExists(format!("{}/{}", collection, id)));
        }
        let stamp = self.clock.stamp().await;
        document.resolve_server_time(stamp);
        table.insert(id.to_string(), document.clone());
        self.hub.notify(collection, table).await;
        Ok(document)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|table| table.get(id))
            .cloned())
    }

    async fn query(&self, collection: &str, filter: &Filter) -> Result<QueryRows, StoreError> {
        let collections = self.collections.read().await;
        Ok(match collections.get(collection) {
            Some(table) => matching_rows(table, filter),
            None => Vec::new(),
        })
    }

    async fn apply(
        &self,
        collection: &str,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let table = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::Missing(format!("{}/{}", collection, id)))?;
        let document = table
            .get_mut(id)
            .ok_or_else(|| StoreError::Missing(format!("{}/{}", collection, id)))?;
        let stamp = self.clock.stamp().await;
        for update in updates {
            update.resolve(stamp).apply_to(document);
        }
        self.hub.notify(collection, table).await;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let Some(table) = collections.get_mut(collection) else {
            return Ok(());
        };
        if table.remove(id).is_none() {
            return Ok(());
        }
        self.hub.notify(collection, table).await;
        Ok(())
    }

    async fn watch_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Subscription<Option<Document>>, StoreError> {
        // Register under the read lock so no write lands between the
        // initial snapshot and the subscription.
        let collections = self.collections.read().await;
        let current = collections
            .get(collection)
            .and_then(|table| table.get(id))
            .cloned();
        let subscription = self.hub.watch_document(collection, id, current).await;
        drop(collections);
        Ok(subscription)
    }

    async fn watch_query(
        &self,
        collection: &str,
        filter: Filter,
    ) -> Result<Subscription<QueryRows>, StoreError> {
        let collections = self.collections.read().await;
        let current = match collections.get(collection) {
            Some(table) => matching_rows(table, &filter),
            None => Vec::new(),
        };
        let subscription = self.hub.watch_query(collection, filter, current).await;
        drop(collections);
        Ok(subscription)
    }
}
