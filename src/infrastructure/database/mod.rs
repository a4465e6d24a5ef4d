//! SQLite-backed document store implementation

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use tokio::sync::Mutex;

use crate::application::errors::StoreError;
use crate::domain::entities::{Document, FieldUpdate, Filter};
use crate::domain::traits::{DocumentStore, QueryRows, Subscription};
use crate::infrastructure::storage::{matching_rows, ServerClock, Table, WatchHub};

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// SQLite-backed document store for persistence across runs.
///
/// Documents are JSON bodies in one table keyed by collection and id. The
/// connection sits behind a mutex, so write batches are serialized and
/// per-document atomicity holds without transactions. Timestamps and watch
/// notifications happen under that lock, exactly as in the in-memory
/// backend, so subscribers observe states in commit order.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    hub: Arc<WatchHub>,
    clock: ServerClock,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Fresh private store, gone when dropped. For tests and local tools.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        init_tables(&conn)?;
        tracing::info!("Sqlite document store ready");
        Ok(Self {
            conn: Mutex::new(conn),
            hub: Arc::new(WatchHub::new()),
            clock: ServerClock::new(),
        })
    }
}

fn init_tables(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            body TEXT NOT NULL,
            PRIMARY KEY (collection, id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection)",
        [],
    )?;

    Ok(())
}

fn fetch(conn: &Connection, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
            rusqlite::params![collection, id],
            |row| row.get(0),
        )
        .optional()?;

    match body {
        Some(body) => Ok(Some(serde_json::from_str(&body)?)),
        None => Ok(None),
    }
}

fn load_collection(conn: &Connection, collection: &str) -> Result<Table, StoreError> {
    let mut stmt = conn.prepare("SELECT id, body FROM documents WHERE collection = ?1")?;
    let rows = stmt.query_map([collection], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut table = Table::new();
    for row in rows {
        let (id, body) = row?;
        let document: Document = serde_json::from_str(&body)?;
        table.insert(id, document);
    }
    Ok(table)
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn create(
        &self,
        collection: &str,
        id: &str,
        mut document: Document,
    ) -> Result<Document, StoreError> {
        let conn = self.conn.lock().await;
        if fetch(&conn, collection, id)?.is_some() {
            return Err(StoreError::AlreadyExists(format!("{}/{}", collection, id)));
        }
        let stamp = self.clock.stamp().await;
        document.resolve_server_time(stamp);
        conn.execute(
            "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
            rusqlite::params![collection, id, serde_json::to_string(&document)?],
        )?;
        let table = load_collection(&conn, collection)?;
        self.hub.notify(collection, &table).await;
        Ok(document)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let conn = self.conn.lock().await;
        fetch(&conn, collection, id)
    }

    async fn query(&self, collection: &str, filter: &Filter) -> Result<QueryRows, StoreError> {
        let conn = self.conn.lock().await;
        let table = load_collection(&conn, collection)?;
        Ok(matching_rows(&table, filter))
    }

    async fn apply(
        &self,
        collection: &str,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let mut document = fetch(&conn, collection, id)?
            .ok_or_else(|| StoreError::Missing(format!("{}/{}", collection, id)))?;
        let stamp = self.clock.stamp().await;
        for update in updates {
            update.resolve(stamp).apply_to(&mut document);
        }
        conn.execute(
            "UPDATE documents SET body = ?1 WHERE collection = ?2 AND id = ?3",
            rusqlite::params![serde_json::to_string(&document)?, collection, id],
        )?;
        let table = load_collection(&conn, collection)?;
        self.hub.notify(collection, &table).await;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let removed = conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            rusqlite::params![collection, id],
        )?;
        if removed == 0 {
            return Ok(());
        }
        let table = load_collection(&conn, collection)?;
        self.hub.notify(collection, &table).await;
        Ok(())
    }

    async fn watch_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Subscription<Option<Document>>, StoreError> {
        // Register under the connection lock so no write lands between the
        // initial snapshot and the subscription.
        let conn = self.conn.lock().await;
        let current = fetch(&conn, collection, id)?;
        let subscription = self.hub.watch_document(collection, id, current).await;
        drop(conn);
        Ok(subscription)
    }

    async fn watch_query(
        &self,
        collection: &str,
        filter: Filter,
    ) -> Result<Subscription<QueryRows>, StoreError> {
        let conn = self.conn.lock().await;
        let table = load_collection(&conn, collection)?;
        let current = matching_rows(&table, &filter);
        let subscription = self.hub.watch_query(collection, filter, current).await;
        drop(conn);
        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Value;

    #[tokio::test]
    async fn documents_round_trip_through_json_bodies() {
        let store = SqliteStore::open_in_memory().unwrap();
        let doc = Document::new()
            .with("username", "builderman")
            .with("robux", 250u64)
            .with("friends", Value::list(["a", "b"]))
            .with("createdAt", Value::ServerTime);

        let stored = store.create("users", "u1", doc).await.unwrap();
        let read = store.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(read, stored);
        assert!(read.require_time("createdAt").is_ok());
    }

    #[tokio::test]
    async fn create_conflicts_and_missing_apply_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .create("users", "u1", Document::new().with("x", 1i64))
            .await
            .unwrap();

        let err = store
            .create("users", "u1", Document::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));

        let err = store
            .apply("users", "missing", vec![FieldUpdate::set("x", 2i64)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Missing(_)));
    }

    #[tokio::test]
    async fn watches_fan_out_from_the_writing_instance() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut sub = store
            .watch_query("users", Filter::eq("status", "online"))
            .await
            .unwrap();
        assert!(sub.current().is_empty());

        store
            .create("users", "u1", Document::new().with("status", "online"))
            .await
            .unwrap();
        assert_eq!(sub.next().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let path = std::env::temp_dir().join(format!("creatoplay-{}.db", uuid::Uuid::new_v4()));

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .create("users", "u1", Document::new().with("username", "kept"))
                .await
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let doc = store.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(doc.require_text("username").unwrap(), "kept");

        drop(store);
        let _ = std::fs::remove_file(&path);
    }
}
