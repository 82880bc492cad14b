//! SQLite Key-Value Store
//!
//! Information Hiding:
//! - Table layout and JSON text encoding hidden from users
//! - Blocking rusqlite calls moved off the async runtime via spawn_blocking
//! - Connection shared behind a mutex; one statement per operation keeps writes atomic

use super::KvStore;
use crate::error::StorageError;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

/// File-backed store - every key is one row in `kv_store`
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let db_path = path.clone();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, StorageError> {
            let conn = Connection::open(&db_path)?;
            conn.execute_batch(SCHEMA)?;
            Ok(conn)
        })
        .await
        .map_err(|e| StorageError::Blocking(e.to_string()))??;

        tracing::info!("[SqliteStore] Opened database at {:?}", path);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path),
        })
    }

    /// Private in-memory database, mainly for tests
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn with_connection<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|e| StorageError::Blocking(e.to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| StorageError::Blocking(e.to_string()))?
    }
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let owned_key = key.to_string();
        let raw = self
            .with_connection(move |conn| {
                let raw = conn
                    .query_row(
                        "SELECT value FROM kv_store WHERE key = ?1",
                        params![owned_key],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                Ok(raw)
            })
            .await
            .inspect_err(|e| tracing::warn!("[SqliteStore] Failed to read key '{}': {}", key, e))?;

        match raw {
            Some(text) => {
                let value = serde_json::from_str(&text).inspect_err(|e| {
                    tracing::warn!("[SqliteStore] Key '{}' holds invalid JSON: {}", key, e)
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        let owned_key = key.to_string();
        let text = serde_json::to_string(value)?;
        let now = Utc::now().to_rfc3339();

        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![owned_key, text, now],
            )?;
            Ok(())
        })
        .await
        .inspect_err(|e| tracing::warn!("[SqliteStore] Failed to write key '{}': {}", key, e))?;

        tracing::debug!("[SqliteStore] Wrote key '{}'", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let owned_key = key.to_string();
        self.with_connection(move |conn| {
            conn.execute("DELETE FROM kv_store WHERE key = ?1", params![owned_key])?;
            Ok(())
        })
        .await
        .inspect_err(|e| tracing::warn!("[SqliteStore] Failed to remove key '{}': {}", key, e))?;

        tracing::debug!("[SqliteStore] Removed key '{}'", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .set("ask_ai_history", &json!([{"id": "1"}]))
            .await
            .unwrap();

        let loaded = store.get("ask_ai_history").await.unwrap();
        assert_eq!(loaded, Some(json!([{"id": "1"}])));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let store = SqliteStore::in_memory().unwrap();
        store.set("k", &json!("first")).await.unwrap();
        store.set("k", &json!("second")).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(json!("second")));
    }

    #[tokio::test]
    async fn test_remove_and_missing() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.get("absent").await.unwrap(), None);

        store.set("k", &json!(true)).await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("store.db");

        {
            let store = SqliteStore::open(&path).await.unwrap();
            store.set("ideasList", &json!([{"title": "Kite"}])).await.unwrap();
        }

        {
            let store = SqliteStore::open(&path).await.unwrap();
            assert_eq!(store.path(), Some(path.as_path()));
            let loaded = store.get("ideasList").await.unwrap();
            assert_eq!(loaded, Some(json!([{"title": "Kite"}])));
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_reported() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .with_connection(|conn| {
                conn.execute(
                    "INSERT INTO kv_store (key, value, updated_at) VALUES ('bad', '{not json', 'now')",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let result = store.get("bad").await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
