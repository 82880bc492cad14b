//! In-Memory Key-Value Store
//!
//! Information Hiding:
//! - HashMap storage structure hidden from users
//! - Thread-safe access via RwLock hidden behind async interface
//! - Suitable for testing and ephemeral sessions

use super::KvStore;
use crate::error::StorageError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory store using HashMap
/// Data is lost when process terminates
#[derive(Clone)]
pub struct InMemoryStore {
    values: Arc<RwLock<HashMap<String, Value>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            values: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let values = self.values.read().await;
        let value = values.get(key).cloned();
        tracing::debug!("[InMemoryStore] Read key '{}' (present: {})", key, value.is_some());
        Ok(value)
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        let mut values = self.values.write().await;
        values.insert(key.to_string(), value.clone());
        tracing::debug!("[InMemoryStore] Wrote key '{}'", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.write().await;
        values.remove(key);
        tracing::debug!("[InMemoryStore] Removed key '{}'", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = InMemoryStore::new();
        store.set("greeting", &json!(["hello", "hi"])).await.unwrap();

        let loaded = store.get("greeting").await.unwrap();
        assert_eq!(loaded, Some(json!(["hello", "hi"])));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_key() {
        let store = InMemoryStore::new();
        store.set("k", &json!(1)).await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);

        // Removing again is fine
        store.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemoryStore::new();
        let other = store.clone();
        store.set("shared", &json!({"a": 1})).await.unwrap();
        assert_eq!(other.get("shared").await.unwrap(), Some(json!({"a": 1})));
    }
}
