//! Key-Value Storage Abstraction
//!
//! Information Hiding:
//! - Storage engine hidden behind an async trait
//! - Values travel as serde_json::Value; encoding on disk is the backend's business
//! - Failures are returned, never swallowed, so callers can tell a no-op from a failed write

use crate::error::StorageError;
use async_trait::async_trait;
use serde_json::Value;

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Trait defining the key-value store interface
/// A single key's write is atomic; there are no guarantees across keys
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`, `None` if absent
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError>;

    /// Remove `key`; removing an absent key is not an error
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
