//! Test doubles
//!
//! `MockGateway` answers from a queue of canned results without touching the
//! network, records every prompt it receives, and can hold each call until
//! the test releases it. `FailingStore` is an in-memory store whose writes
//! start failing after a set number of successes.
//!
//! ```rust
//! use pocketmind::core::AnswerGateway;
//! use pocketmind::testing::MockGateway;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let gateway = MockGateway::new().with_answer("42");
//! assert_eq!(gateway.generate("6 x 7?").await.unwrap(), "42");
//! assert_eq!(gateway.call_count().await, 1);
//! # }
//! ```

use crate::core::AnswerGateway;
use crate::error::{GatewayError, StorageError};
use crate::storage::{InMemoryStore, KvStore};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

pub struct MockGateway {
    responses: Mutex<VecDeque<Result<String, GatewayError>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// No scripted results; an exhausted queue yields `EmptyResponse`
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn with_answer(mut self, text: impl Into<String>) -> Self {
        self.responses.get_mut().push_back(Ok(text.into()));
        self
    }

    pub fn with_error(mut self, error: GatewayError) -> Self {
        self.responses.get_mut().push_back(Err(error));
        self
    }

    /// Answer returned once the scripted queue runs dry
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    /// Hold every call until the returned `Notify` fires once for it
    pub fn held(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub async fn call_count(&self) -> usize {
        self.prompts.lock().await.len()
    }

    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl AnswerGateway for MockGateway {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        self.prompts.lock().await.push(prompt.to_string());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match self.responses.lock().await.pop_front() {
            Some(result) => result,
            None => self.fallback.clone().ok_or(GatewayError::EmptyResponse),
        }
    }
}

/// In-memory store that refuses writes once its budget is spent. Reads always
/// succeed.
#[derive(Default)]
pub struct FailingStore {
    inner: InMemoryStore,
    writes_left: Mutex<Option<usize>>,
}

impl FailingStore {
    /// Every write succeeds until a budget is set
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `count` more writes, then fail every one after
    pub fn fail_writes_after(self, count: usize) -> Self {
        Self {
            writes_left: Mutex::new(Some(count)),
            ..self
        }
    }

    async fn spend_write(&self, key: &str) -> Result<(), StorageError> {
        let mut writes_left = self.writes_left.lock().await;
        match writes_left.as_mut() {
            Some(0) => {
                tracing::debug!("[FailingStore] Refusing write to '{}'", key);
                Err(StorageError::Io(io::Error::other("scripted write failure")))
            }
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl KvStore for FailingStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        self.spend_write(key).await?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.spend_write(key).await?;
        self.inner.remove(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_failing_store_spends_budget() {
        let store = FailingStore::new().fail_writes_after(1);
        store.set("k", &json!(1)).await.unwrap();
        assert!(matches!(
            store.set("k", &json!(2)).await,
            Err(StorageError::Io(_))
        ));
        assert!(store.remove("k").await.is_err());
        assert_eq!(store.get("k").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_unlimited_by_default() {
        let store = FailingStore::new();
        for i in 0..5 {
            store.set("k", &json!(i)).await.unwrap();
        }
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
