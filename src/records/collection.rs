//! Soft-delete collection
//!
//! One JSON array of records under one store key. Every operation is a
//! read-modify-write of the whole array, so a collection must have a single
//! writer; the history actor provides that for Ask-AI.

use super::SoftDeletable;
use crate::error::StorageError;
use crate::storage::KvStore;
use chrono::Utc;
use std::marker::PhantomData;
use std::sync::Arc;

pub struct SoftDeleteCollection<T> {
    store: Arc<dyn KvStore>,
    key: String,
    cap: Option<usize>,
    _record: PhantomData<fn() -> T>,
}

impl<T: SoftDeletable> SoftDeleteCollection<T> {
    pub fn new(store: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            cap: None,
            _record: PhantomData,
        }
    }

    /// Keep at most `cap` records; appends past the cap evict from the front
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = Some(cap);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn cap(&self) -> Option<usize> {
        self.cap
    }

    /// Every stored record, deleted ones included, in stored order
    pub async fn list_all(&self) -> Result<Vec<T>, StorageError> {
        match self.store.get(&self.key).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn list_active(&self) -> Result<Vec<T>, StorageError> {
        let mut records = self.list_all().await?;
        records.retain(|r| r.deleted_at().is_none());
        Ok(records)
    }

    pub async fn list_deleted(&self) -> Result<Vec<T>, StorageError> {
        let mut records = self.list_all().await?;
        records.retain(|r| r.deleted_at().is_some());
        Ok(records)
    }

    pub async fn find(&self, id: &str) -> Result<Option<T>, StorageError> {
        Ok(self.list_all().await?.into_iter().find(|r| r.id() == id))
    }

    /// Append `record` and return the list as written
    pub async fn append(&self, record: T) -> Result<Vec<T>, StorageError> {
        let mut records = self.list_all().await?;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(StorageError::DuplicateId(record.id().to_string()));
        }

        records.push(record);
        if let Some(cap) = self.cap {
            if records.len() > cap {
                let evicted = records.len() - cap;
                records.drain(..evicted);
                tracing::debug!("[Collection {}] Evicted {} oldest record(s)", self.key, evicted);
            }
        }

        self.save(&records).await?;
        Ok(records)
    }

    /// Apply `change` to the record with `id` and write the list back.
    ///
    /// `change` returns whether it modified the record; nothing is written
    /// when the id is absent or the change declined, and `None` is returned.
    pub async fn update<F>(&self, id: &str, change: F) -> Result<Option<T>, StorageError>
    where
        F: FnOnce(&mut T) -> bool,
    {
        let mut records = self.list_all().await?;
        let Some(record) = records.iter_mut().find(|r| r.id() == id) else {
            tracing::debug!("[Collection {}] No record '{}' to update", self.key, id);
            return Ok(None);
        };

        if !change(record) {
            return Ok(None);
        }
        let updated = record.clone();

        self.save(&records).await?;
        Ok(Some(updated))
    }

    /// Mark an active record deleted; `false` if absent or already deleted
    pub async fn soft_delete(&self, id: &str) -> Result<bool, StorageError> {
        let updated = self
            .update(id, |r| {
                if r.deleted_at().is_some() {
                    return false;
                }
                r.set_deleted_at(Some(Utc::now()));
                true
            })
            .await?;
        Ok(updated.is_some())
    }

    /// Clear the deletion mark; `false` if absent or not deleted
    pub async fn restore(&self, id: &str) -> Result<bool, StorageError> {
        let updated = self
            .update(id, |r| {
                if r.deleted_at().is_none() {
                    return false;
                }
                r.set_deleted_at(None);
                true
            })
            .await?;
        Ok(updated.is_some())
    }

    /// Physically remove a record, deleted or not
    pub async fn purge(&self, id: &str) -> Result<bool, StorageError> {
        let mut records = self.list_all().await?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Ok(false);
        }

        self.save(&records).await?;
        Ok(true)
    }

    /// Replace the whole collection with an empty array
    pub async fn clear_all(&self) -> Result<(), StorageError> {
        self.save(&[]).await
    }

    async fn save(&self, records: &[T]) -> Result<(), StorageError> {
        let value = serde_json::to_value(records)?;
        self.store.set(&self.key, &value).await?;
        tracing::debug!("[Collection {}] Saved {} record(s)", self.key, records.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Note {
        id: String,
        text: String,
        deleted_at: Option<DateTime<Utc>>,
    }

    impl Note {
        fn new(id: &str) -> Self {
            Self {
                id: id.to_string(),
                text: format!("note {}", id),
                deleted_at: None,
            }
        }
    }

    impl SoftDeletable for Note {
        fn id(&self) -> &str {
            &self.id
        }

        fn deleted_at(&self) -> Option<DateTime<Utc>> {
            self.deleted_at
        }

        fn set_deleted_at(&mut self, at: Option<DateTime<Utc>>) {
            self.deleted_at = at;
        }
    }

    fn notes(store: Arc<dyn KvStore>) -> SoftDeleteCollection<Note> {
        SoftDeleteCollection::new(store, "notes")
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let collection = notes(Arc::new(InMemoryStore::new()));
        assert!(collection.list_all().await.unwrap().is_empty());
        assert!(collection.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cap_evicts_oldest_first() {
        let collection = notes(Arc::new(InMemoryStore::new())).with_cap(3);
        for i in 0..5 {
            collection.append(Note::new(&i.to_string())).await.unwrap();
        }

        let ids: Vec<String> = collection
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec!["2", "3", "4"]);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let collection = notes(Arc::new(InMemoryStore::new()));
        collection.append(Note::new("a")).await.unwrap();

        let result = collection.append(Note::new("a")).await;
        assert!(matches!(result, Err(StorageError::DuplicateId(id)) if id == "a"));
        assert_eq!(collection.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_soft_delete_restore_purge() {
        let store: Arc<dyn KvStore> = Arc::new(InMemoryStore::new());
        let collection = notes(store.clone());
        collection.append(Note::new("a")).await.unwrap();
        collection.append(Note::new("b")).await.unwrap();

        assert!(collection.soft_delete("a").await.unwrap());
        assert!(!collection.soft_delete("a").await.unwrap());
        assert_eq!(collection.list_active().await.unwrap(), vec![Note::new("b")]);
        assert_eq!(collection.list_deleted().await.unwrap().len(), 1);

        // Still physically present
        let raw = store.get("notes").await.unwrap().unwrap();
        assert_eq!(raw.as_array().unwrap().len(), 2);
        assert!(!raw[0]["deletedAt"].is_null());

        assert!(collection.restore("a").await.unwrap());
        assert!(!collection.restore("a").await.unwrap());
        assert_eq!(collection.list_active().await.unwrap().len(), 2);

        assert!(collection.purge("a").await.unwrap());
        assert!(!collection.purge("a").await.unwrap());
        assert_eq!(collection.list_all().await.unwrap(), vec![Note::new("b")]);
    }

    #[tokio::test]
    async fn test_update_missing_id_writes_nothing() {
        let store: Arc<dyn KvStore> = Arc::new(InMemoryStore::new());
        let collection = notes(store.clone());

        let updated = collection
            .update("ghost", |n| {
                n.text.push('!');
                true
            })
            .await
            .unwrap();
        assert!(updated.is_none());
        assert_eq!(store.get("notes").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_all_writes_empty_array() {
        let store: Arc<dyn KvStore> = Arc::new(InMemoryStore::new());
        let collection = notes(store.clone());
        collection.append(Note::new("a")).await.unwrap();
        collection.soft_delete("a").await.unwrap();

        collection.clear_all().await.unwrap();
        assert_eq!(store.get("notes").await.unwrap(), Some(json!([])));
    }
}
