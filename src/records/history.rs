//! Ask-AI history repository
//!
//! Information Hiding:
//! - Store key and entry cap fixed here
//! - Status transitions enforced by Entry, not by callers

use super::{generate_id, SoftDeletable, SoftDeleteCollection};
use crate::error::StorageError;
use crate::storage::KvStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub const ASK_AI_KEY: &str = "ask_ai_history";
pub const MAX_ENTRIES: usize = 40;
pub const DEFAULT_TOPIC: &str = "General";
/// Answer stored on an entry whose gateway call failed
pub const FAILED_ANSWER: &str = "Failed to get a response. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Completed,
    Error,
}

impl EntryStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, EntryStatus::Pending)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Completed => "completed",
            EntryStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// One question/answer pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredEntry")]
pub struct Entry {
    id: String,
    question: String,
    answer: String,
    topic: String,
    status: EntryStatus,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

/// Stored shape, including records written by older versions
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    id: String,
    question: String,
    #[serde(default)]
    answer: String,
    #[serde(default = "default_topic")]
    topic: String,
    #[serde(default)]
    status: Option<StoredStatus>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum StoredStatus {
    Pending,
    Loading,
    Completed,
    Error,
}

fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

impl From<StoredEntry> for Entry {
    fn from(stored: StoredEntry) -> Self {
        // Older versions wrote no status, or left "loading" in place after the
        // answer arrived; the answer text tells how the question ended.
        let status = match stored.status {
            None => EntryStatus::Completed,
            Some(StoredStatus::Pending) => EntryStatus::Pending,
            Some(StoredStatus::Loading) if stored.answer.is_empty() => EntryStatus::Pending,
            Some(StoredStatus::Loading) if stored.answer == FAILED_ANSWER => EntryStatus::Error,
            Some(StoredStatus::Loading) | Some(StoredStatus::Completed) => EntryStatus::Completed,
            Some(StoredStatus::Error) => EntryStatus::Error,
        };

        Self {
            id: stored.id,
            question: stored.question,
            answer: stored.answer,
            topic: stored.topic,
            status,
            created_at: stored.created_at,
            deleted_at: stored.deleted_at,
        }
    }
}

impl Entry {
    /// New pending entry with an empty answer
    pub fn pending(question: impl Into<String>, topic: Option<&str>) -> Self {
        Self {
            id: generate_id(),
            question: question.into(),
            answer: String::new(),
            topic: topic.unwrap_or(DEFAULT_TOPIC).to_string(),
            status: EntryStatus::Pending,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn set_answer(&mut self, answer: impl Into<String>) {
        self.answer = answer.into();
    }

    /// Terminal write. Refused once the entry left `Pending`, or if `status`
    /// is itself `Pending`.
    pub fn finish(&mut self, status: EntryStatus, answer: impl Into<String>) -> bool {
        if self.status.is_terminal() || !status.is_terminal() {
            return false;
        }
        self.status = status;
        self.answer = answer.into();
        true
    }
}

impl SoftDeletable for Entry {
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

/// Entries stored as one JSON array under `ask_ai_history`
pub struct HistoryRepository {
    entries: SoftDeleteCollection<Entry>,
}

impl HistoryRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            entries: SoftDeleteCollection::new(store, ASK_AI_KEY).with_cap(MAX_ENTRIES),
        }
    }

    /// Entries without a deletion mark, oldest first
    pub async fn list_active(&self) -> Result<Vec<Entry>, StorageError> {
        self.entries.list_active().await
    }

    /// The stored array as-is, deleted entries included
    pub async fn list_all(&self) -> Result<Vec<Entry>, StorageError> {
        self.entries.list_all().await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Entry>, StorageError> {
        self.entries.find(id).await
    }

    /// Append and trim to the most recent entries; returns the list as written
    pub async fn append(&self, entry: Entry) -> Result<Vec<Entry>, StorageError> {
        self.entries.append(entry).await
    }

    /// Replace the answer text; `false` if no entry has `id`
    pub async fn update_answer(&self, id: &str, answer: &str) -> Result<bool, StorageError> {
        let updated = self
            .entries
            .update(id, |entry| {
                entry.set_answer(answer);
                true
            })
            .await?;
        Ok(updated.is_some())
    }

    /// Record the outcome of the gateway call. `None` if the entry is gone or
    /// already holds a terminal status.
    pub async fn finish(
        &self,
        id: &str,
        status: EntryStatus,
        answer: &str,
    ) -> Result<Option<Entry>, StorageError> {
        self.entries
            .update(id, |entry| entry.finish(status, answer))
            .await
    }

    pub async fn soft_delete(&self, id: &str) -> Result<bool, StorageError> {
        self.entries.soft_delete(id).await
    }

    /// Drop every entry, soft-deleted ones too
    pub async fn clear_all(&self) -> Result<(), StorageError> {
        self.entries.clear_all().await
    }
}
