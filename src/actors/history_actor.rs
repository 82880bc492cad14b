//! History actor - the single writer of the Ask-AI history
//!
//! Information Hiding:
//! - Repository and in-memory cache owned by one task; nothing else can touch them
//! - Requests serialized through an mpsc channel, answered over oneshot channels
//! - Callers only ever receive cloned snapshots

use crate::actors::messages::*;
use crate::error::{ConversationError, StorageError};
use crate::records::{Entry, EntryStatus, HistoryRepository};
use std::collections::HashSet;
use tokio::sync::mpsc::{channel, Receiver, Sender};
use tokio::sync::oneshot;

/// Stored as the answer of entries left pending by an earlier process
pub const ABANDONED_ANSWER: &str = "No response was received for this question.";

#[derive(Clone)]
pub struct HistoryActorHandle {
    sender: Sender<HistoryMessage>,
}

impl HistoryActorHandle {
    pub fn new(repository: HistoryRepository, buffer_size: usize) -> Self {
        let (sender, receiver) = channel(buffer_size.max(1));
        tokio::spawn(history_actor(receiver, repository));
        Self { sender }
    }

    pub async fn send_message(&self, message: HistoryMessage) -> Result<(), ConversationError> {
        self.sender.send(message).await.map_err(|e| {
            tracing::error!("Failed to send message to history actor: {}", e);
            ConversationError::ActorUnavailable
        })
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> HistoryMessage,
    ) -> Result<T, ConversationError> {
        let (tx, rx) = oneshot::channel();
        self.send_message(build(tx)).await?;
        rx.await.map_err(|_| ConversationError::ActorUnavailable)
    }

    pub async fn append(&self, entry: Entry) -> Result<(), ConversationError> {
        self.request(|response| HistoryMessage::Append { entry, response })
            .await??;
        Ok(())
    }

    pub async fn finish(&self, id: &str, outcome: Outcome) -> Result<(), ConversationError> {
        let id = id.to_string();
        self.request(|response| HistoryMessage::Finish {
            id,
            outcome,
            response,
        })
        .await??;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool, ConversationError> {
        let id = id.to_string();
        Ok(self
            .request(|response| HistoryMessage::Delete { id, response })
            .await??)
    }

    pub async fn clear_all(&self) -> Result<(), ConversationError> {
        self.request(|response| HistoryMessage::ClearAll { response })
            .await??;
        Ok(())
    }

    pub async fn refresh(&self) -> Result<usize, ConversationError> {
        Ok(self
            .request(|response| HistoryMessage::Refresh { response })
            .await??)
    }

    /// Close out entries left pending by a process that is gone; returns how
    /// many were rewritten
    pub async fn recover_abandoned(&self) -> Result<usize, ConversationError> {
        Ok(self
            .request(|response| HistoryMessage::RecoverAbandoned { response })
            .await??)
    }

    pub async fn clear_last_failed(&self) -> Result<(), ConversationError> {
        self.send_message(HistoryMessage::ClearLastFailed).await
    }

    pub async fn snapshot(&self) -> Result<ConversationSnapshot, ConversationError> {
        self.request(HistoryMessage::Snapshot).await
    }
}

struct HistoryState {
    repository: HistoryRepository,
    /// Active entries, oldest first, mirroring the store
    entries: Vec<Entry>,
    in_flight: HashSet<String>,
    last_failed_question: Option<String>,
    last_error: Option<String>,
}

impl HistoryState {
    fn new(repository: HistoryRepository) -> Self {
        Self {
            repository,
            entries: Vec::new(),
            in_flight: HashSet::new(),
            last_failed_question: None,
            last_error: None,
        }
    }

    async fn reload(&mut self) -> Result<usize, StorageError> {
        self.entries = self.repository.list_active().await?;
        Ok(self.entries.len())
    }

    /// Pending entries this actor did not append can no longer be finished by
    /// it. An entry that already holds an answer keeps it and completes.
    async fn recover_abandoned(&mut self) -> Result<usize, StorageError> {
        let abandoned: Vec<Entry> = self
            .repository
            .list_all()
            .await?
            .into_iter()
            .filter(|e| e.status() == EntryStatus::Pending && !self.in_flight.contains(e.id()))
            .collect();

        for entry in &abandoned {
            if entry.answer().is_empty() {
                self.repository
                    .finish(entry.id(), EntryStatus::Error, ABANDONED_ANSWER)
                    .await?;
            } else {
                self.repository
                    .finish(entry.id(), EntryStatus::Completed, entry.answer())
                    .await?;
            }
        }
        if !abandoned.is_empty() {
            tracing::warn!("[HistoryActor] Closed {} abandoned entries", abandoned.len());
            self.reload().await?;
        }
        Ok(abandoned.len())
    }

    async fn handle(&mut self, message: HistoryMessage) {
        match message {
            HistoryMessage::Append { entry, response } => {
                let _ = response.send(self.append(entry).await);
            }
            HistoryMessage::Finish {
                id,
                outcome,
                response,
            } => {
                let _ = response.send(self.finish(&id, outcome).await);
            }
            HistoryMessage::Delete { id, response } => {
                let _ = response.send(self.delete(&id).await);
            }
            HistoryMessage::ClearAll { response } => {
                let _ = response.send(self.clear_all().await);
            }
            HistoryMessage::Refresh { response } => {
                let result = self.reload().await;
                if let Err(e) = &result {
                    tracing::warn!("[HistoryActor] Refresh failed: {}", e);
                }
                let _ = response.send(result);
            }
            HistoryMessage::RecoverAbandoned { response } => {
                let result = self.recover_abandoned().await;
                if let Err(e) = &result {
                    tracing::warn!("[HistoryActor] Recovery failed: {}", e);
                }
                let _ = response.send(result);
            }
            HistoryMessage::ClearLastFailed => {
                self.last_failed_question = None;
            }
            HistoryMessage::Snapshot(response) => {
                let _ = response.send(self.snapshot());
            }
        }
    }

    async fn append(&mut self, entry: Entry) -> Result<(), StorageError> {
        let id = entry.id().to_string();
        let written = self.repository.append(entry).await.inspect_err(|e| {
            tracing::warn!("[HistoryActor] Failed to persist entry '{}': {}", id, e)
        })?;

        self.entries = written.into_iter().filter(|e| !e.is_deleted()).collect();
        self.in_flight.insert(id.clone());
        tracing::debug!("[HistoryActor] Appended entry '{}'", id);
        Ok(())
    }

    async fn finish(&mut self, id: &str, outcome: Outcome) -> Result<(), StorageError> {
        self.in_flight.remove(id);

        let (status, answer) = match outcome {
            Outcome::Completed { answer } => {
                self.last_failed_question = None;
                self.last_error = None;
                (EntryStatus::Completed, answer)
            }
            Outcome::Failed {
                question,
                message,
                error,
            } => {
                self.last_failed_question = Some(question);
                self.last_error = Some(error);
                (EntryStatus::Error, message)
            }
        };

        // The cache gets the terminal state even if the write below fails,
        // so an entry is never shown as pending forever.
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id() == id) {
            entry.finish(status, answer.as_str());
        }

        match self.repository.finish(id, status, &answer).await {
            Ok(Some(_)) => {
                tracing::debug!("[HistoryActor] Entry '{}' finished as {}", id, status);
                Ok(())
            }
            Ok(None) => self.reconcile_refused_finish(id).await,
            Err(e) => {
                tracing::warn!("[HistoryActor] Failed to persist result of '{}': {}", id, e);
                Err(e)
            }
        }
    }

    /// The stored entry was missing or already terminal when the result
    /// arrived. A terminal one was finished by another writer; the cache
    /// takes the stored version and the caller gets a conflict.
    async fn reconcile_refused_finish(&mut self, id: &str) -> Result<(), StorageError> {
        match self.repository.get(id).await? {
            Some(stored) if stored.status().is_terminal() => {
                tracing::warn!(
                    "[HistoryActor] Entry '{}' was already finished as {} elsewhere",
                    id,
                    stored.status()
                );
                if let Some(cached) = self.entries.iter_mut().find(|e| e.id() == id) {
                    *cached = stored;
                }
                Err(StorageError::Conflict(id.to_string()))
            }
            _ => {
                tracing::debug!(
                    "[HistoryActor] Entry '{}' no longer stored, result kept in memory only",
                    id
                );
                Ok(())
            }
        }
    }

    async fn delete(&mut self, id: &str) -> Result<bool, StorageError> {
        let found = self.repository.soft_delete(id).await.inspect_err(|e| {
            tracing::warn!("[HistoryActor] Failed to delete entry '{}': {}", id, e)
        })?;
        self.entries.retain(|e| e.id() != id);
        Ok(found)
    }

    async fn clear_all(&mut self) -> Result<(), StorageError> {
        self.repository
            .clear_all()
            .await
            .inspect_err(|e| tracing::warn!("[HistoryActor] Failed to clear history: {}", e))?;
        self.entries.clear();
        self.last_failed_question = None;
        self.last_error = None;
        Ok(())
    }

    fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            entries: self.entries.iter().rev().cloned().collect(),
            last_failed_question: self.last_failed_question.clone(),
            last_error: self.last_error.clone(),
            in_flight: self.in_flight.len(),
        }
    }
}

async fn history_actor(mut receiver: Receiver<HistoryMessage>, repository: HistoryRepository) {
    let mut state = HistoryState::new(repository);

    match state.reload().await {
        Ok(count) => tracing::info!("History actor started with {} active entries", count),
        Err(e) => tracing::warn!("History actor started without history: {}", e),
    }

    while let Some(message) = receiver.recv().await {
        state.handle(message).await;
    }

    tracing::info!("History actor channel closed, shutting down");
}
