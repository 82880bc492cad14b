//! Conversation manager
//!
//! Drives one question through pending → completed | error. Storage goes
//! through the history actor; the gateway call runs here, outside the actor,
//! so snapshots stay available while a question is in flight.

use crate::actors::{ConversationSnapshot, HistoryActorHandle, Outcome};
use crate::core::{build_prompt, AnswerGateway};
use crate::error::{ConversationError, GatewayError};
use crate::records::{Entry, EntryStatus, HistoryRepository};
use std::sync::Arc;

pub use crate::records::history::FAILED_ANSWER;

const DEFAULT_BUFFER: usize = 32;

#[derive(Clone)]
pub struct ConversationManager {
    history: HistoryActorHandle,
    gateway: Arc<dyn AnswerGateway>,
}

impl ConversationManager {
    pub fn new(repository: HistoryRepository, gateway: Arc<dyn AnswerGateway>) -> Self {
        Self {
            history: HistoryActorHandle::new(repository, DEFAULT_BUFFER),
            gateway,
        }
    }

    /// Ask a question and wait for its answer.
    ///
    /// The pending entry is stored and visible in snapshots before the gateway
    /// is called. A gateway failure is recorded on the entry and then returned.
    pub async fn ask(
        &self,
        question: &str,
        topic: Option<&str>,
    ) -> Result<Entry, ConversationError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ConversationError::EmptyQuestion);
        }
        let topic = topic.map(str::trim).filter(|t| !t.is_empty());

        let prompt = build_prompt(question, topic);
        let mut entry = Entry::pending(question, topic);
        let id = entry.id().to_string();

        self.history.append(entry.clone()).await?;
        tracing::info!("[Conversation] Asking '{}' (topic: {})", id, entry.topic());

        let error = match self.gateway.generate(&prompt).await {
            Ok(answer) if !answer.trim().is_empty() => {
                entry.finish(EntryStatus::Completed, answer.as_str());
                self.history
                    .finish(&id, Outcome::Completed { answer })
                    .await?;
                tracing::info!("[Conversation] Entry '{}' answered", id);
                return Ok(entry);
            }
            Ok(_) => GatewayError::EmptyResponse,
            Err(e) => e,
        };

        tracing::error!("[Conversation] Entry '{}' failed: {:?}", id, error);
        entry.finish(EntryStatus::Error, FAILED_ANSWER);
        let outcome = Outcome::Failed {
            question: question.to_string(),
            message: FAILED_ANSWER.to_string(),
            error: error.to_string(),
        };
        if let Err(e) = self.history.finish(&id, outcome).await {
            // The gateway error is the one the caller needs to see
            tracing::warn!("[Conversation] Could not record failure of '{}': {}", id, e);
        }

        Err(error.into())
    }

    /// Ask again as a brand-new entry; the failed entry stays as it is
    pub async fn retry(
        &self,
        question: &str,
        topic: Option<&str>,
    ) -> Result<Entry, ConversationError> {
        self.history.clear_last_failed().await?;
        self.ask(question, topic).await
    }

    /// Soft-delete an entry; `false` if it was not active
    pub async fn delete(&self, id: &str) -> Result<bool, ConversationError> {
        self.history.delete(id).await
    }

    pub async fn clear_all(&self) -> Result<(), ConversationError> {
        self.history.clear_all().await
    }

    /// Reload the cached list from storage; returns the active entry count
    pub async fn refresh(&self) -> Result<usize, ConversationError> {
        self.history.refresh().await
    }

    /// Mark entries left pending by an earlier process as finished. Only run
    /// this where no other process can still be answering, as the ask and
    /// chat commands do; returns how many entries were closed.
    pub async fn recover_abandoned(&self) -> Result<usize, ConversationError> {
        self.history.recover_abandoned().await
    }

    pub async fn snapshot(&self) -> Result<ConversationSnapshot, ConversationError> {
        self.history.snapshot().await
    }

    /// Active entries, most recent first
    pub async fn entries(&self) -> Result<Vec<Entry>, ConversationError> {
        Ok(self.snapshot().await?.entries)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Entry>, ConversationError> {
        Ok(self.snapshot().await?.get(id).cloned())
    }

    pub async fn last_failed_question(&self) -> Result<Option<String>, ConversationError> {
        Ok(self.snapshot().await?.last_failed_question)
    }

    pub async fn last_error(&self) -> Result<Option<String>, ConversationError> {
        Ok(self.snapshot().await?.last_error)
    }

    pub async fn is_pending(&self) -> Result<bool, ConversationError> {
        Ok(self.snapshot().await?.is_pending())
    }
}
