//! pocketmind - Ask-AI chat history and ideas notebook
//!
//! Questions go to a generative-language gateway and are kept, with their
//! answers, in a local key-value store alongside an ideas notebook. All writes
//! to the chat history pass through one actor task.

pub mod actors;
mod config;
pub mod conversation;
pub mod core;
pub mod error;
pub mod export;
pub mod records;
pub mod storage;
pub mod testing;
pub mod utils;

pub mod cli;

pub use self::config::{GatewayConfig, LoggingConfig, Settings, StorageConfig};
pub use conversation::ConversationManager;
pub use error::{ConversationError, GatewayError, StorageError};
pub use records::{Entry, EntryStatus, Idea};

use crate::core::{AnswerGateway, GeminiClient};
use records::history::MAX_ENTRIES;
use records::{HistoryRepository, IdeaRepository};
use std::sync::Arc;
use storage::{KvStore, SqliteStore};

/// Everything the front end needs, wired to one store
pub struct App {
    conversation: ConversationManager,
    ideas: IdeaRepository,
}

impl App {
    /// Open the SQLite store from `settings` and talk to Gemini with `api_key`
    pub async fn open(settings: &Settings, api_key: String) -> Result<Self, StorageError> {
        let store = SqliteStore::open(&settings.storage.path).await?;
        let gateway = GeminiClient::new(api_key, settings.gateway.clone());
        Ok(Self::with_parts(Arc::new(store), Arc::new(gateway)))
    }

    pub fn with_parts(store: Arc<dyn KvStore>, gateway: Arc<dyn AnswerGateway>) -> Self {
        let history = HistoryRepository::new(store.clone());
        tracing::info!("pocketmind ready (history limit {})", MAX_ENTRIES);
        Self {
            conversation: ConversationManager::new(history, gateway),
            ideas: IdeaRepository::new(store),
        }
    }

    pub fn conversation(&self) -> &ConversationManager {
        &self.conversation
    }

    pub fn ideas(&self) -> &IdeaRepository {
        &self.ideas
    }
}
