use crate::error::StorageError;
use crate::records::Entry;
use tokio::sync::oneshot;

/// How a question ended
#[derive(Debug, Clone)]
pub enum Outcome {
    Completed {
        answer: String,
    },
    Failed {
        question: String,
        /// Text stored as the entry's answer
        message: String,
        /// Cause, kept for `last_error`
        error: String,
    },
}

#[derive(Debug)]
pub enum HistoryMessage {
    Append {
        entry: Entry,
        response: oneshot::Sender<Result<(), StorageError>>,
    },
    Finish {
        id: String,
        outcome: Outcome,
        response: oneshot::Sender<Result<(), StorageError>>,
    },
    Delete {
        id: String,
        response: oneshot::Sender<Result<bool, StorageError>>,
    },
    ClearAll {
        response: oneshot::Sender<Result<(), StorageError>>,
    },
    Refresh {
        response: oneshot::Sender<Result<usize, StorageError>>,
    },
    RecoverAbandoned {
        response: oneshot::Sender<Result<usize, StorageError>>,
    },
    ClearLastFailed,
    Snapshot(oneshot::Sender<ConversationSnapshot>),
}

/// Read-only copy of the conversation state
#[derive(Debug, Clone, Default)]
pub struct ConversationSnapshot {
    /// Active entries, most recent first
    pub entries: Vec<Entry>,
    pub last_failed_question: Option<String>,
    pub last_error: Option<String>,
    /// Questions whose gateway call has not resolved yet
    pub in_flight: usize,
}

impl ConversationSnapshot {
    pub fn is_pending(&self) -> bool {
        self.in_flight > 0
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id() == id)
    }
}
