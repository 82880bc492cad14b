//! Persisted record collections
//!
//! Information Hiding:
//! - JSON array layout under a single key hidden behind repository methods
//! - Soft-delete bookkeeping shared by Ask-AI history and Ideas
//! - Id generation centralized

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod collection;
pub mod history;
pub mod ideas;

pub use collection::SoftDeleteCollection;
pub use history::{Entry, EntryStatus, HistoryRepository};
pub use ideas::{FilterField, Idea, IdeaChanges, IdeaRepository, NewIdea, SortOrder};

/// A record that can be hidden by a deletion timestamp instead of removed
pub trait SoftDeletable: Serialize + DeserializeOwned + Clone + Send + Sync {
    fn id(&self) -> &str;
    fn deleted_at(&self) -> Option<DateTime<Utc>>;
    fn set_deleted_at(&mut self, at: Option<DateTime<Utc>>);
}

/// `<unix millis>-<8 random hex chars>`
pub fn generate_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &suffix[..8])
}
