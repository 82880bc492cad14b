//! Ideas notebook
//!
//! Same soft-delete collection as the Ask-AI history, with the restore and
//! purge paths exposed and no cap.

use super::{generate_id, SoftDeletable, SoftDeleteCollection};
use crate::error::StorageError;
use crate::storage::KvStore;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const IDEAS_KEY: &str = "ideasList";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: String,
    pub title: String,
    pub purpose: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDeletable for Idea {
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

/// User-supplied fields of a new idea
#[derive(Debug, Clone, Default)]
pub struct NewIdea {
    pub title: String,
    pub purpose: String,
    pub description: String,
    pub category: Option<String>,
    pub tools: Vec<String>,
}

/// Partial edit; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct IdeaChanges {
    pub title: Option<String>,
    pub purpose: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tools: Option<Vec<String>>,
}

impl IdeaChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.purpose.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.tools.is_none()
    }

    fn apply(self, idea: &mut Idea) {
        if let Some(title) = self.title {
            idea.title = title;
        }
        if let Some(purpose) = self.purpose {
            idea.purpose = purpose;
        }
        if let Some(description) = self.description {
            idea.description = description;
        }
        if let Some(category) = self.category {
            idea.category = Some(category).filter(|c| !c.is_empty());
        }
        if let Some(tools) = self.tools {
            idea.tools = tools;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FilterField {
    #[default]
    Title,
    Purpose,
    Description,
    Category,
    Tools,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

pub struct IdeaRepository {
    ideas: SoftDeleteCollection<Idea>,
}

impl IdeaRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            ideas: SoftDeleteCollection::new(store, IDEAS_KEY),
        }
    }

    pub async fn add(&self, new_idea: NewIdea) -> Result<Idea, StorageError> {
        let idea = Idea {
            id: generate_id(),
            title: new_idea.title,
            purpose: new_idea.purpose,
            description: new_idea.description,
            category: new_idea.category.filter(|c| !c.is_empty()),
            tools: new_idea.tools,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        };

        self.ideas.append(idea.clone()).await?;
        tracing::info!("[IdeaRepository] Added idea '{}'", idea.id);
        Ok(idea)
    }

    /// Edit an active idea; deleted or unknown ids yield `None`
    pub async fn update(
        &self,
        id: &str,
        changes: IdeaChanges,
    ) -> Result<Option<Idea>, StorageError> {
        self.ideas
            .update(id, |idea| {
                if idea.deleted_at.is_some() {
                    return false;
                }
                changes.apply(idea);
                idea.updated_at = Some(Utc::now());
                true
            })
            .await
    }

    /// Active idea by id
    pub async fn get(&self, id: &str) -> Result<Option<Idea>, StorageError> {
        Ok(self
            .ideas
            .find(id)
            .await?
            .filter(|idea| idea.deleted_at.is_none()))
    }

    pub async fn list_all(&self) -> Result<Vec<Idea>, StorageError> {
        self.ideas.list_all().await
    }

    pub async fn list_active(&self) -> Result<Vec<Idea>, StorageError> {
        self.ideas.list_active().await
    }

    pub async fn list_deleted(&self) -> Result<Vec<Idea>, StorageError> {
        self.ideas.list_deleted().await
    }

    pub async fn soft_delete(&self, id: &str) -> Result<bool, StorageError> {
        self.ideas.soft_delete(id).await
    }

    pub async fn restore(&self, id: &str) -> Result<bool, StorageError> {
        self.ideas.restore(id).await
    }

    pub async fn purge(&self, id: &str) -> Result<bool, StorageError> {
        self.ideas.purge(id).await
    }
}

/// Case-insensitive substring search on one field, ordered by creation time.
/// Ideas without a value in the field never match.
pub fn filter_and_sort(
    ideas: &[Idea],
    search: &str,
    field: FilterField,
    order: SortOrder,
) -> Vec<Idea> {
    let needle = search.to_lowercase();
    let contains = |value: &str| value.to_lowercase().contains(&needle);

    let mut matched: Vec<Idea> = ideas
        .iter()
        .filter(|idea| match field {
            FilterField::Title => contains(&idea.title),
            FilterField::Purpose => contains(&idea.purpose),
            FilterField::Description => contains(&idea.description),
            FilterField::Category => idea.category.as_deref().is_some_and(|c| contains(c)),
            FilterField::Tools => idea.tools.iter().any(|tool| contains(tool)),
        })
        .cloned()
        .collect();

    match order {
        SortOrder::Asc => matched.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::Desc => matched.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    matched
}
