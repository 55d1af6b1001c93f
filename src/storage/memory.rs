//! In-memory idea store on a concurrent map

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{HealthStatus, IdeaStore, StoreHealth, StoredIdea};
use crate::types::{BusinessIdea, IdeaId, Result};

/// Process-local store; contents are lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStore {
    ideas: DashMap<IdeaId, StoredIdea>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ideas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
    }
}

#[async_trait]
impl IdeaStore for MemoryStore {
    async fn save(&self, idea: &BusinessIdea) -> Result<StoredIdea> {
        let now = Utc::now();
        let stored = match self.ideas.entry(idea.id().clone()) {
            Entry::Occupied(mut entry) => {
                let stored = StoredIdea {
                    idea: idea.clone(),
                    created_at: entry.get().created_at,
                    updated_at: now,
                };
                entry.insert(stored.clone());
                stored
            }
            Entry::Vacant(entry) => {
                let stored = StoredIdea {
                    idea: idea.clone(),
                    created_at: now,
                    updated_at: now,
                };
                entry.insert(stored.clone());
                stored
            }
        };
        Ok(stored)
    }

    async fn get(&self, id: &IdeaId) -> Result<Option<StoredIdea>> {
        Ok(self.ideas.get(id).map(|entry| entry.value().clone()))
    }

    async fn list(&self) -> Result<Vec<StoredIdea>> {
        let mut ideas: Vec<StoredIdea> = self
            .ideas
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        ideas.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.idea.id().cmp(b.idea.id()))
        });
        Ok(ideas)
    }

    async fn delete(&self, id: &IdeaId) -> Result<bool> {
        Ok(self.ideas.remove(id).is_some())
    }

    async fn health_check(&self) -> StoreHealth {
        StoreHealth::new(
            HealthStatus::Healthy,
            format!("{} ideas in memory", self.ideas.len()),
        )
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
