//! Idea Storage
//!
//! The generation pipeline never persists anything itself; callers hand the
//! ideas it returns to an [`IdeaStore`]. Keys are opaque idea identifiers and
//! every operation touches a single key.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{PoolConfig, SqliteStore};

use std::fmt;
use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{ConfigLoader, StorageBackend, StorageConfig};
use crate::types::{BusinessIdea, IdeaId, Result};

/// Shared store handle for async contexts
pub type SharedStore = Arc<dyn IdeaStore>;

/// A stored idea with its bookkeeping timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredIdea {
    pub idea: BusinessIdea,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreHealth {
    pub status: HealthStatus,
    pub details: String,
}

impl StoreHealth {
    pub fn new(status: HealthStatus, details: impl Into<String>) -> Self {
        Self {
            status,
            details: details.into(),
        }
    }
}

/// Persistence contract for generated ideas
#[async_trait]
pub trait IdeaStore: Send + Sync {
    /// Insert or replace; replacing keeps `created_at` and refreshes `updated_at`
    async fn save(&self, idea: &BusinessIdea) -> Result<StoredIdea>;

    async fn get(&self, id: &IdeaId) -> Result<Option<StoredIdea>>;

    /// All stored ideas, oldest first
    async fn list(&self) -> Result<Vec<StoredIdea>>;

    /// Remove an idea; returns whether it existed
    async fn delete(&self, id: &IdeaId) -> Result<bool>;

    async fn health_check(&self) -> StoreHealth;

    /// Backend name for display
    fn backend(&self) -> &'static str;
}

/// Open the store selected by configuration
pub fn open_store(config: &StorageConfig) -> Result<SharedStore> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StorageBackend::Sqlite => {
            let path = config
                .path
                .clone()
                .unwrap_or_else(ConfigLoader::default_database_path);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            Ok(Arc::new(SqliteStore::open(&path)?))
        }
    }
}
