//! SQLite Idea Store with Connection Pooling
//!
//! - Connection pooling via r2d2 for concurrent access
//! - WAL mode for concurrent readers alongside a writer
//! - One row per idea; the idea itself is stored as JSON and re-validated
//!   when read back
//!
//! Blocking SQLite calls run on the tokio blocking pool.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, params};

use super::{HealthStatus, IdeaStore, StoreHealth, StoredIdea};
use crate::types::{BusinessIdea, IdeaId, PlanError, Result, ResultExt};

const SCHEMA: &str = include_str!("schema.sql");

/// Current schema version, recorded in `user_version`
const SCHEMA_VERSION: u32 = 1;

const UPSERT_IDEA: &str = r#"
    INSERT INTO ideas (id, title, category, market_risk, data, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
    ON CONFLICT(id) DO UPDATE SET
        title = excluded.title,
        category = excluded.category,
        market_risk = excluded.market_risk,
        data = excluded.data,
        updated_at = excluded.updated_at
    RETURNING created_at, updated_at
"#;

/// (data, created_at, updated_at)
type IdeaRow = (String, String, String);

/// Connection pool configuration
///
/// Pool size is calculated from CPU cores.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool
    pub max_size: u32,
    /// Minimum idle connections to keep ready
    pub min_idle: u32,
    /// Timeout for acquiring a connection (seconds)
    pub connection_timeout_secs: u64,
}

impl PoolConfig {
    const MIN_POOL_SIZE: u32 = 2;
    const MAX_POOL_SIZE: u32 = 16;

    /// clamp(cores * 2, MIN, MAX)
    pub fn optimal_pool_size() -> u32 {
        let cores = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);
        (cores * 2).clamp(Self::MIN_POOL_SIZE, Self::MAX_POOL_SIZE)
    }

    pub fn auto() -> Self {
        let max_size = Self::optimal_pool_size();
        Self {
            max_size,
            min_idle: (max_size / 4).max(1),
            connection_timeout_secs: 30,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::auto()
    }
}

/// Durable store backed by a single SQLite file
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, PoolConfig::default())
    }

    pub fn open_with_config<P: AsRef<Path>>(path: P, config: PoolConfig) -> Result<Self> {
        let manager =
            SqliteConnectionManager::file(path.as_ref()).with_init(Self::configure_connection);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(config.min_idle))
            .connection_timeout(Duration::from_secs(config.connection_timeout_secs))
            .build(manager)
            .map_err(|e| PlanError::Storage(format!("Failed to create connection pool: {}", e)))?;

        let store = Self { pool };
        store.initialize()?;
        Ok(store)
    }

    fn configure_connection(conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            PRAGMA wal_autocheckpoint = 1000;
            "#,
        )?;
        Ok(())
    }

    fn initialize(&self) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire database connection: {}", e)))?;

        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);
        if version > SCHEMA_VERSION {
            return Err(PlanError::Storage(format!(
                "Database schema version {} is newer than supported version {}",
                version, SCHEMA_VERSION
            )));
        }

        conn.execute_batch(SCHEMA)
            .with_context("Failed to initialize database schema")?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .with_context("Failed to set schema version")?;
        Ok(())
    }

    /// Run `f` with a pooled connection on the blocking pool
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| {
                PlanError::Storage(format!("Failed to acquire database connection: {}", e))
            })?;
            f(&conn)
        })
        .await
        .map_err(|e| PlanError::Storage(format!("Storage task failed: {}", e)))?
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .with_context_fn(|| format!("Invalid timestamp '{}'", value))
}

fn row_to_stored((data, created_at, updated_at): IdeaRow) -> Result<StoredIdea> {
    let idea: BusinessIdea =
        serde_json::from_str(&data).with_context("Stored idea does not match the schema")?;
    Ok(StoredIdea {
        idea,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[async_trait]
impl IdeaStore for SqliteStore {
    async fn save(&self, idea: &BusinessIdea) -> Result<StoredIdea> {
        let data = serde_json::to_string(idea)?;
        let id = idea.id().to_string();
        let title = idea.title().to_string();
        let category = idea.category().as_str();
        let market_risk = idea.market_risk().as_str();
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let (created_at, updated_at) = self
            .with_conn(move |conn| {
                conn.query_row(
                    UPSERT_IDEA,
                    params![id, title, category, market_risk, data, now],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                )
                .with_context("Failed to save idea")
            })
            .await?;

        tracing::debug!("Saved idea: id={}", idea.id());

        Ok(StoredIdea {
            idea: idea.clone(),
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }

    async fn get(&self, id: &IdeaId) -> Result<Option<StoredIdea>> {
        let id = id.to_string();
        let row: Option<IdeaRow> = self
            .with_conn(move |conn| {
                conn.query_row(
                    "SELECT data, created_at, updated_at FROM ideas WHERE id = ?1",
                    params![id],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()
                .with_context("Failed to load idea")
            })
            .await?;

        row.map(row_to_stored).transpose()
    }

    async fn list(&self) -> Result<Vec<StoredIdea>> {
        let rows: Vec<IdeaRow> = self
            .with_conn(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT data, created_at, updated_at FROM ideas ORDER BY created_at, id",
                )?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
                    .collect::<std::result::Result<Vec<IdeaRow>, _>>()?;
                Ok(rows)
            })
            .await?;

        rows.into_iter().map(row_to_stored).collect()
    }

    async fn delete(&self, id: &IdeaId) -> Result<bool> {
        let id = id.to_string();
        let removed = self
            .with_conn(move |conn| {
                conn.execute("DELETE FROM ideas WHERE id = ?1", params![id])
                    .with_context("Failed to delete idea")
            })
            .await?;
        Ok(removed > 0)
    }

    async fn health_check(&self) -> StoreHealth {
        let state = self.pool.state();
        let count = self
            .with_conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM ideas", [], |row| row.get::<_, i64>(0))
                    .with_context("Failed to count ideas")
            })
            .await;

        match count {
            Ok(count) if state.connections > 0 => StoreHealth::new(
                HealthStatus::Healthy,
                format!(
                    "{} ideas stored; {}/{} connections idle",
                    count, state.idle_connections, state.connections
                ),
            ),
            Ok(count) => StoreHealth::new(
                HealthStatus::Degraded,
                format!("{} ideas stored; connection pool is empty", count),
            ),
            Err(e) => StoreHealth::new(HealthStatus::Unhealthy, e.to_string()),
        }
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::idea::fixtures::{sample_idea, sample_parts};
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> SqliteStore {
        SqliteStore::open(dir.path().join("ideas.db")).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let idea = sample_idea("idea-1");

        let saved = store.save(&idea).await.unwrap();
        assert_eq!(saved.created_at, saved.updated_at);

        let loaded = store.get(idea.id()).await.unwrap().unwrap();
        assert_eq!(loaded.idea, idea);
        assert_eq!(loaded.created_at, saved.created_at);

        assert!(store.get(&IdeaId::from("missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_keeps_created_at() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        let first = store.save(&sample_idea("idea-1")).await.unwrap();

        let mut parts = sample_parts();
        parts.title = "Renamed Bakery".to_string();
        let renamed = BusinessIdea::new(IdeaId::from("idea-1"), parts).unwrap();
        let second = store.save(&renamed).await.unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].idea.title(), "Renamed Bakery");
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let idea = sample_idea("idea-1");

        store.save(&idea).await.unwrap();
        assert!(store.delete(idea.id()).await.unwrap());
        assert!(!store.delete(idea.id()).await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = open(&dir);
            store.save(&sample_idea("a")).await.unwrap();
            store.save(&sample_idea("b")).await.unwrap();
        }

        let store = open(&dir);
        let ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.idea.id().to_string())
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"a".to_string()));
        assert!(ids.contains(&"b".to_string()));
    }

    #[tokio::test]
    async fn test_corrupt_row_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store.save(&sample_idea("idea-1")).await.unwrap();

        store
            .with_conn(|conn| {
                conn.execute(
                    "UPDATE ideas SET data = json_set(data, '$.initialBudget.min', 99999) WHERE id = 'idea-1'",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        assert!(store.get(&IdeaId::from("idea-1")).await.is_err());
    }

    #[tokio::test]
    async fn test_health_check() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store.save(&sample_idea("idea-1")).await.unwrap();

        let health = store.health_check().await;
        assert_eq!(health.status, HealthStatus::Healthy);
        assert!(health.details.starts_with("1 ideas stored"));
    }
}
