//! Topic repository: persistence of topic name → forum thread id mappings.
//!
//! Uses SqlitePoolManager and the TopicMapping model.
//! External: SQLite via sqlx; callers use find/upsert/list.

use crate::error::StorageError;
use crate::models::TopicMapping;
use crate::sqlite_pool::SqlitePoolManager;
use tracing::{debug, info};

#[derive(Clone)]
pub struct TopicRepository {
    pool_manager: SqlitePoolManager,
}

impl TopicRepository {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating topic_mappings table if not exists");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS topic_mappings (
                topic_name TEXT PRIMARY KEY,
                topic_id INTEGER
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;

        Ok(())
    }

    /// Returns the stored thread id for the exact (case-sensitive) topic name.
    /// A row whose `topic_id` is NULL counts as absent.
    pub async fn find(&self, topic_name: &str) -> Result<Option<i64>, StorageError> {
        let row: Option<(Option<i64>,)> =
            sqlx::query_as("SELECT topic_id FROM topic_mappings WHERE topic_name = ?")
                .bind(topic_name)
                .fetch_optional(self.pool_manager.pool())
                .await?;
        let topic_id = row.and_then(|r| r.0);

        debug!(topic_name = %topic_name, found = topic_id.is_some(), "Looked up topic mapping");
        Ok(topic_id)
    }

    /// Creates or replaces the mapping for `topic_name`.
    pub async fn upsert(&self, topic_name: &str, topic_id: i64) -> Result<(), StorageError> {
        sqlx::query("INSERT OR REPLACE INTO topic_mappings (topic_name, topic_id) VALUES (?, ?)")
            .bind(topic_name)
            .bind(topic_id)
            .execute(self.pool_manager.pool())
            .await?;

        info!(topic_name = %topic_name, topic_id = topic_id, "Saved topic mapping");
        Ok(())
    }

    /// All mappings ordered by topic name.
    pub async fn list(&self) -> Result<Vec<TopicMapping>, StorageError> {
        let rows = sqlx::query_as::<_, TopicMapping>(
            "SELECT topic_name, topic_id FROM topic_mappings \
             WHERE topic_id IS NOT NULL ORDER BY topic_name",
        )
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64, StorageError> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM topic_mappings")
            .fetch_one(self.pool_manager.pool())
            .await?;
        Ok(total.0)
    }

    /// Closes the underlying pool. Every clone of this repository shares the pool.
    pub async fn close(&self) {
        self.pool_manager.close().await;
    }
}
