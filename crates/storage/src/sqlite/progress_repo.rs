use async_trait::async_trait;
use sqlx::Row;

use vedanta_core::model::UserName;

use super::SqliteRepository;
use crate::repository::{ProgressRecord, ProgressRepository, StorageError};

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(
        &self,
        user: &UserName,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_name, session_data, last_updated
            FROM user_progress
            WHERE user_name = ?1
            ",
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(ProgressRecord {
            user_name: row
                .try_get("user_name")
                .map_err(|e| StorageError::Serialization(e.to_string()))?,
            blob: row
                .try_get("session_data")
                .map_err(|e| StorageError::Serialization(e.to_string()))?,
            last_updated: row
                .try_get("last_updated")
                .map_err(|e| StorageError::Serialization(e.to_string()))?,
        }))
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_progress (user_name, session_data, last_updated)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_name) DO UPDATE SET
                session_data = excluded.session_data,
                last_updated = excluded.last_updated
            ",
        )
        .bind(&record.user_name)
        .bind(&record.blob)
        .bind(record.last_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn count_users(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM user_progress")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let count: i64 = row
            .try_get("count")
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
