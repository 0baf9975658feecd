use async_trait::async_trait;

use super::{SqliteRepository, mapping::map_sync_log_row};
use crate::repository::{StorageError, SyncLogEntry, SyncLogRepository};

#[async_trait]
impl SyncLogRepository for SqliteRepository {
    async fn append_sync_log(&self, entry: &SyncLogEntry) -> Result<i64, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO sync_log (sync_type, status, message, sync_date)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(&entry.sync_type)
        .bind(&entry.status)
        .bind(&entry.message)
        .bind(entry.synced_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    async fn recent_sync_logs(&self, limit: u32) -> Result<Vec<SyncLogEntry>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT sync_type, status, message, sync_date
            FROM sync_log
            ORDER BY sync_date DESC, id DESC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_sync_log_row).collect()
    }
}
