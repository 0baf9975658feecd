use async_trait::async_trait;

use vedanta_core::model::{FeedbackStatus, FeedbackSubmission};

use super::{SqliteRepository, mapping::map_feedback_row};
use crate::repository::{FeedbackRepository, StorageError, StoredFeedback};

#[async_trait]
impl FeedbackRepository for SqliteRepository {
    async fn insert_submission(
        &self,
        submission: &FeedbackSubmission,
    ) -> Result<i64, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO feedback_submissions (
                type, name, email, message, category, donation_willing, status, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(submission.kind.as_str())
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.message)
        .bind(&submission.category)
        .bind(i64::from(submission.donation_willing))
        .bind(submission.status.as_str())
        .bind(submission.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    async fn list_submissions(&self) -> Result<Vec<StoredFeedback>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, type, name, email, message, category, donation_willing, status, created_at
            FROM feedback_submissions
            ORDER BY id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_feedback_row).collect()
    }

    async fn update_submission_status(
        &self,
        id: i64,
        status: FeedbackStatus,
    ) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE feedback_submissions SET status = ?1 WHERE id = ?2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
