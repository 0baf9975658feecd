use std::sync::Arc;

use tracing::info;

use storage::repository::{FeedbackRepository, StoredFeedback};
use vedanta_core::Clock;
use vedanta_core::model::{FeedbackDraft, FeedbackStatus};

use crate::error::FeedbackServiceError;

/// Intake and triage for learner feedback submissions.
pub struct FeedbackService {
    clock: Clock,
    repo: Arc<dyn FeedbackRepository>,
}

impl FeedbackService {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn FeedbackRepository>) -> Self {
        Self { clock, repo }
    }

    /// Validate and store a submission; returns its id.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackServiceError::Feedback` for invalid drafts and
    /// `FeedbackServiceError::Storage` when the insert fails.
    pub async fn submit(&self, draft: FeedbackDraft) -> Result<i64, FeedbackServiceError> {
        let submission = draft.validate(self.clock.now())?;
        let id = self.repo.insert_submission(&submission).await?;
        info!(
            id,
            kind = submission.kind.as_str(),
            from = %submission.name,
            "feedback submission received"
        );
        Ok(id)
    }

    /// All submissions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackServiceError::Storage` on repository failure.
    pub async fn list(&self) -> Result<Vec<StoredFeedback>, FeedbackServiceError> {
        Ok(self.repo.list_submissions().await?)
    }

    /// Move a submission through the review workflow.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackServiceError::Storage` with `NotFound` inside
    /// when the id is unknown.
    pub async fn set_status(
        &self,
        id: i64,
        status: FeedbackStatus,
    ) -> Result<(), FeedbackServiceError> {
        self.repo.update_submission_status(id, status).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::{InMemoryRepository, StorageError};
    use vedanta_core::model::{FeedbackError, FeedbackKind};
    use vedanta_core::time::fixed_clock;

    fn build_service() -> FeedbackService {
        FeedbackService::new(fixed_clock(), Arc::new(InMemoryRepository::new()))
    }

    fn draft() -> FeedbackDraft {
        FeedbackDraft {
            kind: FeedbackKind::Suggestion,
            name: "Kavi".into(),
            email: "kavi@example.org".into(),
            message: "More intermediate cards, please.".into(),
            category: Some("content".into()),
            donation_willing: false,
        }
    }

    #[tokio::test]
    async fn submit_then_review() {
        let service = build_service();
        let id = service.submit(draft()).await.unwrap();
        service.set_status(id, FeedbackStatus::Reviewed).await.unwrap();

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].submission.status, FeedbackStatus::Reviewed);
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_before_storage() {
        let service = build_service();
        let mut bad = draft();
        bad.email = "not-an-email".into();

        let err = service.submit(bad).await.unwrap_err();
        assert!(matches!(
            err,
            FeedbackServiceError::Feedback(FeedbackError::InvalidEmail(_))
        ));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let service = build_service();
        let err = service
            .set_status(42, FeedbackStatus::Resolved)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FeedbackServiceError::Storage(StorageError::NotFound)
        ));
    }
}
