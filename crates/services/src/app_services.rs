use std::sync::Arc;

use storage::repository::Storage;
use vedanta_core::Clock;

use crate::content_service::ContentService;
use crate::error::AppServicesError;
use crate::feedback_service::FeedbackService;
use crate::progress_service::ProgressService;
use crate::quiz::QuizLoopService;
use crate::sync::{SyncConfig, SyncService};

/// Assembles the app-facing services over one storage backend.
///
/// Everything is constructed once and handed out as `Arc`s; there is no
/// global mutable state anywhere downstream.
#[derive(Clone)]
pub struct AppServices {
    content: Arc<ContentService>,
    progress: Arc<ProgressService>,
    quiz_loop: Arc<QuizLoopService>,
    sync: Arc<SyncService>,
    feedback: Arc<FeedbackService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(storage, clock, SyncConfig::from_env()))
    }

    /// Build services over an existing storage aggregate.
    #[must_use]
    pub fn with_storage(storage: Storage, clock: Clock, sync_config: SyncConfig) -> Self {
        let content = Arc::new(ContentService::new(
            Arc::clone(&storage.content),
            Arc::clone(&storage.progress),
        ));
        let progress = Arc::new(ProgressService::new(clock, Arc::clone(&storage.progress)));
        let quiz_loop = Arc::new(QuizLoopService::new(
            clock,
            Arc::clone(&content),
            Arc::clone(&progress),
        ));
        let sync = Arc::new(SyncService::new(
            clock,
            sync_config,
            Arc::clone(&storage.content),
            Arc::clone(&storage.sync_log),
        ));
        let feedback = Arc::new(FeedbackService::new(clock, Arc::clone(&storage.feedback)));

        Self {
            content,
            progress,
            quiz_loop,
            sync,
            feedback,
        }
    }

    #[must_use]
    pub fn content(&self) -> Arc<ContentService> {
        Arc::clone(&self.content)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn sync(&self) -> Arc<SyncService> {
        Arc::clone(&self.sync)
    }

    #[must_use]
    pub fn feedback(&self) -> Arc<FeedbackService> {
        Arc::clone(&self.feedback)
    }
}
