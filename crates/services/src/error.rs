//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use vedanta_core::model::{FeedbackError, ProgressError, QuestionId};

/// Errors emitted by the quiz session engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no questions available for this quiz type")]
    NoQuestions,
    #[error("quiz session already completed")]
    AlreadyCompleted,
    #[error("submitted answer targets question {got}, expected {expected}")]
    QuestionMismatch {
        expected: QuestionId,
        got: QuestionId,
    },
    #[error("quiz session is not complete yet")]
    NotComplete,
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
///
/// Storage failures here are advisory: the in-memory aggregate is left
/// untouched and callers surface a transient warning.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ContentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("content not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the CSV sync pipeline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    #[error("all content sources failed for {kind}")]
    AllSourcesFailed { kind: &'static str },
    #[error("source returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("invalid row {line}: {reason}")]
    InvalidRow { line: usize, reason: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `FeedbackService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedbackServiceError {
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the presentation-boundary controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ControllerError {
    #[error("no quiz session in progress")]
    NoActiveQuiz,
    #[error("no flashcard browsing session in progress")]
    NoActiveBrowser,
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
