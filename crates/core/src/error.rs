use thiserror::Error;

use crate::model::{FeedbackError, FlashcardError, ProgressError, QuestionError};

/// Umbrella error for domain validation failures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Flashcard(#[from] FlashcardError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
}
