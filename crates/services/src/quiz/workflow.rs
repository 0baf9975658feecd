use std::sync::Arc;

use tracing::warn;

use storage::repository::ContentFilter;
use vedanta_core::Clock;
use vedanta_core::model::{
    AnswerOption, AnswerRecord, Progress, QuestionId, QuizResults, QuizType,
};

use super::select::QuizBuilder;
use super::session::QuizSession;
use crate::content_service::ContentService;
use crate::error::QuizError;
use crate::progress_service::ProgressService;

/// Result of answering a single question in a session.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizAnswerResult {
    pub answer: AnswerRecord,
    /// Explanation for the answered question, for the feedback panel.
    pub explanation: String,
    pub is_complete: bool,
    /// Present once the session reached its terminal state.
    pub results: Option<QuizResults>,
}

/// Orchestrates quiz start and answering against content and progress.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    content: Arc<ContentService>,
    progress: Arc<ProgressService>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, content: Arc<ContentService>, progress: Arc<ProgressService>) -> Self {
        Self {
            clock,
            content,
            progress,
        }
    }

    /// Start a new quiz of the given type.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` when the filtered pool is empty
    /// and `QuizError::Content` for content access failures.
    pub async fn start_quiz(&self, quiz_type: QuizType) -> Result<QuizSession, QuizError> {
        let pool = self.content.list_questions(&ContentFilter::any()).await?;
        let plan = QuizBuilder::new(quiz_type).build(pool);
        QuizSession::new(quiz_type, plan, self.clock.now())
    }

    /// Answer the current question; folds the outcome into progress when
    /// the session completes.
    ///
    /// # Errors
    ///
    /// Propagates session validation errors (`QuestionMismatch`,
    /// `AlreadyCompleted`). Progress persistence is best-effort and never
    /// fails the submission.
    pub async fn submit_answer(
        &self,
        session: &mut QuizSession,
        question_id: QuestionId,
        selected: AnswerOption,
        progress: &mut Progress,
    ) -> Result<QuizAnswerResult, QuizError> {
        let answered_at = self.clock.now();
        let explanation = session
            .current_question()
            .map(|q| q.explanation().to_owned())
            .unwrap_or_default();
        let answer = session.submit(question_id, selected, answered_at)?.clone();

        let mut results = None;
        if session.is_complete() {
            let outcome = session.outcome()?;
            if let Err(err) = self.progress.apply_quiz_outcome(progress, &outcome).await {
                // Session scoring guarantees score <= total, so this only
                // fires on an aggregate bug; the quiz result itself stands.
                warn!(session = %session.id(), %err, "failed to fold quiz outcome into progress");
            }
            results = Some(session.results()?);
        }

        Ok(QuizAnswerResult {
            answer,
            explanation,
            is_complete: session.is_complete(),
            results,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
