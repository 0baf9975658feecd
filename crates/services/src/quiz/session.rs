use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

use vedanta_core::model::{
    AnswerOption, AnswerRecord, QuestionId, QuizOutcome, QuizQuestion, QuizResults, QuizType,
};

use super::select::QuizPlan;
use crate::error::QuizError;

//
// ─── PROGRESS VIEW ─────────────────────────────────────────────────────────────
//

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub score: u32,
    pub is_complete: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state machine for one quiz attempt.
///
/// Steps through the selected questions sequentially; every index is
/// answered exactly once, so the score can never double-count.
pub struct QuizSession {
    id: Uuid,
    quiz_type: QuizType,
    questions: Vec<QuizQuestion>,
    current: usize,
    answers: Vec<AnswerRecord>,
    score: u32,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Create a session from a selection plan.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` when the plan is empty; callers
    /// surface this as a "no questions" state rather than crashing.
    pub fn new(
        quiz_type: QuizType,
        plan: QuizPlan,
        started_at: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        if plan.is_empty() {
            return Err(QuizError::NoQuestions);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            quiz_type,
            questions: plan.questions,
            current: 0,
            answers: Vec::new(),
            score: 0,
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn quiz_type(&self) -> QuizType {
        self.quiz_type
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Total number of questions in this session.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Number of questions answered so far.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            total: self.total_questions(),
            answered: self.answered_count(),
            remaining: self.questions.len().saturating_sub(self.current),
            score: self.score,
            is_complete: self.is_complete(),
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current)
    }

    /// Record an answer for the question at the current index.
    ///
    /// `answered_at` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadyCompleted` when the session is terminal
    /// and `QuizError::QuestionMismatch` when `question_id` is not the
    /// question currently awaiting an answer. Neither changes any state,
    /// so a stale double-click cannot double-count.
    pub fn submit(
        &mut self,
        question_id: QuestionId,
        selected: AnswerOption,
        answered_at: DateTime<Utc>,
    ) -> Result<&AnswerRecord, QuizError> {
        let Some(question) = self.current_question() else {
            return Err(QuizError::AlreadyCompleted);
        };
        if question.id() != question_id {
            return Err(QuizError::QuestionMismatch {
                expected: question.id(),
                got: question_id,
            });
        }

        let is_correct = question.is_correct(selected);
        self.answers.push(AnswerRecord {
            question_id,
            selected,
            correct_option: question.correct(),
            is_correct,
            category: question.category().clone(),
        });
        if is_correct {
            self.score = self.score.saturating_add(1);
        }

        self.current += 1;
        if self.current >= self.questions.len() {
            self.completed_at = Some(answered_at);
        }

        self.answers.last().ok_or(QuizError::AlreadyCompleted)
    }

    /// Final summary; only valid once the session is terminal.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotComplete` while questions remain.
    pub fn results(&self) -> Result<QuizResults, QuizError> {
        if !self.is_complete() {
            return Err(QuizError::NotComplete);
        }
        Ok(QuizResults::from_answers(&self.answers))
    }

    /// Outcome event for the progress aggregator; only valid once terminal.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotComplete` while questions remain.
    pub fn outcome(&self) -> Result<QuizOutcome, QuizError> {
        let completed_at = self.completed_at.ok_or(QuizError::NotComplete)?;
        let results = self.results()?;
        Ok(QuizOutcome {
            session_id: self.id,
            quiz_type: self.quiz_type,
            score: results.score(),
            total: results.total(),
            correct: results.score(),
            duration_secs: (completed_at - self.started_at).num_seconds().max(0),
            answers: self.answers.clone(),
            per_category: results.per_category().clone(),
            completed_at,
        })
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("quiz_type", &self.quiz_type)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
