use rand::rng;
use rand::seq::SliceRandom;

use vedanta_core::model::{QuizQuestion, QuizType};

/// Upper bound on questions per session.
pub const MAX_QUESTIONS_PER_QUIZ: usize = 10;

/// Selection result for a quiz build.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizPlan {
    pub questions: Vec<QuizQuestion>,
    /// Size of the pool after the quiz-type filter, before truncation.
    pub filtered_pool: usize,
}

impl QuizPlan {
    /// Returns true when no questions matched the quiz type.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Builds a quiz by filtering the pool by quiz type, shuffling uniformly,
/// and truncating to the session cap.
pub struct QuizBuilder {
    quiz_type: QuizType,
}

impl QuizBuilder {
    #[must_use]
    pub fn new(quiz_type: QuizType) -> Self {
        Self { quiz_type }
    }

    /// Build a plan from the given question pool.
    ///
    /// The shuffle is a uniform permutation of the filtered pool, so the
    /// selected subset is drawn without replacement.
    pub fn build(self, pool: impl IntoIterator<Item = QuizQuestion>) -> QuizPlan {
        let mut filtered: Vec<QuizQuestion> = pool
            .into_iter()
            .filter(|question| self.quiz_type.admits(question.category()))
            .collect();
        let filtered_pool = filtered.len();

        let mut rng = rng();
        filtered.as_mut_slice().shuffle(&mut rng);
        filtered.truncate(MAX_QUESTIONS_PER_QUIZ);

        QuizPlan {
            questions: filtered,
            filtered_pool,
        }
    }
}
