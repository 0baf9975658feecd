use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::model::flashcard::Category;
use crate::model::ids::QuestionId;
use crate::model::question::AnswerOption;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TallyError {
    #[error("correct count ({correct}) exceeds total ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },
}

/// Error type for parsing a quiz type label.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid quiz type: {0}")]
pub struct ParseQuizTypeError(String);

//
// ─── QUIZ TYPE ─────────────────────────────────────────────────────────────────
//

/// The three quiz variants a learner can start.
///
/// Each variant selects questions by category: `Core` draws from
/// "Core Concepts", `Ethics` from "Ethics" and "Practices", and `Mixed`
/// from the whole pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizType {
    Core,
    Ethics,
    Mixed,
}

impl QuizType {
    /// Whether a question of the given category belongs in this quiz.
    #[must_use]
    pub fn admits(self, category: &Category) -> bool {
        match self {
            QuizType::Core => category.as_str() == Category::CORE_CONCEPTS,
            QuizType::Ethics => {
                category.as_str() == Category::ETHICS || category.as_str() == Category::PRACTICES
            }
            QuizType::Mixed => true,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuizType::Core => "core",
            QuizType::Ethics => "ethics",
            QuizType::Mixed => "mixed",
        }
    }
}

impl FromStr for QuizType {
    type Err = ParseQuizTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "core" => Ok(QuizType::Core),
            "ethics" => Ok(QuizType::Ethics),
            "mixed" => Ok(QuizType::Mixed),
            _ => Err(ParseQuizTypeError(s.to_owned())),
        }
    }
}

impl fmt::Display for QuizType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── CATEGORY TALLY ────────────────────────────────────────────────────────────
//

/// Correct/total counter for one category.
///
/// The invariant `correct <= total` holds by construction; persisted
/// counts are re-checked on load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTally {
    correct: u32,
    total: u32,
}

impl CategoryTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrates a tally from persisted counts.
    ///
    /// # Errors
    ///
    /// Returns `TallyError::CorrectExceedsTotal` when the counts are
    /// inconsistent.
    pub fn from_counts(correct: u32, total: u32) -> Result<Self, TallyError> {
        if correct > total {
            return Err(TallyError::CorrectExceedsTotal { correct, total });
        }
        Ok(Self { correct, total })
    }

    /// Counts one answered question.
    pub fn record(&mut self, is_correct: bool) {
        self.total = self.total.saturating_add(1);
        if is_correct {
            self.correct = self.correct.saturating_add(1);
        }
    }

    /// Folds another tally into this one.
    pub fn absorb(&mut self, other: CategoryTally) {
        self.correct = self.correct.saturating_add(other.correct);
        self.total = self.total.saturating_add(other.total);
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Rounded percentage of correct answers; 0 when nothing was counted.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.correct, self.total)
    }
}

/// Rounded percent of `part` in `whole`; 0 when `whole` is 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * f64::from(part) / f64::from(whole)).round() as u32
}

//
// ─── ANSWER RECORD ─────────────────────────────────────────────────────────────
//

/// Record of a single answered question within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub selected: AnswerOption,
    pub correct_option: AnswerOption,
    pub is_correct: bool,
    pub category: Category,
}

//
// ─── QUIZ RESULTS ──────────────────────────────────────────────────────────────
//

/// A Sanskrit quote shown with the result screen, picked by score band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanskritQuote {
    pub quote: &'static str,
    pub translation: &'static str,
}

/// Final summary of a completed quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResults {
    score: u32,
    total: u32,
    per_category: BTreeMap<Category, CategoryTally>,
}

impl QuizResults {
    /// Builds a summary by folding answered questions per category.
    #[must_use]
    pub fn from_answers(answers: &[AnswerRecord]) -> Self {
        let mut per_category: BTreeMap<Category, CategoryTally> = BTreeMap::new();
        let mut score = 0_u32;
        for answer in answers {
            per_category
                .entry(answer.category.clone())
                .or_default()
                .record(answer.is_correct);
            if answer.is_correct {
                score = score.saturating_add(1);
            }
        }
        let total = u32::try_from(answers.len()).unwrap_or(u32::MAX);
        Self {
            score,
            total,
            per_category,
        }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Rounded overall percentage; 0 for an empty session.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total)
    }

    #[must_use]
    pub fn per_category(&self) -> &BTreeMap<Category, CategoryTally> {
        &self.per_category
    }

    /// Encouragement line matching the score band.
    #[must_use]
    pub fn encouragement(&self) -> &'static str {
        match self.percentage() {
            90..=u32::MAX => "Outstanding! You have deep understanding of Vedantic wisdom.",
            80..=89 => "Excellent! You're on the right path of knowledge.",
            70..=79 => "Good work! Continue your learning journey with dedication.",
            60..=69 => "Keep learning! Every step brings you closer to wisdom.",
            _ => "Don't give up! The path of knowledge requires patience and practice.",
        }
    }

    /// Sanskrit quote matching the score band.
    #[must_use]
    pub fn sanskrit_quote(&self) -> SanskritQuote {
        match self.percentage() {
            90..=u32::MAX => SanskritQuote {
                quote: "सत्यमेव जयते",
                translation: "Truth alone triumphs",
            },
            80..=89 => SanskritQuote {
                quote: "तत्त्वमसि",
                translation: "That thou art",
            },
            70..=79 => SanskritQuote {
                quote: "अहं ब्रह्मास्मि",
                translation: "I am Brahman",
            },
            60..=69 => SanskritQuote {
                quote: "वसुधैव कुटुम्बकम्",
                translation: "The world is one family",
            },
            _ => SanskritQuote {
                quote: "योगः कर्मसु कौशलम्",
                translation: "Yoga is skill in action",
            },
        }
    }
}

//
// ─── QUIZ OUTCOME ──────────────────────────────────────────────────────────────
//

/// Event emitted once when a session reaches its terminal state.
///
/// The progress aggregator folds this into the per-user `Progress`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizOutcome {
    pub session_id: Uuid,
    pub quiz_type: QuizType,
    pub score: u32,
    pub total: u32,
    /// Count of correct answers; equals `score` for standard scoring.
    pub correct: u32,
    pub duration_secs: i64,
    pub answers: Vec<AnswerRecord>,
    pub per_category: BTreeMap<Category, CategoryTally>,
    pub completed_at: DateTime<Utc>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(id: u64, category: Category, is_correct: bool) -> AnswerRecord {
        AnswerRecord {
            question_id: QuestionId::new(id),
            selected: AnswerOption::A,
            correct_option: if is_correct {
                AnswerOption::A
            } else {
                AnswerOption::B
            },
            is_correct,
            category,
        }
    }

    #[test]
    fn quiz_type_filters_categories() {
        let core = Category::core_concepts();
        let ethics = Category::ethics();
        let practices = Category::practices();

        assert!(QuizType::Core.admits(&core));
        assert!(!QuizType::Core.admits(&ethics));
        assert!(QuizType::Ethics.admits(&ethics));
        assert!(QuizType::Ethics.admits(&practices));
        assert!(!QuizType::Ethics.admits(&core));
        assert!(QuizType::Mixed.admits(&core));
        assert!(QuizType::Mixed.admits(&practices));
    }

    #[test]
    fn quiz_type_label_round_trips() {
        for quiz_type in [QuizType::Core, QuizType::Ethics, QuizType::Mixed] {
            assert_eq!(quiz_type.as_str().parse::<QuizType>().unwrap(), quiz_type);
        }
        assert!("advanced".parse::<QuizType>().is_err());
    }

    #[test]
    fn tally_rejects_inconsistent_counts() {
        let err = CategoryTally::from_counts(5, 3).unwrap_err();
        assert_eq!(err, TallyError::CorrectExceedsTotal { correct: 5, total: 3 });
    }

    #[test]
    fn tally_records_and_absorbs() {
        let mut tally = CategoryTally::new();
        tally.record(true);
        tally.record(false);
        assert_eq!((tally.correct(), tally.total()), (1, 2));

        tally.absorb(CategoryTally::from_counts(2, 2).unwrap());
        assert_eq!((tally.correct(), tally.total()), (3, 4));
        assert_eq!(tally.percentage(), 75);
    }

    #[test]
    fn results_fold_score_and_categories() {
        let answers = vec![
            answer(1, Category::core_concepts(), true),
            answer(2, Category::core_concepts(), false),
            answer(3, Category::ethics(), true),
        ];
        let results = QuizResults::from_answers(&answers);

        assert_eq!(results.score(), 2);
        assert_eq!(results.total(), 3);
        assert_eq!(results.percentage(), 67);
        assert_eq!(
            results.per_category()[&Category::core_concepts()].total(),
            2
        );
        assert_eq!(results.per_category()[&Category::ethics()].correct(), 1);
    }

    #[test]
    fn six_of_eight_scores_seventy_five() {
        let answers: Vec<_> = (0..8)
            .map(|i| answer(i, Category::core_concepts(), i < 6))
            .collect();
        let results = QuizResults::from_answers(&answers);
        assert_eq!(results.percentage(), 75);
    }

    #[test]
    fn encouragement_bands() {
        let perfect = QuizResults::from_answers(&[answer(1, Category::ethics(), true)]);
        assert!(perfect.encouragement().starts_with("Outstanding"));
        assert_eq!(perfect.sanskrit_quote().translation, "Truth alone triumphs");

        let poor = QuizResults::from_answers(&[answer(1, Category::ethics(), false)]);
        assert!(poor.encouragement().starts_with("Don't give up"));
        assert_eq!(poor.sanskrit_quote().translation, "Yoga is skill in action");
    }

    #[test]
    fn empty_results_are_zeroed() {
        let results = QuizResults::from_answers(&[]);
        assert_eq!(results.score(), 0);
        assert_eq!(results.total(), 0);
        assert_eq!(results.percentage(), 0);
    }
}
