use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::flashcard::{Category, Difficulty};
use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors raised while constructing quiz questions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyQuestionText,

    #[error("option {0} cannot be empty")]
    EmptyOption(AnswerOption),

    #[error("explanation cannot be empty")]
    EmptyExplanation,

    #[error("invalid answer option value: {0}")]
    InvalidOption(String),
}

//
// ─── ANSWER OPTION ─────────────────────────────────────────────────────────────
//

/// One of the four multiple-choice slots of a quiz question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnswerOption {
    A,
    B,
    C,
    D,
}

impl AnswerOption {
    /// All options in display order.
    pub const ALL: [AnswerOption; 4] = [
        AnswerOption::A,
        AnswerOption::B,
        AnswerOption::C,
        AnswerOption::D,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerOption::A => "A",
            AnswerOption::B => "B",
            AnswerOption::C => "C",
            AnswerOption::D => "D",
        }
    }

    /// Index into the options array of a question.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            AnswerOption::A => 0,
            AnswerOption::B => 1,
            AnswerOption::C => 2,
            AnswerOption::D => 3,
        }
    }
}

impl FromStr for AnswerOption {
    type Err = QuestionError;

    /// Parses a sheet value such as `"A"` or `"c"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(AnswerOption::A),
            "B" => Ok(AnswerOption::B),
            "C" => Ok(AnswerOption::C),
            "D" => Ok(AnswerOption::D),
            _ => Err(QuestionError::InvalidOption(s.to_owned())),
        }
    }
}

impl fmt::Display for AnswerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── QUIZ QUESTION ─────────────────────────────────────────────────────────────
//

/// A four-option multiple-choice question.
///
/// Immutable once loaded; sessions reference questions by id and never
/// mutate them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    id: QuestionId,
    question_text: String,
    options: [String; 4],
    correct: AnswerOption,
    explanation: String,
    category: Category,
    difficulty: Difficulty,
}

impl QuizQuestion {
    /// Creates a new quiz question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the question text, any option, or the
    /// explanation is empty.
    pub fn new(
        id: QuestionId,
        question_text: impl Into<String>,
        options: [String; 4],
        correct: AnswerOption,
        explanation: impl Into<String>,
        category: Category,
        difficulty: Difficulty,
    ) -> Result<Self, QuestionError> {
        let question_text = question_text.into();
        if question_text.trim().is_empty() {
            return Err(QuestionError::EmptyQuestionText);
        }
        for (slot, text) in AnswerOption::ALL.iter().zip(options.iter()) {
            if text.trim().is_empty() {
                return Err(QuestionError::EmptyOption(*slot));
            }
        }
        let explanation = explanation.into();
        if explanation.trim().is_empty() {
            return Err(QuestionError::EmptyExplanation);
        }

        let options = options.map(|o| o.trim().to_owned());

        Ok(Self {
            id,
            question_text: question_text.trim().to_owned(),
            options,
            correct,
            explanation: explanation.trim().to_owned(),
            category,
            difficulty,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    /// Text of the given option slot.
    #[must_use]
    pub fn option_text(&self, option: AnswerOption) -> &str {
        &self.options[option.index()]
    }

    #[must_use]
    pub fn options(&self) -> &[String; 4] {
        &self.options
    }

    #[must_use]
    pub fn correct(&self) -> AnswerOption {
        self.correct
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn category(&self) -> &Category {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Whether the given selection answers this question correctly.
    #[must_use]
    pub fn is_correct(&self, selected: AnswerOption) -> bool {
        self.correct == selected
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> [String; 4] {
        [
            "Liberation from the cycle of rebirth".into(),
            "Material wealth".into(),
            "Political power".into(),
            "Fame".into(),
        ]
    }

    fn build_question() -> QuizQuestion {
        QuizQuestion::new(
            QuestionId::new(1),
            "What is Moksha?",
            options(),
            AnswerOption::A,
            "Moksha means liberation from samsara.",
            Category::core_concepts(),
            Difficulty::Beginner,
        )
        .unwrap()
    }

    #[test]
    fn question_rejects_empty_text() {
        let err = QuizQuestion::new(
            QuestionId::new(1),
            "  ",
            options(),
            AnswerOption::A,
            "explanation",
            Category::core_concepts(),
            Difficulty::Beginner,
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyQuestionText);
    }

    #[test]
    fn question_rejects_empty_option() {
        let mut opts = options();
        opts[2] = " ".into();
        let err = QuizQuestion::new(
            QuestionId::new(1),
            "What is Moksha?",
            opts,
            AnswerOption::A,
            "explanation",
            Category::core_concepts(),
            Difficulty::Beginner,
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyOption(AnswerOption::C));
    }

    #[test]
    fn option_parse_accepts_lowercase() {
        assert_eq!("a".parse::<AnswerOption>().unwrap(), AnswerOption::A);
        assert_eq!(" d ".parse::<AnswerOption>().unwrap(), AnswerOption::D);
        assert!("E".parse::<AnswerOption>().is_err());
    }

    #[test]
    fn option_text_follows_slot() {
        let q = build_question();
        assert_eq!(q.option_text(AnswerOption::B), "Material wealth");
    }

    #[test]
    fn is_correct_matches_correct_slot() {
        let q = build_question();
        assert!(q.is_correct(AnswerOption::A));
        assert!(!q.is_correct(AnswerOption::D));
    }
}
