use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::model::ids::CardId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FlashcardError {
    #[error("sanskrit term cannot be empty")]
    EmptySanskritTerm,

    #[error("english term cannot be empty")]
    EmptyEnglishTerm,

    #[error("meaning cannot be empty")]
    EmptyMeaning,

    #[error("category cannot be empty")]
    EmptyCategory,

    #[error("invalid difficulty value: {0}")]
    InvalidDifficulty(String),
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Topic grouping for flashcards and quiz questions.
///
/// The content sheets define an open set of categories; the three the
/// seed content ships with are exposed as constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub const CORE_CONCEPTS: &'static str = "Core Concepts";
    pub const ETHICS: &'static str = "Ethics";
    pub const PRACTICES: &'static str = "Practices";

    /// Creates a category from a raw sheet value.
    ///
    /// # Errors
    ///
    /// Returns `FlashcardError::EmptyCategory` if the value is empty or
    /// whitespace-only.
    pub fn new(name: impl Into<String>) -> Result<Self, FlashcardError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(FlashcardError::EmptyCategory);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn core_concepts() -> Self {
        Self(Self::CORE_CONCEPTS.to_owned())
    }

    #[must_use]
    pub fn ethics() -> Self {
        Self(Self::ETHICS.to_owned())
    }

    #[must_use]
    pub fn practices() -> Self {
        Self(Self::PRACTICES.to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Three-level difficulty rating carried by every card and question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl FromStr for Difficulty {
    type Err = FlashcardError;

    /// Parses a sheet value, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            _ => Err(FlashcardError::InvalidDifficulty(s.to_owned())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── FLASHCARD ─────────────────────────────────────────────────────────────────
//

/// A single Sanskrit term with its translation and meaning.
///
/// Cards are immutable once loaded; filtering and ordering happen on
/// read-only views of the deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    id: CardId,
    sanskrit_term: String,
    english_term: String,
    meaning: String,
    category: Category,
    difficulty: Difficulty,
    image_url: Option<Url>,
}

impl Flashcard {
    /// Creates a new flashcard.
    ///
    /// # Errors
    ///
    /// Returns `FlashcardError` if any of the term or meaning fields is
    /// empty or whitespace-only.
    pub fn new(
        id: CardId,
        sanskrit_term: impl Into<String>,
        english_term: impl Into<String>,
        meaning: impl Into<String>,
        category: Category,
        difficulty: Difficulty,
        image_url: Option<Url>,
    ) -> Result<Self, FlashcardError> {
        let sanskrit_term = sanskrit_term.into();
        if sanskrit_term.trim().is_empty() {
            return Err(FlashcardError::EmptySanskritTerm);
        }
        let english_term = english_term.into();
        if english_term.trim().is_empty() {
            return Err(FlashcardError::EmptyEnglishTerm);
        }
        let meaning = meaning.into();
        if meaning.trim().is_empty() {
            return Err(FlashcardError::EmptyMeaning);
        }

        Ok(Self {
            id,
            sanskrit_term: sanskrit_term.trim().to_owned(),
            english_term: english_term.trim().to_owned(),
            meaning: meaning.trim().to_owned(),
            category,
            difficulty,
            image_url,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    #[must_use]
    pub fn sanskrit_term(&self) -> &str {
        &self.sanskrit_term
    }

    #[must_use]
    pub fn english_term(&self) -> &str {
        &self.english_term
    }

    #[must_use]
    pub fn meaning(&self) -> &str {
        &self.meaning
    }

    #[must_use]
    pub fn category(&self) -> &Category {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&Url> {
        self.image_url.as_ref()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
