use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

use crate::model::flashcard::Category;
use crate::model::ids::CardId;
use crate::model::quiz::{CategoryTally, QuizOutcome, QuizType, TallyError, percentage};
use crate::time::utc_day;

/// Current schema version of the persisted progress blob.
pub const PROGRESS_SCHEMA_VERSION: u32 = 1;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("user name cannot be empty")]
    EmptyUserName,

    #[error("unsupported progress schema version: {found}")]
    UnsupportedVersion { found: u32 },

    #[error("quiz score ({score}) exceeds total ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },

    #[error(transparent)]
    InvalidTally(#[from] TallyError),
}

//
// ─── USER NAME ─────────────────────────────────────────────────────────────────
//

/// Validated key identifying one learner's progress record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    /// Creates a user name from raw input.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::EmptyUserName` if the name is empty or
    /// whitespace-only.
    pub fn new(name: impl Into<String>) -> Result<Self, ProgressError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ProgressError::EmptyUserName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── QUIZ SCORE ENTRY ──────────────────────────────────────────────────────────
//

/// One completed quiz in the append-only score history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuizScoreEntry {
    pub score: u32,
    pub total: u32,
    pub quiz_type: QuizType,
    pub date: DateTime<Utc>,
}

impl QuizScoreEntry {
    /// Rounded percentage for this quiz; 0 for an empty quiz.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total)
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.score == self.total
    }
}

//
// ─── LOGIN CHECK ───────────────────────────────────────────────────────────────
//

/// Outcome of a streak evaluation on activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginCheck {
    /// Already logged in on this UTC day; streak unchanged.
    SameDay,
    /// Last login was the previous UTC day; streak extended.
    ConsecutiveDay,
    /// A day was missed (or the clock moved backwards); streak restarts at 1.
    Broken,
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// Cumulative per-user learning record.
///
/// All mutation happens through the event-fold methods below; counters
/// only ever grow, sets deduplicate on insert, and the category tallies
/// keep `correct <= total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    version: u32,
    user: UserName,
    total_sessions: u32,
    quiz_scores: Vec<QuizScoreEntry>,
    concepts_learned: BTreeSet<CardId>,
    bookmarked_cards: BTreeSet<CardId>,
    category_progress: BTreeMap<Category, CategoryTally>,
    streak: u32,
    time_spent_minutes: u64,
    last_login: DateTime<Utc>,
}

impl Progress {
    /// Fresh progress for a new learner, with the three canonical
    /// categories pre-seeded at zero.
    #[must_use]
    pub fn new(user: UserName, now: DateTime<Utc>) -> Self {
        let mut category_progress = BTreeMap::new();
        for category in [
            Category::core_concepts(),
            Category::ethics(),
            Category::practices(),
        ] {
            category_progress.insert(category, CategoryTally::new());
        }
        Self {
            version: PROGRESS_SCHEMA_VERSION,
            user,
            total_sessions: 0,
            quiz_scores: Vec::new(),
            concepts_learned: BTreeSet::new(),
            bookmarked_cards: BTreeSet::new(),
            category_progress,
            streak: 0,
            time_spent_minutes: 0,
            last_login: now,
        }
    }

    /// Re-checks invariants a deserialized blob may have violated.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` for an unsupported schema version, a quiz
    /// score entry with `score > total`, or an inconsistent tally.
    pub fn validate(self) -> Result<Self, ProgressError> {
        if self.version != PROGRESS_SCHEMA_VERSION {
            return Err(ProgressError::UnsupportedVersion {
                found: self.version,
            });
        }
        for entry in &self.quiz_scores {
            if entry.score > entry.total {
                return Err(ProgressError::ScoreExceedsTotal {
                    score: entry.score,
                    total: entry.total,
                });
            }
        }
        for tally in self.category_progress.values() {
            CategoryTally::from_counts(tally.correct(), tally.total())?;
        }
        Ok(self)
    }

    // ─── Event folds ───────────────────────────────────────────────────────────

    /// A learning session (flashcards or quiz) was started.
    pub fn record_session_start(&mut self) {
        self.total_sessions = self.total_sessions.saturating_add(1);
    }

    /// Folds a completed quiz into the score history and category tallies.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::ScoreExceedsTotal` when the outcome counts
    /// are inconsistent. The aggregate is left unchanged on error.
    pub fn record_quiz_completed(&mut self, outcome: &QuizOutcome) -> Result<(), ProgressError> {
        if outcome.score > outcome.total {
            return Err(ProgressError::ScoreExceedsTotal {
                score: outcome.score,
                total: outcome.total,
            });
        }
        self.quiz_scores.push(QuizScoreEntry {
            score: outcome.score,
            total: outcome.total,
            quiz_type: outcome.quiz_type,
            date: outcome.completed_at,
        });
        for (category, tally) in &outcome.per_category {
            self.category_progress
                .entry(category.clone())
                .or_default()
                .absorb(*tally);
        }
        Ok(())
    }

    /// Marks a concept as learned. Returns true when newly learned.
    pub fn record_concept_learned(&mut self, concept: CardId) -> bool {
        self.concepts_learned.insert(concept)
    }

    /// Toggles a bookmark. Returns true when the card is now bookmarked.
    pub fn toggle_bookmark(&mut self, card: CardId) -> bool {
        if self.bookmarked_cards.remove(&card) {
            false
        } else {
            self.bookmarked_cards.insert(card);
            true
        }
    }

    /// Adds study time in whole minutes.
    pub fn record_time_spent(&mut self, minutes: u32) {
        self.time_spent_minutes = self.time_spent_minutes.saturating_add(u64::from(minutes));
    }

    /// Evaluates the streak state machine for an activation at `now`.
    ///
    /// Compares UTC calendar days: a same-day login leaves the streak
    /// alone, the day after the last login extends it, anything else
    /// restarts it at 1. The last-login timestamp always moves to `now`.
    pub fn check_login(&mut self, now: DateTime<Utc>) -> LoginCheck {
        let last = utc_day(self.last_login);
        let today = utc_day(now);

        let result = if today == last {
            LoginCheck::SameDay
        } else if last.succ_opt() == Some(today) {
            self.streak = self.streak.saturating_add(1);
            LoginCheck::ConsecutiveDay
        } else {
            self.streak = 1;
            LoginCheck::Broken
        };

        self.last_login = now;
        result
    }

    /// Refreshes the last-login timestamp; called on every save.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_login = now;
    }

    // ─── Derived metrics ───────────────────────────────────────────────────────

    /// Rounded mean of the per-quiz percentages; 0 with no quizzes.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn average_score(&self) -> u32 {
        if self.quiz_scores.is_empty() {
            return 0;
        }
        let sum: f64 = self
            .quiz_scores
            .iter()
            .map(|entry| 100.0 * f64::from(entry.score) / f64::from(entry.total.max(1)))
            .sum();
        (sum / self.quiz_scores.len() as f64).round() as u32
    }

    /// Best single-quiz percentage; 0 with no quizzes.
    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.quiz_scores
            .iter()
            .map(QuizScoreEntry::percentage)
            .max()
            .unwrap_or(0)
    }

    /// Whether any quiz was answered flawlessly.
    #[must_use]
    pub fn has_perfect_score(&self) -> bool {
        self.quiz_scores.iter().any(QuizScoreEntry::is_perfect)
    }

    // ─── Accessors ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn user(&self) -> &UserName {
        &self.user
    }

    #[must_use]
    pub fn total_sessions(&self) -> u32 {
        self.total_sessions
    }

    #[must_use]
    pub fn quiz_scores(&self) -> &[QuizScoreEntry] {
        &self.quiz_scores
    }

    #[must_use]
    pub fn concepts_learned(&self) -> &BTreeSet<CardId> {
        &self.concepts_learned
    }

    #[must_use]
    pub fn bookmarked_cards(&self) -> &BTreeSet<CardId> {
        &self.bookmarked_cards
    }

    #[must_use]
    pub fn is_bookmarked(&self, card: CardId) -> bool {
        self.bookmarked_cards.contains(&card)
    }

    #[must_use]
    pub fn category_progress(&self) -> &BTreeMap<Category, CategoryTally> {
        &self.category_progress
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn time_spent_minutes(&self) -> u64 {
        self.time_spent_minutes
    }

    #[must_use]
    pub fn last_login(&self) -> DateTime<Utc> {
        self.last_login
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn build_progress() -> Progress {
        Progress::new(UserName::new("Arjuna").unwrap(), fixed_now())
    }

    fn outcome(score: u32, total: u32) -> QuizOutcome {
        let mut per_category = BTreeMap::new();
        per_category.insert(
            Category::core_concepts(),
            CategoryTally::from_counts(score.min(total), total).unwrap(),
        );
        QuizOutcome {
            session_id: Uuid::nil(),
            quiz_type: QuizType::Core,
            score,
            total,
            correct: score,
            duration_secs: 60,
            answers: Vec::new(),
            per_category,
            completed_at: fixed_now(),
        }
    }

    #[test]
    fn user_name_rejects_empty() {
        assert_eq!(
            UserName::new("   ").unwrap_err(),
            ProgressError::EmptyUserName
        );
        assert_eq!(UserName::new("  Mira  ").unwrap().as_str(), "Mira");
    }

    #[test]
    fn new_progress_seeds_canonical_categories() {
        let progress = build_progress();
        assert_eq!(progress.category_progress().len(), 3);
        assert_eq!(
            progress.category_progress()[&Category::ethics()].total(),
            0
        );
    }

    #[test]
    fn quiz_completion_appends_and_accumulates() {
        let mut progress = build_progress();
        progress.record_quiz_completed(&outcome(5, 5)).unwrap();
        progress.record_quiz_completed(&outcome(3, 10)).unwrap();

        assert_eq!(progress.quiz_scores().len(), 2);
        let tally = progress.category_progress()[&Category::core_concepts()];
        assert_eq!((tally.correct(), tally.total()), (8, 15));
        assert!(tally.correct() <= tally.total());
    }

    #[test]
    fn inconsistent_outcome_is_rejected_without_state_change() {
        let mut progress = build_progress();
        let err = progress.record_quiz_completed(&outcome(7, 5)).unwrap_err();
        assert_eq!(err, ProgressError::ScoreExceedsTotal { score: 7, total: 5 });
        assert!(progress.quiz_scores().is_empty());
    }

    #[test]
    fn average_score_rounds_mean_of_percentages() {
        let mut progress = build_progress();
        progress.record_quiz_completed(&outcome(5, 5)).unwrap();
        progress.record_quiz_completed(&outcome(3, 10)).unwrap();
        // mean(100, 30) = 65
        assert_eq!(progress.average_score(), 65);
    }

    #[test]
    fn best_score_picks_max_ratio() {
        let mut progress = build_progress();
        assert_eq!(progress.best_score(), 0);
        progress.record_quiz_completed(&outcome(3, 10)).unwrap();
        progress.record_quiz_completed(&outcome(4, 5)).unwrap();
        assert_eq!(progress.best_score(), 80);
    }

    #[test]
    fn concept_learning_deduplicates() {
        let mut progress = build_progress();
        assert!(progress.record_concept_learned(CardId::new(7)));
        assert!(!progress.record_concept_learned(CardId::new(7)));
        assert_eq!(progress.concepts_learned().len(), 1);
    }

    #[test]
    fn bookmark_toggle_is_its_own_inverse() {
        let mut progress = build_progress();
        let card = CardId::new(3);
        assert!(progress.toggle_bookmark(card));
        assert!(progress.is_bookmarked(card));
        assert!(!progress.toggle_bookmark(card));
        assert!(!progress.is_bookmarked(card));
    }

    #[test]
    fn streak_same_day_is_noop() {
        // The fixed timestamp is 22:13 UTC, so stay under the day boundary.
        let mut progress = build_progress();
        let now = fixed_now() + Duration::minutes(30);
        assert_eq!(progress.check_login(now), LoginCheck::SameDay);
        assert_eq!(progress.streak(), 0);
        assert_eq!(progress.last_login(), now);
    }

    #[test]
    fn streak_consecutive_day_increments_once() {
        let mut progress = build_progress();
        let tomorrow = fixed_now() + Duration::days(1);
        assert_eq!(progress.check_login(tomorrow), LoginCheck::ConsecutiveDay);
        assert_eq!(progress.streak(), 1);

        let day_after = tomorrow + Duration::days(1);
        assert_eq!(progress.check_login(day_after), LoginCheck::ConsecutiveDay);
        assert_eq!(progress.streak(), 2);
    }

    #[test]
    fn streak_gap_resets_to_one() {
        let mut progress = build_progress();
        progress.check_login(fixed_now() + Duration::days(1));
        progress.check_login(fixed_now() + Duration::days(2));
        assert_eq!(progress.streak(), 2);

        let three_days_later = fixed_now() + Duration::days(5);
        assert_eq!(progress.check_login(three_days_later), LoginCheck::Broken);
        assert_eq!(progress.streak(), 1);
    }

    #[test]
    fn time_spent_accumulates() {
        let mut progress = build_progress();
        progress.record_time_spent(10);
        progress.record_time_spent(5);
        assert_eq!(progress.time_spent_minutes(), 15);
    }

    #[test]
    fn blob_round_trips_through_serde() {
        let mut progress = build_progress();
        progress.record_session_start();
        progress.record_quiz_completed(&outcome(4, 5)).unwrap();
        progress.record_concept_learned(CardId::new(11));
        progress.toggle_bookmark(CardId::new(11));

        let blob = serde_json::to_string(&progress).unwrap();
        let restored: Progress = serde_json::from_str(&blob).unwrap();
        assert_eq!(restored.validate().unwrap(), progress);
    }

    #[test]
    fn validate_rejects_unknown_version() {
        let mut progress = build_progress();
        progress.version = 99;
        assert_eq!(
            progress.validate().unwrap_err(),
            ProgressError::UnsupportedVersion { found: 99 }
        );
    }

    #[test]
    fn validate_rejects_corrupt_scores() {
        let mut progress = build_progress();
        progress.quiz_scores.push(QuizScoreEntry {
            score: 9,
            total: 5,
            quiz_type: QuizType::Mixed,
            date: fixed_now(),
        });
        assert!(matches!(
            progress.validate().unwrap_err(),
            ProgressError::ScoreExceedsTotal { .. }
        ));
    }
}
