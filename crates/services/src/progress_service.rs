use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use storage::repository::{ProgressRecord, ProgressRepository};
use vedanta_core::Clock;
use vedanta_core::model::{
    AchievementStatus, Category, CategoryTally, LoginCheck, Progress, QuizOutcome, UserName,
    evaluate_achievements,
};

use crate::error::ProgressServiceError;

//
// ─── OVERVIEW ──────────────────────────────────────────────────────────────────
//

/// Analytics snapshot the presentation layer renders directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressOverview {
    pub total_sessions: u32,
    pub average_score: u32,
    pub best_score: u32,
    pub streak: u32,
    pub concepts_learned: usize,
    pub bookmarked_cards: usize,
    pub time_spent_minutes: u64,
    pub category_progress: BTreeMap<Category, CategoryTally>,
    pub achievements: Vec<AchievementStatus>,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Loads, folds, and persists the per-user progress aggregate.
///
/// Persistence is best-effort: a failed save never mutates or discards
/// the in-memory aggregate, and a missing or malformed stored blob
/// degrades to a fresh default instead of failing session start.
pub struct ProgressService {
    clock: Clock,
    repo: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn ProgressRepository>) -> Self {
        Self { clock, repo }
    }

    /// Load the stored aggregate for a user, or a fresh default.
    ///
    /// An unknown user, an unreachable store, and a malformed blob all
    /// degrade to `Progress::new`; the latter two are logged.
    pub async fn load_or_default(&self, user: &UserName) -> Progress {
        match self.repo.load_progress(user).await {
            Ok(Some(record)) => match record.into_progress() {
                Ok(progress) => progress,
                Err(err) => {
                    warn!(user = %user, %err, "stored progress is malformed, starting fresh");
                    Progress::new(user.clone(), self.clock.now())
                }
            },
            Ok(None) => Progress::new(user.clone(), self.clock.now()),
            Err(err) => {
                warn!(user = %user, %err, "progress store unreachable, starting fresh");
                Progress::new(user.clone(), self.clock.now())
            }
        }
    }

    /// Persist the aggregate, refreshing its last-login timestamp.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` when the write fails; the
    /// in-memory aggregate keeps its previous timestamp in that case.
    pub async fn save(&self, progress: &mut Progress) -> Result<(), ProgressServiceError> {
        let now = self.clock.now();
        let mut snapshot = progress.clone();
        snapshot.touch(now);

        let record = ProgressRecord::from_progress(&snapshot, now)?;
        self.repo.save_progress(&record).await?;

        progress.touch(now);
        Ok(())
    }

    /// Persist without surfacing the failure; returns whether it stuck.
    pub async fn save_best_effort(&self, progress: &mut Progress) -> bool {
        match self.save(progress).await {
            Ok(()) => true,
            Err(err) => {
                warn!(user = %progress.user(), %err, "progress save failed, keeping in-memory state");
                false
            }
        }
    }

    /// Evaluate the streak machine for an app activation, then persist.
    pub async fn check_login(&self, progress: &mut Progress) -> LoginCheck {
        let result = progress.check_login(self.clock.now());
        self.save_best_effort(progress).await;
        result
    }

    /// Fold a completed quiz into the aggregate, then persist.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Progress` for an inconsistent
    /// outcome; the aggregate is unchanged in that case. Save failures
    /// are logged, not returned.
    pub async fn apply_quiz_outcome(
        &self,
        progress: &mut Progress,
        outcome: &QuizOutcome,
    ) -> Result<(), ProgressServiceError> {
        progress.record_quiz_completed(outcome)?;
        self.save_best_effort(progress).await;
        Ok(())
    }

    /// Analytics snapshot for the current aggregate state.
    #[must_use]
    pub fn overview(&self, progress: &Progress) -> ProgressOverview {
        ProgressOverview {
            total_sessions: progress.total_sessions(),
            average_score: progress.average_score(),
            best_score: progress.best_score(),
            streak: progress.streak(),
            concepts_learned: progress.concepts_learned().len(),
            bookmarked_cards: progress.bookmarked_cards().len(),
            time_spent_minutes: progress.time_spent_minutes(),
            category_progress: progress.category_progress().clone(),
            achievements: evaluate_achievements(progress),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
