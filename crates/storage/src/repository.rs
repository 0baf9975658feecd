use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use vedanta_core::model::{
    CardId, Category, Difficulty, FeedbackStatus, FeedbackSubmission, Flashcard, Progress,
    QuestionId, QuizQuestion, UserName,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── CONTENT FILTER ────────────────────────────────────────────────────────────
//

/// Optional predicates for content listings; an unset field matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
}

impl ContentFilter {
    /// A filter that matches every record.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    #[must_use]
    pub fn matches(&self, category: &Category, difficulty: Difficulty) -> bool {
        self.category.as_ref().is_none_or(|c| c == category)
            && self.difficulty.is_none_or(|d| d == difficulty)
    }
}

//
// ─── PROGRESS RECORD ───────────────────────────────────────────────────────────
//

/// Persisted shape of a per-user progress aggregate.
///
/// The aggregate travels as a versioned JSON blob so repositories never
/// need to understand its internals.
#[derive(Debug, Clone)]
pub struct ProgressRecord {
    pub user_name: String,
    pub blob: String,
    pub last_updated: DateTime<Utc>,
}

impl ProgressRecord {
    /// Serializes a progress aggregate for storage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn from_progress(progress: &Progress, now: DateTime<Utc>) -> Result<Self, StorageError> {
        let blob = serde_json::to_string(progress)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(Self {
            user_name: progress.user().as_str().to_owned(),
            blob,
            last_updated: now,
        })
    }

    /// Decodes the stored blob back into a validated aggregate.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed JSON, an
    /// unsupported schema version, or counts violating the progress
    /// invariants. Callers are expected to degrade to a fresh default.
    pub fn into_progress(self) -> Result<Progress, StorageError> {
        let progress: Progress = serde_json::from_str(&self.blob)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        progress
            .validate()
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

//
// ─── SYNC LOG ──────────────────────────────────────────────────────────────────
//

/// One row in the content-sync audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncLogEntry {
    pub sync_type: String,
    pub status: String,
    pub message: Option<String>,
    pub synced_at: DateTime<Utc>,
}

//
// ─── STORED FEEDBACK ───────────────────────────────────────────────────────────
//

/// A feedback submission together with its storage id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFeedback {
    pub id: i64,
    pub submission: FeedbackSubmission,
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

/// Repository contract for flashcards and quiz questions.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// List flashcards matching the filter, in stable category order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn list_flashcards(&self, filter: &ContentFilter) -> Result<Vec<Flashcard>, StorageError>;

    /// Fetch a single flashcard; `None` when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn get_flashcard(&self, id: CardId) -> Result<Option<Flashcard>, StorageError>;

    /// List quiz questions matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn list_questions(&self, filter: &ContentFilter)
    -> Result<Vec<QuizQuestion>, StorageError>;

    /// Fetch a single question; `None` when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn get_question(&self, id: QuestionId) -> Result<Option<QuizQuestion>, StorageError>;

    /// Replace the whole flashcard set; all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure; the previous set
    /// stays intact in that case.
    async fn replace_flashcards(&self, cards: &[Flashcard]) -> Result<(), StorageError>;

    /// Replace the whole question set; all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure; the previous set
    /// stays intact in that case.
    async fn replace_questions(&self, questions: &[QuizQuestion]) -> Result<(), StorageError>;

    /// Number of flashcards per category, for the stats view.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn category_breakdown(&self) -> Result<BTreeMap<String, u64>, StorageError>;
}

/// Repository contract for per-user progress blobs.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load the latest record for a user; `None` when the user is unknown.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn load_progress(&self, user: &UserName)
    -> Result<Option<ProgressRecord>, StorageError>;

    /// Upsert the record for a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), StorageError>;

    /// Number of distinct users with stored progress.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn count_users(&self) -> Result<u64, StorageError>;
}

/// Repository contract for the content-sync audit log.
#[async_trait]
pub trait SyncLogRepository: Send + Sync {
    /// Append one log row and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn append_sync_log(&self, entry: &SyncLogEntry) -> Result<i64, StorageError>;

    /// Most recent log rows, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn recent_sync_logs(&self, limit: u32) -> Result<Vec<SyncLogEntry>, StorageError>;
}

/// Repository contract for feedback submissions.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Insert a submission and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn insert_submission(&self, submission: &FeedbackSubmission)
    -> Result<i64, StorageError>;

    /// List submissions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn list_submissions(&self) -> Result<Vec<StoredFeedback>, StorageError>;

    /// Update the review status of a submission.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when the id is unknown.
    async fn update_submission_status(
        &self,
        id: i64,
        status: FeedbackStatus,
    ) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY IMPLEMENTATION ──────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    flashcards: Arc<Mutex<Vec<Flashcard>>>,
    questions: Arc<Mutex<Vec<QuizQuestion>>>,
    progress: Arc<Mutex<HashMap<String, ProgressRecord>>>,
    sync_logs: Arc<Mutex<Vec<SyncLogEntry>>>,
    feedback: Arc<Mutex<Vec<StoredFeedback>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<T>(guard: &Arc<Mutex<T>>) -> Result<std::sync::MutexGuard<'_, T>, StorageError> {
        guard
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn list_flashcards(
        &self,
        filter: &ContentFilter,
    ) -> Result<Vec<Flashcard>, StorageError> {
        let guard = Self::lock(&self.flashcards)?;
        Ok(guard
            .iter()
            .filter(|card| filter.matches(card.category(), card.difficulty()))
            .cloned()
            .collect())
    }

    async fn get_flashcard(&self, id: CardId) -> Result<Option<Flashcard>, StorageError> {
        let guard = Self::lock(&self.flashcards)?;
        Ok(guard.iter().find(|card| card.id() == id).cloned())
    }

    async fn list_questions(
        &self,
        filter: &ContentFilter,
    ) -> Result<Vec<QuizQuestion>, StorageError> {
        let guard = Self::lock(&self.questions)?;
        Ok(guard
            .iter()
            .filter(|q| filter.matches(q.category(), q.difficulty()))
            .cloned()
            .collect())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<QuizQuestion>, StorageError> {
        let guard = Self::lock(&self.questions)?;
        Ok(guard.iter().find(|q| q.id() == id).cloned())
    }

    async fn replace_flashcards(&self, cards: &[Flashcard]) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.flashcards)?;
        *guard = cards.to_vec();
        Ok(())
    }

    async fn replace_questions(&self, questions: &[QuizQuestion]) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.questions)?;
        *guard = questions.to_vec();
        Ok(())
    }

    async fn category_breakdown(&self) -> Result<BTreeMap<String, u64>, StorageError> {
        let guard = Self::lock(&self.flashcards)?;
        let mut breakdown = BTreeMap::new();
        for card in guard.iter() {
            *breakdown
                .entry(card.category().as_str().to_owned())
                .or_insert(0_u64) += 1;
        }
        Ok(breakdown)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(
        &self,
        user: &UserName,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = Self::lock(&self.progress)?;
        Ok(guard.get(user.as_str()).cloned())
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.progress)?;
        guard.insert(record.user_name.clone(), record.clone());
        Ok(())
    }

    async fn count_users(&self) -> Result<u64, StorageError> {
        let guard = Self::lock(&self.progress)?;
        Ok(guard.len() as u64)
    }
}

#[async_trait]
impl SyncLogRepository for InMemoryRepository {
    async fn append_sync_log(&self, entry: &SyncLogEntry) -> Result<i64, StorageError> {
        let mut guard = Self::lock(&self.sync_logs)?;
        guard.push(entry.clone());
        Ok(guard.len() as i64)
    }

    async fn recent_sync_logs(&self, limit: u32) -> Result<Vec<SyncLogEntry>, StorageError> {
        let guard = Self::lock(&self.sync_logs)?;
        Ok(guard
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryRepository {
    async fn insert_submission(
        &self,
        submission: &FeedbackSubmission,
    ) -> Result<i64, StorageError> {
        let mut guard = Self::lock(&self.feedback)?;
        let id = guard.len() as i64 + 1;
        guard.push(StoredFeedback {
            id,
            submission: submission.clone(),
        });
        Ok(id)
    }

    async fn list_submissions(&self) -> Result<Vec<StoredFeedback>, StorageError> {
        let guard = Self::lock(&self.feedback)?;
        Ok(guard.iter().rev().cloned().collect())
    }

    async fn update_submission_status(
        &self,
        id: i64,
        status: FeedbackStatus,
    ) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.feedback)?;
        let stored = guard
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StorageError::NotFound)?;
        stored.submission.status = status;
        Ok(())
    }
}

//
// ─── STORAGE AGGREGATE ─────────────────────────────────────────────────────────
//

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub content: Arc<dyn ContentRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub sync_log: Arc<dyn SyncLogRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            content: Arc::new(repo.clone()),
            progress: Arc::new(repo.clone()),
            sync_log: Arc::new(repo.clone()),
            feedback: Arc::new(repo),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use vedanta_core::model::{AnswerOption, Difficulty};
    use vedanta_core::time::fixed_now;

    fn build_card(id: u64, category: Category, difficulty: Difficulty) -> Flashcard {
        Flashcard::new(
            CardId::new(id),
            format!("term-{id}"),
            format!("english-{id}"),
            format!("meaning {id}"),
            category,
            difficulty,
            None,
        )
        .unwrap()
    }

    fn build_question(id: u64) -> QuizQuestion {
        QuizQuestion::new(
            QuestionId::new(id),
            format!("question {id}?"),
            ["a".into(), "b".into(), "c".into(), "d".into()],
            AnswerOption::B,
            "because",
            Category::ethics(),
            Difficulty::Beginner,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn content_filter_narrows_listings() {
        let repo = InMemoryRepository::new();
        repo.replace_flashcards(&[
            build_card(1, Category::core_concepts(), Difficulty::Beginner),
            build_card(2, Category::ethics(), Difficulty::Advanced),
        ])
        .await
        .unwrap();

        let all = repo.list_flashcards(&ContentFilter::any()).await.unwrap();
        assert_eq!(all.len(), 2);

        let ethics = repo
            .list_flashcards(&ContentFilter::any().with_category(Category::ethics()))
            .await
            .unwrap();
        assert_eq!(ethics.len(), 1);
        assert_eq!(ethics[0].id(), CardId::new(2));

        let none = repo
            .list_flashcards(
                &ContentFilter::any()
                    .with_category(Category::ethics())
                    .with_difficulty(Difficulty::Beginner),
            )
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn replace_swaps_whole_sets() {
        let repo = InMemoryRepository::new();
        repo.replace_questions(&[build_question(1), build_question(2)])
            .await
            .unwrap();
        repo.replace_questions(&[build_question(9)]).await.unwrap();

        let remaining = repo.list_questions(&ContentFilter::any()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), QuestionId::new(9));
    }

    #[tokio::test]
    async fn progress_blob_round_trips() {
        let repo = InMemoryRepository::new();
        let user = UserName::new("Arjuna").unwrap();
        let progress = Progress::new(user.clone(), fixed_now());

        let record = ProgressRecord::from_progress(&progress, fixed_now()).unwrap();
        repo.save_progress(&record).await.unwrap();

        let loaded = repo.load_progress(&user).await.unwrap().unwrap();
        assert_eq!(loaded.into_progress().unwrap(), progress);
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn malformed_blob_fails_decoding() {
        let record = ProgressRecord {
            user_name: "Arjuna".into(),
            blob: "{not json".into(),
            last_updated: fixed_now(),
        };
        assert!(matches!(
            record.into_progress().unwrap_err(),
            StorageError::Serialization(_)
        ));
    }

    #[tokio::test]
    async fn feedback_status_updates_by_id() {
        use vedanta_core::model::{FeedbackDraft, FeedbackKind};

        let repo = InMemoryRepository::new();
        let submission = FeedbackDraft {
            kind: FeedbackKind::General,
            name: "Kavi".into(),
            email: "kavi@example.org".into(),
            message: "Namaste".into(),
            category: None,
            donation_willing: false,
        }
        .validate(fixed_now())
        .unwrap();

        let id = repo.insert_submission(&submission).await.unwrap();
        repo.update_submission_status(id, FeedbackStatus::Reviewed)
            .await
            .unwrap();

        let listed = repo.list_submissions().await.unwrap();
        assert_eq!(listed[0].submission.status, FeedbackStatus::Reviewed);

        assert!(matches!(
            repo.update_submission_status(999, FeedbackStatus::Resolved)
                .await
                .unwrap_err(),
            StorageError::NotFound
        ));
    }
}
