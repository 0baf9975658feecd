use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use storage::repository::{ContentRepository, SyncLogEntry, SyncLogRepository};
use vedanta_core::Clock;
use vedanta_core::model::{
    AnswerOption, CardId, Category, Difficulty, Flashcard, QuestionId, QuizQuestion,
};

use crate::error::SyncError;

//
// ─── CONTENT KIND ──────────────────────────────────────────────────────────────
//

/// Which content set a sync run replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Flashcards,
    Quiz,
}

impl ContentKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Flashcards => "flashcards",
            ContentKind::Quiz => "quiz",
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            ContentKind::Flashcards => "flashcards.csv",
            ContentKind::Quiz => "quiz.csv",
        }
    }
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Source configuration for the sync pipeline.
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    pub flashcards_url: Option<String>,
    pub quiz_url: Option<String>,
    pub local_dir: PathBuf,
}

impl SyncConfig {
    /// Reads the sheet URLs and data directory from the environment.
    ///
    /// Remote sources stay disabled unless both URLs are present,
    /// mirroring how the published sheets are provisioned together.
    #[must_use]
    pub fn from_env() -> Self {
        let flashcards_url = env::var("VEDANTA_FLASHCARDS_SHEET_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let quiz_url = env::var("VEDANTA_QUIZ_SHEET_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let local_dir = env::var("VEDANTA_DATA_DIR")
            .map_or_else(|_| PathBuf::from("assets/data"), PathBuf::from);

        if flashcards_url.is_some() != quiz_url.is_some() {
            warn!("only one sheet URL configured, remote sync disabled");
            return Self {
                flashcards_url: None,
                quiz_url: None,
                local_dir,
            };
        }

        Self {
            flashcards_url,
            quiz_url,
            local_dir,
        }
    }

    #[must_use]
    pub fn with_local_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_dir = dir.into();
        self
    }

    #[must_use]
    pub fn remote_enabled(&self) -> bool {
        self.flashcards_url.is_some() && self.quiz_url.is_some()
    }
}

//
// ─── SOURCES ───────────────────────────────────────────────────────────────────
//

/// One attempt in the ordered provider chain.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CsvSource {
    Remote { url: String },
    LocalFile { path: PathBuf },
}

impl CsvSource {
    fn describe(&self) -> String {
        match self {
            CsvSource::Remote { url } => format!("remote:{url}"),
            CsvSource::LocalFile { path } => format!("file:{}", path.display()),
        }
    }

    async fn fetch(&self, client: &Client) -> Result<String, SyncError> {
        match self {
            CsvSource::Remote { url } => {
                let response = client.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(SyncError::HttpStatus(response.status()));
                }
                Ok(response.text().await?)
            }
            CsvSource::LocalFile { path } => Ok(std::fs::read_to_string(path)?),
        }
    }
}

//
// ─── ROW SHAPES ────────────────────────────────────────────────────────────────
//

/// Column layout of the flashcards sheet.
#[derive(Debug, Deserialize)]
struct FlashcardRow {
    sanskrit_term: String,
    english_term: String,
    meaning: String,
    category: String,
    difficulty: String,
    #[serde(default)]
    image_url: String,
}

impl FlashcardRow {
    fn into_flashcard(self, id: CardId) -> Result<Flashcard, String> {
        let category = Category::new(self.category).map_err(|e| e.to_string())?;
        let difficulty: Difficulty = self.difficulty.parse().map_err(|e| format!("{e}"))?;
        let image_url = match self.image_url.trim() {
            "" => None,
            raw => Some(Url::parse(raw).map_err(|e| format!("image_url: {e}"))?),
        };
        Flashcard::new(
            id,
            self.sanskrit_term,
            self.english_term,
            self.meaning,
            category,
            difficulty,
            image_url,
        )
        .map_err(|e| e.to_string())
    }
}

/// Column layout of the quiz sheet.
#[derive(Debug, Deserialize)]
struct QuestionRow {
    question: String,
    option_a: String,
    option_b: String,
    option_c: String,
    option_d: String,
    correct_answer: String,
    explanation: String,
    category: String,
    difficulty: String,
}

impl QuestionRow {
    fn into_question(self, id: QuestionId) -> Result<QuizQuestion, String> {
        let category = Category::new(self.category).map_err(|e| e.to_string())?;
        let difficulty: Difficulty = self.difficulty.parse().map_err(|e| format!("{e}"))?;
        let correct: AnswerOption = self.correct_answer.parse().map_err(|e| format!("{e}"))?;
        QuizQuestion::new(
            id,
            self.question,
            [self.option_a, self.option_b, self.option_c, self.option_d],
            correct,
            self.explanation,
            category,
            difficulty,
        )
        .map_err(|e| e.to_string())
    }
}

/// Parses the flashcards sheet; any bad row fails the whole batch.
///
/// # Errors
///
/// Returns `SyncError::Csv` for malformed CSV and
/// `SyncError::InvalidRow` for rows that fail domain validation.
pub fn parse_flashcards(csv_text: &str) -> Result<Vec<Flashcard>, SyncError> {
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let mut cards = Vec::new();
    for (index, row) in reader.deserialize::<FlashcardRow>().enumerate() {
        // Line number in the sheet: 1-based, after the header.
        let line = index + 2;
        let row = row?;
        let card = row
            .into_flashcard(CardId::new(index as u64 + 1))
            .map_err(|reason| SyncError::InvalidRow { line, reason })?;
        cards.push(card);
    }
    Ok(cards)
}

/// Parses the quiz sheet; any bad row fails the whole batch.
///
/// # Errors
///
/// Returns `SyncError::Csv` for malformed CSV and
/// `SyncError::InvalidRow` for rows that fail domain validation.
pub fn parse_questions(csv_text: &str) -> Result<Vec<QuizQuestion>, SyncError> {
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let mut questions = Vec::new();
    for (index, row) in reader.deserialize::<QuestionRow>().enumerate() {
        let line = index + 2;
        let row = row?;
        let question = row
            .into_question(QuestionId::new(index as u64 + 1))
            .map_err(|reason| SyncError::InvalidRow { line, reason })?;
        questions.push(question);
    }
    Ok(questions)
}

//
// ─── REPORT ────────────────────────────────────────────────────────────────────
//

/// Summary of one successful sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub kind: ContentKind,
    pub source: String,
    pub imported: usize,
    pub synced_at: DateTime<Utc>,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Replaces stored content from an ordered chain of CSV sources.
///
/// Sources are tried in sequence (remote sheet, then local file); the
/// first one that fetches, parses, and imports wins. Every failed
/// attempt is logged and the final failure is a typed error.
pub struct SyncService {
    client: Client,
    clock: Clock,
    config: SyncConfig,
    content: Arc<dyn ContentRepository>,
    sync_log: Arc<dyn SyncLogRepository>,
}

impl SyncService {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: SyncConfig,
        content: Arc<dyn ContentRepository>,
        sync_log: Arc<dyn SyncLogRepository>,
    ) -> Self {
        Self {
            client: Client::new(),
            clock,
            config,
            content,
            sync_log,
        }
    }

    fn sources(&self, kind: ContentKind) -> Vec<CsvSource> {
        let mut sources = Vec::new();
        let remote = match kind {
            ContentKind::Flashcards => self.config.flashcards_url.as_ref(),
            ContentKind::Quiz => self.config.quiz_url.as_ref(),
        };
        if self.config.remote_enabled() {
            if let Some(url) = remote {
                sources.push(CsvSource::Remote { url: url.clone() });
            }
        }
        sources.push(CsvSource::LocalFile {
            path: self.config.local_dir.join(kind.file_name()),
        });
        sources
    }

    async fn import(&self, kind: ContentKind, csv_text: &str) -> Result<usize, SyncError> {
        match kind {
            ContentKind::Flashcards => {
                let cards = parse_flashcards(csv_text)?;
                self.content.replace_flashcards(&cards).await?;
                Ok(cards.len())
            }
            ContentKind::Quiz => {
                let questions = parse_questions(csv_text)?;
                self.content.replace_questions(&questions).await?;
                Ok(questions.len())
            }
        }
    }

    async fn log_outcome(&self, kind: ContentKind, status: &str, message: String) {
        let entry = SyncLogEntry {
            sync_type: kind.as_str().to_owned(),
            status: status.to_owned(),
            message: Some(message),
            synced_at: self.clock.now(),
        };
        if let Err(err) = self.sync_log.append_sync_log(&entry).await {
            warn!(kind = kind.as_str(), %err, "failed to record sync log entry");
        }
    }

    /// Run the provider chain for one content set.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::AllSourcesFailed` once every source in the
    /// chain has failed.
    pub async fn sync(&self, kind: ContentKind) -> Result<SyncReport, SyncError> {
        for source in self.sources(kind) {
            let attempt = async {
                let csv_text = source.fetch(&self.client).await?;
                self.import(kind, &csv_text).await
            };
            match attempt.await {
                Ok(imported) => {
                    let source = source.describe();
                    info!(kind = kind.as_str(), %source, imported, "content synced");
                    self.log_outcome(kind, "success", format!("{imported} records from {source}"))
                        .await;
                    return Ok(SyncReport {
                        kind,
                        source,
                        imported,
                        synced_at: self.clock.now(),
                    });
                }
                Err(err) => {
                    warn!(
                        kind = kind.as_str(),
                        source = %source.describe(),
                        %err,
                        "sync source failed, trying next"
                    );
                }
            }
        }

        self.log_outcome(kind, "error", "all sources failed".to_owned())
            .await;
        Err(SyncError::AllSourcesFailed {
            kind: kind.as_str(),
        })
    }

    /// Sync both content sets, flashcards first.
    ///
    /// # Errors
    ///
    /// Propagates the first `SyncError::AllSourcesFailed`.
    pub async fn sync_all(&self) -> Result<Vec<SyncReport>, SyncError> {
        let mut reports = Vec::with_capacity(2);
        reports.push(self.sync(ContentKind::Flashcards).await?);
        reports.push(self.sync(ContentKind::Quiz).await?);
        Ok(reports)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
