use sqlx::Row;
use url::Url;

use vedanta_core::model::{
    AnswerOption, CardId, Category, Difficulty, FeedbackKind, FeedbackStatus, FeedbackSubmission,
    Flashcard, QuestionId, QuizQuestion,
};

use crate::repository::{StorageError, StoredFeedback, SyncLogEntry};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn card_id_from_i64(v: i64) -> Result<CardId, StorageError> {
    Ok(CardId::new(i64_to_u64("card id", v)?))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question id", v)?))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn map_flashcard_row(row: &sqlx::sqlite::SqliteRow) -> Result<Flashcard, StorageError> {
    let id = card_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let category = Category::new(row.try_get::<String, _>("category").map_err(ser)?).map_err(ser)?;
    let difficulty: Difficulty = row
        .try_get::<String, _>("difficulty")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let image_url = row
        .try_get::<Option<String>, _>("image_url")
        .map_err(ser)?
        .filter(|s| !s.trim().is_empty())
        .map(|s| Url::parse(&s))
        .transpose()
        .map_err(ser)?;

    Flashcard::new(
        id,
        row.try_get::<String, _>("sanskrit_term").map_err(ser)?,
        row.try_get::<String, _>("english_term").map_err(ser)?,
        row.try_get::<String, _>("meaning").map_err(ser)?,
        category,
        difficulty,
        image_url,
    )
    .map_err(ser)
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuizQuestion, StorageError> {
    let id = question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let category = Category::new(row.try_get::<String, _>("category").map_err(ser)?).map_err(ser)?;
    let difficulty: Difficulty = row
        .try_get::<String, _>("difficulty")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let correct: AnswerOption = row
        .try_get::<String, _>("correct_answer")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;

    let options = [
        row.try_get::<String, _>("option_a").map_err(ser)?,
        row.try_get::<String, _>("option_b").map_err(ser)?,
        row.try_get::<String, _>("option_c").map_err(ser)?,
        row.try_get::<String, _>("option_d").map_err(ser)?,
    ];

    QuizQuestion::new(
        id,
        row.try_get::<String, _>("question").map_err(ser)?,
        options,
        correct,
        row.try_get::<String, _>("explanation").map_err(ser)?,
        category,
        difficulty,
    )
    .map_err(ser)
}

pub(crate) fn map_sync_log_row(row: &sqlx::sqlite::SqliteRow) -> Result<SyncLogEntry, StorageError> {
    Ok(SyncLogEntry {
        sync_type: row.try_get("sync_type").map_err(ser)?,
        status: row.try_get("status").map_err(ser)?,
        message: row.try_get("message").map_err(ser)?,
        synced_at: row.try_get("sync_date").map_err(ser)?,
    })
}

pub(crate) fn map_feedback_row(row: &sqlx::sqlite::SqliteRow) -> Result<StoredFeedback, StorageError> {
    let kind: FeedbackKind = row
        .try_get::<String, _>("type")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let status: FeedbackStatus = row
        .try_get::<String, _>("status")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;

    Ok(StoredFeedback {
        id: row.try_get("id").map_err(ser)?,
        submission: FeedbackSubmission {
            kind,
            name: row.try_get("name").map_err(ser)?,
            email: row.try_get("email").map_err(ser)?,
            message: row.try_get("message").map_err(ser)?,
            category: row.try_get("category").map_err(ser)?,
            donation_willing: row.try_get::<i64, _>("donation_willing").map_err(ser)? != 0,
            status,
            submitted_at: row.try_get("created_at").map_err(ser)?,
        },
    })
}
