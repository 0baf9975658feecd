use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use vedanta_core::model::{CardId, Flashcard, QuestionId, QuizQuestion};

use super::{SqliteRepository, mapping};
use crate::repository::{ContentFilter, ContentRepository, StorageError};

const FLASHCARD_COLUMNS: &str =
    "id, sanskrit_term, english_term, meaning, category, difficulty, image_url";
const QUESTION_COLUMNS: &str = "id, question, option_a, option_b, option_c, option_d, \
     correct_answer, explanation, category, difficulty";

/// Builds `SELECT <columns> FROM <table> [WHERE ...] ORDER BY ...` for a filter.
fn select_with_filter(columns: &str, table: &str, filter: &ContentFilter) -> String {
    let mut sql = format!("SELECT {columns} FROM {table}");
    let mut conditions = Vec::new();
    if filter.category.is_some() {
        conditions.push("category = ?");
    }
    if filter.difficulty.is_some() {
        conditions.push("difficulty = ?");
    }
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY category, difficulty, id");
    sql
}

fn bind_filter<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    filter: &'q ContentFilter,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    let mut query = query;
    if let Some(category) = &filter.category {
        query = query.bind(category.as_str());
    }
    if let Some(difficulty) = filter.difficulty {
        query = query.bind(difficulty.as_str());
    }
    query
}

#[async_trait]
impl ContentRepository for SqliteRepository {
    async fn list_flashcards(
        &self,
        filter: &ContentFilter,
    ) -> Result<Vec<Flashcard>, StorageError> {
        let sql = select_with_filter(FLASHCARD_COLUMNS, "flashcards", filter);
        let rows = bind_filter(sqlx::query(&sql), filter)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(mapping::map_flashcard_row).collect()
    }

    async fn get_flashcard(&self, id: CardId) -> Result<Option<Flashcard>, StorageError> {
        let sql = format!("SELECT {FLASHCARD_COLUMNS} FROM flashcards WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(mapping::id_to_i64("card id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(mapping::map_flashcard_row).transpose()
    }

    async fn list_questions(
        &self,
        filter: &ContentFilter,
    ) -> Result<Vec<QuizQuestion>, StorageError> {
        let sql = select_with_filter(QUESTION_COLUMNS, "quiz_questions", filter);
        let rows = bind_filter(sqlx::query(&sql), filter)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(mapping::map_question_row).collect()
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<QuizQuestion>, StorageError> {
        let sql = format!("SELECT {QUESTION_COLUMNS} FROM quiz_questions WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(mapping::id_to_i64("question id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(mapping::map_question_row).transpose()
    }

    async fn replace_flashcards(&self, cards: &[Flashcard]) -> Result<(), StorageError> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query("DELETE FROM flashcards")
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for card in cards {
            sqlx::query(
                r"
                INSERT INTO flashcards (
                    id, sanskrit_term, english_term, meaning, category, difficulty,
                    image_url, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ",
            )
            .bind(mapping::id_to_i64("card id", card.id().value())?)
            .bind(card.sanskrit_term())
            .bind(card.english_term())
            .bind(card.meaning())
            .bind(card.category().as_str())
            .bind(card.difficulty().as_str())
            .bind(card.image_url().map(url::Url::as_str))
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    async fn replace_questions(&self, questions: &[QuizQuestion]) -> Result<(), StorageError> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query("DELETE FROM quiz_questions")
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for question in questions {
            sqlx::query(
                r"
                INSERT INTO quiz_questions (
                    id, question, option_a, option_b, option_c, option_d,
                    correct_answer, explanation, category, difficulty, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ",
            )
            .bind(mapping::id_to_i64("question id", question.id().value())?)
            .bind(question.question_text())
            .bind(question.option_text(vedanta_core::model::AnswerOption::A))
            .bind(question.option_text(vedanta_core::model::AnswerOption::B))
            .bind(question.option_text(vedanta_core::model::AnswerOption::C))
            .bind(question.option_text(vedanta_core::model::AnswerOption::D))
            .bind(question.correct().as_str())
            .bind(question.explanation())
            .bind(question.category().as_str())
            .bind(question.difficulty().as_str())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    async fn category_breakdown(&self) -> Result<BTreeMap<String, u64>, StorageError> {
        let rows = sqlx::query("SELECT category, COUNT(*) AS count FROM flashcards GROUP BY category")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut breakdown = BTreeMap::new();
        for row in &rows {
            let category: String = row
                .try_get("category")
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            let count: i64 = row
                .try_get("count")
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            breakdown.insert(category, u64::try_from(count).unwrap_or(0));
        }
        Ok(breakdown)
    }
}
