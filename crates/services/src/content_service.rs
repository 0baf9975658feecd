use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use storage::repository::{ContentFilter, ContentRepository, ProgressRepository, StorageError};
use vedanta_core::model::{CardId, Flashcard, QuestionId, QuizQuestion};

use crate::error::ContentError;
use crate::sample;

/// Aggregate counts for the stats view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentStats {
    pub total_flashcards: u64,
    pub total_questions: u64,
    pub total_users: u64,
    pub category_breakdown: BTreeMap<String, u64>,
}

/// Read access to flashcards and quiz questions.
///
/// Listings fall back to the bundled dataset when the store is empty or
/// unreachable, so the presentation layer never blocks on a fetch.
pub struct ContentService {
    content: Arc<dyn ContentRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl ContentService {
    #[must_use]
    pub fn new(content: Arc<dyn ContentRepository>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { content, progress }
    }

    /// List flashcards matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Storage` only for non-transient repository
    /// failures; an empty store or a connection failure yields the
    /// bundled sample deck instead.
    pub async fn list_flashcards(
        &self,
        filter: &ContentFilter,
    ) -> Result<Vec<Flashcard>, ContentError> {
        match self.content.list_flashcards(filter).await {
            Ok(cards) if !cards.is_empty() => Ok(cards),
            Ok(_) => Ok(filtered_samples(sample::sample_flashcards(), filter, |c| {
                (c.category().clone(), c.difficulty())
            })),
            Err(StorageError::Connection(err)) => {
                warn!(%err, "content store unreachable, serving bundled flashcards");
                Ok(filtered_samples(sample::sample_flashcards(), filter, |c| {
                    (c.category().clone(), c.difficulty())
                }))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch a single flashcard.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::NotFound` for an unknown id.
    pub async fn get_flashcard(&self, id: CardId) -> Result<Flashcard, ContentError> {
        self.content
            .get_flashcard(id)
            .await?
            .ok_or(ContentError::NotFound)
    }

    /// List quiz questions matching the filter.
    ///
    /// # Errors
    ///
    /// Same degradation rules as `list_flashcards`.
    pub async fn list_questions(
        &self,
        filter: &ContentFilter,
    ) -> Result<Vec<QuizQuestion>, ContentError> {
        match self.content.list_questions(filter).await {
            Ok(questions) if !questions.is_empty() => Ok(questions),
            Ok(_) => Ok(filtered_samples(sample::sample_questions(), filter, |q| {
                (q.category().clone(), q.difficulty())
            })),
            Err(StorageError::Connection(err)) => {
                warn!(%err, "content store unreachable, serving bundled questions");
                Ok(filtered_samples(sample::sample_questions(), filter, |q| {
                    (q.category().clone(), q.difficulty())
                }))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch a single question.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::NotFound` for an unknown id.
    pub async fn get_question(&self, id: QuestionId) -> Result<QuizQuestion, ContentError> {
        self.content
            .get_question(id)
            .await?
            .ok_or(ContentError::NotFound)
    }

    /// Aggregate counts across the whole store.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Storage` on repository failure.
    pub async fn stats(&self) -> Result<ContentStats, ContentError> {
        let category_breakdown = self.content.category_breakdown().await?;
        let total_flashcards = category_breakdown.values().sum();
        let total_questions = self
            .content
            .list_questions(&ContentFilter::any())
            .await?
            .len() as u64;
        let total_users = self.progress.count_users().await?;

        Ok(ContentStats {
            total_flashcards,
            total_questions,
            total_users,
            category_breakdown,
        })
    }
}

fn filtered_samples<T>(
    items: Vec<T>,
    filter: &ContentFilter,
    key: impl Fn(&T) -> (vedanta_core::model::Category, vedanta_core::model::Difficulty),
) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| {
            let (category, difficulty) = key(item);
            filter.matches(&category, difficulty)
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;
    use vedanta_core::model::{Category, Difficulty};

    fn service_with(repo: InMemoryRepository) -> ContentService {
        ContentService::new(Arc::new(repo.clone()), Arc::new(repo))
    }

    #[tokio::test]
    async fn empty_store_serves_bundled_deck() {
        let service = service_with(InMemoryRepository::new());
        let cards = service.list_flashcards(&ContentFilter::any()).await.unwrap();
        assert_eq!(cards.len(), 8);

        let practices = service
            .list_flashcards(&ContentFilter::any().with_category(Category::practices()))
            .await
            .unwrap();
        assert!(!practices.is_empty());
        assert!(practices
            .iter()
            .all(|c| c.category().as_str() == Category::PRACTICES));
    }

    #[tokio::test]
    async fn stored_content_wins_over_samples() {
        let repo = InMemoryRepository::new();
        let card = Flashcard::new(
            CardId::new(42),
            "शान्ति",
            "Shanti",
            "Peace, inner stillness invoked at the close of prayer.",
            Category::practices(),
            Difficulty::Beginner,
            None,
        )
        .unwrap();
        repo.replace_flashcards(std::slice::from_ref(&card))
            .await
            .unwrap();

        let service = service_with(repo);
        let cards = service.list_flashcards(&ContentFilter::any()).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id(), CardId::new(42));
    }

    #[tokio::test]
    async fn unknown_ids_surface_not_found() {
        let service = service_with(InMemoryRepository::new());
        assert!(matches!(
            service.get_flashcard(CardId::new(9)).await.unwrap_err(),
            ContentError::NotFound
        ));
        assert!(matches!(
            service.get_question(QuestionId::new(9)).await.unwrap_err(),
            ContentError::NotFound
        ));
    }

    #[tokio::test]
    async fn stats_count_store_contents() {
        let repo = InMemoryRepository::new();
        let card = Flashcard::new(
            CardId::new(1),
            "गुरु",
            "Guru",
            "The teacher who dispels darkness.",
            Category::core_concepts(),
            Difficulty::Beginner,
            None,
        )
        .unwrap();
        repo.replace_flashcards(std::slice::from_ref(&card))
            .await
            .unwrap();

        let service = service_with(repo);
        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total_flashcards, 1);
        assert_eq!(stats.total_questions, 0);
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.category_breakdown[Category::CORE_CONCEPTS], 1);
    }
}
