use std::sync::Arc;

use chrono::{DateTime, Utc};

use storage::repository::ContentFilter;
use vedanta_core::Clock;
use vedanta_core::model::{
    AnswerOption, Flashcard, LoginCheck, Progress, QuizQuestion, QuizResults, QuizType, UserName,
};

use crate::app_services::AppServices;
use crate::content_service::ContentService;
use crate::error::ControllerError;
use crate::flashcards::{CardFilter, FlashcardBrowser};
use crate::progress_service::{ProgressOverview, ProgressService};
use crate::quiz::{QuizAnswerResult, QuizLoopService, QuizSession};

/// Thin adapter between UI events and the state-transition core.
///
/// Translates presentation events into service calls and holds the
/// active quiz session, the flashcard browser, and the learner's
/// progress aggregate. It never touches the rendering layer, so every
/// flow is drivable from tests.
pub struct AppController {
    clock: Clock,
    progress: Progress,
    progress_service: Arc<ProgressService>,
    content: Arc<ContentService>,
    quiz_loop: Arc<QuizLoopService>,
    quiz: Option<QuizSession>,
    browser: Option<FlashcardBrowser>,
    browse_started_at: Option<DateTime<Utc>>,
}

impl AppController {
    /// Load (or initialize) the user's progress and run the first
    /// login check of this activation.
    pub async fn new(services: &AppServices, clock: Clock, user: UserName) -> Self {
        let progress_service = services.progress();
        let mut progress = progress_service.load_or_default(&user).await;
        progress_service.check_login(&mut progress).await;

        Self {
            clock,
            progress,
            progress_service,
            content: services.content(),
            quiz_loop: services.quiz_loop(),
            quiz: None,
            browser: None,
            browse_started_at: None,
        }
    }

    /// Streak re-evaluation when the app regains foreground.
    pub async fn on_activated(&mut self) -> LoginCheck {
        self.progress_service.check_login(&mut self.progress).await
    }

    // ─── Quiz events ───────────────────────────────────────────────────────────

    /// Start a quiz of the given type, replacing any active session.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` (wrapped) when the filtered pool
    /// is empty; the caller renders a "no questions" notice.
    pub async fn on_start_quiz(&mut self, quiz_type: QuizType) -> Result<(), ControllerError> {
        let session = self.quiz_loop.start_quiz(quiz_type).await?;
        self.progress.record_session_start();
        self.progress_service
            .save_best_effort(&mut self.progress)
            .await;
        self.quiz = Some(session);
        Ok(())
    }

    /// Submit an answer for the question currently shown.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NoActiveQuiz` without a session and the
    /// engine's validation errors otherwise.
    pub async fn on_submit(
        &mut self,
        selected: AnswerOption,
    ) -> Result<QuizAnswerResult, ControllerError> {
        let session = self.quiz.as_mut().ok_or(ControllerError::NoActiveQuiz)?;
        let question_id = session
            .current_question()
            .map(QuizQuestion::id)
            .ok_or(ControllerError::NoActiveQuiz)?;
        let result = self
            .quiz_loop
            .submit_answer(session, question_id, selected, &mut self.progress)
            .await?;
        Ok(result)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.quiz.as_ref().and_then(QuizSession::current_question)
    }

    #[must_use]
    pub fn quiz_session(&self) -> Option<&QuizSession> {
        self.quiz.as_ref()
    }

    /// Results of the finished quiz.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveQuiz` without a session, or the engine's
    /// `NotComplete` while questions remain.
    pub fn quiz_results(&self) -> Result<QuizResults, ControllerError> {
        let session = self.quiz.as_ref().ok_or(ControllerError::NoActiveQuiz)?;
        Ok(session.results()?)
    }

    // ─── Flashcard events ──────────────────────────────────────────────────────

    /// Enter the flashcard deck with the given filter.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Content` when the deck cannot be loaded.
    pub async fn on_start_browsing(&mut self, filter: CardFilter) -> Result<(), ControllerError> {
        let pool = self.content.list_flashcards(&ContentFilter::any()).await?;
        let mut browser = FlashcardBrowser::new(pool);
        browser.apply_filter(filter);

        self.progress.record_session_start();
        self.browser = Some(browser);
        self.browse_started_at = Some(self.clock.now());
        self.mark_current_learned().await;
        self.progress_service
            .save_best_effort(&mut self.progress)
            .await;
        Ok(())
    }

    /// Advance to the next card.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NoActiveBrowser` outside a deck.
    pub async fn on_next(&mut self) -> Result<(), ControllerError> {
        let browser = self
            .browser
            .as_mut()
            .ok_or(ControllerError::NoActiveBrowser)?;
        if browser.next() {
            self.mark_current_learned().await;
        }
        Ok(())
    }

    /// Step back to the previous card.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NoActiveBrowser` outside a deck.
    pub async fn on_previous(&mut self) -> Result<(), ControllerError> {
        let browser = self
            .browser
            .as_mut()
            .ok_or(ControllerError::NoActiveBrowser)?;
        if browser.previous() {
            self.mark_current_learned().await;
        }
        Ok(())
    }

    /// Toggle the meaning reveal for the current card.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NoActiveBrowser` outside a deck.
    pub fn on_flip(&mut self) -> Result<bool, ControllerError> {
        let browser = self
            .browser
            .as_mut()
            .ok_or(ControllerError::NoActiveBrowser)?;
        Ok(browser.flip())
    }

    /// Shuffle the filtered deck.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NoActiveBrowser` outside a deck.
    pub async fn on_shuffle(&mut self) -> Result<(), ControllerError> {
        let browser = self
            .browser
            .as_mut()
            .ok_or(ControllerError::NoActiveBrowser)?;
        browser.shuffle();
        self.mark_current_learned().await;
        Ok(())
    }

    /// Re-filter the deck.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NoActiveBrowser` outside a deck.
    pub async fn on_apply_filter(&mut self, filter: CardFilter) -> Result<(), ControllerError> {
        let browser = self
            .browser
            .as_mut()
            .ok_or(ControllerError::NoActiveBrowser)?;
        browser.apply_filter(filter);
        self.mark_current_learned().await;
        Ok(())
    }

    /// Toggle the bookmark on the current card; returns the new state.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NoActiveBrowser` when no card is shown.
    pub async fn on_bookmark_toggle(&mut self) -> Result<bool, ControllerError> {
        let card_id = self
            .browser
            .as_ref()
            .and_then(FlashcardBrowser::current_card)
            .map(Flashcard::id)
            .ok_or(ControllerError::NoActiveBrowser)?;

        let bookmarked = self.progress.toggle_bookmark(card_id);
        self.progress_service
            .save_best_effort(&mut self.progress)
            .await;
        Ok(bookmarked)
    }

    /// Leave the deck, folding the elapsed study time into progress.
    ///
    /// Returns the minutes recorded.
    pub async fn on_end_browsing(&mut self) -> u32 {
        self.browser = None;
        let Some(started_at) = self.browse_started_at.take() else {
            return 0;
        };

        let elapsed = self.clock.now() - started_at;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let minutes = (elapsed.num_seconds().max(0) as f64 / 60.0).round() as u32;
        if minutes > 0 {
            self.progress.record_time_spent(minutes);
        }
        self.progress_service
            .save_best_effort(&mut self.progress)
            .await;
        minutes
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&Flashcard> {
        self.browser.as_ref().and_then(FlashcardBrowser::current_card)
    }

    #[must_use]
    pub fn browser(&self) -> Option<&FlashcardBrowser> {
        self.browser.as_ref()
    }

    // ─── Progress queries ──────────────────────────────────────────────────────

    #[must_use]
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Analytics snapshot for the current aggregate state.
    #[must_use]
    pub fn progress_snapshot(&self) -> ProgressOverview {
        self.progress_service.overview(&self.progress)
    }

    /// Displaying a card counts its concept as learned (idempotent).
    async fn mark_current_learned(&mut self) {
        let Some(card_id) = self
            .browser
            .as_ref()
            .and_then(FlashcardBrowser::current_card)
            .map(Flashcard::id)
        else {
            return;
        };

        if self.progress.record_concept_learned(card_id) {
            self.progress_service
                .save_best_effort(&mut self.progress)
                .await;
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::Storage;
    use vedanta_core::time::fixed_clock;

    use crate::sync::SyncConfig;

    async fn build_controller() -> AppController {
        let services =
            AppServices::with_storage(Storage::in_memory(), fixed_clock(), SyncConfig::default());
        AppController::new(&services, fixed_clock(), UserName::new("Arjuna").unwrap()).await
    }

    #[tokio::test]
    async fn quiz_flow_from_events_to_results() {
        let mut controller = build_controller().await;
        controller.on_start_quiz(QuizType::Mixed).await.unwrap();
        assert_eq!(controller.progress().total_sessions(), 1);

        let mut submissions = 0;
        while let Some(correct) = controller.current_question().map(QuizQuestion::correct) {
            controller.on_submit(correct).await.unwrap();
            submissions += 1;
        }
        assert_eq!(submissions, 8);

        let results = controller.quiz_results().unwrap();
        assert_eq!(results.percentage(), 100);

        let snapshot = controller.progress_snapshot();
        assert_eq!(snapshot.average_score, 100);
        assert_eq!(snapshot.best_score, 100);
        assert!(snapshot
            .achievements
            .iter()
            .any(|a| a.id == "perfect-score" && a.earned));
    }

    #[tokio::test]
    async fn submit_without_a_session_is_rejected() {
        let mut controller = build_controller().await;
        assert!(matches!(
            controller.on_submit(AnswerOption::A).await.unwrap_err(),
            ControllerError::NoActiveQuiz
        ));
    }

    #[tokio::test]
    async fn browsing_marks_concepts_and_bookmarks() {
        let mut controller = build_controller().await;
        controller.on_start_browsing(CardFilter::any()).await.unwrap();
        assert_eq!(controller.progress().concepts_learned().len(), 1);

        controller.on_next().await.unwrap();
        controller.on_next().await.unwrap();
        assert_eq!(controller.progress().concepts_learned().len(), 3);

        // Walking back over a seen card must not double-count.
        controller.on_previous().await.unwrap();
        assert_eq!(controller.progress().concepts_learned().len(), 3);

        let card_id = controller.current_card().unwrap().id();
        assert!(controller.on_bookmark_toggle().await.unwrap());
        assert!(controller.progress().is_bookmarked(card_id));
        assert!(!controller.on_bookmark_toggle().await.unwrap());
        assert!(!controller.progress().is_bookmarked(card_id));
    }

    #[tokio::test]
    async fn flip_state_follows_navigation() {
        let mut controller = build_controller().await;
        controller.on_start_browsing(CardFilter::any()).await.unwrap();

        assert!(controller.on_flip().unwrap());
        controller.on_next().await.unwrap();
        let browser = controller.browser().unwrap();
        assert!(!browser.is_revealed());
    }

    #[tokio::test]
    async fn ending_a_deck_clears_browser_state() {
        let mut controller = build_controller().await;
        controller.on_start_browsing(CardFilter::any()).await.unwrap();
        assert!(controller.current_card().is_some());

        let minutes = controller.on_end_browsing().await;
        assert_eq!(minutes, 0);
        assert!(controller.current_card().is_none());
        assert!(matches!(
            controller.on_next().await.unwrap_err(),
            ControllerError::NoActiveBrowser
        ));
    }

    #[tokio::test]
    async fn browsing_events_outside_a_deck_are_rejected() {
        let mut controller = build_controller().await;
        assert!(matches!(
            controller.on_flip().unwrap_err(),
            ControllerError::NoActiveBrowser
        ));
        assert!(matches!(
            controller.on_shuffle().await.unwrap_err(),
            ControllerError::NoActiveBrowser
        ));
    }
}
