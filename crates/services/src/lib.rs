#![forbid(unsafe_code)]

pub mod app_services;
pub mod content_service;
pub mod controller;
pub mod error;
pub mod feedback_service;
pub mod flashcards;
pub mod progress_service;
pub mod quiz;
pub mod sample;
pub mod sync;

pub use vedanta_core::Clock;

pub use app_services::AppServices;
pub use content_service::{ContentService, ContentStats};
pub use controller::AppController;
pub use error::{
    AppServicesError, ContentError, ControllerError, FeedbackServiceError, ProgressServiceError,
    QuizError, SyncError,
};
pub use feedback_service::FeedbackService;
pub use flashcards::{CardFilter, FlashcardBrowser};
pub use progress_service::{ProgressOverview, ProgressService};
pub use quiz::{
    MAX_QUESTIONS_PER_QUIZ, QuizAnswerResult, QuizLoopService, QuizPlan, QuizProgress, QuizSession,
};
pub use sync::{ContentKind, SyncConfig, SyncReport, SyncService};
