mod achievement;
mod feedback;
mod flashcard;
mod ids;
mod progress;
mod question;
mod quiz;

pub use achievement::{ACHIEVEMENTS, Achievement, AchievementStatus, evaluate as evaluate_achievements};
pub use feedback::{
    FeedbackDraft, FeedbackError, FeedbackKind, FeedbackStatus, FeedbackSubmission,
};
pub use flashcard::{Category, Difficulty, Flashcard, FlashcardError};
pub use ids::{CardId, ParseIdError, QuestionId};
pub use progress::{
    LoginCheck, PROGRESS_SCHEMA_VERSION, Progress, ProgressError, QuizScoreEntry, UserName,
};
pub use question::{AnswerOption, QuestionError, QuizQuestion};
pub use quiz::{
    AnswerRecord, CategoryTally, ParseQuizTypeError, QuizOutcome, QuizResults, QuizType,
    SanskritQuote, TallyError, percentage,
};
