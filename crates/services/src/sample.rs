//! Bundled fallback dataset.
//!
//! Served when the content store is empty or unreachable so the app can
//! always show something instead of blocking on a fetch.

use vedanta_core::model::{
    AnswerOption, CardId, Category, Difficulty, Flashcard, QuestionId, QuizQuestion,
};

/// The built-in flashcard deck.
///
/// # Panics
///
/// Panics only if the bundled rows are malformed, which is covered by tests.
#[must_use]
pub fn sample_flashcards() -> Vec<Flashcard> {
    let rows: [(&str, &str, &str, Category, Difficulty); 8] = [
        (
            "आत्मन्",
            "Atman",
            "The eternal soul, the true Self that is beyond the physical body and mind. \
             It is the unchanging essence of every individual.",
            Category::core_concepts(),
            Difficulty::Beginner,
        ),
        (
            "ब्रह्मन्",
            "Brahman",
            "The ultimate reality, the cosmic consciousness that pervades everything. \
             It is the source and essence of all existence.",
            Category::core_concepts(),
            Difficulty::Intermediate,
        ),
        (
            "मोक्ष",
            "Moksha",
            "Liberation from the cycle of death and rebirth (samsara). \
             It is the ultimate goal of spiritual practice.",
            Category::core_concepts(),
            Difficulty::Beginner,
        ),
        (
            "धर्म",
            "Dharma",
            "Righteous duty or moral law. It encompasses ethical conduct, natural law, \
             and individual purpose in life.",
            Category::ethics(),
            Difficulty::Beginner,
        ),
        (
            "कर्म",
            "Karma",
            "The law of cause and effect governing actions and their consequences. \
             Every action creates reactions that affect future experiences.",
            Category::ethics(),
            Difficulty::Beginner,
        ),
        (
            "समाधि",
            "Samadhi",
            "The highest state of meditation where the meditator, meditation, \
             and object of meditation become one.",
            Category::practices(),
            Difficulty::Advanced,
        ),
        (
            "प्राणायाम",
            "Pranayama",
            "Breathing exercises that control the life force (prana) to purify \
             the body and mind for spiritual practice.",
            Category::practices(),
            Difficulty::Intermediate,
        ),
        (
            "सत्संग",
            "Satsang",
            "Association with truth or good company. Gathering with like-minded \
             spiritual seekers for learning and growth.",
            Category::practices(),
            Difficulty::Beginner,
        ),
    ];

    rows.into_iter()
        .enumerate()
        .map(|(i, (sanskrit, english, meaning, category, difficulty))| {
            Flashcard::new(
                CardId::new(i as u64 + 1),
                sanskrit,
                english,
                meaning,
                category,
                difficulty,
                None,
            )
            .expect("bundled flashcards are well-formed")
        })
        .collect()
}

/// The built-in question pool.
///
/// # Panics
///
/// Panics only if the bundled rows are malformed, which is covered by tests.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn sample_questions() -> Vec<QuizQuestion> {
    let rows: [(&str, [&str; 4], AnswerOption, &str, Category, Difficulty); 8] = [
        (
            "What is Moksha?",
            [
                "Liberation from the cycle of rebirth",
                "Material wealth and prosperity",
                "Political power and influence",
                "Fame and recognition",
            ],
            AnswerOption::A,
            "Moksha means liberation from samsara, the cycle of death and rebirth. \
             It is the ultimate spiritual goal.",
            Category::core_concepts(),
            Difficulty::Beginner,
        ),
        (
            "What does Dharma represent?",
            [
                "Selfish desires",
                "Righteous duty and moral law",
                "Material possessions",
                "Physical strength",
            ],
            AnswerOption::B,
            "Dharma encompasses righteous duty, moral law, and ethical conduct \
             that maintains cosmic order.",
            Category::ethics(),
            Difficulty::Beginner,
        ),
        (
            "According to Vedanta, what is Atman?",
            [
                "The physical body",
                "The mind and thoughts",
                "The eternal soul or true Self",
                "Worldly achievements",
            ],
            AnswerOption::C,
            "Atman is the eternal, unchanging essence of every individual - \
             the true Self beyond body and mind.",
            Category::core_concepts(),
            Difficulty::Beginner,
        ),
        (
            "What is the law of Karma?",
            [
                "Random events in life",
                "The law of cause and effect",
                "Financial transactions",
                "Social relationships",
            ],
            AnswerOption::B,
            "Karma is the universal law of cause and effect, where every action \
             creates consequences.",
            Category::ethics(),
            Difficulty::Beginner,
        ),
        (
            "What is Brahman in Vedantic philosophy?",
            [
                "A specific deity",
                "A religious ritual",
                "The ultimate reality",
                "A sacred text",
            ],
            AnswerOption::C,
            "Brahman is the ultimate reality, the cosmic consciousness that is \
             the source of all existence.",
            Category::core_concepts(),
            Difficulty::Intermediate,
        ),
        (
            "What is the purpose of Pranayama?",
            [
                "Physical exercise only",
                "To control life force through breathing",
                "To increase lung capacity",
                "To reduce stress only",
            ],
            AnswerOption::B,
            "Pranayama controls prana (life force) through breathing exercises \
             to purify body and mind.",
            Category::practices(),
            Difficulty::Intermediate,
        ),
        (
            "What does Satsang mean?",
            [
                "Singing devotional songs",
                "Association with truth and good company",
                "Reading scriptures alone",
                "Performing rituals",
            ],
            AnswerOption::B,
            "Satsang means association with truth or gathering with like-minded \
             spiritual seekers.",
            Category::practices(),
            Difficulty::Beginner,
        ),
        (
            "What is Samadhi?",
            [
                "A yoga posture",
                "A religious festival",
                "The highest state of meditation",
                "A sacred mantra",
            ],
            AnswerOption::C,
            "Samadhi is the highest meditative state where subject, object, and \
             process of meditation merge.",
            Category::practices(),
            Difficulty::Advanced,
        ),
    ];

    rows.into_iter()
        .enumerate()
        .map(
            |(i, (question, options, correct, explanation, category, difficulty))| {
                QuizQuestion::new(
                    QuestionId::new(i as u64 + 1),
                    question,
                    options.map(str::to_owned),
                    correct,
                    explanation,
                    category,
                    difficulty,
                )
                .expect("bundled questions are well-formed")
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn bundled_flashcards_are_valid_and_unique() {
        let cards = sample_flashcards();
        assert_eq!(cards.len(), 8);
        let ids: BTreeSet<_> = cards.iter().map(Flashcard::id).collect();
        assert_eq!(ids.len(), cards.len());
    }

    #[test]
    fn bundled_questions_are_valid_and_unique() {
        let questions = sample_questions();
        assert_eq!(questions.len(), 8);
        let ids: BTreeSet<_> = questions.iter().map(QuizQuestion::id).collect();
        assert_eq!(ids.len(), questions.len());
    }

    #[test]
    fn bundled_content_covers_all_three_categories() {
        let categories: BTreeSet<_> = sample_flashcards()
            .iter()
            .map(|c| c.category().as_str().to_owned())
            .collect();
        assert!(categories.contains(Category::CORE_CONCEPTS));
        assert!(categories.contains(Category::ETHICS));
        assert!(categories.contains(Category::PRACTICES));
    }
}
