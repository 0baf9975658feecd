use crate::model::progress::Progress;

/// A named milestone with its unlock condition.
///
/// Predicates are pure functions of `Progress`; once the underlying
/// counters satisfy a condition they never shrink, so an earned badge
/// stays earned.
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    condition: fn(&Progress) -> bool,
}

impl Achievement {
    /// Whether the given progress satisfies this achievement.
    #[must_use]
    pub fn earned_by(&self, progress: &Progress) -> bool {
        (self.condition)(progress)
    }
}

/// Evaluation result for one achievement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementStatus {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub earned: bool,
}

/// The fixed badge list, in display order.
pub const ACHIEVEMENTS: [Achievement; 8] = [
    Achievement {
        id: "first-quiz",
        name: "Pratham Siddhi",
        description: "First Quiz Completed",
        condition: |p| !p.quiz_scores().is_empty(),
    },
    Achievement {
        id: "concepts-25",
        name: "Adhyayana Premi",
        description: "25 Concepts Learned",
        condition: |p| p.concepts_learned().len() >= 25,
    },
    Achievement {
        id: "streak-7",
        name: "Sapta Dina",
        description: "7 Day Streak",
        condition: |p| p.streak() >= 7,
    },
    Achievement {
        id: "streak-30",
        name: "Sadhana Yukta",
        description: "30 Day Streak",
        condition: |p| p.streak() >= 30,
    },
    Achievement {
        id: "perfect-score",
        name: "Purna Gyana",
        description: "Perfect Quiz Score",
        condition: Progress::has_perfect_score,
    },
    Achievement {
        id: "concepts-100",
        name: "Gyani",
        description: "100 Concepts Mastered",
        condition: |p| p.concepts_learned().len() >= 100,
    },
    Achievement {
        id: "quiz-master",
        name: "Pariksha Nipuna",
        description: "10 Quizzes Completed",
        condition: |p| p.quiz_scores().len() >= 10,
    },
    Achievement {
        id: "dedicated-learner",
        name: "Nityabhyasi",
        description: "50 Learning Sessions",
        condition: |p| p.total_sessions() >= 50,
    },
];

/// Evaluates every achievement against the given progress, in order.
#[must_use]
pub fn evaluate(progress: &Progress) -> Vec<AchievementStatus> {
    ACHIEVEMENTS
        .iter()
        .map(|achievement| AchievementStatus {
            id: achievement.id,
            name: achievement.name,
            description: achievement.description,
            earned: achievement.earned_by(progress),
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
