use rand::rng;
use rand::seq::SliceRandom;

use vedanta_core::model::{Category, Difficulty, Flashcard};

//
// ─── FILTER ────────────────────────────────────────────────────────────────────
//

/// Browser filter; unset predicates match every card.
///
/// `level` is the coarse difficulty preselection made before entering
/// the deck; it stacks with the in-deck `difficulty` dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFilter {
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub level: Option<Difficulty>,
}

impl CardFilter {
    /// A filter that matches every card.
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
    pub fn with_level(mut self, level: Difficulty) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn matches(&self, card: &Flashcard) -> bool {
        self.category.as_ref().is_none_or(|c| c == card.category())
            && self.difficulty.is_none_or(|d| d == card.difficulty())
            && self.level.is_none_or(|l| l == card.difficulty())
    }
}

//
// ─── BROWSER ───────────────────────────────────────────────────────────────────
//

/// Pure navigation state over a filtered flashcard deck.
///
/// Owns the current position and the reveal flag for exactly one card;
/// whenever the position changes the next card starts hidden.
#[derive(Debug, Clone)]
pub struct FlashcardBrowser {
    pool: Vec<Flashcard>,
    filtered: Vec<Flashcard>,
    filter: CardFilter,
    current: usize,
    revealed: bool,
}

impl FlashcardBrowser {
    /// Create a browser over the full deck with no filter applied.
    #[must_use]
    pub fn new(pool: Vec<Flashcard>) -> Self {
        let filtered = pool.clone();
        Self {
            pool,
            filtered,
            filter: CardFilter::any(),
            current: 0,
            revealed: false,
        }
    }

    /// Recompute the filtered view and reset to its first card.
    pub fn apply_filter(&mut self, filter: CardFilter) {
        self.filtered = self
            .pool
            .iter()
            .filter(|card| filter.matches(card))
            .cloned()
            .collect();
        self.filter = filter;
        self.current = 0;
        self.revealed = false;
    }

    #[must_use]
    pub fn filter(&self) -> &CardFilter {
        &self.filter
    }

    /// The card under the cursor; `None` when the filter matched nothing.
    #[must_use]
    pub fn current_card(&self) -> Option<&Flashcard> {
        self.filtered.get(self.current)
    }

    /// Advance one card. No-op at the end of the deck (no wrap-around).
    ///
    /// Returns true when the position changed.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.filtered.len() {
            self.current += 1;
            self.revealed = false;
            true
        } else {
            false
        }
    }

    /// Step back one card. No-op at the start of the deck.
    ///
    /// Returns true when the position changed.
    pub fn previous(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            self.revealed = false;
            true
        } else {
            false
        }
    }

    /// Toggle the meaning reveal for the current card.
    ///
    /// Returns the new reveal state; stays hidden when no card matches.
    pub fn flip(&mut self) -> bool {
        if self.current_card().is_some() {
            self.revealed = !self.revealed;
        }
        self.revealed
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Fisher-Yates shuffle of the filtered view; resets to the first card.
    pub fn shuffle(&mut self) {
        let mut rng = rng();
        self.filtered.as_mut_slice().shuffle(&mut rng);
        self.current = 0;
        self.revealed = false;
    }

    /// 1-based position for the "Card x of y" indicator.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        if self.filtered.is_empty() {
            None
        } else {
            Some((self.current + 1, self.filtered.len()))
        }
    }

    #[must_use]
    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    #[must_use]
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use vedanta_core::model::CardId;

    fn build_card(id: u64, category: Category, difficulty: Difficulty) -> Flashcard {
        Flashcard::new(
            CardId::new(id),
            format!("term-{id}"),
            format!("english-{id}"),
            format!("meaning of {id}"),
            category,
            difficulty,
            None,
        )
        .unwrap()
    }

    fn build_browser() -> FlashcardBrowser {
        FlashcardBrowser::new(vec![
            build_card(1, Category::core_concepts(), Difficulty::Beginner),
            build_card(2, Category::ethics(), Difficulty::Beginner),
            build_card(3, Category::practices(), Difficulty::Advanced),
            build_card(4, Category::ethics(), Difficulty::Intermediate),
        ])
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut browser = build_browser();
        assert!(!browser.previous());
        assert_eq!(browser.current_card().unwrap().id(), CardId::new(1));

        assert!(browser.next());
        assert!(browser.next());
        assert!(browser.next());
        assert!(!browser.next(), "must not wrap at the last card");
        assert_eq!(browser.current_card().unwrap().id(), CardId::new(4));
    }

    #[test]
    fn flip_resets_when_position_changes() {
        let mut browser = build_browser();
        assert!(browser.flip());
        assert!(browser.is_revealed());

        browser.next();
        assert!(!browser.is_revealed(), "new card starts hidden");

        assert!(browser.flip());
        browser.previous();
        assert!(!browser.is_revealed());
    }

    #[test]
    fn flip_toggles_back_and_forth() {
        let mut browser = build_browser();
        assert!(browser.flip());
        assert!(!browser.flip());
        assert!(browser.flip());
    }

    #[test]
    fn filter_predicates_stack() {
        let mut browser = build_browser();
        browser.apply_filter(CardFilter::any().with_category(Category::ethics()));
        assert_eq!(browser.filtered_len(), 2);
        assert_eq!(browser.position(), Some((1, 2)));

        browser.apply_filter(
            CardFilter::any()
                .with_category(Category::ethics())
                .with_difficulty(Difficulty::Intermediate),
        );
        assert_eq!(browser.filtered_len(), 1);
        assert_eq!(browser.current_card().unwrap().id(), CardId::new(4));

        browser.apply_filter(CardFilter::any().with_level(Difficulty::Advanced));
        assert_eq!(browser.filtered_len(), 1);
        assert_eq!(browser.current_card().unwrap().id(), CardId::new(3));
    }

    #[test]
    fn empty_filter_result_is_a_state_not_an_error() {
        let mut browser = build_browser();
        browser.apply_filter(
            CardFilter::any()
                .with_category(Category::core_concepts())
                .with_difficulty(Difficulty::Advanced),
        );
        assert!(browser.current_card().is_none());
        assert_eq!(browser.position(), None);
        assert!(!browser.next());
        assert!(!browser.flip());
    }

    #[test]
    fn filter_reset_returns_to_first_card() {
        let mut browser = build_browser();
        browser.next();
        browser.next();
        browser.apply_filter(CardFilter::any());
        assert_eq!(browser.current_card().unwrap().id(), CardId::new(1));
    }

    #[test]
    fn shuffle_is_a_permutation_of_the_filtered_view() {
        let mut browser = build_browser();
        let before: BTreeSet<_> = browser.filtered.iter().map(Flashcard::id).collect();

        for _ in 0..10 {
            browser.shuffle();
            let after: BTreeSet<_> = browser.filtered.iter().map(Flashcard::id).collect();
            assert_eq!(before, after);
            assert_eq!(browser.position(), Some((1, 4)));
            assert!(!browser.is_revealed());
        }
    }
}
