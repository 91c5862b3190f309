//! Picks the next card to present.
//!
//! A card is due once its interval has elapsed since its last review, or if it
//! has never been reviewed. Due cards are ranked by overdue factor: elapsed
//! time divided by interval, or [`NEW_CARD_FACTOR`] for unreviewed cards.
//! Independently of card state, nothing is offered until the minimum show
//! interval has passed since the previous presentation.

use std::time::Duration;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::engine::card::Flashcard;

pub const NEW_CARD_FACTOR: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    MostOverdue,
    Weighted,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DueCandidate {
    /// Position in the card set.
    pub index: usize,
    pub overdue_factor: f64,
}

pub trait SelectionStrategy {
    /// Choose among non-empty `candidates`, which are in card-set order.
    fn pick(&mut self, candidates: &[DueCandidate]) -> Option<usize>;
}

/// Strictly greatest overdue factor; the first one seen wins ties.
#[derive(Clone, Copy, Debug, Default)]
pub struct MostOverdue;

impl SelectionStrategy for MostOverdue {
    fn pick(&mut self, candidates: &[DueCandidate]) -> Option<usize> {
        let mut best: Option<&DueCandidate> = None;
        for candidate in candidates {
            match best {
                Some(b) if candidate.overdue_factor <= b.overdue_factor => {}
                _ => best = Some(candidate),
            }
        }
        best.map(|c| c.index)
    }
}

/// Draw with probability proportional to overdue factor.
pub struct WeightedRandom {
    rng: SmallRng,
}

impl WeightedRandom {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for WeightedRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStrategy for WeightedRandom {
    fn pick(&mut self, candidates: &[DueCandidate]) -> Option<usize> {
        let last = candidates.last()?;
        let total: f64 = candidates.iter().map(|c| c.overdue_factor).sum();
        if total <= 0.0 || !total.is_finite() {
            return candidates.first().map(|c| c.index);
        }

        let r = self.rng.gen_range(0.0..total);
        let mut cumulative = 0.0;
        for candidate in candidates {
            cumulative += candidate.overdue_factor;
            if r < cumulative {
                return Some(candidate.index);
            }
        }
        // Float accumulation can leave r just past the final boundary.
        Some(last.index)
    }
}

pub struct DueCardSelector {
    min_show_interval: Duration,
    overdue_cap: f64,
    strategy: Box<dyn SelectionStrategy>,
}

impl DueCardSelector {
    pub fn new(
        min_show_interval: Duration,
        overdue_cap: f64,
        strategy: Box<dyn SelectionStrategy>,
    ) -> Self {
        Self {
            min_show_interval,
            overdue_cap,
            strategy,
        }
    }

    pub fn for_policy(policy: SelectionPolicy, min_show_interval: Duration, overdue_cap: f64) -> Self {
        let strategy: Box<dyn SelectionStrategy> = match policy {
            SelectionPolicy::MostOverdue => Box::new(MostOverdue),
            SelectionPolicy::Weighted => Box::new(WeightedRandom::new()),
        };
        Self::new(min_show_interval, overdue_cap, strategy)
    }

    /// True while the previous presentation is too recent for another one.
    pub fn is_paced_out(&self, now: Timestamp, last_shown_at: Option<Timestamp>) -> bool {
        last_shown_at
            .is_some_and(|shown| now.saturating_duration_since(shown) < self.min_show_interval)
    }

    /// Index of the card to present next, if any.
    pub fn select(
        &mut self,
        cards: &[Flashcard],
        now: Timestamp,
        last_shown_at: Option<Timestamp>,
    ) -> Option<usize> {
        if self.is_paced_out(now, last_shown_at) {
            return None;
        }

        let candidates = self.due_candidates(cards, now);
        if candidates.is_empty() {
            tracing::debug!(total = cards.len(), "no cards due");
            return None;
        }

        let chosen = self.strategy.pick(&candidates)?;
        if let Some(c) = candidates.iter().find(|c| c.index == chosen) {
            tracing::info!(
                card = %cards[chosen].front_text(),
                overdue_factor = c.overdue_factor,
                due = candidates.len(),
                "selected card"
            );
        }
        Some(chosen)
    }

    pub fn due_candidates(&self, cards: &[Flashcard], now: Timestamp) -> Vec<DueCandidate> {
        let now_secs = now.as_secs();
        cards
            .iter()
            .enumerate()
            .filter(|(_, card)| card.is_due(now_secs))
            .map(|(index, card)| DueCandidate {
                index,
                overdue_factor: self.overdue_factor(card, now_secs),
            })
            .collect()
    }

    pub fn overdue_factor(&self, card: &Flashcard, now_secs: u64) -> f64 {
        match card.elapsed_secs(now_secs) {
            None => NEW_CARD_FACTOR,
            Some(_) if card.interval == 0 => self.overdue_cap,
            Some(elapsed) => (elapsed as f64 / card.interval as f64).min(self.overdue_cap),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::card::sample_card;

    fn reviewed(front: &str, interval: u64, last_review: u64) -> Flashcard {
        let mut card = sample_card(front);
        card.interval = interval;
        card.last_review = Some(last_review);
        card.review_count = 1;
        card
    }

    fn selector(strategy: Box<dyn SelectionStrategy>) -> DueCardSelector {
        DueCardSelector::new(Duration::from_secs(300), 10.0, strategy)
    }

    #[test]
    fn test_empty_set_selects_nothing() {
        let mut sel = selector(Box::new(MostOverdue));
        assert_eq!(sel.select(&[], Timestamp::from_secs(10_000), None), None);
    }

    #[test]
    fn test_never_returns_card_that_is_not_due() {
        let cards = vec![reviewed("a", 600, 1_000), reviewed("b", 300, 1_100)];
        let mut sel = selector(Box::new(MostOverdue));
        for now in 1_000..1_400 {
            assert_eq!(sel.select(&cards, Timestamp::from_secs(now), None), None);
        }
        assert_eq!(sel.select(&cards, Timestamp::from_secs(1_400), None), Some(1));
    }

    #[test]
    fn test_pacing_blocks_even_overdue_cards() {
        let cards = vec![sample_card("new")];
        let mut sel = selector(Box::new(MostOverdue));
        let shown = Timestamp::from_secs(5_000);
        assert_eq!(sel.select(&cards, Timestamp::from_secs(5_299), Some(shown)), None);
        assert_eq!(sel.select(&cards, Timestamp::from_secs(5_300), Some(shown)), Some(0));
    }

    #[test]
    fn test_never_reviewed_beats_moderately_overdue() {
        // factor 3.0 vs 10.0 for the new card
        let cards = vec![reviewed("old", 100, 700), sample_card("new")];
        let mut sel = selector(Box::new(MostOverdue));
        assert_eq!(sel.select(&cards, Timestamp::from_secs(1_000), None), Some(1));
    }

    #[test]
    fn test_ties_go_to_first_seen() {
        let cards = vec![sample_card("first"), sample_card("second")];
        let mut sel = selector(Box::new(MostOverdue));
        assert_eq!(sel.select(&cards, Timestamp::from_secs(1), None), Some(0));
    }

    #[test]
    fn test_overdue_factor_capped() {
        let sel = selector(Box::new(MostOverdue));
        let card = reviewed("x", 10, 0);
        assert_eq!(sel.overdue_factor(&card, 1_000), 10.0);
        assert_eq!(sel.overdue_factor(&card, 25), 2.5);
        // capped card ties with a new card and loses on position
        let cards = vec![sample_card("new"), card];
        let mut sel = selector(Box::new(MostOverdue));
        assert_eq!(sel.select(&cards, Timestamp::from_secs(1_000), None), Some(0));
    }

    #[test]
    fn test_weighted_only_draws_due_cards() {
        let cards = vec![
            reviewed("not-due", 1_000, 900),
            sample_card("new"),
            reviewed("due", 100, 500),
        ];
        let mut sel = selector(Box::new(WeightedRandom::with_seed(7)));
        for _ in 0..200 {
            let pick = sel.select(&cards, Timestamp::from_secs(1_000), None);
            assert!(matches!(pick, Some(1) | Some(2)), "got {pick:?}");
        }
    }

    #[test]
    fn test_weighted_favours_heavier_candidates() {
        let candidates = [
            DueCandidate { index: 0, overdue_factor: 1.0 },
            DueCandidate { index: 1, overdue_factor: 9.0 },
        ];
        let mut strategy = WeightedRandom::with_seed(42);
        let heavy = (0..2_000)
            .filter(|_| strategy.pick(&candidates) == Some(1))
            .count();
        assert!(heavy > 1_500, "heavy candidate drawn {heavy} times");
    }
}
