//! Rescheduling after a response.
//!
//! Each response scales the current interval by a fixed multiplier, truncated
//! to whole seconds and clamped into `[min_interval, max_interval]`. What
//! happens on a card's very first response is a separate rule.

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::engine::card::{Flashcard, Response};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    #[serde(default = "default_easy")]
    pub easy: f64,
    #[serde(default = "default_medium")]
    pub medium: f64,
    #[serde(default = "default_hard")]
    pub hard: f64,
}

fn default_easy() -> f64 {
    2.0
}
fn default_medium() -> f64 {
    1.3
}
fn default_hard() -> f64 {
    0.5
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            easy: default_easy(),
            medium: default_medium(),
            hard: default_hard(),
        }
    }
}

impl Multipliers {
    pub fn for_response(&self, response: Response) -> f64 {
        match response {
            Response::Easy => self.easy,
            Response::Medium => self.medium,
            Response::Hard => self.hard,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstReviewRule {
    /// First exposure always gets the shortest interval.
    ResetToMin,
    /// First exposure is scaled like any other.
    Multiply,
}

pub trait IntervalStrategy {
    /// Unclamped next interval in seconds.
    fn next_interval(&self, card: &Flashcard, response: Response, min_interval: u64) -> u64;
}

pub struct ResetOnFirstReview {
    pub multipliers: Multipliers,
}

impl IntervalStrategy for ResetOnFirstReview {
    fn next_interval(&self, card: &Flashcard, response: Response, min_interval: u64) -> u64 {
        if card.review_count == 0 {
            min_interval
        } else {
            scale(card.interval, self.multipliers.for_response(response))
        }
    }
}

pub struct AlwaysMultiply {
    pub multipliers: Multipliers,
}

impl IntervalStrategy for AlwaysMultiply {
    fn next_interval(&self, card: &Flashcard, response: Response, _min_interval: u64) -> u64 {
        scale(card.interval, self.multipliers.for_response(response))
    }
}

fn scale(interval: u64, multiplier: f64) -> u64 {
    // `as` saturates and truncates toward zero.
    (interval as f64 * multiplier) as u64
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalChange {
    pub old_interval: u64,
    pub new_interval: u64,
}

pub struct IntervalPolicy {
    min_interval: u64,
    max_interval: u64,
    strategy: Box<dyn IntervalStrategy>,
}

impl IntervalPolicy {
    pub fn new(min_interval: u64, max_interval: u64, strategy: Box<dyn IntervalStrategy>) -> Self {
        let min_interval = min_interval.max(1);
        Self {
            min_interval,
            max_interval: max_interval.max(min_interval),
            strategy,
        }
    }

    pub fn for_rule(
        rule: FirstReviewRule,
        multipliers: Multipliers,
        min_interval: u64,
        max_interval: u64,
    ) -> Self {
        let strategy: Box<dyn IntervalStrategy> = match rule {
            FirstReviewRule::ResetToMin => Box::new(ResetOnFirstReview { multipliers }),
            FirstReviewRule::Multiply => Box::new(AlwaysMultiply { multipliers }),
        };
        Self::new(min_interval, max_interval, strategy)
    }

    pub fn min_interval(&self) -> u64 {
        self.min_interval
    }

    pub fn max_interval(&self) -> u64 {
        self.max_interval
    }

    pub fn clamp(&self, interval: u64) -> u64 {
        interval.clamp(self.min_interval, self.max_interval)
    }

    /// Reschedule `card` for `response` given at `now`.
    pub fn apply(&self, card: &mut Flashcard, response: Response, now: Timestamp) -> IntervalChange {
        let old_interval = card.interval;
        let raw = self.strategy.next_interval(card, response, self.min_interval);
        card.interval = self.clamp(raw);
        card.last_review = Some(now.as_secs());
        card.review_count += 1;

        tracing::info!(
            card = %card.front_text(),
            response = response.as_str(),
            old_interval,
            new_interval = card.interval,
            review_count = card.review_count,
            "rescheduled card"
        );

        IntervalChange {
            old_interval,
            new_interval: card.interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::card::sample_card;

    const MIN: u64 = 300;
    const MAX: u64 = 30 * 24 * 60 * 60;

    fn policy(rule: FirstReviewRule) -> IntervalPolicy {
        IntervalPolicy::for_rule(rule, Multipliers::default(), MIN, MAX)
    }

    #[test]
    fn test_easy_doubles_reviewed_card() {
        let mut card = sample_card("水");
        card.interval = 300;
        card.last_review = Some(1_000);
        card.review_count = 3;

        let change = policy(FirstReviewRule::ResetToMin).apply(
            &mut card,
            Response::Easy,
            Timestamp::from_secs(1_300),
        );

        assert_eq!(change.new_interval, 600);
        assert_eq!(card.interval, 600);
        assert_eq!(card.review_count, 4);
        assert_eq!(card.last_review, Some(1_300));
    }

    #[test]
    fn test_first_response_resets_to_min_for_any_quality() {
        for response in Response::ALL {
            let mut card = sample_card("火");
            card.interval = 86_400;
            policy(FirstReviewRule::ResetToMin).apply(&mut card, response, Timestamp::from_secs(50));
            assert_eq!(card.interval, MIN);
            assert_eq!(card.review_count, 1);
        }
    }

    #[test]
    fn test_multiply_rule_scales_first_response() {
        let mut card = sample_card("山");
        card.interval = 1_000;
        policy(FirstReviewRule::Multiply).apply(&mut card, Response::Medium, Timestamp::ZERO);
        assert_eq!(card.interval, 1_300);
    }

    #[test]
    fn test_medium_truncates_toward_zero() {
        let mut card = sample_card("木");
        card.interval = 333;
        card.review_count = 2;
        policy(FirstReviewRule::ResetToMin).apply(&mut card, Response::Medium, Timestamp::ZERO);
        // 333 * 1.3 = 432.9
        assert_eq!(card.interval, 432);
    }

    #[test]
    fn test_hard_never_drops_below_min() {
        let mut card = sample_card("人");
        card.interval = MIN;
        card.review_count = 5;
        policy(FirstReviewRule::ResetToMin).apply(&mut card, Response::Hard, Timestamp::ZERO);
        assert_eq!(card.interval, MIN);
    }

    #[test]
    fn test_intervals_stay_in_bounds_for_any_sequence() {
        let p = policy(FirstReviewRule::Multiply);
        let mut card = sample_card("口");
        let sequence = [
            Response::Easy,
            Response::Easy,
            Response::Hard,
            Response::Medium,
        ];
        let mut expected_count = 0;
        for round in 0..60u64 {
            let response = sequence[(round as usize * 7 + 3) % sequence.len()];
            p.apply(&mut card, response, Timestamp::from_secs(round));
            expected_count += 1;
            assert!((MIN..=MAX).contains(&card.interval));
            assert_eq!(card.review_count, expected_count);
        }
        for _ in 0..40 {
            p.apply(&mut card, Response::Easy, Timestamp::ZERO);
        }
        assert_eq!(card.interval, MAX);
    }

    #[test]
    fn test_bounds_are_repaired() {
        let p = IntervalPolicy::new(0, 0, Box::new(AlwaysMultiply {
            multipliers: Multipliers::default(),
        }));
        assert_eq!(p.min_interval(), 1);
        assert_eq!(p.max_interval(), 1);
    }
}
