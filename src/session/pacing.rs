use std::time::Duration;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::clock::{Clock, Timestamp};
use crate::device::InputSource;
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacingOutcome {
    Elapsed,
    /// A button press cut the delay short.
    Cancelled,
}

/// Random spacing between presentations, so cards turn up at an irregular
/// cadence instead of the instant they fall due. The gap is drawn from
/// `[min_delay, max_delay]` and measured from the previous presentation.
pub struct Pacer {
    min_delay: Duration,
    max_delay: Duration,
    rng: SmallRng,
}

impl Pacer {
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self::with_rng(min_delay, max_delay, SmallRng::from_entropy())
    }

    pub fn with_seed(min_delay: Duration, max_delay: Duration, seed: u64) -> Self {
        Self::with_rng(min_delay, max_delay, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(min_delay: Duration, max_delay: Duration, rng: SmallRng) -> Self {
        Self {
            min_delay,
            max_delay: max_delay.max(min_delay),
            rng,
        }
    }

    /// Uniform in `[min_delay, max_delay]`, at millisecond resolution.
    pub fn draw_delay(&mut self) -> Duration {
        let lo = self.min_delay.as_millis() as u64;
        let hi = self.max_delay.as_millis() as u64;
        Duration::from_millis(self.rng.gen_range(lo..=hi))
    }

    /// Wait out whatever is left of a fresh gap after `last_shown_at`.
    pub fn wait(
        &mut self,
        last_shown_at: Timestamp,
        input: &mut impl InputSource,
        clock: &impl Clock,
        tick: Duration,
    ) -> Result<PacingOutcome> {
        let gap = self.draw_delay();
        let deadline = last_shown_at + gap;
        tracing::debug!(
            gap_secs = gap.as_secs(),
            remaining_secs = deadline.saturating_duration_since(clock.now()).as_secs(),
            "pacing before next card"
        );

        loop {
            if input.is_any_pressed()? {
                tracing::debug!("pacing cancelled by button");
                return Ok(PacingOutcome::Cancelled);
            }
            let now = clock.now();
            if now >= deadline {
                return Ok(PacingOutcome::Elapsed);
            }
            clock.sleep(tick.min(deadline.saturating_duration_since(now)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Button;
    use crate::device::sim::{ManualClock, ScriptedInput};

    const TICK: Duration = Duration::from_millis(100);

    #[test]
    fn test_delays_stay_in_range() {
        let mut pacer = Pacer::with_seed(Duration::from_secs(300), Duration::from_secs(3_600), 9);
        for _ in 0..500 {
            let d = pacer.draw_delay();
            assert!(d >= Duration::from_secs(300) && d <= Duration::from_secs(3_600));
        }
    }

    #[test]
    fn test_degenerate_range_is_fixed() {
        let mut pacer = Pacer::with_seed(Duration::from_secs(5), Duration::from_secs(1), 1);
        assert_eq!(pacer.draw_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_wait_runs_full_delay_without_press() {
        let clock = ManualClock::default();
        let mut input = ScriptedInput::new(clock.clone());
        let mut pacer = Pacer::with_seed(Duration::from_secs(5), Duration::from_secs(10), 3);
        let outcome = pacer.wait(Timestamp::ZERO, &mut input, &clock, TICK).unwrap();
        assert_eq!(outcome, PacingOutcome::Elapsed);
        assert!(clock.now() >= Timestamp::from_secs(5));
        assert!(clock.now() <= Timestamp::from_secs(10));
    }

    #[test]
    fn test_press_cancels_early() {
        let clock = ManualClock::default();
        let mut input = ScriptedInput::new(clock.clone());
        input.press(Button::Easy, Timestamp::from_secs(2));
        let mut pacer = Pacer::with_seed(Duration::from_secs(60), Duration::from_secs(120), 3);
        let outcome = pacer.wait(Timestamp::ZERO, &mut input, &clock, TICK).unwrap();
        assert_eq!(outcome, PacingOutcome::Cancelled);
        assert_eq!(clock.now(), Timestamp::from_secs(2));
    }

    #[test]
    fn test_only_the_remaining_gap_is_waited() {
        let clock = ManualClock::starting_at(Timestamp::from_secs(1_200));
        let mut input = ScriptedInput::new(clock.clone());
        let mut pacer = Pacer::with_seed(Duration::from_secs(300), Duration::from_secs(300), 1);
        let outcome = pacer
            .wait(Timestamp::from_secs(1_000), &mut input, &clock, TICK)
            .unwrap();
        assert_eq!(outcome, PacingOutcome::Elapsed);
        assert_eq!(clock.now(), Timestamp::from_secs(1_300));
    }

    #[test]
    fn test_gap_already_over_returns_at_once() {
        let clock = ManualClock::starting_at(Timestamp::from_secs(5_000));
        let mut input = ScriptedInput::new(clock.clone());
        let mut pacer = Pacer::with_seed(Duration::from_secs(300), Duration::from_secs(600), 1);
        let outcome = pacer
            .wait(Timestamp::from_secs(1_000), &mut input, &clock, TICK)
            .unwrap();
        assert_eq!(outcome, PacingOutcome::Elapsed);
        assert_eq!(clock.total_slept(), Duration::ZERO);
    }
}
