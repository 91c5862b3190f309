use std::time::Duration;

use crate::clock::{Clock, Timestamp};
use crate::device::{DisplaySurface, Frame};
use crate::engine::card::Flashcard;
use crate::error::Result;

/// Rate limiter around a display that must not be refreshed more often than
/// `min_refresh_interval`. Requests that arrive early wait their turn; none
/// is dropped or merged.
pub struct PresentationGate<D: DisplaySurface> {
    surface: D,
    min_refresh_interval: Duration,
    sleep_step: Duration,
    last_refresh_at: Option<Timestamp>,
    refresh_count: usize,
}

impl<D: DisplaySurface> PresentationGate<D> {
    pub fn new(surface: D, min_refresh_interval: Duration, sleep_step: Duration) -> Self {
        Self {
            surface,
            min_refresh_interval,
            sleep_step: sleep_step.max(Duration::from_millis(1)),
            last_refresh_at: None,
            refresh_count: 0,
        }
    }

    pub fn can_refresh(&self, now: Timestamp) -> bool {
        self.cooldown_remaining(now).is_zero()
    }

    pub fn cooldown_remaining(&self, now: Timestamp) -> Duration {
        match self.last_refresh_at {
            None => Duration::ZERO,
            Some(last) => self
                .min_refresh_interval
                .saturating_sub(now.saturating_duration_since(last)),
        }
    }

    pub fn last_refresh_at(&self) -> Option<Timestamp> {
        self.last_refresh_at
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_count
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    /// Sleep in short steps until the surface may refresh again.
    pub fn wait_until_ready(&self, clock: &impl Clock) -> Duration {
        let start = clock.now();
        let remaining = self.cooldown_remaining(start);
        if !remaining.is_zero() {
            tracing::info!(wait_secs = remaining.as_secs(), "display cooling down");
        }
        loop {
            let remaining = self.cooldown_remaining(clock.now());
            if remaining.is_zero() {
                break;
            }
            clock.sleep(remaining.min(self.sleep_step));
        }
        clock.now().saturating_duration_since(start)
    }

    /// Draw `frame`, first blocking for as long as the cooldown requires.
    pub fn refresh(&mut self, frame: &Frame<'_>, clock: &impl Clock) -> Result<()> {
        self.wait_until_ready(clock);
        self.surface.draw(frame)?;
        self.last_refresh_at = Some(clock.now());
        self.refresh_count += 1;
        tracing::debug!(frame = frame.kind(), "display refreshed");
        Ok(())
    }

    /// Present a card's question, or question and answer, laying the card
    /// out on first use.
    pub fn show_card(
        &mut self,
        card: &mut Flashcard,
        show_answer: bool,
        clock: &impl Clock,
    ) -> Result<()> {
        let surface = &self.surface;
        let rendered = card.rendered_or_insert_with(|content| surface.layout(content));
        let frame = if show_answer {
            Frame::Answer(rendered)
        } else {
            Frame::Question(rendered)
        };
        self.refresh(&frame, clock)
    }
}
