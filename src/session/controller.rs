//! One show → reveal → respond → reschedule cycle.
//!
//! A failure before the rating leaves the card untouched. A failure while
//! saving comes after the interval update, which is then kept in memory and
//! left for the caller to flush again.

use std::time::Duration;

use crate::clock::{Clock, Timestamp};
use crate::config::Config;
use crate::device::{DisplaySurface, Frame, InputSource};
use crate::engine::card::Response;
use crate::engine::interval::{IntervalChange, IntervalPolicy};
use crate::error::{Error, Result};
use crate::session::gate::PresentationGate;
use crate::session::input;
use crate::session::pacing::{Pacer, PacingOutcome};
use crate::session::state::{Phase, SessionState};
use crate::store::{CardPersistence, CardStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    pub tick: Duration,
    pub reveal_timeout: Option<Duration>,
    pub response_timeout: Option<Duration>,
    pub default_response: Response,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tick: config.poll_interval(),
            reveal_timeout: config.reveal_timeout(),
            response_timeout: config.response_timeout(),
            default_response: config.default_response,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseSource {
    Button,
    /// Nobody asked for the answer in time; it was never shown.
    RevealTimeout,
    ResponseTimeout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleReport {
    pub index: usize,
    pub response: Response,
    pub source: ResponseSource,
    pub change: IntervalChange,
    pub pacing: Option<PacingOutcome>,
    pub finished_at: Timestamp,
}

pub struct SessionController<C: Clock, D: DisplaySurface, I: InputSource> {
    clock: C,
    gate: PresentationGate<D>,
    input: I,
    policy: IntervalPolicy,
    pacer: Option<Pacer>,
    settings: SessionSettings,
    state: SessionState,
    last_shown_at: Option<Timestamp>,
}

impl<C: Clock, D: DisplaySurface, I: InputSource> SessionController<C, D, I> {
    pub fn new(
        clock: C,
        gate: PresentationGate<D>,
        input: I,
        policy: IntervalPolicy,
        pacer: Option<Pacer>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            clock,
            gate,
            input,
            policy,
            pacer,
            settings,
            state: SessionState::default(),
            last_shown_at: None,
        }
    }

    pub fn from_config(clock: C, surface: D, input: I, config: &Config) -> Self {
        let settings = SessionSettings::from_config(config);
        let gate = PresentationGate::new(surface, config.refresh_interval(), settings.tick);
        let pacer = config
            .pacing_enabled
            .then(|| Pacer::new(config.min_show_interval(), config.max_show_interval()));
        Self::new(clock, gate, input, config.interval_policy(), pacer, settings)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn gate(&self) -> &PresentationGate<D> {
        &self.gate
    }

    pub fn policy(&self) -> &IntervalPolicy {
        &self.policy
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn last_shown_at(&self) -> Option<Timestamp> {
        self.last_shown_at
    }

    /// Startup screen. Goes through the gate like any other refresh.
    pub fn show_banner(&mut self, title: &str, subtitle: &str) -> Result<()> {
        self.gate
            .refresh(&Frame::Banner { title, subtitle }, &self.clock)
    }

    /// Wait one tick between selections, still noticing an interrupt.
    pub fn idle(&mut self, duration: Duration) -> Result<()> {
        self.input.is_any_pressed()?;
        self.clock.sleep(duration);
        Ok(())
    }

    /// Present the card at `index` and reschedule it from the rating.
    pub fn run_cycle<P: CardPersistence>(
        &mut self,
        store: &mut CardStore<P>,
        index: usize,
    ) -> Result<CycleReport> {
        let result = self.drive(store, index);
        if let Err(err) = &result {
            tracing::warn!(error = %err, phase = ?self.state.phase, "cycle aborted");
        }
        self.state.reset();
        result
    }

    fn drive<P: CardPersistence>(
        &mut self,
        store: &mut CardStore<P>,
        index: usize,
    ) -> Result<CycleReport> {
        let tick = self.settings.tick;
        self.state.begin(index, self.clock.now());

        // Nothing has been shown yet, so there is no gap to keep.
        let pacing = match (self.pacer.as_mut(), self.last_shown_at) {
            (Some(pacer), Some(shown)) => {
                Some(pacer.wait(shown, &mut self.input, &self.clock, tick)?)
            }
            _ => None,
        };

        let card = store.get_mut(index).ok_or(Error::UnknownCard(index))?;

        self.state.enter(Phase::ShowingQuestion, self.clock.now(), None);
        self.gate.show_card(card, false, &self.clock)?;

        let reveal_timeout = self.settings.reveal_timeout;
        self.state
            .enter(Phase::AwaitingReveal, self.clock.now(), reveal_timeout);
        let revealed =
            input::wait_for_any_press(&mut self.input, &self.clock, tick, reveal_timeout)?;

        let (response, source) = if revealed {
            self.state.enter(Phase::ShowingAnswer, self.clock.now(), None);
            self.gate.show_card(card, true, &self.clock)?;

            let response_timeout = self.settings.response_timeout;
            self.state
                .enter(Phase::AwaitingResponse, self.clock.now(), response_timeout);
            match input::poll_response(&mut self.input, &self.clock, tick, response_timeout)? {
                Some(response) => (response, ResponseSource::Button),
                None => (self.settings.default_response, ResponseSource::ResponseTimeout),
            }
        } else {
            (self.settings.default_response, ResponseSource::RevealTimeout)
        };
        if source != ResponseSource::Button {
            tracing::info!(
                card = %card.front_text(),
                ?source,
                response = response.as_str(),
                "no rating given, using default"
            );
        }

        let now = self.clock.now();
        self.state.enter(Phase::Rescheduling, now, None);
        let change = self.policy.apply(card, response, now);
        self.last_shown_at = Some(now);

        store.flush()?;

        Ok(CycleReport {
            index,
            response,
            source,
            change,
            pacing,
            finished_at: now,
        })
    }
}
