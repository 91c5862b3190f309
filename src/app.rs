use std::time::Duration;

use crate::clock::Clock;
use crate::config::Config;
use crate::device::{DisplaySurface, InputSource};
use crate::engine::selector::DueCardSelector;
use crate::error::{Error, Result};
use crate::session::{CycleReport, SessionController};
use crate::store::{CardPersistence, CardStore};

pub const BANNER_TITLE: &str = "inkcards";
pub const BANNER_SUBTITLE: &str = "Ready for learning";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Reviewed(CycleReport),
    /// The card was rescheduled but could not be saved. Retried next step.
    SaveFailed,
    Idle,
}

/// The appliance loop: select a due card, run a cycle on it, repeat.
pub struct App<C: Clock, D: DisplaySurface, I: InputSource, P: CardPersistence> {
    store: CardStore<P>,
    selector: DueCardSelector,
    controller: SessionController<C, D, I>,
    idle_tick: Duration,
    unsaved: bool,
}

impl<C: Clock, D: DisplaySurface, I: InputSource, P: CardPersistence> App<C, D, I, P> {
    pub fn new(
        store: CardStore<P>,
        selector: DueCardSelector,
        controller: SessionController<C, D, I>,
        idle_tick: Duration,
    ) -> Self {
        Self {
            store,
            selector,
            controller,
            idle_tick,
            unsaved: false,
        }
    }

    pub fn from_config(clock: C, surface: D, input: I, persistence: P, config: &Config) -> Self {
        let store = CardStore::load(persistence, config.min_interval_secs, config.max_interval_secs);
        let controller = SessionController::from_config(clock, surface, input, config);
        Self::new(store, config.selector(), controller, config.poll_interval())
    }

    pub fn store(&self) -> &CardStore<P> {
        &self.store
    }

    pub fn controller(&self) -> &SessionController<C, D, I> {
        &self.controller
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn start(&mut self) -> Result<()> {
        tracing::info!(
            cards = self.store.len(),
            due = self.store.due_count(self.controller.clock().now().as_secs()),
            "starting"
        );
        self.controller.show_banner(BANNER_TITLE, BANNER_SUBTITLE)
    }

    pub fn step(&mut self) -> Result<Step> {
        if self.unsaved {
            match self.store.flush() {
                Ok(()) => {
                    tracing::info!("saved pending changes");
                    self.unsaved = false;
                }
                Err(err) => tracing::warn!(error = %err, "save still failing"),
            }
        }

        let now = self.controller.clock().now();
        let selected =
            self.selector
                .select(self.store.cards(), now, self.controller.last_shown_at());
        let Some(index) = selected else {
            self.controller.idle(self.idle_tick)?;
            return Ok(Step::Idle);
        };

        match self.controller.run_cycle(&mut self.store, index) {
            Ok(report) => {
                tracing::info!(
                    card = index,
                    response = report.response.as_str(),
                    old_interval = report.change.old_interval,
                    new_interval = report.change.new_interval,
                    "reviewed"
                );
                Ok(Step::Reviewed(report))
            }
            Err(err @ Error::Persist { .. }) => {
                tracing::warn!(error = %err, "will retry saving");
                self.unsaved = true;
                Ok(Step::SaveFailed)
            }
            Err(Error::UnknownCard(index)) => {
                tracing::warn!(index, "selected card vanished");
                Ok(Step::Idle)
            }
            Err(err) => Err(err),
        }
    }

    /// Run until interrupted. The card set is flushed on the way out,
    /// whatever ended the loop.
    pub fn run(&mut self) -> Result<()> {
        let result = self.run_loop();
        let flushed = self.shutdown();
        match result {
            Err(Error::Interrupted) => {
                tracing::info!("interrupted, shutting down");
                flushed
            }
            Err(err) => {
                if let Err(flush_err) = flushed {
                    tracing::error!(error = %flush_err, "final save failed");
                }
                Err(err)
            }
            Ok(()) => flushed,
        }
    }

    fn run_loop(&mut self) -> Result<()> {
        self.start()?;
        loop {
            self.step()?;
        }
    }

    pub fn shutdown(&mut self) -> Result<()> {
        self.store.flush()?;
        self.unsaved = false;
        tracing::info!(cards = self.store.len(), "saved on shutdown");
        Ok(())
    }
}
