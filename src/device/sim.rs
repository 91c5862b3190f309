//! Deterministic stand-ins for the clock, buttons and display.
//!
//! Time only moves when something sleeps on the [`ManualClock`], so every
//! wait loop in the session runs instantly and reproducibly.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::clock::{Clock, Timestamp};
use crate::device::{Button, DisplaySurface, Frame, InputSource};
use crate::engine::card::{CardContent, RenderedCard};
use crate::error::{Error, Result};

#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Timestamp>>,
    slept: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn starting_at(start: Timestamp) -> Self {
        let clock = Self::default();
        clock.now.set(start);
        clock
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Timestamp) {
        self.now.set(to);
    }

    /// Total time spent in `sleep`.
    pub fn total_slept(&self) -> Duration {
        self.slept.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
        self.slept.set(self.slept.get() + duration);
    }
}

#[derive(Clone, Copy, Debug)]
struct Press {
    at: Timestamp,
    hold: Duration,
    button: Button,
}

/// Buttons pressed at scripted moments of virtual time.
#[derive(Clone)]
pub struct ScriptedInput {
    clock: ManualClock,
    presses: Rc<RefCell<Vec<Press>>>,
    interrupt_at: Rc<Cell<Option<Timestamp>>>,
}

impl ScriptedInput {
    pub const DEFAULT_HOLD: Duration = Duration::from_millis(250);

    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            presses: Rc::new(RefCell::new(Vec::new())),
            interrupt_at: Rc::new(Cell::new(None)),
        }
    }

    pub fn press(&self, button: Button, at: Timestamp) {
        self.press_for(button, at, Self::DEFAULT_HOLD);
    }

    pub fn press_for(&self, button: Button, at: Timestamp, hold: Duration) {
        self.presses.borrow_mut().push(Press { at, hold, button });
    }

    /// From `at` on, every query fails with [`Error::Interrupted`].
    pub fn interrupt_at(&self, at: Timestamp) {
        self.interrupt_at.set(Some(at));
    }

    fn held(&self) -> Result<Option<Button>> {
        let now = self.clock.now();
        if self.interrupt_at.get().is_some_and(|at| now >= at) {
            return Err(Error::Interrupted);
        }
        Ok(self
            .presses
            .borrow()
            .iter()
            .find(|p| p.at <= now && now < p.at + p.hold)
            .map(|p| p.button))
    }
}

impl InputSource for ScriptedInput {
    fn is_any_pressed(&mut self) -> Result<bool> {
        Ok(self.held()?.is_some())
    }

    fn pressed_button(&mut self) -> Result<Option<Button>> {
        self.held()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawnFrame {
    pub at: Timestamp,
    pub kind: &'static str,
    /// First line of the drawn text, if any.
    pub headline: Option<String>,
}

/// Records every refresh with the virtual time it happened at.
#[derive(Clone)]
pub struct RecordingDisplay {
    clock: ManualClock,
    frames: Rc<RefCell<Vec<DrawnFrame>>>,
    layouts: Rc<Cell<usize>>,
    fail_after: Rc<Cell<Option<usize>>>,
}

impl RecordingDisplay {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            frames: Rc::new(RefCell::new(Vec::new())),
            layouts: Rc::new(Cell::new(0)),
            fail_after: Rc::new(Cell::new(None)),
        }
    }

    /// Let `draws` more refreshes succeed, then fail every one after.
    pub fn fail_after(&self, draws: usize) {
        self.fail_after.set(Some(self.frames.borrow().len() + draws));
    }

    pub fn frames(&self) -> Vec<DrawnFrame> {
        self.frames.borrow().clone()
    }

    pub fn layout_count(&self) -> usize {
        self.layouts.get()
    }
}

impl DisplaySurface for RecordingDisplay {
    fn layout(&self, content: &CardContent) -> RenderedCard {
        self.layouts.set(self.layouts.get() + 1);
        RenderedCard {
            question: vec![content.front_text.clone()],
            romanization: vec![content.romanization.clone()],
            answer: vec![content.translation.clone()],
            notes: content.example.iter().cloned().collect(),
        }
    }

    fn draw(&mut self, frame: &Frame<'_>) -> Result<()> {
        let drawn = self.frames.borrow().len();
        if self.fail_after.get().is_some_and(|limit| drawn >= limit) {
            return Err(Error::hardware("display", "refresh failed"));
        }
        let headline = match frame {
            Frame::Banner { title, .. } => Some(title.to_string()),
            Frame::Question(card) | Frame::Answer(card) => card.question.first().cloned(),
        };
        self.frames.borrow_mut().push(DrawnFrame {
            at: self.clock.now(),
            kind: frame.kind(),
            headline,
        });
        Ok(())
    }
}
