use std::time::Duration;

use crate::clock::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ShowingQuestion,
    AwaitingReveal,
    ShowingAnswer,
    AwaitingResponse,
    Rescheduling,
}

/// Where one presentation cycle currently stands.
#[derive(Clone, Debug)]
pub struct SessionState {
    pub phase: Phase,
    pub active: Option<usize>,
    pub entered_at: Option<Timestamp>,
    pub deadline: Option<Timestamp>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            active: None,
            entered_at: None,
            deadline: None,
        }
    }
}

impl SessionState {
    pub fn begin(&mut self, index: usize, now: Timestamp) {
        self.active = Some(index);
        self.enter(Phase::Idle, now, None);
    }

    pub fn enter(&mut self, phase: Phase, now: Timestamp, timeout: Option<Duration>) {
        tracing::debug!(from = ?self.phase, to = ?phase, "session phase");
        self.phase = phase;
        self.entered_at = Some(now);
        self.deadline = timeout.map(|t| now + t);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle && self.active.is_none()
    }
}
