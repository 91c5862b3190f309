use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::device::{Button, InputSource};
use crate::error::{Error, Result};

/// Without release events a key is treated as held for this long after its
/// press is read.
pub const HOLD_WINDOW: Duration = Duration::from_millis(150);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Button(Button),
    Press,
    Quit,
}

pub fn classify(key: &KeyEvent) -> Option<KeyAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(KeyAction::Quit);
    }
    let action = match key.code {
        KeyCode::Char('1') => KeyAction::Button(Button::Easy),
        KeyCode::Char('2') => KeyAction::Button(Button::Medium),
        KeyCode::Char('3') => KeyAction::Button(Button::Hard),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
        _ => KeyAction::Press,
    };
    Some(action)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HeldKey {
    Button(Button),
    Other,
}

/// Emulated key state. Press and repeat events restart the window.
#[derive(Debug)]
struct HoldTracker {
    window: Duration,
    held: Option<(HeldKey, Instant)>,
    quit: bool,
}

impl HoldTracker {
    fn new(window: Duration) -> Self {
        Self {
            window,
            held: None,
            quit: false,
        }
    }

    fn record(&mut self, action: KeyAction, at: Instant) {
        match action {
            KeyAction::Quit => self.quit = true,
            KeyAction::Button(button) => self.held = Some((HeldKey::Button(button), at)),
            KeyAction::Press => self.held = Some((HeldKey::Other, at)),
        }
    }

    fn current(&mut self, now: Instant) -> Result<Option<HeldKey>> {
        if self.quit {
            return Err(Error::Interrupted);
        }
        if let Some((key, since)) = self.held {
            if now.saturating_duration_since(since) <= self.window {
                return Ok(Some(key));
            }
            self.held = None;
        }
        Ok(None)
    }
}

/// The keyboard standing in for the three buttons.
pub struct TerminalInput {
    tracker: HoldTracker,
}

impl TerminalInput {
    /// `tick` is the poll interval the session uses; the hold window is
    /// stretched to cover a debounce sleep of that length.
    pub fn new(tick: Duration) -> Self {
        Self {
            tracker: HoldTracker::new(HOLD_WINDOW.max(tick * 2)),
        }
    }

    fn drain(&mut self) -> Result<()> {
        while event::poll(Duration::ZERO).map_err(|e| Error::hardware("keyboard", e))? {
            let ev = event::read().map_err(|e| Error::hardware("keyboard", e))?;
            if let Event::Key(key) = ev {
                if let Some(action) = classify(&key) {
                    tracing::trace!(?action, "key");
                    self.tracker.record(action, Instant::now());
                }
            }
        }
        Ok(())
    }

    fn held(&mut self) -> Result<Option<HeldKey>> {
        self.drain()?;
        self.tracker.current(Instant::now())
    }
}

impl InputSource for TerminalInput {
    fn is_any_pressed(&mut self) -> Result<bool> {
        Ok(self.held()?.is_some())
    }

    fn pressed_button(&mut self) -> Result<Option<Button>> {
        Ok(match self.held()? {
            Some(HeldKey::Button(button)) => Some(button),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_digit_keys_are_buttons() {
        assert_eq!(
            classify(&key(KeyCode::Char('1'))),
            Some(KeyAction::Button(Button::Easy))
        );
        assert_eq!(
            classify(&key(KeyCode::Char('2'))),
            Some(KeyAction::Button(Button::Medium))
        );
        assert_eq!(
            classify(&key(KeyCode::Char('3'))),
            Some(KeyAction::Button(Button::Hard))
        );
        assert_eq!(classify(&key(KeyCode::Char(' '))), Some(KeyAction::Press));
        assert_eq!(classify(&key(KeyCode::Enter)), Some(KeyAction::Press));
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(classify(&key(KeyCode::Esc)), Some(KeyAction::Quit));
        assert_eq!(classify(&key(KeyCode::Char('q'))), Some(KeyAction::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(classify(&ctrl_c), Some(KeyAction::Quit));
        assert_eq!(classify(&key(KeyCode::Char('c'))), Some(KeyAction::Press));
    }

    #[test]
    fn test_release_events_ignored() {
        let mut release = key(KeyCode::Char('1'));
        release.kind = KeyEventKind::Release;
        assert_eq!(classify(&release), None);
    }

    #[test]
    fn test_key_held_for_window() {
        let start = Instant::now();
        let mut tracker = HoldTracker::new(HOLD_WINDOW);
        tracker.record(KeyAction::Button(Button::Medium), start);
        assert_eq!(
            tracker.current(start + Duration::from_millis(100)).unwrap(),
            Some(HeldKey::Button(Button::Medium))
        );
        assert_eq!(tracker.current(start + Duration::from_millis(200)).unwrap(), None);
    }

    #[test]
    fn test_repeat_extends_hold() {
        let start = Instant::now();
        let mut tracker = HoldTracker::new(HOLD_WINDOW);
        tracker.record(KeyAction::Press, start);
        tracker.record(KeyAction::Press, start + Duration::from_millis(120));
        assert_eq!(
            tracker.current(start + Duration::from_millis(250)).unwrap(),
            Some(HeldKey::Other)
        );
    }

    #[test]
    fn test_quit_sticks() {
        let start = Instant::now();
        let mut tracker = HoldTracker::new(HOLD_WINDOW);
        tracker.record(KeyAction::Quit, start);
        assert!(matches!(tracker.current(start), Err(Error::Interrupted)));
        assert!(matches!(
            tracker.current(start + Duration::from_secs(5)),
            Err(Error::Interrupted)
        ));
    }

    #[test]
    fn test_window_covers_slow_ticks() {
        let input = TerminalInput::new(Duration::from_millis(250));
        assert_eq!(input.tracker.window, Duration::from_millis(500));
        let input = TerminalInput::new(Duration::from_millis(50));
        assert_eq!(input.tracker.window, HOLD_WINDOW);
    }
}
