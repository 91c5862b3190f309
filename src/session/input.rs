//! Poll-and-debounce waits on the buttons.
//!
//! Every wait first lets go of any button still held from the previous
//! interaction, then polls at `tick` for a new press. Deadlines are computed
//! once, from the clock reading at the start of the wait.

use std::time::Duration;

use crate::clock::{Clock, Timestamp};
use crate::device::InputSource;
use crate::engine::card::Response;
use crate::error::Result;

fn past(clock: &impl Clock, deadline: Option<Timestamp>) -> bool {
    deadline.is_some_and(|d| clock.now() >= d)
}

/// Returns false if the deadline passed first.
pub fn wait_for_release(
    input: &mut impl InputSource,
    clock: &impl Clock,
    tick: Duration,
    deadline: Option<Timestamp>,
) -> Result<bool> {
    while input.is_any_pressed()? {
        if past(clock, deadline) {
            tracing::debug!("timed out waiting for buttons to be released");
            return Ok(false);
        }
        clock.sleep(tick);
    }
    Ok(true)
}

/// Returns false if the deadline passed first.
pub fn wait_for_press(
    input: &mut impl InputSource,
    clock: &impl Clock,
    tick: Duration,
    deadline: Option<Timestamp>,
) -> Result<bool> {
    while !input.is_any_pressed()? {
        if past(clock, deadline) {
            tracing::debug!("timed out waiting for a button press");
            return Ok(false);
        }
        clock.sleep(tick);
    }
    Ok(true)
}

/// Wait for a fresh press of any button. `false` on timeout.
pub fn wait_for_any_press(
    input: &mut impl InputSource,
    clock: &impl Clock,
    tick: Duration,
    timeout: Option<Duration>,
) -> Result<bool> {
    let deadline = timeout.map(|t| clock.now() + t);
    if !wait_for_release(input, clock, tick, deadline)? {
        return Ok(false);
    }
    if !wait_for_press(input, clock, tick, deadline)? {
        return Ok(false);
    }
    clock.sleep(tick);
    Ok(true)
}

/// Wait for one of the three rating buttons. `None` on timeout.
pub fn poll_response(
    input: &mut impl InputSource,
    clock: &impl Clock,
    tick: Duration,
    timeout: Option<Duration>,
) -> Result<Option<Response>> {
    let deadline = timeout.map(|t| clock.now() + t);
    loop {
        if !wait_for_release(input, clock, tick, deadline)? {
            return Ok(None);
        }
        if !wait_for_press(input, clock, tick, deadline)? {
            return Ok(None);
        }
        clock.sleep(tick);
        // A press that is gone after the debounce was a bounce.
        if let Some(button) = input.pressed_button()? {
            return Ok(Some(button.response()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Button;
    use crate::device::sim::{ManualClock, ScriptedInput};
    use crate::error::Error;

    const TICK: Duration = Duration::from_millis(100);

    fn rig() -> (ManualClock, ScriptedInput) {
        let clock = ManualClock::default();
        let input = ScriptedInput::new(clock.clone());
        (clock, input)
    }

    #[test]
    fn test_response_read_after_debounce() {
        let (clock, mut input) = rig();
        input.press(Button::Easy, Timestamp::from_secs(3));
        let response = poll_response(&mut input, &clock, TICK, None).unwrap();
        assert_eq!(response, Some(Response::Easy));
        assert!(clock.now() >= Timestamp::from_secs(3));
        assert!(clock.now() < Timestamp::from_millis(3_300));
    }

    #[test]
    fn test_huge_timeout_behaves_as_unbounded() {
        let (clock, mut input) = rig();
        input.press(Button::Medium, Timestamp::from_secs(2));
        let response = poll_response(&mut input, &clock, TICK, Some(Duration::MAX)).unwrap();
        assert_eq!(response, Some(Response::Medium));
        input.press(Button::Easy, Timestamp::from_secs(5));
        let revealed = wait_for_any_press(&mut input, &clock, TICK, Some(Duration::MAX)).unwrap();
        assert!(revealed);
        assert!(clock.now() >= Timestamp::from_secs(5));
    }

    #[test]
    fn test_response_times_out() {
        let (clock, mut input) = rig();
        let response =
            poll_response(&mut input, &clock, TICK, Some(Duration::from_secs(5))).unwrap();
        assert_eq!(response, None);
        assert_eq!(clock.now(), Timestamp::from_secs(5));
    }

    #[test]
    fn test_held_button_must_be_released_first() {
        let (clock, mut input) = rig();
        // Still held from the reveal press, then a fresh press of Medium.
        input.press_for(Button::Hard, Timestamp::ZERO, Duration::from_secs(2));
        input.press(Button::Medium, Timestamp::from_secs(4));
        let response = poll_response(&mut input, &clock, TICK, None).unwrap();
        assert_eq!(response, Some(Response::Medium));
    }

    #[test]
    fn test_bounce_is_ignored() {
        let (clock, mut input) = rig();
        input.press_for(Button::Easy, Timestamp::from_secs(1), Duration::from_millis(50));
        input.press(Button::Hard, Timestamp::from_secs(2));
        let response = poll_response(&mut input, &clock, TICK, None).unwrap();
        assert_eq!(response, Some(Response::Hard));
    }

    #[test]
    fn test_any_press_with_and_without_timeout() {
        let (clock, mut input) = rig();
        assert!(!wait_for_any_press(&mut input, &clock, TICK, Some(Duration::from_secs(1))).unwrap());
        input.press(Button::Medium, Timestamp::from_secs(10));
        assert!(wait_for_any_press(&mut input, &clock, TICK, None).unwrap());
    }

    #[test]
    fn test_interrupt_propagates() {
        let (clock, mut input) = rig();
        input.interrupt_at(Timestamp::from_secs(1));
        let err = poll_response(&mut input, &clock, TICK, None).unwrap_err();
        assert!(matches!(err, Error::Interrupted));
    }
}
