use std::cell::Cell;
use std::ops::Add;
use std::thread;
use std::time::Duration;

use chrono::Utc;

/// A reading of the monotonic clock, measured from an arbitrary fixed origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Duration);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(Duration::ZERO);

    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// Whole seconds since the origin. This is the resolution cards are stored at.
    pub fn as_secs(self) -> u64 {
        self.0.as_secs()
    }

    pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

/// Saturates at the far end of the timeline, so an unbounded timeout
/// expressed as a huge `Duration` simply never expires.
impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0.saturating_add(rhs))
    }
}

pub trait Clock {
    fn now(&self) -> Timestamp;

    /// Suspend the control loop. Every wait in the crate is built from short
    /// calls to this, so a simulated clock can advance time instead.
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Wall clock in Unix milliseconds, forced to never run backwards.
///
/// Card timestamps are persisted, so the origin has to survive restarts;
/// a process-local `Instant` would not.
pub struct SystemClock {
    last: Cell<Timestamp>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            last: Cell::new(Timestamp::ZERO),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        let reading = Timestamp::from_millis(millis).max(self.last.get());
        self.last.set(reading);
        reading
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_never_goes_backwards() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(a.as_secs() > 1_600_000_000);
    }

    #[test]
    fn test_saturating_duration_since() {
        let early = Timestamp::from_secs(10);
        let late = Timestamp::from_secs(25);
        assert_eq!(late.saturating_duration_since(early), Duration::from_secs(15));
        assert_eq!(early.saturating_duration_since(late), Duration::ZERO);
    }

    #[test]
    fn test_whole_seconds_truncate() {
        assert_eq!(Timestamp::from_millis(4_999).as_secs(), 4);
        assert_eq!((Timestamp::from_secs(1) + Duration::from_millis(500)).as_secs(), 1);
    }

    #[test]
    fn test_adding_huge_duration_saturates() {
        let far = Timestamp::from_secs(10) + Duration::MAX;
        assert_eq!(far, Timestamp(Duration::MAX));
        assert!(far > Timestamp::from_secs(u64::MAX / 2));
        assert_eq!(far + Duration::from_secs(1), far);
    }
}
