//! Quiescence debouncer for the filter text box
//!
//! Time is passed in by the caller, so the event loop drives it from its tick
//! and tests drive it with fabricated instants.

use std::time::{Duration, Instant};

/// Delay between the last keystroke and applying the filter
pub const FILTER_DEBOUNCE: Duration = Duration::from_millis(150);

/// Holds the latest pushed value until nothing new arrived for `delay`
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending value and restart the delay
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Take the pending value if it has been quiet for long enough
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, pushed)) if now.saturating_duration_since(*pushed) >= self.delay => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Take the pending value immediately, e.g. on Enter
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Drop the pending value without emitting it
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, pushed)| *pushed + self.delay)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(FILTER_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_emits_only_after_quiescence() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(ms(150));

        debouncer.push("a", t0);
        assert_eq!(debouncer.poll(t0 + ms(149)), None);
        assert_eq!(debouncer.poll(t0 + ms(150)), Some("a"));
        assert_eq!(debouncer.poll(t0 + ms(500)), None);
    }

    #[test]
    fn test_latest_value_wins_and_restarts_delay() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(ms(150));

        debouncer.push("f".to_string(), t0);
        debouncer.push("fo".to_string(), t0 + ms(100));
        debouncer.push("foo".to_string(), t0 + ms(200));

        // 150ms after the first push, but only 50ms after the last
        assert_eq!(debouncer.poll(t0 + ms(250)), None);
        assert_eq!(debouncer.deadline(), Some(t0 + ms(350)));
        assert_eq!(debouncer.poll(t0 + ms(350)), Some("foo".to_string()));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_flush_and_cancel() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::default();
        assert_eq!(debouncer.delay(), FILTER_DEBOUNCE);

        debouncer.push(1, t0);
        assert_eq!(debouncer.flush(), Some(1));
        assert_eq!(debouncer.flush(), None);

        debouncer.push(2, t0);
        debouncer.cancel();
        assert_eq!(debouncer.poll(t0 + ms(1_000)), None);
    }

    #[test]
    fn test_clock_going_backwards_does_not_fire() {
        let t0 = Instant::now() + ms(1_000);
        let mut debouncer = Debouncer::new(ms(150));
        debouncer.push((), t0);
        assert_eq!(debouncer.poll(t0 - ms(500)), None);
        assert!(debouncer.is_pending());
    }
}
