//! Coalesced, cancellable deferred work
//!
//! The grid never blocks. Work that should settle first (scroll adjustment,
//! ensure-visible, relayout after resize) is parked in a [`DelayedTask`] and
//! run by whoever drives the event loop once its deadline passes. Scheduling
//! again before then replaces the pending request.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current time for deferred work
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// A single pending request with a deadline
#[derive(Debug, Clone)]
pub struct DelayedTask<T> {
    pending: Option<(Instant, T)>,
}

impl<T> DelayedTask<T> {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Schedule `payload` to fire `delay` after `now`, dropping any pending request
    pub fn delay(&mut self, now: Instant, delay: Duration, payload: T) {
        self.pending = Some((now + delay, payload));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(at, _)| *at)
    }

    /// Take the payload if its deadline has passed
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((at, _)) if *at <= now => self.pending.take().map(|(_, payload)| payload),
            _ => None,
        }
    }
}

impl<T> Default for DelayedTask<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_deadline() {
        let clock = ManualClock::new();
        let mut task = DelayedTask::new();
        task.delay(clock.now(), Duration::from_millis(50), 1);

        assert_eq!(task.take_due(clock.now()), None);
        clock.advance(Duration::from_millis(49));
        assert_eq!(task.take_due(clock.now()), None);
        clock.advance(Duration::from_millis(1));
        assert_eq!(task.take_due(clock.now()), Some(1));
        assert!(!task.is_pending());
    }

    #[test]
    fn test_later_request_replaces_pending() {
        let clock = ManualClock::new();
        let mut task = DelayedTask::new();
        task.delay(clock.now(), Duration::from_millis(50), "first");
        clock.advance(Duration::from_millis(30));
        task.delay(clock.now(), Duration::from_millis(50), "second");

        clock.advance(Duration::from_millis(30));
        assert_eq!(task.take_due(clock.now()), None);
        clock.advance(Duration::from_millis(20));
        assert_eq!(task.take_due(clock.now()), Some("second"));
        assert_eq!(task.take_due(clock.now()), None);
    }

    #[test]
    fn test_cancel() {
        let clock = ManualClock::new();
        let mut task = DelayedTask::new();
        task.delay(clock.now(), Duration::ZERO, ());
        task.cancel();
        assert_eq!(task.take_due(clock.now()), None);
    }
}
