//! Cancellable deferred work driven by an explicit clock.
//!
//! Nothing here owns a timer. The host calls [`ChartApi::tick`](crate::ChartApi::tick)
//! from its event loop (an iced `time::every` subscription, a frame callback, ...) and
//! each slot fires once its deadline has passed.
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use iced::time::Instant;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl ManualClock {
    pub fn new(start: Instant) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A single deferred slot. Scheduling again replaces the pending deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Debounce {
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True while the deadline has not been reached yet.
    pub fn is_active(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now < deadline)
    }

    /// Consume the slot if its deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescheduling_replaces_pending_deadline() {
        let clock = ManualClock::default();
        let mut slot = Debounce::default();
        slot.schedule(clock.now(), Duration::from_millis(10));
        clock.advance(Duration::from_millis(8));
        slot.schedule(clock.now(), Duration::from_millis(10));
        clock.advance(Duration::from_millis(8));
        assert!(!slot.fire_if_due(clock.now()));
        clock.advance(Duration::from_millis(2));
        assert!(slot.fire_if_due(clock.now()));
        assert!(!slot.fire_if_due(clock.now()));
    }

    #[test]
    fn cancelled_slot_never_fires() {
        let clock = ManualClock::default();
        let mut slot = Debounce::default();
        slot.schedule(clock.now(), Duration::from_millis(1));
        slot.cancel();
        clock.advance(Duration::from_millis(5));
        assert!(!slot.fire_if_due(clock.now()));
        assert!(!slot.is_pending());
    }
}
