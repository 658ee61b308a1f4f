//! Clocks

use std::{cell::Cell, rc::Rc};

use jiff::{SignedDuration, Timestamp};

/// Source of the current wall time.
pub trait Clock {
    /// Current time
    fn now(&self) -> Timestamp;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle while the store
/// owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Timestamp>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }

    /// Move forward by `by`, saturating at [`Timestamp::MAX`].
    pub fn advance(&self, by: SignedDuration) {
        let next = self.now.get().checked_add(by).unwrap_or(Timestamp::MAX);

        self.now.set(next);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Timestamp::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_time() {
        let clock = ManualClock::default();
        let handle = clock.clone();

        handle.advance(SignedDuration::from_mins(3));

        assert_eq!(
            clock.now().duration_since(Timestamp::UNIX_EPOCH),
            SignedDuration::from_mins(3)
        );
    }

    #[test]
    fn advance_saturates() {
        let clock = ManualClock::new(Timestamp::MAX);

        clock.advance(SignedDuration::from_hours(1));

        assert_eq!(clock.now(), Timestamp::MAX);
    }
}
