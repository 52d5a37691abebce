//! Injectable time source.
//!
//! Every expiry decision in the claim protocol is made against a `now` taken
//! from a [`Clock`], so tests can move time past a claim's expiry without
//! sleeping.

use std::sync::Mutex;

use chrono::Utc;

use crate::types::Timestamp;

/// A source of the current UTC time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: chrono::Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }

    /// Jump the clock to an absolute instant.
    pub fn set(&self, at: Timestamp) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = at;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_only_moves_on_advance() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(chrono::Duration::minutes(6));
        assert_eq!(clock.now(), start + chrono::Duration::minutes(6));
    }

    #[test]
    fn manual_clock_set_jumps() {
        let clock = ManualClock::default();
        let target = Utc::now() + chrono::Duration::days(1);
        clock.set(target);
        assert_eq!(clock.now(), target);
    }
}
