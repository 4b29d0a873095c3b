//! Desk clock: the single source of "now" for SLA arithmetic.
//!
//! RULE: engine operations take `now` explicitly. Callers obtain it from a
//! Clock so tests and the runner can drive time deterministically.

use crate::types::Timestamp;
use chrono::{Duration, Utc};
use parking_lot::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Real wall-clock time.
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
        Self { current: Mutex::new(start) }
    }

    /// Advance by `minutes`. Returns the new instant.
    pub fn advance_minutes(&self, minutes: i64) -> Timestamp {
        let mut current = self.current.lock();
        *current += Duration::minutes(minutes);
        *current
    }

    pub fn set(&self, to: Timestamp) {
        *self.current.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.lock()
    }
}
