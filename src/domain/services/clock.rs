//! # Clock
//!
//! Injectable time source. Tracking synthesis depends only on the tracking
//! number and "now", so tests pin "now" with a [`ManualClock`].

use crate::domain::value_objects::timestamp::Timestamp;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of the current time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
///
/// # Examples
///
/// ```
/// use shipping_engine::domain::services::clock::{Clock, ManualClock};
/// use shipping_engine::domain::value_objects::Timestamp;
///
/// let start = Timestamp::from_secs(1_700_000_000).unwrap();
/// let clock = ManualClock::new(start);
/// clock.advance_secs(3600);
/// assert_eq!(clock.now(), start.add_hours(1));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    /// Moves the clock to `at`.
    pub fn set(&self, at: Timestamp) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }

    /// Moves the clock forward by `secs` seconds.
    pub fn advance_secs(&self, secs: i64) {
        self.millis
            .fetch_add(secs.saturating_mul(1000), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let millis = self.millis.load(Ordering::SeqCst);
        Timestamp::from_millis(millis).unwrap_or_else(Timestamp::now)
    }
}
