//! Wall-clock seam.
//!
//! The outcome branch is keyed off the sub-second clock reading, so tests
//! swap [`SystemClock`] for a [`FixedClock`] to force each branch.

use chrono::{Local, NaiveTime};

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Always reports the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(NaiveTime);

impl FixedClock {
    #[must_use]
    pub const fn new(time: NaiveTime) -> Self {
        Self(time)
    }

    /// Noon plus `millis % 1000` milliseconds.
    #[must_use]
    pub fn at_millis(millis: u32) -> Self {
        Self(NaiveTime::from_hms_milli_opt(12, 0, 0, millis % 1_000).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}
