//! Wall-clock source for date policy evaluation.
//!
//! Sessions read the clock on every validation rather than caching "today",
//! so a form left open across midnight is judged against the new date.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Supplies the reference instant used by date constraint checks.
pub trait Clock: Send + Sync {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;
}

/// Reads the host's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock pinned to a single instant. Used by the CLI `--today` flag and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(NaiveDateTime);

impl FixedClock {
    /// Pin the clock to `now`.
    #[must_use]
    pub fn new(now: NaiveDateTime) -> Self {
        Self(now)
    }

    /// Pin the clock to midday on `date`.
    #[must_use]
    pub fn on_date(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
