//! Time-of-day arithmetic.
//!
//! Wall-clock strings are reduced to minutes since midnight so they can be
//! compared and subtracted. Only same-day ranges exist here: nothing wraps
//! past midnight.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::{AppError, Result};

const MINUTES_PER_HOUR: u16 = 60;

/// Minutes since midnight, always within `0..=1439`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Parse an `HH:MM` string.
    ///
    /// Leading zeros are optional: `"09:05"` and `"9:5"` both yield 545.
    /// Each part must be one or two ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MalformedTime` if the string does not have exactly
    /// two `:`-separated numeric parts, or the hour is above 23, or the minute
    /// is above 59.
    pub fn parse(hhmm: &str) -> Result<Self> {
        let mut parts = hhmm.split(':');
        let (Some(hour), Some(minute), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(AppError::MalformedTime(format!(
                "expected HH:MM, got {hhmm:?}"
            )));
        };

        let hour = parse_part(hour, hhmm)?;
        let minute = parse_part(minute, hhmm)?;

        if hour > 23 {
            return Err(AppError::MalformedTime(format!(
                "hour {hour} out of range in {hhmm:?}"
            )));
        }
        if minute > 59 {
            return Err(AppError::MalformedTime(format!(
                "minute {minute} out of range in {hhmm:?}"
            )));
        }

        Ok(Self(hour * MINUTES_PER_HOUR + minute))
    }

    /// Minutes since midnight.
    #[must_use]
    pub fn minutes(self) -> u16 {
        self.0
    }
}

fn parse_part(part: &str, whole: &str) -> Result<u16> {
    if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::MalformedTime(format!(
            "expected HH:MM, got {whole:?}"
        )));
    }
    part.parse::<u16>()
        .map_err(|err| AppError::MalformedTime(format!("{whole:?}: {err}")))
}

/// Convert an `HH:MM` string to minutes since midnight.
///
/// # Errors
///
/// Returns `AppError::MalformedTime` under the same conditions as
/// [`TimeOfDay::parse`].
pub fn to_minutes(hhmm: &str) -> Result<u16> {
    TimeOfDay::parse(hhmm).map(TimeOfDay::minutes)
}

/// Length of an event split into whole hours and leftover minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventDuration {
    /// Whole hours.
    pub hours: u16,
    /// Remaining minutes, `0..=59`.
    pub minutes: u16,
}

impl EventDuration {
    /// Total length in minutes.
    #[must_use]
    pub fn total_minutes(self) -> u16 {
        self.hours * MINUTES_PER_HOUR + self.minutes
    }
}

impl Display for EventDuration {
    /// Renders as `"2 hours"`, `"1 hour 30 minutes"`, or `"45 minutes"`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let hours = match self.hours {
            0 => None,
            1 => Some("1 hour".to_owned()),
            n => Some(format!("{n} hours")),
        };
        let minutes = match self.minutes {
            0 => None,
            1 => Some("1 minute".to_owned()),
            n => Some(format!("{n} minutes")),
        };

        match (hours, minutes) {
            (Some(h), Some(m)) => write!(f, "{h} {m}"),
            (Some(h), None) => f.write_str(&h),
            (None, Some(m)) => f.write_str(&m),
            (None, None) => f.write_str("0 minutes"),
        }
    }
}

/// Duration between two same-day times given in minutes since midnight.
///
/// The caller checks `end > start` first (see
/// [`crate::schedule::time_range::TimeRangeValidator`]); an inverted range
/// yields a zero duration rather than wrapping.
#[must_use]
pub fn duration(start_minutes: u16, end_minutes: u16) -> EventDuration {
    let span = end_minutes.saturating_sub(start_minutes);
    EventDuration {
        hours: span / MINUTES_PER_HOUR,
        minutes: span % MINUTES_PER_HOUR,
    }
}
