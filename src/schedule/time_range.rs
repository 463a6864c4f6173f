//! Start/end time range validation.

use tracing::debug;

use crate::models::verdict::{ValidationVerdict, Violation};
use crate::schedule::time::{duration, EventDuration, TimeOfDay};

/// Message shown when either end of the range cannot be parsed.
pub const MALFORMED_TIME_MESSAGE: &str = "Please enter a valid time (HH:MM).";
/// Message shown when the end does not strictly follow the start.
pub const END_NOT_AFTER_START_MESSAGE: &str = "End time must be after start time.";

/// Outcome of a range check. `duration` is a display side output and is only
/// present when the range is valid and both ends were filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeCheck {
    /// Pass/fail verdict for the range.
    pub verdict: ValidationVerdict,
    /// Derived event length, for the duration hint.
    pub duration: Option<EventDuration>,
}

impl RangeCheck {
    fn pass(duration: Option<EventDuration>) -> Self {
        Self {
            verdict: ValidationVerdict::valid(),
            duration,
        }
    }

    fn fail(violation: Violation, message: &str) -> Self {
        Self {
            verdict: ValidationVerdict::invalid(violation, message),
            duration: None,
        }
    }
}

/// Validates that an end time strictly follows a start time.
pub struct TimeRangeValidator;

impl TimeRangeValidator {
    /// Check the `start`..`end` range.
    ///
    /// Evaluation order:
    /// 1. Both empty: valid, the range is optional until both are filled.
    /// 2. Only one filled: valid, the missing end is a required-field concern.
    /// 3. Either malformed: invalid with a generic time message.
    /// 4. `end <= start`: invalid, zero-length events are rejected.
    /// 5. Otherwise valid, with the derived duration attached.
    #[must_use]
    pub fn validate(start: &str, end: &str) -> RangeCheck {
        let start = start.trim();
        let end = end.trim();

        if start.is_empty() || end.is_empty() {
            return RangeCheck::pass(None);
        }

        let (Ok(start_time), Ok(end_time)) = (TimeOfDay::parse(start), TimeOfDay::parse(end))
        else {
            debug!(start, end, "malformed time in range");
            return RangeCheck::fail(Violation::MalformedTimeError, MALFORMED_TIME_MESSAGE);
        };

        if end_time <= start_time {
            debug!(start, end, "end time does not follow start time");
            return RangeCheck::fail(Violation::EndNotAfterStart, END_NOT_AFTER_START_MESSAGE);
        }

        RangeCheck::pass(Some(duration(start_time.minutes(), end_time.minutes())))
    }
}
