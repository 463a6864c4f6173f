//! Minimum-date policy per form mode.
//!
//! New requests need a week of lead time; edits and postponements only need
//! to land on a future day. The minimum is recomputed from the reference
//! instant on every call and never cached.

use chrono::{Days, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::config::SchedulingConfig;
use crate::models::form::FormMode;
use crate::models::verdict::{ValidationVerdict, Violation};
use crate::{AppError, Result};

/// Inputs needed to decide the earliest acceptable date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateConstraintContext {
    /// Which flow the form belongs to.
    pub mode: FormMode,
    /// The instant "today" is measured from.
    pub reference_now: NaiveDateTime,
}

impl DateConstraintContext {
    /// Build a context for `mode` evaluated at `reference_now`.
    #[must_use]
    pub fn new(mode: FormMode, reference_now: NaiveDateTime) -> Self {
        Self {
            mode,
            reference_now,
        }
    }
}

/// Lead-time rules for event dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateConstraintPolicy {
    new_request_lead_days: u32,
    reschedule_lead_days: u32,
}

impl Default for DateConstraintPolicy {
    fn default() -> Self {
        Self::from_config(&SchedulingConfig::default())
    }
}

impl DateConstraintPolicy {
    /// Build the policy from configured lead times.
    #[must_use]
    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self {
            new_request_lead_days: config.new_request_lead_days,
            reschedule_lead_days: config.reschedule_lead_days,
        }
    }

    /// Days of lead time required for `mode`.
    #[must_use]
    pub fn lead_days(&self, mode: FormMode) -> u32 {
        match mode {
            FormMode::NewRequest => self.new_request_lead_days,
            FormMode::Edit | FormMode::Postpone => self.reschedule_lead_days,
        }
    }

    /// Earliest acceptable calendar day for the context.
    #[must_use]
    pub fn minimum_date(&self, ctx: &DateConstraintContext) -> NaiveDate {
        let today = ctx.reference_now.date();
        today
            .checked_add_days(Days::new(u64::from(self.lead_days(ctx.mode))))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Check a candidate day against the minimum. Only the calendar day is
    /// compared; use [`Self::validate_instant`] for values carrying a time.
    #[must_use]
    pub fn validate(&self, candidate: NaiveDate, ctx: &DateConstraintContext) -> ValidationVerdict {
        let minimum = self.minimum_date(ctx);
        if candidate < minimum {
            debug!(%candidate, %minimum, mode = ?ctx.mode, "date before policy minimum");
            return ValidationVerdict::invalid(Violation::DateTooEarly, self.message(ctx.mode));
        }
        ValidationVerdict::valid()
    }

    /// Check a candidate instant, ignoring its time of day.
    #[must_use]
    pub fn validate_instant(
        &self,
        candidate: NaiveDateTime,
        ctx: &DateConstraintContext,
    ) -> ValidationVerdict {
        self.validate(candidate.date(), ctx)
    }

    /// Parse and check a `YYYY-MM-DD` string. Unparseable input yields an
    /// invalid verdict rather than an error.
    #[must_use]
    pub fn validate_str(&self, raw: &str, ctx: &DateConstraintContext) -> ValidationVerdict {
        match parse_date(raw) {
            Ok(date) => self.validate(date, ctx),
            Err(_) => ValidationVerdict::invalid(Violation::MalformedDate, MALFORMED_DATE_MESSAGE),
        }
    }

    fn message(&self, mode: FormMode) -> String {
        let days = self.lead_days(mode);
        match (mode, days) {
            (FormMode::NewRequest, 1) => "Event date must be at least 1 day from today.".into(),
            (FormMode::NewRequest, n) => {
                format!("Event date must be at least {n} days from today.")
            }
            (_, 1) => "Please select a future date.".into(),
            (_, n) => format!("Please select a date at least {n} days from today."),
        }
    }
}

/// Message shown for a date that cannot be parsed.
pub const MALFORMED_DATE_MESSAGE: &str = "Please enter a valid date (YYYY-MM-DD).";

/// Parse a `YYYY-MM-DD` date string as produced by a date input.
///
/// # Errors
///
/// Returns `AppError::MalformedDate` if the string is not a valid calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| AppError::MalformedDate(format!("{raw:?}: {err}")))
}

/// Long-form rendering used for the date info hint, e.g.
/// `"Monday, October 26, 2026"`.
#[must_use]
pub fn describe_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}
