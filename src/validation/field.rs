//! Per-field rule evaluation.
//!
//! Pure: reads a [`FormField`] and returns a fresh verdict. Showing or
//! clearing the error is the session's job.

use std::num::IntErrorKind;

use crate::models::field::{Bounds, FieldKind, FormField};
use crate::models::verdict::{ValidationVerdict, Violation};
use crate::schedule::date_policy::{parse_date, MALFORMED_DATE_MESSAGE};
use crate::schedule::time::TimeOfDay;
use crate::schedule::time_range::MALFORMED_TIME_MESSAGE;

/// Evaluates required, length, numeric, and format rules for one field.
pub struct FieldValidator;

impl FieldValidator {
    /// Validate `field` against its declaration.
    ///
    /// Evaluation order:
    /// 1. Empty after trimming: invalid if required, otherwise valid (optional
    ///    fields are skipped).
    /// 2. Text: trimmed character count within bounds.
    /// 3. Integer: parses as a whole number within bounds.
    /// 4. Time of day / date: well-formed.
    #[must_use]
    pub fn validate(field: &FormField) -> ValidationVerdict {
        let value = field.raw_value().trim();

        if value.is_empty() {
            if field.is_required() {
                return ValidationVerdict::invalid(
                    Violation::RequiredFieldMissing,
                    format!("{} is required.", field.label()),
                );
            }
            return ValidationVerdict::valid();
        }

        match field.kind() {
            FieldKind::Text => check_length(field.label(), value, field.bounds()),
            FieldKind::Integer => check_integer(field.label(), value, field.bounds()),
            FieldKind::TimeOfDay => match TimeOfDay::parse(value) {
                Ok(_) => ValidationVerdict::valid(),
                Err(_) => ValidationVerdict::invalid(
                    Violation::MalformedTimeError,
                    MALFORMED_TIME_MESSAGE,
                ),
            },
            FieldKind::Date => match parse_date(value) {
                Ok(_) => ValidationVerdict::valid(),
                Err(_) => {
                    ValidationVerdict::invalid(Violation::MalformedDate, MALFORMED_DATE_MESSAGE)
                }
            },
        }
    }
}

fn check_length(label: &str, value: &str, bounds: Option<Bounds>) -> ValidationVerdict {
    let Some(bounds) = bounds else {
        return ValidationVerdict::valid();
    };
    let length = i64::try_from(value.chars().count()).unwrap_or(i64::MAX);

    if let Some(min) = bounds.min {
        if length < min {
            return ValidationVerdict::invalid(
                Violation::LengthOutOfBounds,
                format!("{label} must be at least {min} characters long."),
            );
        }
    }
    if let Some(max) = bounds.max {
        if length > max {
            return ValidationVerdict::invalid(
                Violation::LengthOutOfBounds,
                format!("{label} must be at most {max} characters."),
            );
        }
    }
    ValidationVerdict::valid()
}

fn check_integer(label: &str, value: &str, bounds: Option<Bounds>) -> ValidationVerdict {
    let not_whole = || {
        ValidationVerdict::invalid(
            Violation::NumericOutOfBounds,
            format!("{label} must be a whole number."),
        )
    };
    if value.starts_with('+') {
        return not_whole();
    }
    // Digits too large for i64 are still a whole number; saturate so the
    // bound checks below report them.
    let number = match value.parse::<i64>() {
        Ok(number) => number,
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => return not_whole(),
        },
    };
    let bounds = bounds.unwrap_or_default();

    if let Some(min) = bounds.min {
        if number < min {
            return ValidationVerdict::invalid(
                Violation::NumericOutOfBounds,
                format!("{label} must be at least {}.", group_thousands(min)),
            );
        }
    }
    if let Some(max) = bounds.max {
        if number > max {
            return ValidationVerdict::invalid(
                Violation::NumericOutOfBounds,
                format!("{label} cannot exceed {}.", group_thousands(max)),
            );
        }
    }
    ValidationVerdict::valid()
}

/// Render an integer with comma thousands separators (`10000` → `"10,000"`).
fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
