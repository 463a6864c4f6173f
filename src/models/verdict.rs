//! Validation verdict model.

use serde::Serialize;

/// Classification of a failed check. Every variant is recoverable by the user
/// correcting the offending value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    /// A required field was empty after trimming.
    RequiredFieldMissing,
    /// Trimmed text length fell outside the configured bounds.
    LengthOutOfBounds,
    /// Integer value was unparseable or outside the configured bounds.
    NumericOutOfBounds,
    /// Time-of-day text was not a well-formed `HH:MM` value.
    MalformedTimeError,
    /// Date text was not a well-formed `YYYY-MM-DD` value.
    MalformedDate,
    /// Date falls before the minimum allowed for the form mode.
    DateTooEarly,
    /// End time does not strictly follow start time.
    EndNotAfterStart,
}

/// Result of one validation check.
///
/// Produced fresh per evaluation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationVerdict {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    violation: Option<Violation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl ValidationVerdict {
    /// A passing verdict.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            valid: true,
            violation: None,
            message: None,
        }
    }

    /// A failing verdict with a user-facing message.
    #[must_use]
    pub fn invalid(violation: Violation, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            violation: Some(violation),
            message: Some(message.into()),
        }
    }

    /// Whether the check passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Failure classification, if the check failed.
    #[must_use]
    pub fn violation(&self) -> Option<Violation> {
        self.violation
    }

    /// User-facing message, if the check failed.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
