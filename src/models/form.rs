//! Form schema model and the built-in event forms.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models::field::{Bounds, FieldKind, FieldSpec};
use crate::{AppError, Result};

/// Which scheduling flow a form belongs to. Selects the date lead-time policy.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    /// First-time event request submitted by a department.
    #[default]
    NewRequest,
    /// Administrative edit of a pending request.
    Edit,
    /// Rescheduling of an approved event.
    Postpone,
}

/// Identifier of the built-in new-request form.
pub const REQUEST_EVENT_FORM: &str = "request_event";
/// Identifier of the built-in edit form.
pub const EDIT_REQUEST_FORM: &str = "edit_request";
/// Identifier of the built-in postpone form.
pub const POSTPONE_EVENT_FORM: &str = "postpone_event";

/// Declaration of one form: its fields in document order plus the names of
/// the fields that take part in cross-field checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FormSchema {
    /// Form identifier.
    pub id: String,
    /// Scheduling flow, which selects the date policy.
    #[serde(default)]
    pub mode: FormMode,
    /// Fields in document order.
    pub fields: Vec<FieldSpec>,
    /// Field checked against the date policy.
    #[serde(default)]
    pub date_field: Option<String>,
    /// Start of the time range.
    #[serde(default)]
    pub start_time_field: Option<String>,
    /// End of the time range; range errors are shown here.
    #[serde(default)]
    pub end_time_field: Option<String>,
}

impl FormSchema {
    /// The department event request form.
    #[must_use]
    pub fn request_event() -> Self {
        Self {
            id: REQUEST_EVENT_FORM.into(),
            mode: FormMode::NewRequest,
            fields: event_fields(),
            date_field: Some("date".into()),
            start_time_field: Some("start_time".into()),
            end_time_field: Some("end_time".into()),
        }
    }

    /// The pending-request edit form. Same fields, rescheduling lead time.
    #[must_use]
    pub fn edit_request() -> Self {
        Self {
            id: EDIT_REQUEST_FORM.into(),
            mode: FormMode::Edit,
            ..Self::request_event()
        }
    }

    /// The approved-event postpone form.
    #[must_use]
    pub fn postpone_event() -> Self {
        Self {
            id: POSTPONE_EVENT_FORM.into(),
            mode: FormMode::Postpone,
            fields: vec![
                FieldSpec::new("new_date", "New date", FieldKind::Date).required(),
                FieldSpec::new("new_start_time", "New start time", FieldKind::TimeOfDay)
                    .required(),
                FieldSpec::new("new_end_time", "New end time", FieldKind::TimeOfDay).required(),
                FieldSpec::new("reason", "Reason", FieldKind::Text).with_bounds(Bounds::at_most(500)),
            ],
            date_field: Some("new_date".into()),
            start_time_field: Some("new_start_time".into()),
            end_time_field: Some("new_end_time".into()),
        }
    }

    /// Look up a built-in form by identifier.
    #[must_use]
    pub fn builtin(id: &str) -> Option<Self> {
        match id {
            REQUEST_EVENT_FORM => Some(Self::request_event()),
            EDIT_REQUEST_FORM => Some(Self::edit_request()),
            POSTPONE_EVENT_FORM => Some(Self::postpone_event()),
            _ => None,
        }
    }

    /// Field declaration by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check that field names are unique and that cross-field references
    /// point at fields of the right kind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` describing the first inconsistency found.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(AppError::Config("form id must not be empty".into()));
        }

        for (idx, field) in self.fields.iter().enumerate() {
            if self.fields[..idx].iter().any(|f| f.name == field.name) {
                return Err(AppError::Config(format!(
                    "form {}: duplicate field {}",
                    self.id, field.name
                )));
            }
            if let Some(Bounds {
                min: Some(min),
                max: Some(max),
            }) = field.bounds
            {
                if min > max {
                    return Err(AppError::Config(format!(
                        "form {}: field {} has min {min} greater than max {max}",
                        self.id, field.name
                    )));
                }
            }
        }

        self.check_reference(self.date_field.as_deref(), FieldKind::Date, "date_field")?;
        self.check_reference(
            self.start_time_field.as_deref(),
            FieldKind::TimeOfDay,
            "start_time_field",
        )?;
        self.check_reference(
            self.end_time_field.as_deref(),
            FieldKind::TimeOfDay,
            "end_time_field",
        )?;

        if self.start_time_field.is_some() != self.end_time_field.is_some() {
            return Err(AppError::Config(format!(
                "form {}: start_time_field and end_time_field must be set together",
                self.id
            )));
        }

        Ok(())
    }

    fn check_reference(&self, name: Option<&str>, kind: FieldKind, key: &str) -> Result<()> {
        let Some(name) = name else {
            return Ok(());
        };
        match self.field(name) {
            Some(spec) if spec.kind == kind => Ok(()),
            Some(spec) => Err(AppError::Config(format!(
                "form {}: {key} {name} is {:?}, expected {kind:?}",
                self.id, spec.kind
            ))),
            None => Err(AppError::Config(format!(
                "form {}: {key} {name} is not a declared field",
                self.id
            ))),
        }
    }
}

fn event_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("event_name", "Event name", FieldKind::Text)
            .required()
            .with_bounds(Bounds::between(3, 100)),
        FieldSpec::new("description", "Description", FieldKind::Text)
            .with_bounds(Bounds::at_most(500)),
        FieldSpec::new("location", "Location", FieldKind::Text)
            .required()
            .with_bounds(Bounds::at_least(3)),
        FieldSpec::new("date", "Event date", FieldKind::Date).required(),
        FieldSpec::new("start_time", "Start time", FieldKind::TimeOfDay).required(),
        FieldSpec::new("end_time", "End time", FieldKind::TimeOfDay).required(),
        FieldSpec::new("participant_limit", "Participant limit", FieldKind::Integer)
            .required()
            .with_bounds(Bounds::between(1, 10_000)),
    ]
}
