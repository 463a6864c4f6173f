//! Form field model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field name to raw value, as read from a form or stored in a draft.
pub type FieldValues = BTreeMap<String, String>;

/// Input kind of a form control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text (`input`, `textarea`).
    #[default]
    Text,
    /// Calendar date in `YYYY-MM-DD` form.
    Date,
    /// Wall-clock time in `HH:MM` form.
    TimeOfDay,
    /// Whole number.
    Integer,
}

/// Inclusive lower/upper limits. For text these bound the trimmed character
/// count; for integers they bound the parsed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct Bounds {
    /// Smallest accepted length or value.
    #[serde(default)]
    pub min: Option<i64>,
    /// Largest accepted length or value.
    #[serde(default)]
    pub max: Option<i64>,
}

impl Bounds {
    /// Bounds with both ends set.
    #[must_use]
    pub fn between(min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Bounds with only a lower end.
    #[must_use]
    pub fn at_least(min: i64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Bounds with only an upper end.
    #[must_use]
    pub fn at_most(max: i64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }
}

/// Static description of a field as declared by a form schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FieldSpec {
    /// Control name, unique within the form.
    pub name: String,
    /// Human label used in messages.
    pub label: String,
    /// Input kind.
    #[serde(default)]
    pub kind: FieldKind,
    /// Whether an empty value is rejected.
    #[serde(default)]
    pub required: bool,
    /// Optional length or value bounds.
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

impl FieldSpec {
    /// A field spec with no requirement and no bounds.
    #[must_use]
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
            kind,
            required: false,
            bounds: None,
        }
    }

    /// Mark the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach bounds.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

/// A live field: its declaration plus the value currently in the control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    spec: FieldSpec,
    raw_value: String,
}

impl FormField {
    /// Attach a field with its initial value.
    #[must_use]
    pub fn new(spec: FieldSpec, raw_value: impl Into<String>) -> Self {
        Self {
            spec,
            raw_value: raw_value.into(),
        }
    }

    /// Field declaration.
    #[must_use]
    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    /// Control name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Human label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.spec.label
    }

    /// Input kind.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.spec.kind
    }

    /// Whether an empty value is rejected.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.spec.required
    }

    /// Configured bounds, if any.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        self.spec.bounds
    }

    /// Value exactly as typed.
    #[must_use]
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// Replace the current value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.raw_value = value.into();
    }
}
