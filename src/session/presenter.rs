//! Presentation adapter between the validation session and a UI.
//!
//! The session never touches controls directly: it tells a [`Presenter`]
//! what to show. [`MemoryPresenter`] keeps the resulting view state in
//! memory and backs the CLI and the tests.

use std::collections::BTreeMap;

use serde::Serialize;

/// Validity indicator of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldState {
    /// Not yet validated; no indicator shown.
    Untouched,
    /// Latest verdict passed.
    Valid,
    /// Latest verdict failed; an error message is shown.
    Invalid,
}

/// Informational hint attached below a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HintKind {
    /// Event length under the end-time field.
    Duration,
    /// Long-form date under the date field.
    DateInfo,
}

/// Sink for the session's display side effects.
pub trait Presenter {
    /// Show `message` as the field's only error, replacing any previous one.
    fn show_error(&mut self, field: &str, message: &str);

    /// Remove the field's error, if any.
    fn clear_error(&mut self, field: &str);

    /// Set the field's validity indicator.
    fn set_state(&mut self, field: &str, state: FieldState);

    /// Show or replace a hint of `kind` under the field.
    fn show_hint(&mut self, field: &str, kind: HintKind, text: &str);

    /// Remove a hint of `kind` from the field, if any.
    fn clear_hint(&mut self, field: &str, kind: HintKind);

    /// Scroll to and focus the field.
    fn focus(&mut self, field: &str);
}

/// In-memory view state.
#[derive(Debug, Default, Clone, Serialize)]
pub struct MemoryPresenter {
    errors: BTreeMap<String, String>,
    states: BTreeMap<String, FieldState>,
    hints: BTreeMap<String, BTreeMap<HintKind, String>>,
    focused: Option<String>,
}

impl MemoryPresenter {
    /// An empty view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Error currently shown on `field`.
    #[must_use]
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// All shown errors, keyed by field.
    #[must_use]
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Indicator currently shown on `field`.
    #[must_use]
    pub fn state(&self, field: &str) -> FieldState {
        self.states
            .get(field)
            .copied()
            .unwrap_or(FieldState::Untouched)
    }

    /// Hint of `kind` currently shown on `field`.
    #[must_use]
    pub fn hint(&self, field: &str, kind: HintKind) -> Option<&str> {
        self.hints
            .get(field)
            .and_then(|hints| hints.get(&kind))
            .map(String::as_str)
    }

    /// Field most recently focused.
    #[must_use]
    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }
}

impl Presenter for MemoryPresenter {
    fn show_error(&mut self, field: &str, message: &str) {
        self.errors.insert(field.to_owned(), message.to_owned());
    }

    fn clear_error(&mut self, field: &str) {
        self.errors.remove(field);
    }

    fn set_state(&mut self, field: &str, state: FieldState) {
        self.states.insert(field.to_owned(), state);
    }

    fn show_hint(&mut self, field: &str, kind: HintKind, text: &str) {
        self.hints
            .entry(field.to_owned())
            .or_default()
            .insert(kind, text.to_owned());
    }

    fn clear_hint(&mut self, field: &str, kind: HintKind) {
        if let Some(hints) = self.hints.get_mut(field) {
            hints.remove(&kind);
            if hints.is_empty() {
                self.hints.remove(field);
            }
        }
    }

    fn focus(&mut self, field: &str) {
        self.focused = Some(field.to_owned());
    }
}
