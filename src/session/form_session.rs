//! Per-form validation orchestrator.
//!
//! Field state machine: `Untouched → Valid | Invalid`.
//!
//! - **blur / change**: validate the field.
//! - **input**: re-validate only if the field is already `Invalid`, so an
//!   error clears as soon as it is fixed but typing alone never raises one.
//! - **submit**: force-validate every field; block unless all pass.
//!
//! Cross-field rules are attached to an owning field. The date policy belongs
//! to the date field. The time range belongs to the end-time field, so range
//! errors and the duration hint appear there.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::clock::{Clock, SystemClock};
use crate::draft::guard::DraftGuard;
use crate::models::field::{FieldValues, FormField};
use crate::models::form::FormSchema;
use crate::models::verdict::ValidationVerdict;
use crate::schedule::date_policy::{
    describe_date, parse_date, DateConstraintContext, DateConstraintPolicy,
};
use crate::schedule::time_range::TimeRangeValidator;
use crate::session::presenter::{FieldState, HintKind, Presenter};
use crate::validation::field::FieldValidator;
use crate::{AppError, Result};

/// A field that failed during a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name.
    pub field: String,
    /// Message shown on the field.
    pub message: String,
}

/// Decision of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Every check passed. The caller hands `values` to the native submission.
    Allowed {
        /// Field values to submit.
        values: FieldValues,
    },
    /// At least one check failed. The submission must not proceed.
    Blocked {
        /// First failing field in document order; it has been focused.
        first_invalid: String,
        /// Every failing field in document order.
        errors: Vec<FieldError>,
    },
}

impl SubmitOutcome {
    /// Whether the submission may proceed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Full evaluation of one field: its verdict plus any hints to display.
struct Evaluation {
    verdict: ValidationVerdict,
    date_info: Option<String>,
    duration: Option<String>,
}

/// Validation state for one form instance.
///
/// Owns its fields exclusively; nothing is shared between forms. Dropping the
/// session drops its [`DraftGuard`] and with it any pending autosave.
pub struct FormValidationSession<P: Presenter> {
    session_id: String,
    schema: FormSchema,
    fields: Vec<FormField>,
    states: HashMap<String, FieldState>,
    verdicts: HashMap<String, ValidationVerdict>,
    policy: DateConstraintPolicy,
    clock: Arc<dyn Clock>,
    presenter: P,
    draft: Option<DraftGuard>,
}

impl<P: Presenter> FormValidationSession<P> {
    /// Attach to a form with every field empty.
    #[must_use]
    pub fn new(schema: FormSchema, presenter: P) -> Self {
        let fields = schema
            .fields
            .iter()
            .map(|spec| FormField::new(spec.clone(), String::new()))
            .collect();
        let states = schema
            .fields
            .iter()
            .map(|spec| (spec.name.clone(), FieldState::Untouched))
            .collect();

        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            schema,
            fields,
            states,
            verdicts: HashMap::new(),
            policy: DateConstraintPolicy::default(),
            clock: Arc::new(SystemClock),
            presenter,
            draft: None,
        }
    }

    /// Pre-fill field values, as rendered by the server. Unknown names are
    /// ignored. Fields stay `Untouched`.
    #[must_use]
    pub fn with_values(mut self, values: &FieldValues) -> Self {
        for field in &mut self.fields {
            if let Some(value) = values.get(field.name()) {
                field.set_value(value.clone());
            }
        }
        self
    }

    /// Use a specific date policy instead of the default lead times.
    #[must_use]
    pub fn with_policy(mut self, policy: DateConstraintPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use a specific clock for "today".
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Attach a draft guard. Every later edit is forwarded to it.
    #[must_use]
    pub fn with_draft_guard(mut self, guard: DraftGuard) -> Self {
        self.draft = Some(guard);
        self
    }

    /// Unique identifier of this session, used in log spans.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Form declaration.
    #[must_use]
    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Presentation adapter.
    #[must_use]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Attached draft guard, if any.
    #[must_use]
    pub fn draft_guard(&self) -> Option<&DraftGuard> {
        self.draft.as_ref()
    }

    /// Current values of every field.
    #[must_use]
    pub fn values(&self) -> FieldValues {
        self.fields
            .iter()
            .map(|f| (f.name().to_owned(), f.raw_value().to_owned()))
            .collect()
    }

    /// Current value of `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.find(name).map(FormField::raw_value)
    }

    /// State of `name`, or `None` for an unknown field.
    #[must_use]
    pub fn field_state(&self, name: &str) -> Option<FieldState> {
        self.states.get(name).copied()
    }

    /// Latest verdict applied to `name`. `None` while untouched.
    #[must_use]
    pub fn verdict(&self, name: &str) -> Option<&ValidationVerdict> {
        self.verdicts.get(name)
    }

    /// Whether the form would pass a submit right now. Evaluates every field
    /// and cross-field rule without touching the view.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.fields
            .iter()
            .all(|field| self.evaluate(field.name()).verdict.is_valid())
    }

    /// A keystroke changed `name` to `value`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the form has no such field.
    pub fn on_input(&mut self, name: &str, value: &str) -> Result<FieldState> {
        self.set_value(name, value)?;
        if self.state_of(name) == FieldState::Invalid {
            self.validate_with_dependents(name);
        }
        Ok(self.state_of(name))
    }

    /// The user committed a new `value` to `name` (change event).
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the form has no such field.
    pub fn on_change(&mut self, name: &str, value: &str) -> Result<FieldState> {
        self.set_value(name, value)?;
        self.validate_with_dependents(name);
        Ok(self.state_of(name))
    }

    /// Focus left `name`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the form has no such field.
    pub fn on_blur(&mut self, name: &str) -> Result<FieldState> {
        if self.find(name).is_none() {
            return Err(AppError::NotFound(format!("field {name}")));
        }
        self.validate_with_dependents(name);
        Ok(self.state_of(name))
    }

    /// Attempt to submit: force-validate everything and decide.
    ///
    /// On a block the first failing field (document order) is focused and all
    /// messages stay visible. On success the draft guard is released.
    pub fn submit(&mut self) -> SubmitOutcome {
        let _span = info_span!(
            "submit",
            form_id = %self.schema.id,
            session_id = %self.session_id,
        )
        .entered();

        let names: Vec<String> = self.fields.iter().map(|f| f.name().to_owned()).collect();
        for name in &names {
            self.validate_field(name);
        }

        let errors: Vec<FieldError> = names
            .iter()
            .filter_map(|name| {
                let verdict = self.verdicts.get(name)?;
                let message = verdict.message()?;
                (!verdict.is_valid()).then(|| FieldError {
                    field: name.clone(),
                    message: message.to_owned(),
                })
            })
            .collect();

        if let Some(first) = errors.first() {
            let first_invalid = first.field.clone();
            self.presenter.focus(&first_invalid);
            info!(
                first_invalid = %first_invalid,
                failures = errors.len(),
                "submit blocked"
            );
            return SubmitOutcome::Blocked {
                first_invalid,
                errors,
            };
        }

        if let Some(ref mut guard) = self.draft {
            guard.mark_submitted();
        }
        info!("submit allowed");
        SubmitOutcome::Allowed {
            values: self.values(),
        }
    }

    /// Apply a stored draft, if one exists, as user edits. Field states are
    /// left untouched. Returns whether a draft was applied.
    pub fn restore_draft(&mut self) -> bool {
        let Some(draft) = self.draft.as_ref().and_then(DraftGuard::recover) else {
            return false;
        };

        let mut applied = 0usize;
        for (name, value) in &draft {
            if self.set_value(name, value).is_ok() {
                applied += 1;
            }
        }
        info!(applied, "draft restored");
        applied > 0
    }

    // ── Internals ───────────────────────────────────────

    fn find(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    fn state_of(&self, name: &str) -> FieldState {
        self.states
            .get(name)
            .copied()
            .unwrap_or(FieldState::Untouched)
    }

    fn set_value(&mut self, name: &str, value: &str) -> Result<()> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.name() == name)
            .ok_or_else(|| AppError::NotFound(format!("field {name}")))?;
        field.set_value(value);

        if let Some(ref mut guard) = self.draft {
            guard.record_change(name, value);
        }
        Ok(())
    }

    /// Validate `name`, then refresh the end-time field when the start time
    /// moved and the end has already been shown a verdict.
    fn validate_with_dependents(&mut self, name: &str) {
        self.validate_field(name);

        if self.schema.start_time_field.as_deref() == Some(name) {
            if let Some(end) = self.schema.end_time_field.clone() {
                if self.state_of(&end) != FieldState::Untouched {
                    self.validate_field(&end);
                }
            }
        }
    }

    fn validate_field(&mut self, name: &str) {
        let evaluation = self.evaluate(name);
        self.apply(name, evaluation);
    }

    fn evaluate(&self, name: &str) -> Evaluation {
        let mut evaluation = Evaluation {
            verdict: ValidationVerdict::valid(),
            date_info: None,
            duration: None,
        };
        let Some(field) = self.find(name) else {
            return evaluation;
        };

        evaluation.verdict = FieldValidator::validate(field);
        if !evaluation.verdict.is_valid() {
            return evaluation;
        }

        let value = field.raw_value().trim();

        if self.schema.date_field.as_deref() == Some(name) && !value.is_empty() {
            let ctx = DateConstraintContext::new(self.schema.mode, self.clock.now());
            evaluation.verdict = self.policy.validate_str(value, &ctx);
            if evaluation.verdict.is_valid() {
                evaluation.date_info = parse_date(value).ok().map(describe_date);
            }
        }

        if self.schema.end_time_field.as_deref() == Some(name) {
            if let Some(start) = self
                .schema
                .start_time_field
                .as_deref()
                .and_then(|start| self.find(start))
            {
                // A malformed start is reported on the start field itself.
                if FieldValidator::validate(start).is_valid() {
                    let range = TimeRangeValidator::validate(start.raw_value(), value);
                    evaluation.verdict = range.verdict;
                    evaluation.duration = range.duration.map(|d| d.to_string());
                }
            }
        }

        evaluation
    }

    fn apply(&mut self, name: &str, evaluation: Evaluation) {
        let Evaluation {
            verdict,
            date_info,
            duration,
        } = evaluation;

        let state = if verdict.is_valid() {
            self.presenter.clear_error(name);
            FieldState::Valid
        } else {
            self.presenter
                .show_error(name, verdict.message().unwrap_or_default());
            FieldState::Invalid
        };
        self.presenter.set_state(name, state);

        if self.schema.date_field.as_deref() == Some(name) {
            match date_info {
                Some(ref text) => self.presenter.show_hint(name, HintKind::DateInfo, text),
                None => self.presenter.clear_hint(name, HintKind::DateInfo),
            }
        }
        if self.schema.end_time_field.as_deref() == Some(name) {
            match duration {
                Some(ref text) => self.presenter.show_hint(name, HintKind::Duration, text),
                None => self.presenter.clear_hint(name, HintKind::Duration),
            }
        }

        debug!(
            field = name,
            valid = verdict.is_valid(),
            message = verdict.message().unwrap_or_default(),
            "field validated"
        );
        self.states.insert(name.to_owned(), state);
        self.verdicts.insert(name.to_owned(), verdict);
    }
}
