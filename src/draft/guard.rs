//! Unsaved-change tracking and leave confirmation.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::DraftConfig;
use crate::draft::autosave::{AutosaveHandle, DraftAutosave};
use crate::draft::store::DraftStore;
use crate::models::field::FieldValues;

/// Prompt shown when leaving the page with unsaved changes.
pub const LEAVE_PROMPT: &str = "You have unsaved changes. Are you sure you want to leave?";
/// Prompt shown when cancelling with unsaved changes.
pub const CANCEL_PROMPT: &str = "You have unsaved changes. Are you sure you want to cancel?";

/// Decision handed to the navigation or cancel collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveDecision {
    /// Nothing to lose; leave without asking.
    Proceed,
    /// Ask the user before leaving.
    Confirm {
        /// Presentational prompt text.
        prompt: &'static str,
    },
}

impl LeaveDecision {
    /// Whether the collaborator must block and ask first.
    #[must_use]
    pub fn should_block(&self) -> bool {
        matches!(self, Self::Confirm { .. })
    }
}

/// Point-in-time view of the guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftSnapshot {
    /// Values captured when the session began.
    pub baseline_values: FieldValues,
    /// Whether any current value differs from its baseline.
    pub currently_modified: bool,
}

/// Tracks edits against a captured baseline, guards navigation away from
/// unsaved work, and optionally autosaves and recovers a draft.
pub struct DraftGuard {
    baseline: FieldValues,
    current: FieldValues,
    modified: bool,
    submitted: bool,
    store: Option<Arc<dyn DraftStore>>,
    storage_key: String,
    autosave: Option<AutosaveHandle>,
}

impl DraftGuard {
    /// Capture `baseline` as the unmodified state.
    #[must_use]
    pub fn new(baseline: FieldValues) -> Self {
        Self {
            current: baseline.clone(),
            baseline,
            modified: false,
            submitted: false,
            store: None,
            storage_key: String::new(),
            autosave: None,
        }
    }

    /// Guard wired to `store` under the configured key, with a debounced
    /// autosave when `config.enabled` is set.
    ///
    /// Spawns the autosave task, so must be called from within a Tokio
    /// runtime unless autosave is disabled.
    #[must_use]
    pub fn from_config(
        baseline: FieldValues,
        config: &DraftConfig,
        store: Arc<dyn DraftStore>,
    ) -> Self {
        let guard = Self::new(baseline).with_store(Arc::clone(&store), config.storage_key.clone());
        if !config.enabled {
            debug!(key = %config.storage_key, "draft autosave disabled");
            return guard;
        }
        let autosave =
            DraftAutosave::new(config.storage_key.clone(), config.debounce(), store).spawn();
        guard.with_autosave(autosave)
    }

    /// Attach the store used for draft recovery and discard.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn DraftStore>, key: impl Into<String>) -> Self {
        self.store = Some(store);
        self.storage_key = key.into();
        self
    }

    /// Attach a running autosave timer. Each recorded change reschedules it.
    #[must_use]
    pub fn with_autosave(mut self, autosave: AutosaveHandle) -> Self {
        self.autosave = Some(autosave);
        self
    }

    /// Record a field's new value and recompute the modified flag.
    ///
    /// The flag is recomputed across all fields, so reverting every edit
    /// clears it again.
    pub fn record_change(&mut self, name: &str, value: &str) {
        self.current.insert(name.to_owned(), value.to_owned());
        self.modified = self.current.iter().any(|(field, value)| {
            self.baseline
                .get(field)
                .map_or(!value.is_empty(), |base| base != value)
        });
        debug!(field = name, modified = self.modified, "draft change recorded");

        if self.submitted {
            return;
        }
        if let Some(ref autosave) = self.autosave {
            autosave.schedule(self.current.clone());
        }
    }

    /// Whether there are unsaved changes. Always false after a successful submit.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified && !self.submitted
    }

    /// Decision for the page-navigation collaborator.
    #[must_use]
    pub fn leave_decision(&self) -> LeaveDecision {
        if self.is_modified() {
            LeaveDecision::Confirm {
                prompt: LEAVE_PROMPT,
            }
        } else {
            LeaveDecision::Proceed
        }
    }

    /// Decision for an explicit cancel action.
    #[must_use]
    pub fn cancel_decision(&self) -> LeaveDecision {
        if self.is_modified() {
            LeaveDecision::Confirm {
                prompt: CANCEL_PROMPT,
            }
        } else {
            LeaveDecision::Proceed
        }
    }

    /// Baseline and modified flag as of now.
    #[must_use]
    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            baseline_values: self.baseline.clone(),
            currently_modified: self.is_modified(),
        }
    }

    /// Current values as last recorded.
    #[must_use]
    pub fn current_values(&self) -> &FieldValues {
        &self.current
    }

    /// Called after an allowed submit: silences further prompts for this
    /// session, drops any pending autosave, and discards the stored draft.
    ///
    /// The draft is cleared now and again on the autosave task once any
    /// write already in flight has landed.
    pub fn mark_submitted(&mut self) {
        self.submitted = true;
        self.discard_draft();
        if let Some(ref autosave) = self.autosave {
            autosave.discard();
        }
        info!("draft guard released after submit");
    }

    /// Load a previously stored draft. Storage failures read as "no draft".
    #[must_use]
    pub fn recover(&self) -> Option<FieldValues> {
        let store = self.store.as_ref()?;
        match store.load(&self.storage_key) {
            Ok(draft) => draft,
            Err(err) => {
                warn!(key = %self.storage_key, %err, "draft unavailable");
                None
            }
        }
    }

    /// Remove the stored draft. Storage failures are ignored.
    pub fn discard_draft(&self) {
        let Some(ref store) = self.store else {
            return;
        };
        if let Err(err) = store.clear(&self.storage_key) {
            warn!(key = %self.storage_key, %err, "failed to discard draft");
        }
    }
}
