//! Global configuration parsing and validation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::models::form::FormSchema;
use crate::{AppError, Result};

/// Date lead-time policy.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SchedulingConfig {
    /// Days ahead a new event request must be dated.
    #[serde(default = "default_new_request_lead_days")]
    pub new_request_lead_days: u32,
    /// Days ahead an edited or postponed event must be dated.
    #[serde(default = "default_reschedule_lead_days")]
    pub reschedule_lead_days: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            new_request_lead_days: default_new_request_lead_days(),
            reschedule_lead_days: default_reschedule_lead_days(),
        }
    }
}

fn default_new_request_lead_days() -> u32 {
    7
}

fn default_reschedule_lead_days() -> u32 {
    1
}

/// Draft autosave settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DraftConfig {
    /// Whether drafts are autosaved at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Quiet period after the last edit before a draft is written.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Key the draft is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Directory holding file-backed drafts.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            debounce_ms: default_debounce_ms(),
            storage_key: default_storage_key(),
            storage_dir: default_storage_dir(),
        }
    }
}

impl DraftConfig {
    /// Autosave quiet period as a [`Duration`].
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_true() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    2000
}

fn default_storage_key() -> String {
    "event_request_draft".into()
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".event-intake").join("drafts")
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Date lead-time policy.
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    /// Draft autosave settings.
    #[serde(default)]
    pub draft: DraftConfig,
    /// Additional form schemas. These take precedence over built-ins with the
    /// same id.
    #[serde(default)]
    pub forms: Vec<FormSchema>,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        debug!(forms = config.forms.len(), "configuration parsed");
        Ok(config)
    }

    /// Resolve a form schema by id: configured forms first, then built-ins.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no form has that id.
    pub fn form(&self, id: &str) -> Result<FormSchema> {
        self.forms
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .or_else(|| FormSchema::builtin(id))
            .ok_or_else(|| AppError::NotFound(format!("form {id}")))
    }

    fn validate(&self) -> Result<()> {
        if self.scheduling.new_request_lead_days == 0 {
            return Err(AppError::Config(
                "new_request_lead_days must be greater than zero".into(),
            ));
        }

        if self.scheduling.reschedule_lead_days == 0 {
            return Err(AppError::Config(
                "reschedule_lead_days must be greater than zero".into(),
            ));
        }

        if self.draft.debounce_ms == 0 {
            return Err(AppError::Config(
                "draft debounce_ms must be greater than zero".into(),
            ));
        }

        if self.draft.storage_key.trim().is_empty() {
            return Err(AppError::Config(
                "draft storage_key must not be empty".into(),
            ));
        }

        for (idx, form) in self.forms.iter().enumerate() {
            if self.forms[..idx].iter().any(|f| f.id == form.id) {
                return Err(AppError::Config(format!("duplicate form id {}", form.id)));
            }
            form.validate()?;
        }

        Ok(())
    }
}
