//! Durable client-local draft storage.
//!
//! A draft is a single string-keyed JSON object `{field: value}`. The format
//! is private to this crate and not shared with any server.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::models::field::FieldValues;
use crate::{AppError, Result};

/// Key/value storage for draft snapshots.
///
/// Implementations must be [`Send`] and [`Sync`] so a store can be shared with
/// the autosave task via [`std::sync::Arc`].
pub trait DraftStore: Send + Sync {
    /// Write `values` under `key`, replacing any previous draft.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if storage is unavailable or full.
    fn save(&self, key: &str, values: &FieldValues) -> Result<()>;

    /// Read the draft stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if storage is unavailable or the stored
    /// payload is not a valid draft.
    fn load(&self, key: &str) -> Result<Option<FieldValues>>;

    /// Remove the draft stored under `key`. Removing a missing draft succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if storage is unavailable.
    fn clear(&self, key: &str) -> Result<()>;
}

/// Stores each draft as `<dir>/<key>.json`.
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    /// Construct a store rooted at `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            AppError::Storage(format!(
                "failed to create draft directory {}: {e}",
                dir.display()
            ))
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the draft files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let safe = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !safe {
            return Err(AppError::Storage(format!("invalid draft key {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl DraftStore for FileDraftStore {
    fn save(&self, key: &str, values: &FieldValues) -> Result<()> {
        let path = self.path_for(key)?;
        let payload = serde_json::to_string(values)?;

        // Write to a sibling temp file and rename so a crash never leaves a
        // half-written draft behind.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| AppError::Storage(format!("failed to stage draft: {e}")))?;
        tmp.write_all(payload.as_bytes())
            .map_err(|e| AppError::Storage(format!("failed to write draft: {e}")))?;
        tmp.persist(&path).map_err(|e| {
            AppError::Storage(format!("failed to persist draft {}: {e}", path.display()))
        })?;

        debug!(key, path = %path.display(), "draft written");
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<FieldValues>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(AppError::Storage(format!(
                "failed to read draft {}: {err}",
                path.display()
            ))),
        }
    }

    fn clear(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::Storage(format!(
                "failed to remove draft {}: {err}",
                path.display()
            ))),
        }
    }
}

/// In-process store mirroring browser local-storage semantics: values are
/// kept as serialized strings, with an optional byte quota and an
/// "unavailable" mode (as in private browsing).
#[derive(Default)]
pub struct MemoryDraftStore {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
    unavailable: bool,
}

impl MemoryDraftStore {
    /// An empty, unlimited store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store that rejects writes once the total payload size would
    /// exceed `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota_bytes: Some(bytes),
            ..Self::default()
        }
    }

    /// A store that fails every operation.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        if self.unavailable {
            return Err(AppError::Storage("storage unavailable".into()));
        }
        self.entries
            .lock()
            .map_err(|_| AppError::Storage("draft store mutex poisoned".into()))
    }
}

impl DraftStore for MemoryDraftStore {
    fn save(&self, key: &str, values: &FieldValues) -> Result<()> {
        let payload = serde_json::to_string(values)?;
        let mut entries = self.entries()?;

        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + payload.len() > quota {
                return Err(AppError::Storage(format!(
                    "quota of {quota} bytes exceeded"
                )));
            }
        }

        entries.insert(key.to_owned(), payload);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<FieldValues>> {
        let entries = self.entries()?;
        entries
            .get(key)
            .map(|raw| serde_json::from_str(raw).map_err(AppError::from))
            .transpose()
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}
