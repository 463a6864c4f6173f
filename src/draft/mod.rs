//! Draft protection: unsaved-change guard, debounced autosave, and the
//! storage it writes to.

pub mod autosave;
pub mod guard;
pub mod store;

pub use autosave::{AutosaveHandle, DraftAutosave};
pub use guard::{DraftGuard, DraftSnapshot, LeaveDecision};
pub use store::{DraftStore, FileDraftStore, MemoryDraftStore};
