//! Form validation session and its presentation adapter.

pub mod form_session;
pub mod presenter;

pub use form_session::{FieldError, FormValidationSession, SubmitOutcome};
pub use presenter::{FieldState, HintKind, MemoryPresenter, Presenter};
