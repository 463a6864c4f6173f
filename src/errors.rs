//! Error types shared across the application.
//!
//! User-correctable validation failures are not errors here: they travel as
//! [`crate::models::verdict::ValidationVerdict`] values. `AppError` covers
//! configuration, parsing at the time-arithmetic boundary, and storage.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all non-verdict failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// A time-of-day string was not a well-formed `HH:MM` value.
    MalformedTime(String),
    /// A calendar date string was not a well-formed `YYYY-MM-DD` value.
    MalformedDate(String),
    /// Draft storage read, write, or quota failure.
    Storage(String),
    /// Requested form schema or stored draft does not exist.
    NotFound(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::MalformedTime(msg) => write!(f, "malformed time: {msg}"),
            Self::MalformedDate(msg) => write!(f, "malformed date: {msg}"),
            Self::Storage(msg) => write!(f, "storage: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(format!("invalid draft payload: {err}"))
    }
}
