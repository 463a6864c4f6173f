#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod draft;
pub mod errors;
pub mod models;
pub mod schedule;
pub mod session;
pub mod validation;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
