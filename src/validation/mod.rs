//! Field-level validation rules.

pub mod field;
