//! Domain model module declarations.

pub mod field;
pub mod form;
pub mod verdict;
