//! Scheduling constraints: time arithmetic, date lead-time policy, and
//! start/end range checks.

pub mod date_policy;
pub mod time;
pub mod time_range;
