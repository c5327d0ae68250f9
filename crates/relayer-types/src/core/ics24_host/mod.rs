//! ICS 24: host identifiers and their validation rules.

pub mod error;
pub mod identifier;
pub mod validate;
