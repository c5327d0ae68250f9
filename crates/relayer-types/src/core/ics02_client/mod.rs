//! ICS 02: light client heights, headers and the update-client message.

pub mod error;
pub mod header;
pub mod height;
pub mod msgs;
