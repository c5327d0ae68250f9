//! Messages of the ICS 20 transfer application.

pub mod transfer;
