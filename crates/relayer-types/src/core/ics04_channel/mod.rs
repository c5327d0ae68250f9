//! ICS 04: packets, sequences and the packet messages.

pub mod error;
pub mod msgs;
pub mod packet;
