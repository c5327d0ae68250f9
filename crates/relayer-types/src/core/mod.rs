//! Core IBC data structures used when relaying packets.

pub mod ics02_client;
pub mod ics04_channel;
pub mod ics23_commitment;
pub mod ics24_host;
