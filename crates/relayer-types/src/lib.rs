#![forbid(unsafe_code)]

//! Domain types for the packet relayer.
//!
//! This crate holds everything the relay engine needs to talk about two
//! chains without performing any I/O itself:
//!
//! - identifiers for chains, clients, connections, channels and ports,
//! - block [`Height`]s, packet [`Sequence`](core::ics04_channel::packet::Sequence)s
//!   and [`Timestamp`](timestamp::Timestamp)s,
//! - light client [`Header`](core::ics02_client::header::Header)s and commitment proofs,
//! - ICS-20 coins, denomination tracing and packet data,
//! - the closed set of outbound messages, [`RelayMsg`](tx_msg::RelayMsg).

pub mod applications;
pub mod core;
pub mod proto;
pub mod signer;
pub mod timestamp;
pub mod tx_msg;

/// Re-export of the block height type, which is used everywhere.
pub use crate::core::ics02_client::height::Height;
