#![forbid(unsafe_code)]

//! Packet relay engine.
//!
//! Relays packets between two chains that share a channel, through the
//! [`ChainHandle`](chain::handle::ChainHandle) boundary:
//!
//! - [`link::relay_msgs`] batches outbound messages per destination chain and
//!   submits them, reporting the outcome of every sub-batch,
//! - [`sync`] fetches fresh light client headers for both chains,
//! - [`link::proofs`] retrieves commitment proofs with bounded retries,
//! - [`link::relay_path`] clears pending sequences in one or both directions,
//! - [`gun`] generates transfer load, and [`keep_alive`] keeps the light
//!   clients of a path from expiring.

pub mod chain;
pub mod config;
pub mod error;
pub mod gun;
pub mod keep_alive;
pub mod link;
pub mod logging;
pub mod path;
pub mod sync;
pub mod transfer;
pub mod util;

#[cfg(test)]
pub(crate) mod test_utils;
