//! ICS 20: fungible token transfer.

pub mod amount;
pub mod coin;
pub mod denom;
pub mod error;
pub mod msgs;
pub mod packet;
