//! ICS 23: commitment proofs.

pub mod commitment;
