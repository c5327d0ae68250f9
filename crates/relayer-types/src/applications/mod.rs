//! Applications whose packets the relayer constructs itself.

pub mod transfer;
