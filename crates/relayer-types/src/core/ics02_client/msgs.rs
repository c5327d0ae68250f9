//! Messages handled by the ICS 02 client module.

pub mod update_client;
