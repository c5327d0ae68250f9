//! Packet messages handled by the ICS 04 channel module.

pub mod recv_packet;
pub mod send_packet;
