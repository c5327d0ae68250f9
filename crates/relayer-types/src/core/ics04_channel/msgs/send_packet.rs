use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::packet::TimeoutHeight;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::proto::RawMsgSendPacket;
use crate::signer::Signer;
use crate::timestamp::Timestamp;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.core.channel.v1.MsgSendPacket";

/// Sends a packet carrying arbitrary application bytes over a channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgSendPacket {
    pub source_port: PortId,
    pub source_channel: ChannelId,
    pub data: Vec<u8>,
    pub timeout_height: TimeoutHeight,
    pub timeout_timestamp: Timestamp,
    pub signer: Signer,
}

impl MsgSendPacket {
    pub fn new(
        source_port: PortId,
        source_channel: ChannelId,
        data: Vec<u8>,
        timeout_height: TimeoutHeight,
        timeout_timestamp: Timestamp,
        signer: Signer,
    ) -> Result<Self, Error> {
        if data.is_empty() {
            return Err(Error::zero_packet_data());
        }

        Ok(Self {
            source_port,
            source_channel,
            data,
            timeout_height,
            timeout_timestamp,
            signer,
        })
    }
}

impl Msg for MsgSendPacket {
    type Raw = RawMsgSendPacket;

    fn action(&self) -> &'static str {
        "send_packet"
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }
}

impl From<MsgSendPacket> for RawMsgSendPacket {
    fn from(msg: MsgSendPacket) -> Self {
        RawMsgSendPacket {
            source_port: msg.source_port.to_string(),
            source_channel: msg.source_channel.to_string(),
            data: msg.data,
            timeout_height: Some(msg.timeout_height.into()),
            timeout_timestamp: msg.timeout_timestamp.nanoseconds(),
            signer: msg.signer.to_string(),
        }
    }
}
