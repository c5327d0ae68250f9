//! This is the definition of a transfer messages that an application submits to a chain.

use crate::applications::transfer::coin::Coin;
use crate::core::ics04_channel::packet::TimeoutHeight;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::proto::RawMsgTransfer;
use crate::signer::Signer;
use crate::timestamp::Timestamp;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.applications.transfer.v1.MsgTransfer";

/// Message used to build an ICS20 token transfer packet.
///
/// Note that this message is not a packet yet, as it lacks the proper sequence
/// number, and destination port/channel. This is by design. The sender of the
/// packet, which might be the user of a command line application, should only
/// have to specify the information related to the transfer of the token, and
/// let the library figure out how to build the packet properly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgTransfer {
    /// the port on which the packet will be sent
    pub source_port: PortId,
    /// the channel by which the packet will be sent
    pub source_channel: ChannelId,
    /// the tokens to be transferred
    pub token: Coin,
    /// the sender address
    pub sender: Signer,
    /// the recipient address on the destination chain
    pub receiver: Signer,
    /// Timeout height relative to the current block height.
    /// The timeout is disabled when set to None.
    pub timeout_height: TimeoutHeight,
    /// Timeout timestamp relative to the current block timestamp.
    /// The timeout is disabled when set to 0.
    pub timeout_timestamp: Timestamp,
}

impl Msg for MsgTransfer {
    type Raw = RawMsgTransfer;

    fn action(&self) -> &'static str {
        "transfer"
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }
}

impl From<MsgTransfer> for RawMsgTransfer {
    fn from(domain_msg: MsgTransfer) -> Self {
        RawMsgTransfer {
            source_port: domain_msg.source_port.to_string(),
            source_channel: domain_msg.source_channel.to_string(),
            token: Some(domain_msg.token.into()),
            sender: domain_msg.sender.to_string(),
            receiver: domain_msg.receiver.to_string(),
            timeout_height: Some(domain_msg.timeout_height.into()),
            timeout_timestamp: domain_msg.timeout_timestamp.nanoseconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    use crate::Height;

    fn transfer(amount: u64) -> MsgTransfer {
        MsgTransfer {
            source_port: PortId::transfer(),
            source_channel: ChannelId::new(0),
            token: Coin::new("stake", amount),
            sender: "cosmos1sender".parse().unwrap(),
            receiver: "cosmos1receiver".parse().unwrap(),
            timeout_height: TimeoutHeight::At(Height::new(0, 1000).unwrap()),
            timeout_timestamp: Timestamp::from_nanoseconds(1),
        }
    }

    #[test]
    fn to_any_carries_type_url_and_encoding() {
        let msg = transfer(10);
        let len = msg.encoded_len();
        let any = msg.to_any();

        assert_eq!(any.type_url, TYPE_URL);
        assert_eq!(any.value.len(), len);
    }

    #[test]
    fn larger_amount_grows_encoding() {
        assert!(transfer(1_000_000).encoded_len() > transfer(1).encoded_len());
    }
}
