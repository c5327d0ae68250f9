use crate::core::ics04_channel::packet::Packet;
use crate::core::ics23_commitment::commitment::CommitmentProofBytes;
use crate::proto::RawMsgRecvPacket;
use crate::signer::Signer;
use crate::tx_msg::Msg;
use crate::Height;

pub const TYPE_URL: &str = "/ibc.core.channel.v1.MsgRecvPacket";

///
/// Message definition for the "packet receiving" datagram.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgRecvPacket {
    pub packet: Packet,
    pub proof_commitment: CommitmentProofBytes,
    pub proof_height: Height,
    pub signer: Signer,
}

impl MsgRecvPacket {
    pub fn new(
        packet: Packet,
        proof_commitment: CommitmentProofBytes,
        proof_height: Height,
        signer: Signer,
    ) -> MsgRecvPacket {
        Self {
            packet,
            proof_commitment,
            proof_height,
            signer,
        }
    }
}

impl Msg for MsgRecvPacket {
    type Raw = RawMsgRecvPacket;

    fn action(&self) -> &'static str {
        "recv_packet"
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }
}

impl From<MsgRecvPacket> for RawMsgRecvPacket {
    fn from(domain_msg: MsgRecvPacket) -> Self {
        RawMsgRecvPacket {
            packet: Some(domain_msg.packet.into()),
            proof_commitment: domain_msg.proof_commitment.into(),
            proof_height: Some(domain_msg.proof_height.into()),
            signer: domain_msg.signer.to_string(),
        }
    }
}
