use core::fmt::{Display, Error as FmtError, Formatter};

use prost::Message;
use prost_types::Any;

use crate::applications::transfer::msgs::transfer::MsgTransfer;
use crate::core::ics02_client::msgs::update_client::MsgUpdateClient;
use crate::core::ics04_channel::msgs::recv_packet::MsgRecvPacket;
use crate::core::ics04_channel::msgs::send_packet::MsgSendPacket;
use crate::signer::Signer;

pub trait Msg: Clone {
    type Raw: From<Self> + Message;

    /// Short name of the handler for this message, eg. `recv_packet`.
    fn action(&self) -> &'static str;

    /// Unique type identifier for this message, to support encoding to/from `prost_types::Any`.
    fn type_url(&self) -> String;

    #[allow(clippy::wrong_self_convention)]
    fn to_any(self) -> Any {
        Any {
            type_url: self.type_url(),
            value: self.get_sign_bytes(),
        }
    }

    fn get_sign_bytes(self) -> Vec<u8> {
        let raw_msg: Self::Raw = self.into();
        raw_msg.encode_to_vec()
    }

    fn encoded_len(&self) -> usize {
        let raw_msg: Self::Raw = self.clone().into();
        raw_msg.encoded_len()
    }
}

/// The closed set of messages the relayer ever submits to a chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayMsg {
    UpdateClient(MsgUpdateClient),
    Transfer(MsgTransfer),
    RecvPacket(MsgRecvPacket),
    SendPacket(MsgSendPacket),
}

impl RelayMsg {
    pub fn action(&self) -> &'static str {
        match self {
            Self::UpdateClient(msg) => msg.action(),
            Self::Transfer(msg) => msg.action(),
            Self::RecvPacket(msg) => msg.action(),
            Self::SendPacket(msg) => msg.action(),
        }
    }

    pub fn type_url(&self) -> String {
        match self {
            Self::UpdateClient(msg) => msg.type_url(),
            Self::Transfer(msg) => msg.type_url(),
            Self::RecvPacket(msg) => msg.type_url(),
            Self::SendPacket(msg) => msg.type_url(),
        }
    }

    /// Size in bytes of the signed payload of this message.
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::UpdateClient(msg) => msg.encoded_len(),
            Self::Transfer(msg) => msg.encoded_len(),
            Self::RecvPacket(msg) => msg.encoded_len(),
            Self::SendPacket(msg) => msg.encoded_len(),
        }
    }

    pub fn to_any(&self) -> Any {
        match self {
            Self::UpdateClient(msg) => msg.clone().to_any(),
            Self::Transfer(msg) => msg.clone().to_any(),
            Self::RecvPacket(msg) => msg.clone().to_any(),
            Self::SendPacket(msg) => msg.clone().to_any(),
        }
    }

    pub fn signer(&self) -> &Signer {
        match self {
            Self::UpdateClient(msg) => &msg.signer,
            Self::Transfer(msg) => &msg.sender,
            Self::RecvPacket(msg) => &msg.signer,
            Self::SendPacket(msg) => &msg.signer,
        }
    }

    pub fn is_update_client(&self) -> bool {
        matches!(self, Self::UpdateClient(_))
    }
}

impl Display for RelayMsg {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}", self.action())
    }
}

impl From<MsgUpdateClient> for RelayMsg {
    fn from(msg: MsgUpdateClient) -> Self {
        Self::UpdateClient(msg)
    }
}

impl From<MsgTransfer> for RelayMsg {
    fn from(msg: MsgTransfer) -> Self {
        Self::Transfer(msg)
    }
}

impl From<MsgRecvPacket> for RelayMsg {
    fn from(msg: MsgRecvPacket) -> Self {
        Self::RecvPacket(msg)
    }
}

impl From<MsgSendPacket> for RelayMsg {
    fn from(msg: MsgSendPacket) -> Self {
        Self::SendPacket(msg)
    }
}
