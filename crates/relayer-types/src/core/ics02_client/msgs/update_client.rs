//! Definition of domain type message `MsgUpdateClient`.

use crate::core::ics02_client::header::Header;
use crate::core::ics24_host::identifier::ClientId;
use crate::proto::RawMsgUpdateClient;
use crate::signer::Signer;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.core.client.v1.MsgUpdateClient";

/// A type of message that triggers the update of an on-chain (IBC) client with new headers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgUpdateClient {
    pub client_id: ClientId,
    pub header: Header,
    pub signer: Signer,
}

impl MsgUpdateClient {
    pub fn new(client_id: ClientId, header: Header, signer: Signer) -> Self {
        MsgUpdateClient {
            client_id,
            header,
            signer,
        }
    }
}

impl Msg for MsgUpdateClient {
    type Raw = RawMsgUpdateClient;

    fn action(&self) -> &'static str {
        "update_client"
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }
}

impl From<MsgUpdateClient> for RawMsgUpdateClient {
    fn from(value: MsgUpdateClient) -> Self {
        RawMsgUpdateClient {
            client_id: value.client_id.to_string(),
            header: Some(value.header.into()),
            signer: value.signer.to_string(),
        }
    }
}
