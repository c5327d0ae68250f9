use serde_derive::{Deserialize, Serialize};

use super::coin::Coin;
use super::error::Error;
use crate::signer::Signer;

/// The payload of an ICS 20 packet.
///
/// Fields are declared in lexicographic order: the chain commits to the
/// key-sorted JSON encoding, and the relayer must reproduce those exact bytes
/// when it rebuilds a packet instead of reading it back from the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungibleTokenPacketData {
    pub amount: String,
    pub denom: String,
    pub receiver: String,
    pub sender: String,
}

impl FungibleTokenPacketData {
    pub fn new(token: &Coin, sender: &Signer, receiver: &Signer) -> Self {
        Self {
            amount: token.amount.to_string(),
            denom: token.denom.clone(),
            receiver: receiver.to_string(),
            sender: sender.to_string(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(Error::encode_packet_data)
    }
}
