use serde_derive::{Deserialize, Serialize};

use crate::core::ics24_host::identifier::ChainId;
use crate::proto::RawHeader;
use crate::timestamp::Timestamp;
use crate::Height;

/// A light client header: the minimal consensus state snapshot of a chain at
/// a given height, used by the counterparty's light client to verify proofs
/// against the application state root committed at that height.
///
/// Headers are never cached across relay rounds, the consensus state of a
/// chain can move on between two rounds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub chain_id: ChainId,
    pub height: Height,
    pub timestamp: Timestamp,
    pub app_hash: Vec<u8>,
    pub next_validators_hash: Vec<u8>,
}

impl Header {
    pub fn height(&self) -> Height {
        self.height
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl From<Header> for RawHeader {
    fn from(header: Header) -> Self {
        RawHeader {
            chain_id: header.chain_id.to_string(),
            height: Some(header.height.into()),
            timestamp: header.timestamp.nanoseconds(),
            app_hash: header.app_hash,
            next_validators_hash: header.next_validators_hash,
        }
    }
}
