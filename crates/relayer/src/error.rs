//! Errors raised when talking to a chain.

use flex_error::define_error;

use packet_relayer_types::applications::transfer::error::Error as TransferTypesError;
use packet_relayer_types::core::ics02_client::error::Error as ClientError;
use packet_relayer_types::core::ics04_channel::error::Error as ChannelError;
use packet_relayer_types::core::ics04_channel::packet::Sequence;
use packet_relayer_types::core::ics24_host::identifier::ChainId;
use packet_relayer_types::signer::SignerError;
use packet_relayer_types::Height;

define_error! {
    Error {
        Query
            { chain_id: ChainId, query: String, reason: String }
            |e| {
                format!("failed to query {} on chain {}: {}", e.query, e.chain_id, e.reason)
            },

        Broadcast
            { chain_id: ChainId, reason: String }
            |e| {
                format!("failed to broadcast transaction to chain {}: {}", e.chain_id, e.reason)
            },

        MissingHeader
            { chain_id: ChainId }
            |e| {
                format!("no header was synchronized for chain {}", e.chain_id)
            },

        MissingCommitment
            { chain_id: ChainId, sequence: Sequence, height: Height }
            |e| {
                format!("no packet commitment for sequence {} on chain {} at height {}",
                    e.sequence, e.chain_id, e.height)
            },

        Signer
            { chain_id: ChainId }
            [ SignerError ]
            |e| {
                format!("failed to resolve the signer of chain {}", e.chain_id)
            },

        Height
            [ ClientError ]
            |_| { "invalid height" },

        Channel
            [ ChannelError ]
            |_| { "invalid channel message" },

        SequenceOverflow
            { sequence: Sequence, offset: u64 }
            |e| {
                format!("sequence {} + {} does not fit in a u64", e.sequence, e.offset)
            },

        Transfer
            [ TransferTypesError ]
            |_| { "invalid token transfer" },
    }
}
