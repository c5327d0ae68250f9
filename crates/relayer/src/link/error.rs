use flex_error::define_error;

use packet_relayer_types::core::ics04_channel::packet::Sequence;
use packet_relayer_types::core::ics24_host::identifier::{ChainId, ChannelId, PortId};
use packet_relayer_types::Height;

use crate::error::Error;

define_error! {
    LinkError {
        Relayer
            [ Error ]
            |_| { "failed with underlying error" },

        Query
            { chain_id: ChainId }
            [ Error ]
            |e| {
                format!("failed during query to chain id {0}", e.chain_id)
            },

        RetrievalExhausted
            { chain_id: ChainId, attempts: u64, last_error: String }
            |e| {
                format!("failed to retrieve packet proofs from chain {0} after {1} attempts, last error: {2}",
                    e.chain_id, e.attempts, e.last_error)
            },

        MissingProof
            { chain_id: ChainId, sequence: Sequence, height: Height }
            |e| {
                format!("no proof of the packet commitment for sequence {0} on chain {1} at height {2}",
                    e.sequence, e.chain_id, e.height)
            },

        SequenceUnderflow
            { chain_id: ChainId, next_sequence: Sequence, count: u64 }
            |e| {
                format!("chain {0} has not sent {1} packets yet, its next sequence to send is {2}",
                    e.chain_id, e.count, e.next_sequence)
            },

        PacketNotFound
            {
                chain_id: ChainId,
                port_id: PortId,
                channel_id: ChannelId,
                sequence: Sequence,
            }
            |e| {
                format!("no packet with sequence {0} was sent on {1}/{2} of chain {3}",
                    e.sequence, e.port_id, e.channel_id, e.chain_id)
            },

        PathMismatch
            { expected: ChainId, actual: ChainId }
            |e| {
                format!("path end is configured for chain {0} but the chain handle is connected to {1}",
                    e.expected, e.actual)
            },

        Cancelled
            |_| { "shutdown was requested" },
    }
}
