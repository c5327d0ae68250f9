//! A scripted, in-memory chain for exercising the relay engine without a
//! network.
//!
//! The chain produces one block per header query, commits a packet for every
//! successfully broadcast transfer or send-packet message, and advances its
//! receive cursor for every received packet. Tests can make it hide proofs,
//! fail header queries, and reject or drop broadcasts.

use core::fmt::{Debug, Error as FmtError, Formatter};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use packet_relayer_types::core::ics02_client::header::Header;
use packet_relayer_types::core::ics04_channel::packet::{Packet, Sequence};
use packet_relayer_types::core::ics23_commitment::commitment::CommitmentProofBytes;
use packet_relayer_types::core::ics24_host::identifier::{ChainId, ChannelId, PortId};
use packet_relayer_types::signer::Signer;
use packet_relayer_types::timestamp::Timestamp;
use packet_relayer_types::tx_msg::RelayMsg;
use packet_relayer_types::Height;

use crate::chain::handle::{BroadcastMode, ChainHandle};
use crate::chain::responses::{CommitmentResponse, TxResponse};
use crate::chain::tracking::{TrackedMsgs, TrackingId, TxFee};
use crate::error::Error;

/// Response code the mock answers rejected transactions with.
pub const REJECTED_CODE: u32 = 11;

const GENESIS_TIME_NANOS: u64 = 1_600_000_000_000_000_000;
const BLOCK_TIME_NANOS: u64 = 5_000_000_000;

/// A transaction the mock chain was asked to broadcast.
#[derive(Clone, Debug)]
pub struct Broadcast {
    pub mode: BroadcastMode,
    pub msgs: Vec<RelayMsg>,
    pub fee: TxFee,
    pub tracking_id: TrackingId,
    pub accepted: bool,
}

impl Broadcast {
    pub fn actions(&self) -> Vec<&'static str> {
        self.msgs.iter().map(RelayMsg::action).collect()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Failure {
    Rejected,
    Transport,
}

struct MockState {
    signer: String,
    height: u64,
    next_sequence_send: u64,
    next_sequence_recv: u64,
    /// Height at which each sequence was committed
    commitments: BTreeMap<Sequence, u64>,
    sent_packets: BTreeMap<Sequence, Packet>,
    received: Vec<Sequence>,
    hidden_proofs: u32,
    failing_header_queries: u32,
    broadcast_failures: BTreeMap<usize, Failure>,
    broadcasts: Vec<Broadcast>,
    header_queries: usize,
    commitment_queries: usize,
}

#[derive(Clone)]
pub struct MockChain {
    id: ChainId,
    state: Arc<Mutex<MockState>>,
}

impl Debug for MockChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "MockChain({})", self.id)
    }
}

impl MockChain {
    pub fn new(id: ChainId) -> Self {
        let signer = format!("{id}-relayer");

        Self {
            id,
            state: Arc::new(Mutex::new(MockState {
                signer,
                height: 10,
                next_sequence_send: 1,
                next_sequence_recv: 1,
                commitments: BTreeMap::new(),
                sent_packets: BTreeMap::new(),
                received: Vec::new(),
                hidden_proofs: 0,
                failing_header_queries: 0,
                broadcast_failures: BTreeMap::new(),
                broadcasts: Vec::new(),
                header_queries: 0,
                commitment_queries: 0,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn height(&self, revision_height: u64) -> Result<Height, Error> {
        Height::new(self.id.version(), revision_height).map_err(Error::height)
    }

    pub fn set_signer(&self, signer: &str) {
        self.state().signer = signer.to_string();
    }

    pub fn set_latest_height(&self, height: u64) {
        self.state().height = height;
    }

    pub fn latest_height(&self) -> u64 {
        self.state().height
    }

    pub fn set_next_sequence_send(&self, sequence: u64) {
        self.state().next_sequence_send = sequence;
    }

    pub fn set_next_sequence_recv(&self, sequence: u64) {
        self.state().next_sequence_recv = sequence;
    }

    /// The next `count` commitment queries answer without proof, as if the
    /// node had not indexed the commitment yet.
    pub fn hide_proofs(&self, count: u32) {
        self.state().hidden_proofs = count;
    }

    /// The next `count` header queries fail.
    pub fn fail_header_queries(&self, count: u32) {
        self.state().failing_header_queries = count;
    }

    /// The broadcast with the given index, counting from zero, is rejected by
    /// the chain with [`REJECTED_CODE`].
    pub fn reject_broadcast(&self, index: usize) {
        self.state()
            .broadcast_failures
            .insert(index, Failure::Rejected);
    }

    /// The broadcast with the given index, counting from zero, never reaches
    /// the chain.
    pub fn drop_broadcast(&self, index: usize) {
        self.state()
            .broadcast_failures
            .insert(index, Failure::Transport);
    }

    /// Record a packet as sent by this chain, committed at the current height.
    pub fn insert_send_packet(&self, packet: Packet) {
        let mut state = self.state();
        let height = state.height;

        state.commitments.insert(packet.sequence, height);
        state.next_sequence_send = state.next_sequence_send.max(packet.sequence.as_u64() + 1);
        state.sent_packets.insert(packet.sequence, packet);
    }

    pub fn broadcasts(&self) -> Vec<Broadcast> {
        self.state().broadcasts.clone()
    }

    pub fn received_sequences(&self) -> Vec<Sequence> {
        self.state().received.clone()
    }

    pub fn committed_sequences(&self) -> BTreeSet<Sequence> {
        self.state().commitments.keys().copied().collect()
    }

    pub fn header_queries(&self) -> usize {
        self.state().header_queries
    }

    pub fn commitment_queries(&self) -> usize {
        self.state().commitment_queries
    }

    fn broadcast(&self, tracked_msgs: TrackedMsgs, mode: BroadcastMode) -> Result<TxResponse, Error> {
        let mut state = self.state();

        let index = state.broadcasts.len();
        let failure = state.broadcast_failures.get(&index).copied();

        state.broadcasts.push(Broadcast {
            mode,
            msgs: tracked_msgs.msgs.clone(),
            fee: tracked_msgs.fee.clone(),
            tracking_id: tracked_msgs.tracking_id,
            accepted: failure.is_none(),
        });

        let hash = format!("{:064X}", index + 1);

        match failure {
            Some(Failure::Transport) => Err(Error::broadcast(
                self.id.clone(),
                "connection reset by peer".to_string(),
            )),
            Some(Failure::Rejected) => Ok(TxResponse {
                code: REJECTED_CODE,
                hash,
                height: None,
                log: "out of gas".to_string(),
            }),
            None => {
                let height = state.height;

                for msg in &tracked_msgs.msgs {
                    match msg {
                        RelayMsg::Transfer(_) | RelayMsg::SendPacket(_) => {
                            let sequence = Sequence::from(state.next_sequence_send);
                            state.next_sequence_send += 1;
                            state.commitments.insert(sequence, height);
                        }
                        RelayMsg::RecvPacket(msg) => {
                            state.next_sequence_recv += 1;
                            state.received.push(msg.packet.sequence);
                        }
                        RelayMsg::UpdateClient(_) => {}
                    }
                }

                let included_at = match mode {
                    BroadcastMode::Commit => Some(self.height(height)?),
                    BroadcastMode::CheckTx => None,
                };

                Ok(TxResponse {
                    code: 0,
                    hash,
                    height: included_at,
                    log: String::new(),
                })
            }
        }
    }
}

impl ChainHandle for MockChain {
    fn id(&self) -> ChainId {
        self.id.clone()
    }

    fn get_signer(&self) -> Result<Signer, Error> {
        let signer = self.state().signer.clone();

        signer
            .parse()
            .map_err(|e| Error::signer(self.id.clone(), e))
    }

    fn query_latest_header(&self) -> Result<Header, Error> {
        let mut state = self.state();
        state.header_queries += 1;

        if state.failing_header_queries > 0 {
            state.failing_header_queries -= 1;

            return Err(Error::query(
                self.id.clone(),
                "latest header".to_string(),
                "light client is syncing".to_string(),
            ));
        }

        state.height += 1;
        let height = state.height;

        Ok(Header {
            chain_id: self.id.clone(),
            height: self.height(height)?,
            timestamp: Timestamp::from_nanoseconds(
                GENESIS_TIME_NANOS + height * BLOCK_TIME_NANOS,
            ),
            app_hash: height.to_be_bytes().to_vec(),
            next_validators_hash: vec![0xAB; 32],
        })
    }

    fn query_next_sequence_receive(
        &self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _height: Height,
    ) -> Result<Sequence, Error> {
        Ok(Sequence::from(self.state().next_sequence_recv))
    }

    fn query_next_sequence_send(
        &self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _height: Height,
    ) -> Result<Sequence, Error> {
        Ok(Sequence::from(self.state().next_sequence_send))
    }

    fn query_packet_commitment(
        &self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        sequence: Sequence,
        height: Height,
    ) -> Result<CommitmentResponse, Error> {
        let mut state = self.state();
        state.commitment_queries += 1;

        let committed = state
            .commitments
            .get(&sequence)
            .map_or(false, |committed_at| *committed_at <= height.revision_height());

        let proof = if state.hidden_proofs > 0 {
            state.hidden_proofs -= 1;
            None
        } else if committed {
            let bytes = format!("proof-{}-{}", sequence, height).into_bytes();
            Some(CommitmentProofBytes::try_from(bytes).map_err(|e| {
                Error::query(self.id.clone(), "packet commitment".to_string(), e.to_string())
            })?)
        } else {
            None
        };

        Ok(CommitmentResponse {
            proof,
            proof_height: height,
        })
    }

    fn query_send_packet(
        &self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        sequence: Sequence,
    ) -> Result<Option<Packet>, Error> {
        Ok(self.state().sent_packets.get(&sequence).cloned())
    }

    fn send_messages_and_wait_check_tx(
        &self,
        tracked_msgs: TrackedMsgs,
    ) -> Result<TxResponse, Error> {
        self.broadcast(tracked_msgs, BroadcastMode::CheckTx)
    }

    fn send_messages_and_wait_commit(&self, tracked_msgs: TrackedMsgs) -> Result<TxResponse, Error> {
        self.broadcast(tracked_msgs, BroadcastMode::Commit)
    }
}
