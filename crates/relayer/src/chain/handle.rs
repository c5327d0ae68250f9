use core::fmt::Debug;

use packet_relayer_types::core::ics02_client::header::Header;
use packet_relayer_types::core::ics04_channel::packet::{Packet, Sequence};
use packet_relayer_types::core::ics24_host::identifier::{ChainId, ChannelId, PortId};
use packet_relayer_types::signer::Signer;
use packet_relayer_types::Height;

use crate::chain::responses::{CommitmentResponse, TxResponse};
use crate::chain::tracking::TrackedMsgs;
use crate::error::Error;

/// How long a broadcast waits before returning.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BroadcastMode {
    /// Return once the transaction passed `CheckTx` and sits in the mempool.
    CheckTx,
    /// Return once the transaction was included in a block.
    Commit,
}

/// The relay engine's view of one chain endpoint.
///
/// Every method is a blocking call. Implementations are cheap to clone and
/// share the same underlying connection between clones.
pub trait ChainHandle: Clone + Debug + Send + Sync + 'static {
    /// Get the [`ChainId`] of this chain.
    fn id(&self) -> ChainId;

    /// Return the address the relayer signs transactions with on this chain.
    fn get_signer(&self) -> Result<Signer, Error>;

    /// Fetch a header for the latest block this chain committed, fit to
    /// update a light client of this chain on the counterparty.
    fn query_latest_header(&self) -> Result<Header, Error>;

    fn query_next_sequence_receive(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        height: Height,
    ) -> Result<Sequence, Error>;

    fn query_next_sequence_send(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        height: Height,
    ) -> Result<Sequence, Error>;

    /// Query the proof of the packet commitment for `sequence`, at `height`.
    ///
    /// Returns a response without proof when the commitment is not provable
    /// at that height yet.
    fn query_packet_commitment(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
        height: Height,
    ) -> Result<CommitmentResponse, Error>;

    /// Look up the packet sent with `sequence` through the indexed
    /// `send_packet` events of this chain.
    fn query_send_packet(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
    ) -> Result<Option<Packet>, Error>;

    /// Submit the messages as one transaction and return once it passed `CheckTx`.
    fn send_messages_and_wait_check_tx(&self, tracked_msgs: TrackedMsgs)
        -> Result<TxResponse, Error>;

    /// Submit the messages as one transaction and return once it was committed.
    fn send_messages_and_wait_commit(&self, tracked_msgs: TrackedMsgs) -> Result<TxResponse, Error>;

    fn send_messages(
        &self,
        tracked_msgs: TrackedMsgs,
        mode: BroadcastMode,
    ) -> Result<TxResponse, Error> {
        match mode {
            BroadcastMode::CheckTx => self.send_messages_and_wait_check_tx(tracked_msgs),
            BroadcastMode::Commit => self.send_messages_and_wait_commit(tracked_msgs),
        }
    }
}
