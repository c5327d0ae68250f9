//! The two ends of a channel, as configured and as relayed on.

use serde_derive::{Deserialize, Serialize};

use packet_relayer_types::applications::transfer::coin::Coin;
use packet_relayer_types::applications::transfer::msgs::transfer::MsgTransfer;
use packet_relayer_types::core::ics02_client::header::Header;
use packet_relayer_types::core::ics02_client::msgs::update_client::MsgUpdateClient;
use packet_relayer_types::core::ics04_channel::msgs::recv_packet::MsgRecvPacket;
use packet_relayer_types::core::ics04_channel::msgs::send_packet::MsgSendPacket;
use packet_relayer_types::core::ics04_channel::packet::Packet;
use packet_relayer_types::core::ics23_commitment::commitment::CommitmentProofBytes;
use packet_relayer_types::core::ics24_host::identifier::{
    ChainId, ChannelId, ClientId, ConnectionId, PortId,
};
use packet_relayer_types::signer::Signer;
use packet_relayer_types::tx_msg::RelayMsg;
use packet_relayer_types::Height;

use crate::chain::handle::ChainHandle;
use crate::chain::tracking::TxFee;
use crate::config::RelayConfig;
use crate::error::Error;
use crate::link::error::LinkError;
use crate::transfer::TransferTimeout;

/// One chain's side of a channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathEnd {
    pub chain_id: ChainId,
    /// The client, hosted on this chain, tracking the counterparty chain
    pub client_id: ClientId,
    pub connection_id: ConnectionId,
    pub channel_id: ChannelId,
    pub port_id: PortId,
}

/// The pair of [`PathEnd`]s identifying one channel between two chains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Path {
    pub src: PathEnd,
    pub dst: PathEnd,
}

impl Path {
    pub fn reversed(&self) -> Path {
        Path {
            src: self.dst.clone(),
            dst: self.src.clone(),
        }
    }
}

/// A chain endpoint taking part in a relay operation: the handle to the
/// chain, its side of the channel, and the tunables to submit with.
#[derive(Clone, Debug)]
pub struct ChainEnd<Chain> {
    pub chain: Chain,
    pub path_end: PathEnd,
    pub config: RelayConfig,
}

impl<Chain: ChainHandle> ChainEnd<Chain> {
    /// Fails if the handle is connected to another chain than the path end names.
    pub fn new(chain: Chain, path_end: PathEnd, config: RelayConfig) -> Result<Self, LinkError> {
        let actual = chain.id();

        if actual != path_end.chain_id {
            return Err(LinkError::path_mismatch(path_end.chain_id, actual));
        }

        Ok(Self {
            chain,
            path_end,
            config,
        })
    }

    pub fn id(&self) -> ChainId {
        self.path_end.chain_id.clone()
    }

    pub fn signer(&self) -> Result<Signer, Error> {
        self.chain.get_signer()
    }

    pub fn fee(&self) -> TxFee {
        TxFee {
            gas: self.config.gas,
            gas_price: self.config.gas_price.clone(),
        }
    }

    /// Update this chain's client of the counterparty with the counterparty's `header`.
    pub fn build_update_client(&self, header: &Header, signer: &Signer) -> RelayMsg {
        MsgUpdateClient::new(
            self.path_end.client_id.clone(),
            header.clone(),
            signer.clone(),
        )
        .into()
    }

    /// Transfer `token` from this chain to `receiver` on the counterparty.
    pub fn build_transfer(
        &self,
        token: &Coin,
        sender: &Signer,
        receiver: &Signer,
        timeout: &TransferTimeout,
    ) -> RelayMsg {
        MsgTransfer {
            source_port: self.path_end.port_id.clone(),
            source_channel: self.path_end.channel_id.clone(),
            token: token.clone(),
            sender: sender.clone(),
            receiver: receiver.clone(),
            timeout_height: timeout.timeout_height,
            timeout_timestamp: timeout.timeout_timestamp,
        }
        .into()
    }

    /// Receive on this chain a `packet` sent by the counterparty, proven at `proof_height`.
    pub fn build_recv_packet(
        &self,
        packet: Packet,
        proof: CommitmentProofBytes,
        proof_height: Height,
        signer: &Signer,
    ) -> RelayMsg {
        MsgRecvPacket::new(packet, proof, proof_height, signer.clone()).into()
    }

    /// Send a packet carrying arbitrary `data` from this chain.
    pub fn build_send_packet(
        &self,
        data: Vec<u8>,
        timeout: &TransferTimeout,
        signer: &Signer,
    ) -> Result<RelayMsg, Error> {
        let msg = MsgSendPacket::new(
            self.path_end.port_id.clone(),
            self.path_end.channel_id.clone(),
            data,
            timeout.timeout_height,
            timeout.timeout_timestamp,
            signer.clone(),
        )
        .map_err(Error::channel)?;

        Ok(msg.into())
    }
}
