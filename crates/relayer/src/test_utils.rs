use core::time::Duration;

use packet_relayer_types::core::ics02_client::header::Header;
use packet_relayer_types::core::ics02_client::msgs::update_client::MsgUpdateClient;
use packet_relayer_types::core::ics04_channel::msgs::recv_packet::MsgRecvPacket;
use packet_relayer_types::core::ics04_channel::packet::{Packet, Sequence, TimeoutHeight};
use packet_relayer_types::core::ics23_commitment::commitment::CommitmentProofBytes;
use packet_relayer_types::core::ics24_host::identifier::{
    ChainId, ChannelId, ClientId, ConnectionId, PortId,
};
use packet_relayer_types::signer::Signer;
use packet_relayer_types::timestamp::Timestamp;
use packet_relayer_types::tx_msg::RelayMsg;
use packet_relayer_types::Height;

use crate::chain::mock::MockChain;
use crate::config::{RelayConfig, RetryConfig};
use crate::link::Link;
use crate::path::{ChainEnd, PathEnd};

pub fn src_chain_id() -> ChainId {
    ChainId::new("ibc", 0)
}

pub fn dst_chain_id() -> ChainId {
    ChainId::new("ibc", 1)
}

pub fn path_end(chain_id: ChainId, counter: u64) -> PathEnd {
    PathEnd {
        chain_id,
        client_id: ClientId::new(counter),
        connection_id: ConnectionId::new(counter),
        channel_id: ChannelId::new(counter),
        port_id: PortId::transfer(),
    }
}

/// Retries without waiting, so that tests exhausting them run instantly.
pub fn relay_config(max_attempts: u32) -> RelayConfig {
    RelayConfig {
        retry: RetryConfig {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        },
        ..RelayConfig::default()
    }
}

pub fn mock_link_with(
    src_config: RelayConfig,
    dst_config: RelayConfig,
) -> (MockChain, MockChain, Link<MockChain, MockChain>) {
    let src_chain = MockChain::new(src_chain_id());
    let dst_chain = MockChain::new(dst_chain_id());

    let src = ChainEnd::new(src_chain.clone(), path_end(src_chain_id(), 0), src_config).unwrap();
    let dst = ChainEnd::new(dst_chain.clone(), path_end(dst_chain_id(), 1), dst_config).unwrap();

    (src_chain, dst_chain, Link::new(src, dst))
}

pub fn mock_link() -> (MockChain, MockChain, Link<MockChain, MockChain>) {
    mock_link_with(relay_config(10), relay_config(10))
}

pub fn signer() -> Signer {
    "cosmos1relayer".parse().unwrap()
}

pub fn header(chain_id: ChainId, height: u64) -> Header {
    Header {
        height: Height::new(chain_id.version(), height).unwrap(),
        chain_id,
        timestamp: Timestamp::from_nanoseconds(height * 1_000_000_000),
        app_hash: vec![1; 32],
        next_validators_hash: vec![2; 32],
    }
}

pub fn packet(sequence: u64) -> Packet {
    Packet {
        sequence: Sequence::from(sequence),
        source_port: PortId::transfer(),
        source_channel: ChannelId::new(0),
        destination_port: PortId::transfer(),
        destination_channel: ChannelId::new(1),
        data: br#"{"amount":"1","denom":"stake","receiver":"b","sender":"a"}"#.to_vec(),
        timeout_height: TimeoutHeight::At(Height::new(1, 1000).unwrap()),
        timeout_timestamp: Timestamp::none(),
    }
}

pub fn update_client_msg() -> RelayMsg {
    MsgUpdateClient::new(ClientId::new(0), header(src_chain_id(), 20), signer()).into()
}

pub fn recv_packet_msg(sequence: u64) -> RelayMsg {
    MsgRecvPacket::new(
        packet(sequence),
        CommitmentProofBytes::try_from(vec![7; 64]).unwrap(),
        Height::new(0, 19).unwrap(),
        signer(),
    )
    .into()
}
