//! ICS 20 token transfers over a link, and the reconstruction of the packets
//! they produce.

use core::time::Duration;

use flex_error::define_error;
use tracing::info;

use packet_relayer_types::applications::transfer::coin::Coin;
use packet_relayer_types::applications::transfer::denom::TracePrefix;
use packet_relayer_types::applications::transfer::packet::FungibleTokenPacketData;
use packet_relayer_types::core::ics02_client::header::Header;
use packet_relayer_types::core::ics04_channel::packet::{Packet, Sequence, TimeoutHeight};
use packet_relayer_types::core::ics24_host::identifier::ChainId;
use packet_relayer_types::signer::Signer;
use packet_relayer_types::timestamp::Timestamp;
use packet_relayer_types::tx_msg::RelayMsg;

use crate::chain::handle::ChainHandle;
use crate::chain::tracking::TrackingId;
use crate::config::{default, GunConfig};
use crate::error::Error;
use crate::link::error::LinkError;
use crate::link::proofs::{retrieve_sent_packet_proofs, SentPacketProofs};
use crate::link::relay_msgs::{RelayMsgs, SendReport};
use crate::link::Link;
use crate::sync::update_lite_with_header;
use crate::util::shutdown::ShutdownSignal;

define_error! {
    TransferError {
        Relayer
            [ Error ]
            |_| { "relayer error" },

        Link
            [ LinkError ]
            |_| { "link error" },

        Submit
            { chain_id: ChainId }
            |e| {
                format!("failed to submit the transfer to chain {}", e.chain_id)
            },

        Receive
            { chain_id: ChainId }
            |e| {
                format!("failed to receive the transferred packets on chain {}", e.chain_id)
            },
    }
}

/// How far in the future, relative to the destination chain, a packet times out.
///
/// A zero offset or a zero duration disables the corresponding timeout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeoutOptions {
    pub height_offset: u64,
    pub duration: Duration,
}

impl Default for TimeoutOptions {
    fn default() -> Self {
        Self {
            height_offset: default::timeout_height_offset(),
            duration: default::timeout_duration(),
        }
    }
}

/// The timeout of the packets sent during one round.
///
/// Computed once from the destination header, then shared between the
/// outgoing messages and the packets rebuilt from them, so that the rebuilt
/// packets match what the chain committed to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransferTimeout {
    pub timeout_height: TimeoutHeight,
    pub timeout_timestamp: Timestamp,
}

impl TransferTimeout {
    pub fn new(options: &TimeoutOptions, dst_header: &Header) -> Self {
        let timeout_height = if options.height_offset == 0 {
            TimeoutHeight::no_timeout()
        } else {
            TimeoutHeight::At(dst_header.height().add(options.height_offset))
        };

        let timeout_timestamp = if options.duration.is_zero() {
            Timestamp::none()
        } else {
            let base = if dst_header.timestamp().is_set() {
                dst_header.timestamp()
            } else {
                Timestamp::now()
            };

            base.checked_add(options.duration)
                .unwrap_or_else(Timestamp::none)
        };

        Self {
            timeout_height,
            timeout_timestamp,
        }
    }
}

/// A token transfer from the source to the destination chain of a link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferOptions {
    pub amount: Coin,
    /// The account credited on the destination chain
    pub receiver: Signer,
    /// Whether the source chain is where the denomination originates
    pub is_source_denom: bool,
    pub timeout: TimeoutOptions,
}

impl TransferOptions {
    pub fn new(amount: Coin, receiver: Signer) -> Self {
        Self {
            amount,
            receiver,
            is_source_denom: false,
            timeout: TimeoutOptions::default(),
        }
    }
}

impl From<&GunConfig> for TransferOptions {
    fn from(config: &GunConfig) -> Self {
        Self {
            amount: config.amount.clone(),
            receiver: config.receiver.clone(),
            is_source_denom: config.is_source_denom,
            timeout: TimeoutOptions {
                height_offset: config.timeout_height_offset,
                duration: config.timeout_duration,
            },
        }
    }
}

/// The coin to transfer over `link`, its denomination traced through the
/// channel end it is going to be known by.
///
/// A coin native to the source chain is prefixed with the destination's port
/// and channel, any other with the source's.
pub fn transfer_denom<ChainA: ChainHandle, ChainB: ChainHandle>(
    link: &Link<ChainA, ChainB>,
    amount: &Coin,
    is_source_denom: bool,
) -> Coin {
    let end = if is_source_denom {
        &link.dst.path_end
    } else {
        &link.src.path_end
    };

    let prefix = TracePrefix::new(end.port_id.clone(), end.channel_id.clone());

    amount.with_denom(prefix.apply(&amount.denom))
}

/// Rebuild the packet a transfer of `token` produced on the source chain,
/// without reading it back from the chain.
pub fn transfer_packet<ChainA: ChainHandle, ChainB: ChainHandle>(
    link: &Link<ChainA, ChainB>,
    token: &Coin,
    sender: &Signer,
    receiver: &Signer,
    sequence: Sequence,
    timeout: &TransferTimeout,
) -> Result<Packet, Error> {
    let data = FungibleTokenPacketData::new(token, sender, receiver)
        .to_bytes()
        .map_err(Error::transfer)?;

    Ok(Packet {
        sequence,
        source_port: link.src.path_end.port_id.clone(),
        source_channel: link.src.path_end.channel_id.clone(),
        destination_port: link.dst.path_end.port_id.clone(),
        destination_channel: link.dst.path_end.channel_id.clone(),
        data,
        timeout_height: timeout.timeout_height,
        timeout_timestamp: timeout.timeout_timestamp,
    })
}

/// The messages receiving on the destination chain the transfers whose
/// proofs were retrieved: a client update with the source header the proofs
/// were taken at, then one receipt per proof.
///
/// The i-th receipt carries the destination's next sequence to receive plus i.
pub fn receive_transfer_msgs<ChainA: ChainHandle, ChainB: ChainHandle>(
    link: &Link<ChainA, ChainB>,
    sent: &SentPacketProofs,
    token: &Coin,
    sender: &Signer,
    receiver: &Signer,
    timeout: &TransferTimeout,
) -> Result<Vec<RelayMsg>, Error> {
    let signer = link.dst.signer()?;
    let src_header = sent.headers.get(&link.src.id())?;

    let mut msgs = Vec::with_capacity(sent.proofs.len() + 1);
    msgs.push(link.dst.build_update_client(src_header, &signer));

    for (offset, proof) in (0u64..).zip(&sent.proofs) {
        let sequence = sent
            .next_sequence_recv
            .checked_add(offset)
            .ok_or_else(|| Error::sequence_overflow(sent.next_sequence_recv, offset))?;
        let packet = transfer_packet(link, token, sender, receiver, sequence, timeout)?;

        msgs.push(link.dst.build_recv_packet(
            packet,
            proof.proof.clone(),
            proof.proof_height,
            &signer,
        ));
    }

    Ok(msgs)
}

/// Submit a single transfer to the source chain of `link`.
pub fn send_transfer_msg<ChainA: ChainHandle, ChainB: ChainHandle>(
    link: &Link<ChainA, ChainB>,
    options: &TransferOptions,
    shutdown: &ShutdownSignal,
) -> Result<SendReport, TransferError> {
    let token = transfer_denom(link, &options.amount, options.is_source_denom);

    let dst_header = update_lite_with_header(&link.dst.chain).map_err(TransferError::relayer)?;
    let timeout = TransferTimeout::new(&options.timeout, &dst_header);

    let sender = link.src.signer().map_err(TransferError::relayer)?;
    let msg = link
        .src
        .build_transfer(&token, &sender, &options.receiver, &timeout);

    let report = RelayMsgs::new(vec![msg], vec![])
        .send(link, TrackingId::Static("transfer"), shutdown)
        .map_err(TransferError::link)?;

    if !report.is_success() {
        return Err(TransferError::submit(link.src.id()));
    }

    info!(
        src_chain = %link.src.id(),
        dst_chain = %link.dst.id(),
        %token,
        "transfer submitted"
    );

    Ok(report)
}

/// Transfer a token from the source to the destination chain of `link`, then
/// relay the resulting packet to the destination.
///
/// Returns the report of the receiving transaction.
pub fn send_transfer_both_sides<ChainA: ChainHandle, ChainB: ChainHandle>(
    link: &Link<ChainA, ChainB>,
    options: &TransferOptions,
    shutdown: &ShutdownSignal,
) -> Result<SendReport, TransferError> {
    let token = transfer_denom(link, &options.amount, options.is_source_denom);

    let dst_header = update_lite_with_header(&link.dst.chain).map_err(TransferError::relayer)?;
    let timeout = TransferTimeout::new(&options.timeout, &dst_header);

    let sender = link.src.signer().map_err(TransferError::relayer)?;
    let msg = link
        .src
        .build_transfer(&token, &sender, &options.receiver, &timeout);

    let report = RelayMsgs::new(vec![msg], vec![])
        .send(link, TrackingId::Static("transfer"), shutdown)
        .map_err(TransferError::link)?;

    if !report.is_success() {
        return Err(TransferError::submit(link.src.id()));
    }

    let sent = retrieve_sent_packet_proofs(link, 1, shutdown).map_err(TransferError::link)?;

    let dst_msgs = receive_transfer_msgs(
        link,
        &sent,
        &token,
        &sender,
        &options.receiver,
        &timeout,
    )
    .map_err(TransferError::relayer)?;

    let report = RelayMsgs::new(vec![], dst_msgs)
        .send(link, TrackingId::Static("transfer-recv"), shutdown)
        .map_err(TransferError::link)?;

    if !report.is_success() {
        return Err(TransferError::receive(link.dst.id()));
    }

    info!(
        src_chain = %link.src.id(),
        dst_chain = %link.dst.id(),
        %token,
        "transfer relayed"
    );

    Ok(report)
}

/// Send a packet carrying arbitrary `data` from the source chain of `link` to
/// its destination chain.
pub fn send_packet<ChainA: ChainHandle, ChainB: ChainHandle>(
    link: &Link<ChainA, ChainB>,
    data: Vec<u8>,
    timeout: &TimeoutOptions,
    shutdown: &ShutdownSignal,
) -> Result<SendReport, TransferError> {
    let dst_header = update_lite_with_header(&link.dst.chain).map_err(TransferError::relayer)?;
    let timeout = TransferTimeout::new(timeout, &dst_header);

    let signer = link.src.signer().map_err(TransferError::relayer)?;
    let msg = link
        .src
        .build_send_packet(data, &timeout, &signer)
        .map_err(TransferError::relayer)?;

    let report = RelayMsgs::new(vec![msg], vec![])
        .send(link, TrackingId::Static("send-packet"), shutdown)
        .map_err(TransferError::link)?;

    if !report.is_success() {
        return Err(TransferError::submit(link.src.id()));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    use packet_relayer_types::Height;

    use packet_relayer_types::core::ics23_commitment::commitment::CommitmentProofBytes;

    use crate::chain::handle::BroadcastMode;
    use crate::error::ErrorDetail;
    use crate::link::error::LinkErrorDetail;
    use crate::link::proofs::PacketProof;
    use crate::sync::SyncHeaders;
    use crate::test_utils::{
        dst_chain_id, header, mock_link, mock_link_with, relay_config, signer, src_chain_id,
    };

    fn options() -> TransferOptions {
        TransferOptions::new(Coin::new("stake", 100u64), "cosmos1receiver".parse().unwrap())
    }

    #[test]
    fn native_denom_is_prefixed_with_destination_end() {
        let (_, _, link) = mock_link();

        let coin = transfer_denom(&link, &Coin::new("stake", 10u64), true);
        assert_eq!(coin.denom, "transfer/channel-1/stake");
        assert_eq!(coin.amount, 10u64.into());

        let coin = transfer_denom(&link, &Coin::new("stake", 10u64), false);
        assert_eq!(coin.denom, "transfer/channel-0/stake");
    }

    #[test]
    fn timeout_is_relative_to_destination_header() {
        let header = header(dst_chain_id(), 20);
        let timeout = TransferTimeout::new(
            &TimeoutOptions {
                height_offset: 1000,
                duration: Duration::from_secs(10),
            },
            &header,
        );

        assert_eq!(
            timeout.timeout_height,
            TimeoutHeight::At(Height::new(1, 1020).unwrap())
        );
        assert_eq!(
            timeout.timeout_timestamp,
            Timestamp::from_nanoseconds(30_000_000_000)
        );
    }

    #[test]
    fn zero_timeout_options_disable_timeouts() {
        let header = header(dst_chain_id(), 20);
        let timeout = TransferTimeout::new(
            &TimeoutOptions {
                height_offset: 0,
                duration: Duration::ZERO,
            },
            &header,
        );

        assert_eq!(timeout.timeout_height, TimeoutHeight::no_timeout());
        assert!(!timeout.timeout_timestamp.is_set());
    }

    #[test]
    fn receipt_sequences_past_u64_max_are_an_error() {
        let (_, _, link) = mock_link();

        let mut headers = SyncHeaders::new();
        headers.insert(header(src_chain_id(), 20));

        let proof = |sequence| PacketProof {
            sequence: Sequence::from(sequence),
            proof: CommitmentProofBytes::try_from(vec![7; 64]).unwrap(),
            proof_height: Height::new(0, 19).unwrap(),
        };

        let sent = SentPacketProofs {
            headers,
            next_sequence_recv: Sequence::from(u64::MAX),
            next_sequence_send: Sequence::from(3),
            proofs: vec![proof(1), proof(2)],
        };

        let timeout = TransferTimeout::new(&TimeoutOptions::default(), &header(dst_chain_id(), 20));

        let err = receive_transfer_msgs(
            &link,
            &sent,
            &Coin::new("stake", 1u64),
            &signer(),
            &signer(),
            &timeout,
        )
        .unwrap_err();

        assert!(matches!(
            err.detail(),
            ErrorDetail::SequenceOverflow(e) if e.offset == 1
        ));
    }

    #[test]
    fn send_transfer_msg_submits_one_transfer() {
        let (src, dst, link) = mock_link();

        send_transfer_msg(&link, &options(), &ShutdownSignal::never()).unwrap();

        let txs = src.broadcasts();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].actions(), vec!["transfer"]);
        assert_eq!(txs[0].mode, BroadcastMode::CheckTx);

        match &txs[0].msgs[0] {
            RelayMsg::Transfer(msg) => {
                assert_eq!(msg.token.denom, "transfer/channel-0/stake");
                assert_eq!(msg.source_channel, link.src.path_end.channel_id);
            }
            other => panic!("expected a transfer, got {other}"),
        }

        assert!(dst.broadcasts().is_empty());
    }

    #[test]
    fn rejected_transfer_is_an_error() {
        let (src, _, link) = mock_link();
        src.reject_broadcast(0);

        let err = send_transfer_msg(&link, &options(), &ShutdownSignal::never()).unwrap_err();
        assert!(matches!(err.detail(), TransferErrorDetail::Submit(_)));
    }

    #[test]
    fn transfer_both_sides_relays_the_packet() {
        let (src, dst, link) = mock_link();

        send_transfer_both_sides(&link, &options(), &ShutdownSignal::never()).unwrap();

        assert_eq!(src.committed_sequences().len(), 1);

        let txs = dst.broadcasts();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].actions(), vec!["update_client", "recv_packet"]);

        match &txs[0].msgs[1] {
            RelayMsg::RecvPacket(msg) => {
                let data: FungibleTokenPacketData =
                    serde_json::from_slice(&msg.packet.data).unwrap();

                assert_eq!(data.denom, "transfer/channel-0/stake");
                assert_eq!(data.amount, "100");
                assert_eq!(data.sender, "ibc-0-relayer");
                assert_eq!(data.receiver, "cosmos1receiver");
                assert_eq!(msg.packet.sequence, Sequence::from(1));
            }
            other => panic!("expected a packet receipt, got {other}"),
        }

        assert_eq!(dst.received_sequences(), vec![Sequence::from(1)]);
    }

    #[test]
    fn transfer_both_sides_fails_when_receipt_is_rejected() {
        let (_, dst, link) = mock_link();
        dst.reject_broadcast(0);

        let err =
            send_transfer_both_sides(&link, &options(), &ShutdownSignal::never()).unwrap_err();
        assert!(matches!(err.detail(), TransferErrorDetail::Receive(_)));
    }

    #[test]
    fn transfer_both_sides_gives_up_without_proof() {
        let (src, dst, link) = mock_link_with(relay_config(2), relay_config(2));
        src.hide_proofs(2);

        let err =
            send_transfer_both_sides(&link, &options(), &ShutdownSignal::never()).unwrap_err();

        match err.detail() {
            TransferErrorDetail::Link(e) => assert!(matches!(
                e.source,
                LinkErrorDetail::RetrievalExhausted(_)
            )),
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(dst.broadcasts().is_empty());
    }

    #[test]
    fn send_packet_carries_the_data() {
        let (src, _, link) = mock_link();

        send_packet(
            &link,
            b"ping".to_vec(),
            &TimeoutOptions::default(),
            &ShutdownSignal::never(),
        )
        .unwrap();

        let txs = src.broadcasts();
        assert_eq!(txs[0].actions(), vec!["send_packet"]);

        match &txs[0].msgs[0] {
            RelayMsg::SendPacket(msg) => {
                assert_eq!(msg.data, b"ping".to_vec());
                assert!(msg.timeout_timestamp.is_set());
            }
            other => panic!("expected a packet, got {other}"),
        }
    }

    #[test]
    fn send_packet_rejects_empty_data() {
        let (src, _, link) = mock_link();

        let err = send_packet(
            &link,
            Vec::new(),
            &TimeoutOptions::default(),
            &ShutdownSignal::never(),
        )
        .unwrap_err();

        assert!(matches!(err.detail(), TransferErrorDetail::Relayer(_)));
        assert!(src.broadcasts().is_empty());
    }
}
