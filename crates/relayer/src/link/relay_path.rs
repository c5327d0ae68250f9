//! Clearing the pending packets of a channel, one sequence per direction at
//! a time.

use tracing::{info, warn};

use packet_relayer_types::core::ics04_channel::packet::Sequence;
use packet_relayer_types::tx_msg::RelayMsg;

use crate::chain::handle::ChainHandle;
use crate::chain::tracking::TrackingId;
use crate::config::RelayDirection;
use crate::error::Error;
use crate::link::error::LinkError;
use crate::link::relay_msgs::{RelayMsgs, SendReport, Target};
use crate::link::Link;
use crate::path::ChainEnd;
use crate::sync::SyncHeaders;
use crate::util::shutdown::ShutdownSignal;

/// The sequences of the packets waiting to be relayed, discovered by the
/// caller. Consumed by a single relay round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelaySequences {
    /// Packets sent by the source chain, not yet received on the destination
    pub src: Vec<Sequence>,
    /// Packets sent by the destination chain, not yet received on the source
    pub dst: Vec<Sequence>,
}

impl RelaySequences {
    pub fn is_empty(&self) -> bool {
        self.src.is_empty() && self.dst.is_empty()
    }
}

/// Relay the first pending packet of every requested direction of `link`.
///
/// `headers` must be up to date: proofs are queried at the height below each
/// chain's header, and every non-empty message list is prefixed with a client
/// update built from the counterparty's header.
///
/// Submission failures are logged and reported, not returned as errors.
pub fn relay_packets_ordered_chan<ChainA: ChainHandle, ChainB: ChainHandle>(
    link: &Link<ChainA, ChainB>,
    headers: &SyncHeaders,
    sequences: &RelaySequences,
    direction: RelayDirection,
    shutdown: &ShutdownSignal,
) -> Result<SendReport, LinkError> {
    let mut msgs = RelayMsgs::default();

    if direction.includes_src_to_dst() {
        if let Some(sequence) = sequences.src.first() {
            shutdown.check().map_err(|_| LinkError::cancelled())?;

            if let Some(msg) = build_recv_packet(&link.src, &link.dst, headers, *sequence)? {
                msgs.dst.push(msg);
            }
        }
    }

    if direction.includes_dst_to_src() {
        if let Some(sequence) = sequences.dst.first() {
            shutdown.check().map_err(|_| LinkError::cancelled())?;

            if let Some(msg) = build_recv_packet(&link.dst, &link.src, headers, *sequence)? {
                msgs.src.push(msg);
            }
        }
    }

    if !msgs.is_ready() {
        info!(
            "no packets to relay between {}[{}] and {}[{}]",
            link.src.id(),
            link.src.path_end.port_id,
            link.dst.id(),
            link.dst.path_end.port_id,
        );

        return Ok(SendReport::default());
    }

    if !msgs.dst.is_empty() {
        let header = headers.get(&link.src.id()).map_err(LinkError::relayer)?;
        let signer = link.dst.signer().map_err(LinkError::relayer)?;
        msgs.dst.insert(0, link.dst.build_update_client(header, &signer));
    }

    if !msgs.src.is_empty() {
        let header = headers.get(&link.dst.id()).map_err(LinkError::relayer)?;
        let signer = link.src.signer().map_err(LinkError::relayer)?;
        msgs.src.insert(0, link.src.build_update_client(header, &signer));
    }

    let report = msgs.send(link, TrackingId::Static("relay-packets"), shutdown)?;

    if report.is_success() {
        log_packets_relayed(&link.src, &link.dst, &report, Target::Destination);
        log_packets_relayed(&link.dst, &link.src, &report, Target::Source);
    } else {
        warn!(
            failed_txs = report.failures().count(),
            "failed to relay packets between {} and {}",
            link.src.id(),
            link.dst.id(),
        );
    }

    Ok(report)
}

/// Build the message receiving on `to` the packet `sequence` sent by `from`.
///
/// Returns `None` for a packet that can no longer be received because its
/// timeout height has passed on `to`.
fn build_recv_packet<ChainA: ChainHandle, ChainB: ChainHandle>(
    from: &ChainEnd<ChainA>,
    to: &ChainEnd<ChainB>,
    headers: &SyncHeaders,
    sequence: Sequence,
) -> Result<Option<RelayMsg>, LinkError> {
    let port_id = &from.path_end.port_id;
    let channel_id = &from.path_end.channel_id;

    let packet = from
        .chain
        .query_send_packet(port_id, channel_id, sequence)
        .map_err(|e| LinkError::query(from.id(), e))?
        .ok_or_else(|| {
            LinkError::packet_not_found(from.id(), port_id.clone(), channel_id.clone(), sequence)
        })?;

    let to_height = headers.get(&to.id()).map_err(LinkError::relayer)?.height();

    if packet.timeout_height.has_expired(to_height) {
        warn!(
            chain = %to.id(),
            %sequence,
            timeout_height = %packet.timeout_height,
            "packet timed out on {} at height {}, not relaying it",
            to.id(),
            to_height,
        );

        return Ok(None);
    }

    let from_height = headers.get(&from.id()).map_err(LinkError::relayer)?.height();
    let proof_height = from_height
        .decrement()
        .map_err(|e| LinkError::relayer(Error::height(e)))?;

    let (proof, proof_height) = from
        .chain
        .query_packet_commitment(port_id, channel_id, sequence, proof_height)
        .map_err(|e| LinkError::query(from.id(), e))?
        .into_proof()
        .ok_or_else(|| LinkError::missing_proof(from.id(), sequence, proof_height))?;

    let signer = to.signer().map_err(LinkError::relayer)?;

    Ok(Some(to.build_recv_packet(
        packet,
        proof,
        proof_height,
        &signer,
    )))
}

fn log_packets_relayed<ChainA: ChainHandle, ChainB: ChainHandle>(
    from: &ChainEnd<ChainA>,
    to: &ChainEnd<ChainB>,
    report: &SendReport,
    target: Target,
) {
    let submitted = report.submitted_msgs(target);

    if submitted > 1 {
        info!(
            "relayed {} packets from {}[{}] to {}[{}]",
            submitted - 1,
            from.id(),
            from.path_end.port_id,
            to.id(),
            to.path_end.port_id,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    use packet_relayer_types::core::ics04_channel::packet::{Packet, TimeoutHeight};
    use packet_relayer_types::Height;

    use crate::chain::mock::MockChain;
    use crate::link::error::LinkErrorDetail;
    use crate::sync::updates_with_headers;
    use crate::test_utils::{mock_link, packet};

    fn reverse_packet(sequence: u64) -> Packet {
        let mut packet = packet(sequence);
        core::mem::swap(&mut packet.source_channel, &mut packet.destination_channel);
        packet.timeout_height = TimeoutHeight::At(Height::new(0, 1000).unwrap());
        packet
    }

    fn sync(link: &Link<MockChain, MockChain>) -> SyncHeaders {
        updates_with_headers(&link.src.chain, &link.dst.chain).unwrap()
    }

    #[test]
    fn nothing_pending_is_a_noop() {
        let (src, dst, link) = mock_link();
        let headers = sync(&link);

        let report = relay_packets_ordered_chan(
            &link,
            &headers,
            &RelaySequences::default(),
            RelayDirection::Both,
            &ShutdownSignal::never(),
        )
        .unwrap();

        assert!(report.is_success());
        assert!(report.is_empty());
        assert!(src.broadcasts().is_empty());
        assert!(dst.broadcasts().is_empty());
    }

    #[test]
    fn relays_one_packet_each_way() {
        let (src, dst, link) = mock_link();
        src.insert_send_packet(packet(1));
        src.insert_send_packet(packet(2));
        dst.insert_send_packet(reverse_packet(7));

        let headers = sync(&link);
        let sequences = RelaySequences {
            src: vec![Sequence::from(1), Sequence::from(2)],
            dst: vec![Sequence::from(7)],
        };

        let report = relay_packets_ordered_chan(
            &link,
            &headers,
            &sequences,
            RelayDirection::Both,
            &ShutdownSignal::never(),
        )
        .unwrap();

        assert!(report.is_success());

        let dst_txs = dst.broadcasts();
        assert_eq!(dst_txs.len(), 1);
        assert_eq!(dst_txs[0].actions(), vec!["update_client", "recv_packet"]);

        let src_txs = src.broadcasts();
        assert_eq!(src_txs.len(), 1);
        assert_eq!(src_txs[0].actions(), vec!["update_client", "recv_packet"]);

        // Only the first pending sequence of each direction is relayed
        assert_eq!(dst.received_sequences(), vec![Sequence::from(1)]);
        assert_eq!(src.received_sequences(), vec![Sequence::from(7)]);

        match &dst_txs[0].msgs[0] {
            RelayMsg::UpdateClient(msg) => {
                assert_eq!(msg.client_id, link.dst.path_end.client_id);
                assert_eq!(&msg.header, headers.get(&link.src.id()).unwrap());
            }
            other => panic!("expected a client update, got {other}"),
        }

        match &dst_txs[0].msgs[1] {
            RelayMsg::RecvPacket(msg) => {
                let src_height = headers.get(&link.src.id()).unwrap().height();
                assert_eq!(msg.proof_height, src_height.decrement().unwrap());
                assert_eq!(msg.packet, packet(1));
            }
            other => panic!("expected a packet receipt, got {other}"),
        }
    }

    #[test]
    fn relays_only_the_requested_direction() {
        let (src, dst, link) = mock_link();
        src.insert_send_packet(packet(1));
        dst.insert_send_packet(reverse_packet(1));

        let headers = sync(&link);
        let sequences = RelaySequences {
            src: vec![Sequence::from(1)],
            dst: vec![Sequence::from(1)],
        };

        relay_packets_ordered_chan(
            &link,
            &headers,
            &sequences,
            RelayDirection::DstToSrc,
            &ShutdownSignal::never(),
        )
        .unwrap();

        assert!(dst.broadcasts().is_empty());
        assert_eq!(src.broadcasts().len(), 1);
    }

    #[test]
    fn missing_proof_is_never_submitted() {
        let (src, dst, link) = mock_link();
        src.insert_send_packet(packet(1));
        src.hide_proofs(1);

        let headers = sync(&link);
        let sequences = RelaySequences {
            src: vec![Sequence::from(1)],
            dst: vec![],
        };

        let err = relay_packets_ordered_chan(
            &link,
            &headers,
            &sequences,
            RelayDirection::Both,
            &ShutdownSignal::never(),
        )
        .unwrap_err();

        assert!(matches!(err.detail(), LinkErrorDetail::MissingProof(_)));
        assert!(dst.broadcasts().is_empty());
    }

    #[test]
    fn unknown_packet_is_an_error() {
        let (_src, dst, link) = mock_link();
        let headers = sync(&link);
        let sequences = RelaySequences {
            src: vec![Sequence::from(9)],
            dst: vec![],
        };

        let err = relay_packets_ordered_chan(
            &link,
            &headers,
            &sequences,
            RelayDirection::SrcToDst,
            &ShutdownSignal::never(),
        )
        .unwrap_err();

        assert!(matches!(err.detail(), LinkErrorDetail::PacketNotFound(_)));
        assert!(dst.broadcasts().is_empty());
    }

    #[test]
    fn timed_out_packet_is_skipped() {
        let (src, dst, link) = mock_link();
        dst.set_latest_height(5000);

        src.insert_send_packet(packet(1));

        let headers = sync(&link);
        let sequences = RelaySequences {
            src: vec![Sequence::from(1)],
            dst: vec![],
        };

        let report = relay_packets_ordered_chan(
            &link,
            &headers,
            &sequences,
            RelayDirection::Both,
            &ShutdownSignal::never(),
        )
        .unwrap();

        assert!(report.is_empty());
        assert!(dst.broadcasts().is_empty());
    }

    #[test]
    fn rejected_submission_is_reported_not_raised() {
        let (src, dst, link) = mock_link();
        src.insert_send_packet(packet(1));
        dst.reject_broadcast(0);

        let headers = sync(&link);
        let sequences = RelaySequences {
            src: vec![Sequence::from(1)],
            dst: vec![],
        };

        let report = relay_packets_ordered_chan(
            &link,
            &headers,
            &sequences,
            RelayDirection::Both,
            &ShutdownSignal::never(),
        )
        .unwrap();

        assert!(!report.is_success());
        assert!(dst.received_sequences().is_empty());
    }
}
