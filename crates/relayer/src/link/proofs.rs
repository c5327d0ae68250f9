//! Retrieval of the commitment proofs of the packets a chain just sent.
//!
//! A freshly committed packet is often not provable yet at the height just
//! queried, because the node has not indexed it. Missing proofs are an
//! expected outcome here: the retrieval is retried, with fresh headers each
//! time, up to the bound of the source endpoint's retry configuration.

use tracing::{debug, warn};

use packet_relayer_types::core::ics04_channel::packet::Sequence;
use packet_relayer_types::core::ics23_commitment::commitment::CommitmentProofBytes;
use packet_relayer_types::Height;

use crate::chain::handle::ChainHandle;
use crate::error::Error;
use crate::link::error::LinkError;
use crate::link::Link;
use crate::sync::{updates_with_headers, SyncHeaders};
use crate::util::retry::{retry_with_shutdown, RetryError, RetryResult};
use crate::util::shutdown::ShutdownSignal;

/// The proof of a packet commitment on the source chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacketProof {
    pub sequence: Sequence,
    pub proof: CommitmentProofBytes,
    pub proof_height: Height,
}

/// Everything needed to receive the last packets sent by the source chain on
/// the destination chain.
#[derive(Clone, Debug)]
pub struct SentPacketProofs {
    /// The headers the proofs were retrieved with
    pub headers: SyncHeaders,
    /// The destination's next sequence to receive, at its header height
    pub next_sequence_recv: Sequence,
    /// The source's next sequence to send, at its header height
    pub next_sequence_send: Sequence,
    /// One proof per packet, in sequence order
    pub proofs: Vec<PacketProof>,
}

/// Retrieve the proofs of the last `count` packets sent by the source chain
/// of `link`, ie. the sequences `[next_sequence_send - count, next_sequence_send)`.
///
/// Never returns a missing proof: either every proof is present, or the
/// retrieval fails after the configured number of attempts.
pub fn retrieve_sent_packet_proofs<ChainA: ChainHandle, ChainB: ChainHandle>(
    link: &Link<ChainA, ChainB>,
    count: u64,
    shutdown: &ShutdownSignal,
) -> Result<SentPacketProofs, LinkError> {
    let retry = &link.src.config.retry;

    let result = retry_with_shutdown(retry.strategy().iter(), shutdown, |attempt| {
        match try_retrieve(link, count) {
            Ok(proofs) => RetryResult::Ok(proofs),
            Err(e) => {
                debug!(
                    chain = %link.src.id(),
                    attempt,
                    max_attempts = retry.max_attempts,
                    "packet proofs not available yet: {e}"
                );

                RetryResult::Retry(e)
            }
        }
    });

    match result {
        Ok(proofs) => Ok(proofs),
        Err(RetryError::Cancelled { .. }) => Err(LinkError::cancelled()),
        Err(RetryError::Exhausted { tries, error } | RetryError::Aborted { tries, error }) => {
            warn!(
                chain = %link.src.id(),
                attempts = tries,
                "giving up on retrieving packet proofs: {error}"
            );

            Err(LinkError::retrieval_exhausted(
                link.src.id(),
                tries,
                error.to_string(),
            ))
        }
    }
}

/// One retrieval attempt, from fresh headers.
fn try_retrieve<ChainA: ChainHandle, ChainB: ChainHandle>(
    link: &Link<ChainA, ChainB>,
    count: u64,
) -> Result<SentPacketProofs, LinkError> {
    let (src, dst) = (&link.src, &link.dst);

    let headers = updates_with_headers(&src.chain, &dst.chain).map_err(LinkError::relayer)?;

    let src_height = headers.get(&src.id()).map_err(LinkError::relayer)?.height();
    let dst_height = headers.get(&dst.id()).map_err(LinkError::relayer)?.height();

    let next_sequence_recv = dst
        .chain
        .query_next_sequence_receive(&dst.path_end.port_id, &dst.path_end.channel_id, dst_height)
        .map_err(|e| LinkError::query(dst.id(), e))?;

    let next_sequence_send = src
        .chain
        .query_next_sequence_send(&src.path_end.port_id, &src.path_end.channel_id, src_height)
        .map_err(|e| LinkError::query(src.id(), e))?;

    let first = next_sequence_send
        .checked_sub(count)
        .filter(|first| !first.is_zero())
        .ok_or_else(|| LinkError::sequence_underflow(src.id(), next_sequence_send, count))?;

    // The header at `src_height` commits to the app state of the previous block
    let proof_height = src_height
        .decrement()
        .map_err(|e| LinkError::relayer(Error::height(e)))?;

    let mut proofs = Vec::with_capacity(count as usize);

    for sequence in (first.as_u64()..next_sequence_send.as_u64()).map(Sequence::from) {
        let response = src
            .chain
            .query_packet_commitment(
                &src.path_end.port_id,
                &src.path_end.channel_id,
                sequence,
                proof_height,
            )
            .map_err(|e| LinkError::query(src.id(), e))?;

        let (proof, proof_height) = response
            .into_proof()
            .ok_or_else(|| LinkError::missing_proof(src.id(), sequence, proof_height))?;

        proofs.push(PacketProof {
            sequence,
            proof,
            proof_height,
        });
    }

    Ok(SentPacketProofs {
        headers,
        next_sequence_recv,
        next_sequence_send,
        proofs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    use crate::test_utils::{mock_link, mock_link_with, relay_config};
    use crate::util::shutdown::ShutdownHandle;

    #[test]
    fn retrieves_proofs_of_the_last_sent_packets() {
        let (src, dst, link) = mock_link();
        src.set_next_sequence_send(1);
        dst.set_next_sequence_recv(4);

        for sequence in 1..=5 {
            src.insert_send_packet(crate::test_utils::packet(sequence));
        }

        let retrieved = retrieve_sent_packet_proofs(&link, 3, &ShutdownSignal::never()).unwrap();

        assert_eq!(retrieved.next_sequence_send, Sequence::from(6));
        assert_eq!(retrieved.next_sequence_recv, Sequence::from(4));
        assert_eq!(
            retrieved
                .proofs
                .iter()
                .map(|p| p.sequence.as_u64())
                .collect::<Vec<_>>(),
            vec![3, 4, 5]
        );

        let src_header_height = retrieved.headers.get(&src.id()).unwrap().height();
        for proof in &retrieved.proofs {
            assert_eq!(proof.proof_height, src_header_height.decrement().unwrap());
        }
    }

    #[test]
    fn succeeds_after_three_missing_proofs() {
        let (src, _dst, link) = mock_link();
        src.insert_send_packet(crate::test_utils::packet(1));
        src.hide_proofs(3);

        let retrieved = retrieve_sent_packet_proofs(&link, 1, &ShutdownSignal::never()).unwrap();

        assert_eq!(retrieved.proofs.len(), 1);
        assert_eq!(src.commitment_queries(), 4);
        // Headers were fetched anew for every attempt
        assert_eq!(src.header_queries(), 4);
    }

    #[test]
    fn fails_once_attempts_are_exhausted() {
        let (src, dst, link) = mock_link_with(relay_config(3), relay_config(3));
        src.insert_send_packet(crate::test_utils::packet(1));
        src.hide_proofs(100);

        let err = retrieve_sent_packet_proofs(&link, 1, &ShutdownSignal::never()).unwrap_err();

        assert!(matches!(
            err.detail(),
            crate::link::error::LinkErrorDetail::RetrievalExhausted(e) if e.attempts == 3
        ));
        assert_eq!(src.commitment_queries(), 3);
        assert!(src.broadcasts().is_empty());
        assert!(dst.broadcasts().is_empty());
    }

    #[test]
    fn missing_packets_are_retried_as_underflow() {
        let (src, _dst, link) = mock_link_with(relay_config(2), relay_config(2));
        src.insert_send_packet(crate::test_utils::packet(1));

        let err = retrieve_sent_packet_proofs(&link, 5, &ShutdownSignal::never()).unwrap_err();

        assert!(err.to_string().contains("has not sent 5 packets yet"));
        assert_eq!(src.header_queries(), 2);
    }

    #[test]
    fn header_sync_failures_are_retried() {
        let (src, dst, link) = mock_link();
        src.insert_send_packet(crate::test_utils::packet(1));
        dst.fail_header_queries(2);

        let retrieved = retrieve_sent_packet_proofs(&link, 1, &ShutdownSignal::never()).unwrap();
        assert_eq!(retrieved.proofs.len(), 1);
    }

    #[test]
    fn cancelled_retrieval_does_not_query() {
        let (src, _dst, link) = mock_link();

        let (handle, signal) = ShutdownHandle::pair();
        drop(handle);

        let err = retrieve_sent_packet_proofs(&link, 1, &signal).unwrap_err();

        assert!(matches!(
            err.detail(),
            crate::link::error::LinkErrorDetail::Cancelled(_)
        ));
        assert_eq!(src.header_queries(), 0);
    }
}
