//! Load generator: rounds of token transfers, each one relayed to the
//! destination chain as soon as its proofs are available.
//!
//! A round submits `msgs_per_round` identical transfers to the source chain
//! in a single transaction, waits for the source chain to index them,
//! retrieves the proofs of the packets they committed and receives those
//! packets on the destination chain, behind a client update. Rounds never
//! overlap.

use flex_error::define_error;
use tracing::{error_span, info, warn};

use packet_relayer_telemetry as telemetry;
use packet_relayer_types::applications::transfer::coin::Coin;
use packet_relayer_types::core::ics24_host::identifier::ChainId;
use packet_relayer_types::signer::Signer;

use crate::chain::handle::ChainHandle;
use crate::chain::tracking::TrackingId;
use crate::config::{Error as ConfigError, GunConfig, Repeat, RoundFailurePolicy};
use crate::error::Error;
use crate::link::error::{LinkError, LinkErrorDetail};
use crate::link::proofs::retrieve_sent_packet_proofs;
use crate::link::relay_msgs::RelayMsgs;
use crate::link::Link;
use crate::sync::update_lite_with_header;
use crate::transfer::{receive_transfer_msgs, transfer_denom, TimeoutOptions, TransferTimeout};
use crate::util::shutdown::ShutdownSignal;

define_error! {
    GunError {
        Config
            [ ConfigError ]
            |_| { "invalid load generator configuration" },

        Relayer
            [ Error ]
            |_| { "relayer error" },

        Link
            [ LinkError ]
            |_| { "link error" },

        TransferSubmit
            { chain_id: ChainId, round: u64 }
            |e| {
                format!("round {}: failed to submit transfers to chain {}", e.round, e.chain_id)
            },

        ReceiveSubmit
            { chain_id: ChainId, round: u64 }
            |e| {
                format!("round {}: failed to receive packets on chain {}", e.round, e.chain_id)
            },

        Cancelled
            |_| { "load generator was shut down" },
    }
}

impl GunError {
    fn is_cancelled(&self) -> bool {
        matches!(self.detail(), GunErrorDetail::Cancelled(_))
    }

    fn is_transfer_submit(&self) -> bool {
        matches!(self.detail(), GunErrorDetail::TransferSubmit(_))
    }
}

/// Relay errors are reported as they are, except a shutdown, which ends the
/// run.
fn link_error(e: LinkError) -> GunError {
    match e.detail() {
        LinkErrorDetail::Cancelled(_) => GunError::cancelled(),
        _ => GunError::link(e),
    }
}

/// What a load generator run did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GunSummary {
    /// Rounds run, skipped ones included
    pub rounds: u64,
    /// Rounds that failed and were skipped
    pub skipped: u64,
    /// Transfers submitted by the rounds that succeeded
    pub transfers: u64,
    /// Packets received by the rounds that succeeded
    pub receives: u64,
}

struct RoundOutcome {
    transfers: u64,
    receives: u64,
}

/// Run the load generator over `link` until its configured number of rounds
/// is reached, or until shut down when running forever.
///
/// Shutting down a run with a fixed number of rounds is an error, since the
/// rounds were not all run.
pub fn run<ChainA: ChainHandle, ChainB: ChainHandle>(
    link: &Link<ChainA, ChainB>,
    config: &GunConfig,
    shutdown: &ShutdownSignal,
) -> Result<GunSummary, GunError> {
    config.validate().map_err(GunError::config)?;

    let span = error_span!("gun", src_chain = %link.src.id(), dst_chain = %link.dst.id());
    let _entered = span.enter();

    let token = transfer_denom(link, &config.amount, config.is_source_denom);
    let sender = link.src.signer().map_err(GunError::relayer)?;
    let timeout = TimeoutOptions {
        height_offset: config.timeout_height_offset,
        duration: config.timeout_duration,
    };

    info!(
        %token,
        msgs_per_round = config.msgs_per_round,
        repeat = ?config.repeat,
        "starting load generator"
    );

    let mut summary = GunSummary::default();

    loop {
        if let Repeat::Times(rounds) = config.repeat {
            if summary.rounds >= rounds {
                break;
            }
        }

        let round = summary.rounds + 1;

        let result = shutdown
            .check()
            .map_err(|_| GunError::cancelled())
            .and_then(|()| run_round(link, config, &token, &sender, &timeout, round, shutdown));

        match result {
            Ok(outcome) => {
                summary.transfers += outcome.transfers;
                summary.receives += outcome.receives;
            }
            Err(e) if e.is_cancelled() && config.repeat == Repeat::Forever => {
                info!(rounds = summary.rounds, "load generator shut down");
                return Ok(summary);
            }
            Err(e) if e.is_cancelled() => return Err(e),
            // Transfers that did not land always end the run.
            Err(e) if e.is_transfer_submit() => return Err(e),
            Err(e) => match config.on_round_failure {
                RoundFailurePolicy::Abort => return Err(e),
                RoundFailurePolicy::SkipRound => {
                    warn!(round, "skipping failed round: {e}");
                    summary.skipped += 1;
                }
            },
        }

        summary.rounds = round;
    }

    info!(
        rounds = summary.rounds,
        skipped = summary.skipped,
        transfers = summary.transfers,
        receives = summary.receives,
        "load generator done"
    );

    Ok(summary)
}

fn run_round<ChainA: ChainHandle, ChainB: ChainHandle>(
    link: &Link<ChainA, ChainB>,
    config: &GunConfig,
    token: &Coin,
    sender: &Signer,
    timeout: &TimeoutOptions,
    round: u64,
    shutdown: &ShutdownSignal,
) -> Result<RoundOutcome, GunError> {
    let tracking_id = TrackingId::Round("gun", round);
    let count = config.msgs_per_round;

    let dst_header = update_lite_with_header(&link.dst.chain).map_err(GunError::relayer)?;
    let timeout = TransferTimeout::new(timeout, &dst_header);

    let transfer = link
        .src
        .build_transfer(token, sender, &config.receiver, &timeout);

    let transfers = RelayMsgs::new((0..count).map(|_| transfer.clone()).collect(), vec![]);

    let report = transfers
        .send_sync(link, tracking_id, shutdown)
        .map_err(link_error)?;

    if !report.is_success() {
        return Err(GunError::transfer_submit(link.src.id(), round));
    }

    if config.enable_metrics {
        telemetry::global().gun_transfers_sent(link.src.id().as_str(), count);
    }

    info!(round, count, "transfers included in {}", link.src.id());

    shutdown
        .sleep(config.post_submit_delay)
        .map_err(|_| GunError::cancelled())?;

    let sent = retrieve_sent_packet_proofs(link, count, shutdown).map_err(link_error)?;

    let dst_msgs = receive_transfer_msgs(link, &sent, token, sender, &config.receiver, &timeout)
        .map_err(GunError::relayer)?;

    let report = RelayMsgs::new(vec![], dst_msgs)
        .send(link, tracking_id, shutdown)
        .map_err(link_error)?;

    if !report.is_success() {
        return Err(GunError::receive_submit(link.dst.id(), round));
    }

    if config.enable_metrics {
        telemetry::global().gun_packets_received(link.dst.id().as_str(), count);
    }

    info!(
        round,
        count,
        first_sequence = %sent.next_sequence_recv,
        "packets received on {}",
        link.dst.id()
    );

    Ok(RoundOutcome {
        transfers: count,
        receives: count,
    })
}
