//! Keeps the light clients of a path from expiring, by updating them at a
//! fixed interval whether or not there are packets to relay.

use flex_error::define_error;
use tracing::{debug, error, error_span, info};

use packet_relayer_telemetry as telemetry;
use packet_relayer_types::core::ics24_host::identifier::ChainId;

use crate::chain::handle::ChainHandle;
use crate::chain::tracking::TrackingId;
use crate::config::KeepAliveConfig;
use crate::error::Error;
use crate::link::error::{LinkError, LinkErrorDetail};
use crate::link::relay_msgs::RelayMsgs;
use crate::link::Link;
use crate::sync::{updates_with_headers, SyncHeaders};
use crate::util::retry::{retry_with_shutdown, RetryError, RetryResult};
use crate::util::shutdown::ShutdownSignal;

define_error! {
    KeepAliveError {
        Relayer
            [ Error ]
            |_| { "relayer error" },

        Link
            [ LinkError ]
            |_| { "link error" },

        HeaderSync
            { attempts: u64 }
            [ Error ]
            |e| {
                format!("failed to fetch the latest headers after {} attempts", e.attempts)
            },

        UpdateClientSubmit
            { chain_id: ChainId, round: u64 }
            |e| {
                format!("round {}: failed to update client on chain {}", e.round, e.chain_id)
            },

        Telemetry
            { address: String, reason: String }
            |e| {
                format!("failed to start the telemetry server on {}: {}", e.address, e.reason)
            },

        Cancelled
            |_| { "client keep-alive was shut down" },
    }
}

impl KeepAliveError {
    fn is_cancelled(&self) -> bool {
        matches!(self.detail(), KeepAliveErrorDetail::Cancelled(_))
    }
}

/// Update the destination's client of the source chain of `link`, and the
/// other way around if configured so, every `config.interval`.
///
/// Runs until shut down, which returns the number of rounds completed, or
/// until an update fails to be included, which is an error.
pub fn run<ChainA: ChainHandle, ChainB: ChainHandle>(
    link: &Link<ChainA, ChainB>,
    config: &KeepAliveConfig,
    shutdown: &ShutdownSignal,
) -> Result<u64, KeepAliveError> {
    let span = error_span!("keep_alive", src_chain = %link.src.id(), dst_chain = %link.dst.id());
    let _entered = span.enter();

    if let Some(telemetry_config) = config.telemetry.as_ref().filter(|t| t.enabled) {
        let address = (telemetry_config.host.clone(), telemetry_config.port);

        telemetry::spawn(address, telemetry::global().clone()).map_err(|e| {
            KeepAliveError::telemetry(
                format!("{}:{}", telemetry_config.host, telemetry_config.port),
                e.to_string(),
            )
        })?;
    }

    info!(
        interval = ?config.interval,
        update_both_sides = config.update_both_sides,
        "starting client keep-alive"
    );

    let mut rounds = 0;

    loop {
        match run_round(link, config, rounds + 1, shutdown) {
            Ok(()) => rounds += 1,
            Err(e) if e.is_cancelled() => break,
            Err(e) => {
                error!(round = rounds + 1, "client keep-alive stopped: {e}");
                return Err(e);
            }
        }

        if shutdown.sleep(config.interval).is_err() {
            break;
        }
    }

    info!(rounds, "client keep-alive shut down");

    Ok(rounds)
}

fn run_round<ChainA: ChainHandle, ChainB: ChainHandle>(
    link: &Link<ChainA, ChainB>,
    config: &KeepAliveConfig,
    round: u64,
    shutdown: &ShutdownSignal,
) -> Result<(), KeepAliveError> {
    let headers = sync_headers(link, shutdown)?;

    let mut msgs = RelayMsgs::default();

    let src_header = headers.get(&link.src.id()).map_err(KeepAliveError::relayer)?;
    let dst_signer = link.dst.signer().map_err(KeepAliveError::relayer)?;
    msgs.dst
        .push(link.dst.build_update_client(src_header, &dst_signer));

    if config.update_both_sides {
        let dst_header = headers.get(&link.dst.id()).map_err(KeepAliveError::relayer)?;
        let src_signer = link.src.signer().map_err(KeepAliveError::relayer)?;
        msgs.src
            .push(link.src.build_update_client(dst_header, &src_signer));
    }

    let report = msgs
        .send_sync(link, TrackingId::Round("keep-alive", round), shutdown)
        .map_err(|e| match e.detail() {
            LinkErrorDetail::Cancelled(_) => KeepAliveError::cancelled(),
            _ => KeepAliveError::link(e),
        })?;

    if let Some(failure) = report.failures().next() {
        return Err(KeepAliveError::update_client_submit(
            failure.chain_id.clone(),
            round,
        ));
    }

    telemetry::global().client_updated_now(
        link.src.id().as_str(),
        link.src.path_end.client_id.as_str(),
    );

    info!(
        round,
        src_height = %src_header.height(),
        "updated client {} on {}",
        link.dst.path_end.client_id,
        link.dst.id(),
    );

    Ok(())
}

/// Fetch the latest headers of both chains, retried like proof retrieval.
fn sync_headers<ChainA: ChainHandle, ChainB: ChainHandle>(
    link: &Link<ChainA, ChainB>,
    shutdown: &ShutdownSignal,
) -> Result<SyncHeaders, KeepAliveError> {
    let retry = &link.src.config.retry;

    let result = retry_with_shutdown(retry.strategy().iter(), shutdown, |attempt| {
        match updates_with_headers(&link.src.chain, &link.dst.chain) {
            Ok(headers) => RetryResult::Ok(headers),
            Err(e) => {
                debug!(attempt, "failed to fetch the latest headers: {e}");
                RetryResult::Retry(e)
            }
        }
    });

    match result {
        Ok(headers) => Ok(headers),
        Err(RetryError::Cancelled { .. }) => Err(KeepAliveError::cancelled()),
        Err(RetryError::Exhausted { tries, error } | RetryError::Aborted { tries, error }) => {
            Err(KeepAliveError::header_sync(tries, error))
        }
    }
}
