//! The message batch of a relay round: what to submit to each chain of a
//! link, and how each submission went.

use core::fmt::{Display, Error as FmtError, Formatter};

use tracing::{error, info};

use packet_relayer_types::core::ics24_host::identifier::ChainId;
use packet_relayer_types::tx_msg::RelayMsg;

use crate::chain::handle::{BroadcastMode, ChainHandle};
use crate::chain::responses::TxResponse;
use crate::chain::tracking::{TrackedMsgs, TrackingId};
use crate::error::Error;
use crate::link::batch::batch_messages;
use crate::link::error::LinkError;
use crate::link::Link;
use crate::path::ChainEnd;
use crate::util::pretty::PrettyActions;
use crate::util::shutdown::ShutdownSignal;

/// The chain of a link a list of messages is bound for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Source,
    Destination,
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Target::Source => write!(f, "source"),
            Target::Destination => write!(f, "destination"),
        }
    }
}

/// How the submission of one transaction went.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub target: Target,
    pub chain_id: ChainId,
    pub actions: Vec<&'static str>,
    pub result: Result<TxResponse, Error>,
}

impl SubmitOutcome {
    /// The transaction reached the chain and was not rejected.
    pub fn is_success(&self) -> bool {
        matches!(&self.result, Ok(response) if response.is_ok())
    }

    pub fn msg_count(&self) -> usize {
        self.actions.len()
    }
}

/// The outcome of every transaction submitted for a message batch, in
/// submission order.
#[derive(Debug, Default)]
pub struct SendReport {
    outcomes: Vec<SubmitOutcome>,
}

impl SendReport {
    /// Whether every attempted submission succeeded. A batch with nothing to
    /// submit succeeds.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(SubmitOutcome::is_success)
    }

    pub fn outcomes(&self) -> &[SubmitOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = &SubmitOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    /// Number of messages successfully submitted to the `target` chain.
    pub fn submitted_msgs(&self, target: Target) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.target == target && outcome.is_success())
            .map(SubmitOutcome::msg_count)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn push(&mut self, outcome: SubmitOutcome) {
        self.outcomes.push(outcome);
    }
}

/// The messages to submit to each chain of a link during one relay round.
///
/// Within each list, messages are submitted in order: a client update always
/// lands in the same or an earlier transaction than the packets it proves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelayMsgs {
    /// Messages bound for the source chain
    pub src: Vec<RelayMsg>,
    /// Messages bound for the destination chain
    pub dst: Vec<RelayMsg>,
}

impl RelayMsgs {
    pub fn new(src: Vec<RelayMsg>, dst: Vec<RelayMsg>) -> Self {
        Self { src, dst }
    }

    /// Whether there is anything to submit.
    pub fn is_ready(&self) -> bool {
        !self.src.is_empty() || !self.dst.is_empty()
    }

    /// Submit the messages, split into as many transactions as the batch
    /// bounds of each destination endpoint require.
    ///
    /// Waits for the source endpoint's delay first. A failed transaction does
    /// not stop the submission of the following ones.
    pub fn send<ChainA: ChainHandle, ChainB: ChainHandle>(
        &self,
        link: &Link<ChainA, ChainB>,
        tracking_id: TrackingId,
        shutdown: &ShutdownSignal,
    ) -> Result<SendReport, LinkError> {
        shutdown
            .sleep(link.src.config.delay)
            .map_err(|_| LinkError::cancelled())?;

        let mut report = SendReport::default();

        for batch in batch_messages(self.src.clone(), &link.src.config.batch) {
            report.push(submit(
                &link.src,
                Target::Source,
                batch,
                tracking_id,
                BroadcastMode::CheckTx,
            ));
        }

        for batch in batch_messages(self.dst.clone(), &link.dst.config.batch) {
            report.push(submit(
                &link.dst,
                Target::Destination,
                batch,
                tracking_id,
                BroadcastMode::CheckTx,
            ));
        }

        Ok(report)
    }

    /// Submit each list as a single transaction and wait for it to be
    /// included in a block.
    ///
    /// Waits for the source endpoint's delay first. An empty list is skipped.
    pub fn send_sync<ChainA: ChainHandle, ChainB: ChainHandle>(
        &self,
        link: &Link<ChainA, ChainB>,
        tracking_id: TrackingId,
        shutdown: &ShutdownSignal,
    ) -> Result<SendReport, LinkError> {
        shutdown
            .sleep(link.src.config.delay)
            .map_err(|_| LinkError::cancelled())?;

        let mut report = SendReport::default();

        if !self.src.is_empty() {
            report.push(submit(
                &link.src,
                Target::Source,
                self.src.clone(),
                tracking_id,
                BroadcastMode::Commit,
            ));
        }

        if !self.dst.is_empty() {
            report.push(submit(
                &link.dst,
                Target::Destination,
                self.dst.clone(),
                tracking_id,
                BroadcastMode::Commit,
            ));
        }

        Ok(report)
    }
}

/// Submit `msgs` as one transaction and log how it went.
fn submit<Chain: ChainHandle>(
    end: &ChainEnd<Chain>,
    target: Target,
    msgs: Vec<RelayMsg>,
    tracking_id: TrackingId,
    mode: BroadcastMode,
) -> SubmitOutcome {
    let chain_id = end.id();
    let actions = msgs.iter().map(RelayMsg::action).collect();
    let rendered = PrettyActions(&msgs).to_string();

    let tracked_msgs = TrackedMsgs::new(msgs, end.fee(), tracking_id);
    let result = end.chain.send_messages(tracked_msgs, mode);

    match &result {
        Ok(response) if response.is_ok() => {
            info!(
                chain = %chain_id,
                %tracking_id,
                %response,
                msgs = %rendered,
                "submitted transaction to {target} chain"
            );
        }
        Ok(response) => {
            error!(
                chain = %chain_id,
                %tracking_id,
                %response,
                code = response.code,
                msgs = %rendered,
                "{target} chain rejected transaction"
            );
        }
        Err(e) => {
            error!(
                chain = %chain_id,
                %tracking_id,
                msgs = %rendered,
                "failed to submit transaction to {target} chain: {e}"
            );
        }
    }

    SubmitOutcome {
        target,
        chain_id,
        actions,
        result,
    }
}
