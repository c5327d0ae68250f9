use core::fmt::{Display, Error as FmtError, Formatter};

use packet_relayer_types::tx_msg::RelayMsg;

use crate::config::GasPrice;

/// Identifies the relay operation a transaction was submitted for, so that
/// log lines of the same round can be correlated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrackingId {
    /// A one-off operation, named after what it does.
    Static(&'static str),
    /// A numbered round of a long-running loop.
    Round(&'static str, u64),
}

impl Display for TrackingId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            TrackingId::Static(name) => write!(f, "{name}"),
            TrackingId::Round(name, round) => write!(f, "{name}-{round}"),
        }
    }
}

/// Fee settings a chain handle applies to the transaction it builds.
///
/// `None` leaves the choice to the chain handle's own defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TxFee {
    pub gas: Option<u64>,
    pub gas_price: Option<GasPrice>,
}

/// The messages of one transaction, along with the fee settings to submit it
/// with and the identifier of the operation that produced it.
#[derive(Clone, Debug)]
pub struct TrackedMsgs {
    pub msgs: Vec<RelayMsg>,
    pub fee: TxFee,
    pub tracking_id: TrackingId,
}

impl TrackedMsgs {
    pub fn new(msgs: Vec<RelayMsg>, fee: TxFee, tracking_id: TrackingId) -> Self {
        Self {
            msgs,
            fee,
            tracking_id,
        }
    }

    pub fn new_static(msgs: Vec<RelayMsg>, tracking_id: &'static str) -> Self {
        Self::new(msgs, TxFee::default(), TrackingId::Static(tracking_id))
    }

    pub fn messages(&self) -> &[RelayMsg] {
        &self.msgs
    }

    pub fn len(&self) -> usize {
        self.msgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.msgs.is_empty()
    }

    pub fn tracking_id(&self) -> TrackingId {
        self.tracking_id
    }
}
