use core::fmt::{Display, Error as FmtError, Formatter};
use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_derive::{Deserialize, Serialize};

/// A timestamp with nanosecond precision, counted from the Unix epoch.
///
/// A value of zero means "no timestamp", which for packet timeouts means the
/// packet never expires by time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct Timestamp {
    nanoseconds: u64,
}

impl Timestamp {
    pub const fn from_nanoseconds(nanoseconds: u64) -> Self {
        Self { nanoseconds }
    }

    pub const fn none() -> Self {
        Self { nanoseconds: 0 }
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        let nanoseconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or_default();

        Self { nanoseconds }
    }

    pub fn nanoseconds(&self) -> u64 {
        self.nanoseconds
    }

    pub fn is_set(&self) -> bool {
        self.nanoseconds != 0
    }

    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        let delta = u64::try_from(duration.as_nanos()).ok()?;

        self.nanoseconds
            .checked_add(delta)
            .map(Self::from_nanoseconds)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        if self.is_set() {
            write!(f, "Timestamp({})", self.nanoseconds)
        } else {
            write!(f, "NoTimestamp")
        }
    }
}
