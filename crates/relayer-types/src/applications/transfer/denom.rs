use core::fmt::{Display, Error as FmtError, Formatter};

use super::error::Error;
use crate::core::ics24_host::identifier::{ChannelId, PortId};

/// The `{port}/{channel}` hop a token went through, prepended to its
/// denomination by the receiving chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TracePrefix {
    port_id: PortId,
    channel_id: ChannelId,
}

impl TracePrefix {
    pub fn new(port_id: PortId, channel_id: ChannelId) -> Self {
        Self {
            port_id,
            channel_id,
        }
    }

    /// Prefixes `denom` with this hop: `{port}/{channel}/{denom}`.
    pub fn apply(&self, denom: &str) -> String {
        format!("{self}/{denom}")
    }
}

impl Display for TracePrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}/{}", self.port_id, self.channel_id)
    }
}

/// A denomination must start with a letter, and may contain letters, digits
/// and `/`, `:`, `.`, `_`, `-` afterwards.
pub fn validate_denom(denom: &str) -> Result<(), Error> {
    let mut chars = denom.chars();

    match chars.next() {
        None => Err(Error::empty_base_denom()),
        Some(first) if !first.is_ascii_alphabetic() => Err(Error::invalid_denom(denom.to_string())),
        Some(_) => {
            if chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c)) {
                Ok(())
            } else {
                Err(Error::invalid_denom(denom.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn trace_prefix_is_applied() {
        let prefix = TracePrefix::new(PortId::transfer(), ChannelId::new(4));
        assert_eq!(prefix.apply("stake"), "transfer/channel-4/stake");
    }

    #[test]
    fn denom_validation() {
        assert!(validate_denom("uatom").is_ok());
        assert!(validate_denom("transfer/channel-0/uatom").is_ok());
        assert!(validate_denom("").is_err());
        assert!(validate_denom("1atom").is_err());
        assert!(validate_denom("at om").is_err());
    }
}
