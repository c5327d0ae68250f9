use core::fmt::{Debug, Display, Error as FmtError, Formatter};
use core::str::FromStr;

use serde_derive::{Deserialize, Serialize};

use super::error::ValidationError;
use super::validate::{
    validate_channel_identifier, validate_client_identifier, validate_connection_identifier,
    validate_port_identifier,
};

/// The identifier of a chain, eg. `ibc-0` or `cosmoshub-4`.
///
/// Chain identifiers in epoch format `{name}-{number}` carry the revision
/// number of the chain, see [`ChainId::version`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ChainId {
    id: String,
    version: u64,
}

impl ChainId {
    /// Creates a new `ChainId` given a chain name and an epoch number.
    ///
    /// The returned `ChainId` will have the format: `{chain name}-{epoch number}`.
    pub fn new(name: &str, version: u64) -> Self {
        Self {
            id: format!("{name}-{version}"),
            version,
        }
    }

    pub fn from_string(id: &str) -> Self {
        let version = Self::chain_version(id);

        Self {
            id: id.to_string(),
            version,
        }
    }

    /// Get a reference to the underlying string.
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Extract the version from this chain identifier.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Extract the version from the given chain identifier.
    /// ```
    /// use packet_relayer_types::core::ics24_host::identifier::ChainId;
    ///
    /// assert_eq!(ChainId::chain_version("chain--a-0"), 0);
    /// assert_eq!(ChainId::chain_version("ibc-10"), 10);
    /// assert_eq!(ChainId::chain_version("cosmos-hub-97"), 97);
    /// assert_eq!(ChainId::chain_version("testnet-helloworld-2"), 2);
    /// assert_eq!(ChainId::chain_version("testnet-helloworld"), 0);
    /// ```
    pub fn chain_version(chain_id: &str) -> u64 {
        if !Self::is_epoch_format(chain_id) {
            return 0;
        }

        chain_id
            .rsplit_once('-')
            .and_then(|(_, version)| version.parse().ok())
            .unwrap_or(0)
    }

    /// is_epoch_format() checks if a chain_id is in the format required for parsing epochs
    /// The chainID must be in the form: `{chainID}-{version}`
    pub fn is_epoch_format(chain_id: &str) -> bool {
        match chain_id.rsplit_once('-') {
            Some((name, version)) => {
                !name.is_empty()
                    && !version.is_empty()
                    && version.chars().all(|c| c.is_ascii_digit())
            }
            None => false,
        }
    }
}

impl FromStr for ChainId {
    type Err = ValidationError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        if id.trim().is_empty() {
            return Err(ValidationError::empty());
        }

        Ok(Self::from_string(id))
    }
}

impl Display for ChainId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}", self.id)
    }
}

impl From<ChainId> for String {
    fn from(value: ChainId) -> String {
        value.id
    }
}

impl From<String> for ChainId {
    fn from(value: String) -> Self {
        Self::from_string(&value)
    }
}

/// Declares a string-backed identifier type validated by the given function.
macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $validate:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Builds an identifier of the form `{prefix}-{counter}`.
            pub fn new(counter: u64) -> Self {
                Self(format!("{}-{}", $prefix, counter))
            }

            /// Get this identifier as a borrowed `&str`
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Get this identifier as a borrowed byte slice
            pub fn as_bytes(&self) -> &[u8] {
                self.0.as_bytes()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $validate(s).map(|_| Self(s.to_string()))
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                $validate(&value).map(|_| Self(value))
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier!(
    /// Identifier of a light client hosted on a chain, eg. `07-tendermint-0`.
    ClientId,
    validate_client_identifier,
    "07-tendermint"
);

identifier!(
    /// Identifier of a connection end, eg. `connection-0`.
    ConnectionId,
    validate_connection_identifier,
    "connection"
);

identifier!(
    /// Identifier of a channel end, eg. `channel-0`.
    ChannelId,
    validate_channel_identifier,
    "channel"
);

identifier!(
    /// Identifier of a port, eg. `transfer`.
    PortId,
    validate_port_identifier,
    "port"
);

impl PortId {
    /// The port bound by the fungible token transfer application.
    pub fn transfer() -> Self {
        Self("transfer".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn chain_id_version_is_parsed_from_epoch_format() {
        let id = ChainId::from_string("ibc-7");
        assert_eq!(id.version(), 7);
        assert_eq!(id.to_string(), "ibc-7");

        let id = ChainId::from_string("testnet");
        assert_eq!(id.version(), 0);
    }

    #[test]
    fn chain_id_rejects_blank() {
        assert!("  ".parse::<ChainId>().is_err());
    }

    #[test]
    fn identifiers_are_validated() {
        assert!("channel-0".parse::<ChannelId>().is_ok());
        assert!("chan".parse::<ChannelId>().is_err());
        assert!("07-tendermint-0".parse::<ClientId>().is_ok());
        assert!("connection-12".parse::<ConnectionId>().is_ok());
        assert!("transfer".parse::<PortId>().is_ok());
        assert!("trans/fer".parse::<PortId>().is_err());
    }

    #[test]
    fn counter_constructors() {
        assert_eq!(ChannelId::new(3).as_str(), "channel-3");
        assert_eq!(ClientId::new(0).as_str(), "07-tendermint-0");
        assert_eq!(ConnectionId::new(1).as_str(), "connection-1");
    }

    #[test]
    fn identifiers_deserialize_with_validation() {
        let ok: Result<ChannelId, _> = serde_json::from_str("\"channel-1\"");
        assert!(ok.is_ok());

        let bad: Result<ChannelId, _> = serde_json::from_str("\"c\"");
        assert!(bad.is_err());
    }
}
