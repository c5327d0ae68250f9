use core::fmt::{Display, Formatter};
use core::str::FromStr;

use flex_error::define_error;
use serde_derive::{Deserialize, Serialize};

define_error! {
    SignerError {
        EmptySigner
            | _ | { "signer cannot be empty" },

        InvalidSigner
            { signer: String }
            | e | { format_args!("signer `{0}` cannot contain whitespace", e.signer) },
    }
}

/// The bech32 rendering of an account address, used both as the signer of
/// relayed messages and as the sender/receiver of token transfers.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Signer(String);

impl Signer {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Signer {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Signer {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.is_empty() {
            return Err(SignerError::empty_signer());
        }

        if s.contains(char::is_whitespace) {
            return Err(SignerError::invalid_signer(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn parse_signer() {
        let signer: Signer = " cosmos1xyz ".parse().unwrap();
        assert_eq!(signer.as_str(), "cosmos1xyz");

        assert!("".parse::<Signer>().is_err());
        assert!("cosmos1 xyz".parse::<Signer>().is_err());
    }
}
