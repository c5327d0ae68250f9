use core::fmt::{Display, Error as FmtError, Formatter};
use core::str::FromStr;

use serde_derive::{Deserialize, Serialize};

use super::amount::Amount;
use super::denom::validate_denom;
use super::error::Error;
use crate::proto::RawCoin;

/// An amount of tokens of a given denomination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Amount,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }

    /// The same amount under another denomination.
    pub fn with_denom(&self, denom: String) -> Self {
        Self {
            denom,
            amount: self.amount,
        }
    }
}

/// Parses coins written as `{amount}{denom}`, eg. `100stake` or
/// `5transfer/channel-0/uatom`.
impl FromStr for Coin {
    type Err = Error;

    fn from_str(coin_str: &str) -> Result<Self, Self::Err> {
        let coin_str = coin_str.trim();

        let split = coin_str
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| Error::invalid_coin(coin_str.to_string()))?;

        let (amount, denom) = coin_str.split_at(split);

        if amount.is_empty() {
            return Err(Error::invalid_coin(coin_str.to_string()));
        }

        validate_denom(denom)?;

        Ok(Coin {
            denom: denom.to_string(),
            amount: amount.parse()?,
        })
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl From<Coin> for RawCoin {
    fn from(coin: Coin) -> Self {
        RawCoin {
            denom: coin.denom,
            amount: coin.amount.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn parse_coin() {
        let coin: Coin = "100stake".parse().unwrap();
        assert_eq!(coin, Coin::new("stake", 100u64));
        assert_eq!(coin.to_string(), "100stake");

        let coin: Coin = "7transfer/channel-0/uatom".parse().unwrap();
        assert_eq!(coin.denom, "transfer/channel-0/uatom");
    }

    #[test]
    fn parse_invalid_coin() {
        for bad in ["", "100", "stake", "100 stake", "-1stake", "10/stake"] {
            assert!(bad.parse::<Coin>().is_err(), "{bad} should not parse");
        }
    }
}
