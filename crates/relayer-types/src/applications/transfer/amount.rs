use core::str::FromStr;

use derive_more::{Display, From, Into};
use serde_derive::{Deserialize, Serialize};

use super::error::Error;

/// An amount of tokens, in the smallest unit of their denomination.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into,
)]
pub struct Amount(u128);

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = s
            .parse::<u128>()
            .map_err(|e| Error::invalid_amount(s.to_string(), e))?;

        Ok(Self(amount))
    }
}

impl From<u64> for Amount {
    fn from(amount: u64) -> Self {
        Self(u128::from(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn parses_amounts_beyond_u64() {
        let amount: Amount = "340282366920938463463374607431768211455".parse().unwrap();
        assert_eq!(amount, Amount::from(u128::MAX));

        assert!("-1".parse::<Amount>().is_err());
        assert!("1.5".parse::<Amount>().is_err());
    }
}
