//! Relayer configuration
//!
//! Every relay operation takes an immutable configuration, built once before
//! the operation starts. Chain endpoints are never mutated to tune an
//! operation.

pub mod error;

use core::fmt::{Display, Error as FmtError, Formatter};
use core::str::FromStr;
use core::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize as _, Deserializer, Serializer};
use serde_derive::{Deserialize, Serialize};

use packet_relayer_types::applications::transfer::coin::Coin;
use packet_relayer_types::signer::Signer;

use crate::path::Path;
use crate::util::retry::{Clamped, Fibonacci};

pub use error::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GasPrice {
    pub price: f64,
    pub denom: String,
}

impl GasPrice {
    pub const fn new(price: f64, denom: String) -> Self {
        Self { price, denom }
    }
}

impl Display for GasPrice {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}{}", self.price, self.denom)
    }
}

impl FromStr for GasPrice {
    type Err = Error;

    fn from_str(price_in: &str) -> Result<Self, Self::Err> {
        let spos = price_in.find(char::is_alphabetic);

        match spos {
            Some(position) => {
                let (price_str, denom) = price_in.split_at(position);

                let price = price_str
                    .parse::<f64>()
                    .map_err(|_| Error::invalid_gas_price(price_in.to_string()))?;

                Ok(GasPrice {
                    price,
                    denom: denom.to_owned(),
                })
            }

            None => Err(Error::invalid_gas_price(price_in.to_string())),
        }
    }
}

/// Which directions of a path to relay packets in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RelayDirection {
    /// From the source chain to the destination chain.
    SrcToDst,
    /// From the destination chain to the source chain.
    DstToSrc,
    #[default]
    Both,
}

impl RelayDirection {
    pub fn includes_src_to_dst(&self) -> bool {
        matches!(self, Self::SrcToDst | Self::Both)
    }

    pub fn includes_dst_to_src(&self) -> bool {
        matches!(self, Self::DstToSrc | Self::Both)
    }
}

impl Display for RelayDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Self::SrcToDst => write!(f, "src"),
            Self::DstToSrc => write!(f, "dst"),
            Self::Both => write!(f, "both"),
        }
    }
}

impl FromStr for RelayDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "src" => Ok(Self::SrcToDst),
            "dst" => Ok(Self::DstToSrc),
            "both" => Ok(Self::Both),
            other => Err(Error::invalid_direction(other.to_string())),
        }
    }
}

impl serde::Serialize for RelayDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for RelayDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e: Error| D::Error::custom(e.to_string()))
    }
}

pub mod default {
    use super::*;

    pub fn log_level() -> String {
        "info".to_string()
    }

    pub fn telemetry_host() -> String {
        "127.0.0.1".to_string()
    }

    pub fn telemetry_port() -> u16 {
        3001
    }

    pub fn relay_delay() -> Duration {
        Duration::ZERO
    }

    pub fn max_attempts() -> u32 {
        10
    }

    pub fn initial_retry_delay() -> Duration {
        Duration::from_millis(100)
    }

    pub fn max_retry_delay() -> Duration {
        Duration::from_secs(5)
    }

    pub fn msgs_per_round() -> u64 {
        1
    }

    pub fn post_submit_delay() -> Duration {
        Duration::from_secs(2)
    }

    pub fn timeout_height_offset() -> u64 {
        1000
    }

    pub fn timeout_duration() -> Duration {
        Duration::from_secs(12 * 60 * 60)
    }

    pub fn keep_alive_interval() -> Duration {
        Duration::from_secs(60)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default tracing filter, overridden by `RUST_LOG` when set
    pub log_level: String,
    /// Emit log lines as JSON objects instead of human readable text
    pub log_json: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default::log_level(),
            log_json: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default::telemetry_host")]
    pub host: String,
    #[serde(default = "default::telemetry_port")]
    pub port: u16,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default::telemetry_host(),
            port: default::telemetry_port(),
        }
    }
}

/// Bounds of a single transaction. Zero means unbounded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    pub max_msg_num: usize,
    pub max_tx_size: usize,
}

impl BatchConfig {
    pub const fn unbounded() -> Self {
        Self {
            max_msg_num: 0,
            max_tx_size: 0,
        }
    }

    /// Whether a transaction of `msg_count` messages totalling `tx_size` bytes
    /// goes over either bound.
    pub fn exceeded_by(&self, msg_count: usize, tx_size: usize) -> bool {
        (self.max_msg_num != 0 && msg_count > self.max_msg_num)
            || (self.max_tx_size != 0 && tx_size > self.max_tx_size)
    }
}

/// Bounded retries with Fibonacci backoff.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Total number of attempts, the first one included
    #[serde(default = "default::max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default::initial_retry_delay", with = "humantime_serde")]
    pub initial_delay: Duration,
    #[serde(default = "default::max_retry_delay", with = "humantime_serde")]
    pub max_delay: Duration,
}

impl RetryConfig {
    /// The delays to wait between attempts: one fewer than there are attempts.
    pub fn strategy(&self) -> Clamped<Fibonacci> {
        Clamped::new(
            Fibonacci::from(self.initial_delay),
            self.max_delay,
            self.max_attempts.saturating_sub(1) as usize,
        )
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_attempts == 0 {
            return Err(Error::invalid_retry_config());
        }

        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default::max_attempts(),
            initial_delay: default::initial_retry_delay(),
            max_delay: default::max_retry_delay(),
        }
    }
}

/// Per-endpoint tunables of relay operations.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Pause before every message batch submission
    #[serde(default = "default::relay_delay", with = "humantime_serde")]
    pub delay: Duration,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub gas: Option<u64>,
    #[serde(
        default,
        serialize_with = "gas_price::serialize",
        deserialize_with = "gas_price::deserialize"
    )]
    pub gas_price: Option<GasPrice>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            delay: default::relay_delay(),
            batch: BatchConfig::default(),
            retry: RetryConfig::default(),
            gas: None,
            gas_price: None,
        }
    }
}

/// Gas prices are written the way chains print them, eg. `0.025stake`.
mod gas_price {
    use serde::de::Error as _;
    use serde::Deserialize as _;

    use super::*;

    pub fn serialize<S: Serializer>(price: &Option<GasPrice>, serializer: S) -> Result<S::Ok, S::Error> {
        match price {
            Some(price) => serializer.collect_str(price),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<GasPrice>, D::Error> {
        let price = Option::<String>::deserialize(deserializer)?;

        price
            .map(|p| p.parse().map_err(|e: Error| D::Error::custom(e.to_string())))
            .transpose()
    }
}

/// What the load generator does when a round fails. Transfers the source
/// chain did not accept end the run whatever the policy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundFailurePolicy {
    /// Stop the whole run with the round's error.
    #[default]
    Abort,
    /// Log the error and go on with the next round. A skipped round still
    /// counts towards the number of rounds to run.
    SkipRound,
}

/// How many rounds the load generator runs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Repeat {
    Times(u64),
    #[default]
    Forever,
}

impl Repeat {
    /// Zero rounds means running until shut down.
    pub fn from_count(count: u64) -> Self {
        if count == 0 {
            Self::Forever
        } else {
            Self::Times(count)
        }
    }
}

impl serde::Serialize for Repeat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Times(count) => serializer.serialize_u64(*count),
            Self::Forever => serializer.serialize_u64(0),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Repeat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Self::from_count)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GunConfig {
    /// Tokens sent by every transfer, eg. `100stake`
    #[serde(with = "coin")]
    pub amount: Coin,
    /// Address receiving the tokens on the destination chain
    pub receiver: Signer,
    /// Whether the source chain is the origin of the denomination
    #[serde(default)]
    pub is_source_denom: bool,
    #[serde(default = "default::msgs_per_round")]
    pub msgs_per_round: u64,
    /// Number of rounds, `0` to run until shut down
    #[serde(default)]
    pub repeat: Repeat,
    /// Pause between submitting the transfers and querying their proofs
    #[serde(default = "default::post_submit_delay", with = "humantime_serde")]
    pub post_submit_delay: Duration,
    /// Blocks after the destination's latest height at which transfers time out
    #[serde(default = "default::timeout_height_offset")]
    pub timeout_height_offset: u64,
    /// Time after the destination's latest header at which transfers time out
    #[serde(default = "default::timeout_duration", with = "humantime_serde")]
    pub timeout_duration: Duration,
    #[serde(default)]
    pub on_round_failure: RoundFailurePolicy,
    /// Count transfers and receives in the telemetry counters
    #[serde(default)]
    pub enable_metrics: bool,
}

impl GunConfig {
    pub fn new(amount: Coin, receiver: Signer) -> Self {
        Self {
            amount,
            receiver,
            is_source_denom: false,
            msgs_per_round: default::msgs_per_round(),
            repeat: Repeat::default(),
            post_submit_delay: default::post_submit_delay(),
            timeout_height_offset: default::timeout_height_offset(),
            timeout_duration: default::timeout_duration(),
            on_round_failure: RoundFailurePolicy::default(),
            enable_metrics: false,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.msgs_per_round == 0 {
            return Err(Error::zero_messages_per_round());
        }

        Ok(())
    }
}

mod coin {
    use serde::de::Error as _;
    use serde::Deserialize as _;

    use super::*;

    pub fn serialize<S: Serializer>(coin: &Coin, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(coin)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Coin, D::Error> {
        let coin = String::deserialize(deserializer)?;

        coin.parse()
            .map_err(|e| Error::invalid_amount(coin.clone(), e))
            .map_err(|e| D::Error::custom(e.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeepAliveConfig {
    /// Pause between two rounds of client updates
    #[serde(default = "default::keep_alive_interval", with = "humantime_serde")]
    pub interval: Duration,
    /// Also update the source chain's client of the destination chain
    #[serde(default)]
    pub update_both_sides: bool,
    /// Serve the liveness gauge over HTTP
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            interval: default::keep_alive_interval(),
            update_both_sides: false,
            telemetry: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    pub path: Path,
    /// Tunables of the source endpoint
    #[serde(default)]
    pub src: RelayConfig,
    /// Tunables of the destination endpoint
    #[serde(default)]
    pub dst: RelayConfig,
    #[serde(default)]
    pub direction: RelayDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gun: Option<GunConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<KeepAliveConfig>,
}

impl Config {
    /// Parse and validate a configuration written in TOML.
    pub fn parse(content: &str) -> Result<Config, Error> {
        let config: Config = toml::from_str(content).map_err(Error::decode)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.src.retry.validate()?;
        self.dst.retry.validate()?;

        if let Some(gun) = &self.gun {
            gun.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    const CONFIG: &str = r#"
        [global]
        log_level = "debug"

        [path.src]
        chain_id = "ibc-0"
        client_id = "07-tendermint-0"
        connection_id = "connection-0"
        channel_id = "channel-0"
        port_id = "transfer"

        [path.dst]
        chain_id = "ibc-1"
        client_id = "07-tendermint-1"
        connection_id = "connection-1"
        channel_id = "channel-1"
        port_id = "transfer"

        [src]
        delay = "500ms"
        gas = 300000
        gas_price = "0.025stake"

        [src.batch]
        max_msg_num = 30
        max_tx_size = 180000

        [dst.retry]
        max_attempts = 3
        initial_delay = "1s"

        [gun]
        amount = "100stake"
        receiver = "cosmos1receiver"
        is_source_denom = true
        msgs_per_round = 40
        repeat = 3
        on_round_failure = "skip_round"

        [keep_alive]
        interval = "30s"
        update_both_sides = true
    "#;

    #[test]
    fn parse_full_config() {
        let config = Config::parse(CONFIG).unwrap();

        assert_eq!(config.global.log_level, "debug");
        assert!(!config.global.log_json);
        assert_eq!(config.path.src.chain_id.as_str(), "ibc-0");
        assert_eq!(config.path.dst.channel_id.as_str(), "channel-1");

        assert_eq!(config.src.delay, Duration::from_millis(500));
        assert_eq!(config.src.gas, Some(300000));
        assert_eq!(
            config.src.gas_price,
            Some(GasPrice::new(0.025, "stake".to_string()))
        );
        assert_eq!(config.src.batch.max_msg_num, 30);
        assert_eq!(config.src.retry, RetryConfig::default());

        assert_eq!(config.dst.delay, Duration::ZERO);
        assert_eq!(config.dst.batch, BatchConfig::unbounded());
        assert_eq!(config.dst.retry.max_attempts, 3);
        assert_eq!(config.dst.retry.initial_delay, Duration::from_secs(1));
        assert_eq!(config.dst.retry.max_delay, Duration::from_secs(5));

        assert_eq!(config.direction, RelayDirection::Both);

        let gun = config.gun.unwrap();
        assert_eq!(gun.amount, "100stake".parse().unwrap());
        assert_eq!(gun.msgs_per_round, 40);
        assert_eq!(gun.repeat, Repeat::Times(3));
        assert_eq!(gun.post_submit_delay, Duration::from_secs(2));
        assert_eq!(gun.timeout_height_offset, 1000);
        assert_eq!(gun.timeout_duration, Duration::from_secs(43200));
        assert_eq!(gun.on_round_failure, RoundFailurePolicy::SkipRound);

        let keep_alive = config.keep_alive.unwrap();
        assert_eq!(keep_alive.interval, Duration::from_secs(30));
        assert!(keep_alive.update_both_sides);
        assert_eq!(keep_alive.telemetry, None);
    }

    #[test]
    fn gun_repeat_zero_runs_forever() {
        let config = CONFIG.replace("repeat = 3", "repeat = 0");
        let config = Config::parse(&config).unwrap();

        assert_eq!(config.gun.unwrap().repeat, Repeat::Forever);
    }

    #[test]
    fn reject_zero_messages_per_round() {
        let config = CONFIG.replace("msgs_per_round = 40", "msgs_per_round = 0");
        assert!(Config::parse(&config).is_err());
    }

    #[test]
    fn reject_malformed_values() {
        for (from, to) in [
            ("\"100stake\"", "\"stake\""),
            ("\"0.025stake\"", "\"stake0.025\""),
            ("\"500ms\"", "\"soon\""),
            ("max_attempts = 3", "max_attempts = 0"),
        ] {
            let config = CONFIG.replace(from, to);
            assert!(Config::parse(&config).is_err(), "{to} should be rejected");
        }
    }

    #[test]
    fn parse_gas_price() {
        let price: GasPrice = "0.025stake".parse().unwrap();
        assert_eq!(price, GasPrice::new(0.025, "stake".to_string()));
        assert_eq!(price.to_string(), "0.025stake");

        assert!("stake".parse::<GasPrice>().is_err());
        assert!("0.025".parse::<GasPrice>().is_err());
    }

    #[test]
    fn parse_relay_direction() {
        assert_eq!("src".parse::<RelayDirection>().unwrap(), RelayDirection::SrcToDst);
        assert_eq!("dst".parse::<RelayDirection>().unwrap(), RelayDirection::DstToSrc);
        assert_eq!("both".parse::<RelayDirection>().unwrap(), RelayDirection::Both);
        assert!("sideways".parse::<RelayDirection>().is_err());
    }

    #[test]
    fn retry_strategy_allows_max_attempts() {
        let retry = RetryConfig::default();
        let delays: Vec<_> = retry.strategy().iter().collect();

        assert_eq!(delays.len(), 9);
        assert_eq!(delays[0], Duration::from_millis(100));
        assert!(delays.iter().all(|d| *d <= Duration::from_secs(5)));
    }

    #[test]
    fn batch_bounds() {
        let batch = BatchConfig {
            max_msg_num: 2,
            max_tx_size: 100,
        };

        assert!(!batch.exceeded_by(2, 100));
        assert!(batch.exceeded_by(3, 10));
        assert!(batch.exceeded_by(1, 101));
        assert!(!BatchConfig::unbounded().exceeded_by(usize::MAX, usize::MAX));
    }
}
