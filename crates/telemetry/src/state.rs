use std::time::{SystemTime, UNIX_EPOCH};

use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, IntCounterVec, Opts, Registry};

pub struct TelemetryState {
    registry: Registry,

    /// Unix time, in seconds, of the last successful client update submitted
    /// by a keep-alive loop, per client and chain
    last_client_update_time: GaugeVec,

    /// Number of transfer messages submitted by the load generator, per chain
    gun_transfers_sent: IntCounterVec,

    /// Number of receive messages submitted by the load generator, per chain
    gun_packets_received: IntCounterVec,
}

impl TelemetryState {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let last_client_update_time = GaugeVec::new(
            Opts::new(
                "last_client_update_time",
                "Unix time of the last successful client update, in seconds",
            ),
            &["client_id", "chain_id"],
        )?;

        let gun_transfers_sent = IntCounterVec::new(
            Opts::new(
                "gun_transfers_sent",
                "Number of transfer messages submitted by the load generator",
            ),
            &["chain_id"],
        )?;

        let gun_packets_received = IntCounterVec::new(
            Opts::new(
                "gun_packets_received",
                "Number of receive messages submitted by the load generator",
            ),
            &["chain_id"],
        )?;

        registry.register(Box::new(last_client_update_time.clone()))?;
        registry.register(Box::new(gun_transfers_sent.clone()))?;
        registry.register(Box::new(gun_packets_received.clone()))?;

        Ok(Self {
            registry,
            last_client_update_time,
            gun_transfers_sent,
            gun_packets_received,
        })
    }

    /// Gather the metrics for export
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Set the last client update time of the given client to now
    pub fn client_updated_now(&self, chain_id: &str, client_id: &str) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();

        self.last_client_update_time
            .with_label_values(&[client_id, chain_id])
            .set(now);
    }

    /// Last recorded client update time, if the client was ever updated
    pub fn last_client_update_time(&self, chain_id: &str, client_id: &str) -> Option<f64> {
        self.last_client_update_time
            .get_metric_with_label_values(&[client_id, chain_id])
            .ok()
            .map(|gauge| gauge.get())
            .filter(|time| *time > 0.0)
    }

    pub fn gun_transfers_sent(&self, chain_id: &str, count: u64) {
        self.gun_transfers_sent
            .with_label_values(&[chain_id])
            .inc_by(count);
    }

    pub fn gun_packets_received(&self, chain_id: &str, count: u64) {
        self.gun_packets_received
            .with_label_values(&[chain_id])
            .inc_by(count);
    }

    pub fn gun_transfers_sent_count(&self, chain_id: &str) -> u64 {
        self.gun_transfers_sent.with_label_values(&[chain_id]).get()
    }

    pub fn gun_packets_received_count(&self, chain_id: &str) -> u64 {
        self.gun_packets_received.with_label_values(&[chain_id]).get()
    }
}

impl Default for TelemetryState {
    // Metric names and labels are static, registration cannot collide.
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self::new().expect("failed to register relayer metrics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn client_update_time_is_labelled() {
        let state = TelemetryState::default();
        assert_eq!(state.last_client_update_time("ibc-0", "07-tendermint-0"), None);

        state.client_updated_now("ibc-0", "07-tendermint-0");

        let time = state
            .last_client_update_time("ibc-0", "07-tendermint-0")
            .unwrap();
        assert!(time > 0.0);

        let families = state.gather();
        let family = families
            .iter()
            .find(|f| f.get_name() == "last_client_update_time")
            .unwrap();

        let labels = family.get_metric()[0].get_label();
        let pairs: Vec<_> = labels
            .iter()
            .map(|l| (l.get_name(), l.get_value()))
            .collect();

        assert!(pairs.contains(&("client_id", "07-tendermint-0")));
        assert!(pairs.contains(&("chain_id", "ibc-0")));
    }

    #[test]
    fn gun_counters_accumulate() {
        let state = TelemetryState::default();

        state.gun_transfers_sent("ibc-0", 3);
        state.gun_transfers_sent("ibc-0", 2);
        state.gun_packets_received("ibc-1", 5);

        assert_eq!(state.gun_transfers_sent_count("ibc-0"), 5);
        assert_eq!(state.gun_packets_received_count("ibc-1"), 5);
        assert_eq!(state.gun_packets_received_count("ibc-0"), 0);
    }
}
