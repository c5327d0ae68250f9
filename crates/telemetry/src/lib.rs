//! Prometheus metrics exported by the packet relayer.
//!
//! Metrics live in a single process-wide [`TelemetryState`], reachable through
//! [`global`], and are served in the text exposition format by [`spawn`].

pub mod server;
pub mod state;

use std::error::Error;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::thread::JoinHandle;

use once_cell::sync::Lazy;

pub use crate::state::TelemetryState;

static GLOBAL_STATE: Lazy<Arc<TelemetryState>> = Lazy::new(|| Arc::new(TelemetryState::default()));

pub fn global() -> &'static Arc<TelemetryState> {
    &GLOBAL_STATE
}

/// Start the metrics server on a background thread.
///
/// Returns the address actually bound, which differs from the requested one
/// when port `0` is given.
pub fn spawn<A>(
    address: A,
    state: Arc<TelemetryState>,
) -> Result<(SocketAddr, JoinHandle<()>), Box<dyn Error + Send + Sync>>
where
    A: ToSocketAddrs + Send + 'static,
{
    let server = server::listen(address, state)?;
    let address = server.server_addr();

    tracing::info!("telemetry service running, exposing metrics at http://{address}/metrics");

    let handle = std::thread::spawn(move || server.run());

    Ok((address, handle))
}
