//! Installation of the global `tracing` subscriber.

use std::io;

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::GlobalConfig;

type StdWriter = fn() -> io::Stderr;

/// The filter to install: `RUST_LOG` when set, the configured level otherwise.
pub fn env_filter(config: &GlobalConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Install a subscriber writing to stderr, as human readable text or as JSON
/// objects depending on `log_json`.
///
/// Fails if a global subscriber is already installed.
#[allow(trivial_casts)]
pub fn init(config: &GlobalConfig) -> Result<(), TryInitError> {
    let builder = FmtSubscriber::builder()
        .with_env_filter(env_filter(config))
        .with_writer(io::stderr as StdWriter)
        .with_ansi(false);

    if config.log_json {
        builder.json().finish().try_init()
    } else {
        builder.finish().try_init()
    }
}
