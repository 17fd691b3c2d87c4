//! nirimgr daemon library
//!
//! Talks to niri over its IPC socket and reacts to compositor notifications
//! with the rules and event actions from the configuration. Also hosts the
//! one-shot scratchpad and floating window commands.

pub mod engine;
pub mod floating;
pub mod niri_ipc;
pub mod scratch;

use nirimgr_config::{Config, LogLevel};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter())),
        )
        .init();
}

/// Log the config's non-fatal problems
pub fn log_config_warnings(config: &Config) {
    for warning in config.warnings() {
        tracing::warn!("{}", warning);
    }
}
