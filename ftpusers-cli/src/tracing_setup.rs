//! Tracing setup for the ftpusers CLI
//!
//! Logs go to stderr so that stdout carries only command output.
//!
//! Usage:
//!   ftpusers --debug ...                   # Debug logging
//!   RUST_LOG=ftpusers_data=debug ftpusers  # Fine-grained log control

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Raise the default level to debug (RUST_LOG still wins)
    pub debug: bool,
}

pub fn init(config: &TracingConfig) -> Result<()> {
    let default_level = if config.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
