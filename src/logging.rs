//! Logging init: structured events to stderr, filtered through `RUST_LOG`.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,wporg_asset_cdn=debug";

/// Install the global `tracing` subscriber writing to stderr.
///
/// Fails when a subscriber has already been installed.
pub fn init_logging() -> Result<()> {
  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_writer(std::io::stderr)
    .with_ansi(false)
    .try_init()
    .map_err(|err| anyhow!("failed to initialise logging: {err}"))?;

  tracing::debug!("wporg-asset-cdn logging initialised");
  Ok(())
}
