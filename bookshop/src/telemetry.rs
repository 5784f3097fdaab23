//! Tracing setup.

use crate::{
    config::CatalogConfig,
    error::{CatalogError, Result},
};
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber filtered by `config.log_level`.
///
/// An unparsable filter falls back to `info`. Fails if a global subscriber
/// is already installed.
pub fn init_tracing(config: &CatalogConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .map_err(CatalogError::Telemetry)?;

    tracing::info!("Tracing initialized for catalog: {}", config.entity);
    Ok(())
}
