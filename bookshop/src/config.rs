//! Configuration management using Figment
//!
//! Values are layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. `bookshop.toml` in the working directory (or the path given to
//!    [`CatalogConfig::load_from`])
//! 3. `BOOKSHOP_*` environment variables, e.g. `BOOKSHOP_ID_CEILING=500`

use crate::error::{CatalogError, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "bookshop.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "BOOKSHOP_";

/// Settings of the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Name of the catalog entity.
    pub entity: String,

    /// Exclusive upper bound for generated ids.
    pub id_ceiling: u32,

    /// Enable the per-verb default ON handlers for events without one.
    pub default_handlers: bool,

    /// Tracing filter directive, e.g. `info` or `bookshop=debug,hookline=trace`.
    pub log_level: String,

    /// Per-call gateway deadline in milliseconds. Unset means no deadline.
    pub gateway_timeout_ms: Option<u64>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            entity: "books".to_owned(),
            id_ceiling: 100_000,
            default_handlers: true,
            log_level: "info".to_owned(),
            gateway_timeout_ms: None,
        }
    }
}

impl CatalogConfig {
    /// Load from defaults, `bookshop.toml` and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load using a specific configuration file. A missing file is skipped.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading catalog configuration");

        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.entity.trim().is_empty() {
            return Err(CatalogError::InvalidConfig("entity must not be empty".into()));
        }
        if self.id_ceiling == 0 {
            return Err(CatalogError::InvalidConfig(
                "id_ceiling must be at least 1".into(),
            ));
        }
        if self.gateway_timeout_ms == Some(0) {
            return Err(CatalogError::InvalidConfig(
                "gateway_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    /// The gateway deadline, if one is configured.
    pub fn gateway_timeout(&self) -> Option<Duration> {
        self.gateway_timeout_ms.map(Duration::from_millis)
    }
}
