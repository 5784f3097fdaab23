//! Error types for setting up the catalog.
//!
//! Request failures are reported as [`hookline::PipelineError`]; the errors
//! here only occur while loading configuration and building the service.

use hookline::{BoxError, DefinitionError};
use thiserror::Error;

/// Result alias for catalog setup.
pub type Result<T, E = CatalogError> = std::result::Result<T, E>;

/// Errors raised while starting the catalog service.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Configuration loaded but holds an unusable value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Handlers or operations conflict.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// The tracing subscriber could not be installed.
    #[error("failed to initialize tracing: {0}")]
    Telemetry(#[source] BoxError),
}

impl From<figment::Error> for CatalogError {
    fn from(err: figment::Error) -> Self {
        CatalogError::Config(Box::new(err))
    }
}
