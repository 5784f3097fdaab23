//! # bookshop
//!
//! A book catalog served through the Hookline pipeline.
//!
//! The catalog exposes CRUD on a single entity (`books` by default), the
//! `approveBook` action and the `getBookCount` function. Handlers are
//! registered once by [`CatalogService`]:
//!
//! - **BEFORE**: generic logging; CREATE requires a name and assigns a random
//!   id; UPDATE refuses approved books; NEW/PATCH/SAVE are logged.
//! - **ON**: CREATE inserts through the gateway, READ runs the query, UPDATE
//!   echoes the payload, DELETE acknowledges.
//! - **AFTER**: logging only.
//!
//! ```rust,ignore
//! let config = CatalogConfig::load()?;
//! telemetry::init_tracing(&config)?;
//!
//! let catalog = CatalogService::in_memory(config)?;
//! let book = catalog.create(data).await?;
//! catalog.approve_book(book["id"].clone()).await?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod ids;
pub mod operations;
pub mod service;
pub mod telemetry;

pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use handlers::drafts::DraftEvent;
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use service::CatalogService;
