//! # hookline-std
//!
//! Standard implementations for the Hookline phased request pipeline.
//!
//! This crate provides:
//! - **Registration**: [`RegistryBuilder`], [`Registry`]
//! - **Execution**: [`Dispatcher`], which runs BEFORE → ON → AFTER
//! - **Custom operations**: [`OperationRouter`]
//! - **Storage**: [`MemoryGateway`]
//! - **Standard handlers**: Logging, Timeout (feature `timeout`)
//! - **Test helpers**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use hookline_core;

// Modules
pub mod dispatcher;
mod guard;
pub mod hooks;
pub mod memory;
pub mod operations;
pub mod registry;
pub mod testing;

pub use dispatcher::Dispatcher;
pub use guard::HandlerPanic;
pub use memory::MemoryGateway;
pub use operations::{Operation, OperationKind, OperationRouter, OperationRouterBuilder};
pub use registry::{PhaseHandler, Registration, Registry, RegistryBuilder};
