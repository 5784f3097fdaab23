//! # hookline-core
//!
//! Core types and traits for the Hookline phased request pipeline.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! services that only define handlers and gateways, without pulling in the
//! registry and dispatcher of `hookline-std`.
//!
//! # Pipeline Model
//!
//! Every inbound operation becomes a [`Request`] and runs through three
//! phases:
//!
//! ## BEFORE ([`BeforeHandler`])
//!
//! Any number of handlers, in registration order. They validate and rewrite
//! the request. A rejection stops the run before anything is persisted.
//!
//! ## ON ([`OnHandler`])
//!
//! Exactly one handler per event and entity. It performs the core effect,
//! usually through the [`Gateway`], and produces the outcome.
//!
//! ## AFTER ([`AfterHandler`])
//!
//! Any number of observers of the outcome. They cannot change it, but a
//! failing AFTER handler still fails the run.
//!
//! # Error Types
//!
//! - [`HandlerError`] - Returned by handlers
//! - [`GatewayError`] - Returned by gateways
//! - [`DefinitionError`] - Raised while registering handlers
//! - [`PipelineError`] - What the caller of a run receives

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod event;
mod gateway;
mod handler;
mod query;
mod request;

// Re-exports
pub use error::{
    BoxError, Cause, DefinitionError, GatewayError, HandlerError, PipelineError, Rejection,
};
pub use event::{EntityMatcher, EventKind, EventMatcher, Matcher, Phase, RunState};
pub use gateway::{Context, Gateway};
pub use handler::{
    AfterFn, AfterHandler, BeforeFn, BeforeHandler, DynAfterHandler, DynBeforeHandler,
    DynOnHandler, OnFn, OnHandler, after_fn, before_fn, on_fn,
};
pub use query::{Predicate, Projection, Query, Record};
pub use request::Request;

// Re-exported so handler crates share one `async_trait` and `serde_json`.
pub use async_trait::async_trait;
pub use serde_json;
