//! Testing utilities for Hookline.
//!
//! This module provides utilities to make testing handlers and pipelines easier.
//!
//! # Features
//!
//! - [`RecordingGateway`]: A gateway wrapper that records every call
//! - [`FailingGateway`]: A gateway whose every call fails
//! - [`OrderLog`]: A shared log that handlers append their labels to
//! - [`FailingHandler`]: A handler that fails in a chosen way

use crate::memory::MemoryGateway;
use hookline_core::{
    AfterHandler, BeforeHandler, Context, Gateway, GatewayError, HandlerError, OnHandler,
    Predicate, Projection, Query, Record, Request, async_trait, serde_json::Value,
};
use std::sync::{Arc, Mutex};

// ============================================================================
// Recording Gateway
// ============================================================================

/// One call observed by a [`RecordingGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    /// `insert` into an entity.
    Insert(String),
    /// `query` against an entity.
    Query(String),
    /// `update` of an entity.
    Update(String),
    /// `delete` from an entity.
    Delete(String),
    /// `aggregate` over an entity.
    Aggregate(String),
}

impl GatewayCall {
    /// The entity the call addressed.
    pub fn entity(&self) -> &str {
        match self {
            GatewayCall::Insert(e)
            | GatewayCall::Query(e)
            | GatewayCall::Update(e)
            | GatewayCall::Delete(e)
            | GatewayCall::Aggregate(e) => e,
        }
    }
}

/// A gateway that records every call before forwarding it.
///
/// Useful for asserting that a rejected request never reached storage.
///
/// # Example
///
/// ```rust,ignore
/// let gateway = Arc::new(RecordingGateway::new(MemoryGateway::new()));
/// let dispatcher = Dispatcher::new(registry, gateway.clone());
///
/// dispatcher.dispatch(Request::create("books", data)).await.unwrap_err();
/// assert_eq!(gateway.inserts(), 0);
/// ```
pub struct RecordingGateway<G = MemoryGateway> {
    inner: G,
    calls: Mutex<Vec<GatewayCall>>,
}

impl<G> RecordingGateway<G> {
    /// Wrap `inner`.
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The wrapped gateway.
    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Get a clone of the recorded calls.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the number of `insert` calls.
    pub fn inserts(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, GatewayCall::Insert(_)))
            .count()
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for RecordingGateway<MemoryGateway> {
    fn default() -> Self {
        Self::new(MemoryGateway::new())
    }
}

#[async_trait]
impl<G: Gateway> Gateway for RecordingGateway<G> {
    async fn insert(&self, entity: &str, record: Record) -> Result<Record, GatewayError> {
        self.record(GatewayCall::Insert(entity.to_owned()));
        self.inner.insert(entity, record).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Record>, GatewayError> {
        self.record(GatewayCall::Query(query.entity().to_owned()));
        self.inner.query(query).await
    }

    async fn update(
        &self,
        entity: &str,
        predicate: &Predicate,
        patch: Record,
    ) -> Result<usize, GatewayError> {
        self.record(GatewayCall::Update(entity.to_owned()));
        self.inner.update(entity, predicate, patch).await
    }

    async fn delete(&self, entity: &str, predicate: &Predicate) -> Result<usize, GatewayError> {
        self.record(GatewayCall::Delete(entity.to_owned()));
        self.inner.delete(entity, predicate).await
    }

    async fn aggregate(
        &self,
        entity: &str,
        projection: &Projection,
    ) -> Result<Value, GatewayError> {
        self.record(GatewayCall::Aggregate(entity.to_owned()));
        self.inner.aggregate(entity, projection).await
    }
}

// ============================================================================
// Failing Gateway
// ============================================================================

/// A gateway whose every call fails with [`GatewayError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingGateway;

#[async_trait]
impl Gateway for FailingGateway {
    async fn insert(&self, _entity: &str, _record: Record) -> Result<Record, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn query(&self, _query: &Query) -> Result<Vec<Record>, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn update(
        &self,
        _entity: &str,
        _predicate: &Predicate,
        _patch: Record,
    ) -> Result<usize, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn delete(&self, _entity: &str, _predicate: &Predicate) -> Result<usize, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn aggregate(
        &self,
        _entity: &str,
        _projection: &Projection,
    ) -> Result<Value, GatewayError> {
        Err(GatewayError::Unavailable)
    }
}

// ============================================================================
// Order Log
// ============================================================================

/// A shared log of handler labels, in the order the handlers ran.
///
/// # Example
///
/// ```rust,ignore
/// let log = OrderLog::new();
/// builder
///     .before(EventMatcher::Wildcard, EntityMatcher::Wildcard, log.before("generic"))
///     .before(EventKind::Create, "books", log.before("books"));
///
/// dispatcher.dispatch(request).await?;
/// assert_eq!(log.entries(), ["generic", "books"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrderLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl OrderLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a label.
    pub fn push(&self, label: impl Into<String>) {
        self.entries.lock().unwrap().push(label.into());
    }

    /// Get a clone of the logged labels.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Get the number of logged labels.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Check if nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// A handler that logs `label` and passes.
    ///
    /// Implements all three phase traits; the ON form returns `Null`.
    pub fn handler(&self, label: impl Into<String>) -> Recorder {
        Recorder {
            label: label.into(),
            log: self.clone(),
        }
    }

    /// Shorthand for [`handler`](Self::handler) used as a BEFORE handler.
    pub fn before(&self, label: impl Into<String>) -> Recorder {
        self.handler(label)
    }

    /// Shorthand for [`handler`](Self::handler) used as an AFTER handler.
    pub fn after(&self, label: impl Into<String>) -> Recorder {
        self.handler(label)
    }
}

/// A handler that appends its label to an [`OrderLog`].
#[derive(Debug, Clone)]
pub struct Recorder {
    label: String,
    log: OrderLog,
}

impl BeforeHandler for Recorder {
    async fn before(&self, _req: &mut Request, _cx: &Context) -> Result<(), HandlerError> {
        self.log.push(self.label.clone());
        Ok(())
    }
}

impl OnHandler for Recorder {
    async fn on(&self, _req: &mut Request, _cx: &Context) -> Result<Value, HandlerError> {
        self.log.push(self.label.clone());
        Ok(Value::Null)
    }
}

impl AfterHandler for Recorder {
    async fn after(
        &self,
        _outcome: &Value,
        _req: &Request,
        _cx: &Context,
    ) -> Result<(), HandlerError> {
        self.log.push(self.label.clone());
        Ok(())
    }
}

// ============================================================================
// Failing Handler
// ============================================================================

#[derive(Debug, Clone)]
enum Failure {
    Reject(u16, String),
    Unhandled(String),
    Panic(String),
}

/// A handler that fails every time it runs.
///
/// Implements all three phase traits.
#[derive(Debug, Clone)]
pub struct FailingHandler {
    failure: Failure,
}

impl FailingHandler {
    /// Fail with a rejection.
    pub fn rejecting(status: u16, message: impl Into<String>) -> Self {
        Self {
            failure: Failure::Reject(status, message.into()),
        }
    }

    /// Fail with an unhandled error.
    pub fn unhandled(message: impl Into<String>) -> Self {
        Self {
            failure: Failure::Unhandled(message.into()),
        }
    }

    /// Panic.
    pub fn panicking(message: impl Into<String>) -> Self {
        Self {
            failure: Failure::Panic(message.into()),
        }
    }

    fn fail<T>(&self) -> Result<T, HandlerError> {
        match &self.failure {
            Failure::Reject(status, message) => Err(HandlerError::reject(*status, message.clone())),
            Failure::Unhandled(message) => Err(HandlerError::unhandled(message.clone())),
            Failure::Panic(message) => panic!("{message}"),
        }
    }
}

impl BeforeHandler for FailingHandler {
    async fn before(&self, _req: &mut Request, _cx: &Context) -> Result<(), HandlerError> {
        self.fail()
    }
}

impl OnHandler for FailingHandler {
    async fn on(&self, _req: &mut Request, _cx: &Context) -> Result<Value, HandlerError> {
        self.fail()
    }
}

impl AfterHandler for FailingHandler {
    async fn after(
        &self,
        _outcome: &Value,
        _req: &Request,
        _cx: &Context,
    ) -> Result<(), HandlerError> {
        self.fail()
    }
}
