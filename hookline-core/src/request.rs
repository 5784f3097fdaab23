//! The request envelope that flows through a pipeline run.

use crate::{
    error::Rejection,
    event::EventKind,
    query::{Query, Record},
};
use serde_json::Value;

/// One inbound operation.
///
/// The event and target are fixed at construction. The payload (`data`) and
/// the query may be rewritten by handlers; later handlers of the same run see
/// those changes.
#[derive(Debug, Clone)]
pub struct Request {
    event: EventKind,
    target: Option<String>,
    data: Record,
    query: Option<Query>,
    errors: Vec<Rejection>,
}

impl Request {
    /// Create a request for `event` with no target and an empty payload.
    pub fn new(event: EventKind) -> Self {
        Self {
            event,
            target: None,
            data: Record::new(),
            query: None,
            errors: Vec::new(),
        }
    }

    /// A CREATE of `data` in `entity`.
    pub fn create(entity: impl Into<String>, data: Record) -> Self {
        Self::new(EventKind::Create).with_target(entity).with_data(data)
    }

    /// A READ driven by `query`.
    pub fn read(query: Query) -> Self {
        let entity = query.entity().to_owned();
        Self::new(EventKind::Read).with_target(entity).with_query(query)
    }

    /// An UPDATE of `entity` with `data`.
    pub fn update(entity: impl Into<String>, data: Record) -> Self {
        Self::new(EventKind::Update).with_target(entity).with_data(data)
    }

    /// A DELETE from `entity`, keyed by `data`.
    pub fn delete(entity: impl Into<String>, data: Record) -> Self {
        Self::new(EventKind::Delete).with_target(entity).with_data(data)
    }

    /// Set the target entity.
    pub fn with_target(mut self, entity: impl Into<String>) -> Self {
        self.target = Some(entity.into());
        self
    }

    /// Set the payload.
    pub fn with_data(mut self, data: Record) -> Self {
        self.data = data;
        self
    }

    /// Set the query descriptor.
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    /// The event being processed.
    pub fn event(&self) -> &EventKind {
        &self.event
    }

    /// The targeted entity, if bound.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// The payload.
    pub fn data(&self) -> &Record {
        &self.data
    }

    /// Mutable access to the payload.
    pub fn data_mut(&mut self) -> &mut Record {
        &mut self.data
    }

    /// A single payload field, treating `null` as absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name).filter(|v| !v.is_null())
    }

    /// Set a payload field.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(name.into(), value.into());
    }

    /// The query descriptor, if any.
    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    /// Replace the query descriptor.
    pub fn set_query(&mut self, query: Query) {
        self.query = Some(query);
    }

    /// Record a rejection without interrupting the current handler.
    ///
    /// The pipeline aborts once the handler returns.
    pub fn error(&mut self, status: u16, message: impl Into<String>) {
        self.errors.push(Rejection::new(status, message));
    }

    /// Rejections recorded so far.
    pub fn errors(&self) -> &[Rejection] {
        &self.errors
    }

    /// Whether any rejection was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Drain recorded rejections.
    pub fn take_errors(&mut self) -> Vec<Rejection> {
        std::mem::take(&mut self.errors)
    }
}
