//! Handlers for the books entity.

use crate::ids::IdGenerator;
use hookline::{
    AfterHandler, BeforeHandler, Context, HandlerError, OnHandler, Query, Request,
    serde_json::Value,
};
use std::sync::Arc;

/// Status of a book that may no longer be changed.
pub const APPROVED: &str = "Approved";

/// Logs `<prefix> <EVENT> <entity>` when it runs. Usable in BEFORE and AFTER.
#[derive(Debug, Clone, Copy)]
pub struct Announce(pub &'static str);

impl BeforeHandler for Announce {
    async fn before(&self, req: &mut Request, _cx: &Context) -> Result<(), HandlerError> {
        tracing::info!("{} {} {}", self.0, req.event(), entity_of(req));
        Ok(())
    }
}

impl AfterHandler for Announce {
    async fn after(
        &self,
        outcome: &Value,
        req: &Request,
        _cx: &Context,
    ) -> Result<(), HandlerError> {
        tracing::info!(?outcome, "{} {} {}", self.0, req.event(), entity_of(req));
        Ok(())
    }
}

/// BEFORE CREATE: requires a name and fills in a missing id.
///
/// A missing name is recorded rather than returned, so the id is still
/// assigned before the run aborts.
pub struct PrepareBook {
    ids: Arc<dyn IdGenerator>,
}

impl PrepareBook {
    /// Generate missing ids with `ids`.
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }
}

impl BeforeHandler for PrepareBook {
    async fn before(&self, req: &mut Request, _cx: &Context) -> Result<(), HandlerError> {
        tracing::info!("Before CREATE {}", entity_of(req));

        if !has_name(req.field("name")) {
            req.error(400, "Book name is mandatory");
        }

        if req.field("id").is_none() {
            let id = self.ids.next_id();
            tracing::debug!(id, "generated book id");
            req.set_field("id", id);
        }
        Ok(())
    }
}

/// BEFORE UPDATE: approved books are frozen.
///
/// Rejects when the payload approves the book, or when the stored record
/// with the payload's id is already approved.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuardApproved;

impl BeforeHandler for GuardApproved {
    async fn before(&self, req: &mut Request, cx: &Context) -> Result<(), HandlerError> {
        tracing::info!("Before UPDATE {}", entity_of(req));

        if is_approved(req.field("status")) {
            return Err(HandlerError::reject(400, "Approved books cannot be updated"));
        }

        if let (Some(entity), Some(id)) = (req.target(), req.field("id")) {
            let query = Query::from(entity)
                .where_eq("id", id.clone())
                .columns(["status"])
                .one();
            let current = cx.gateway().query(&query).await?;
            if is_approved(current.first().and_then(|row| row.get("status"))) {
                return Err(HandlerError::reject(400, "Approved books cannot be updated"));
            }
        }
        Ok(())
    }
}

/// Only a non-blank string counts as a name.
fn has_name(name: Option<&Value>) -> bool {
    matches!(name, Some(Value::String(s)) if !s.trim().is_empty())
}

fn is_approved(status: Option<&Value>) -> bool {
    status.and_then(Value::as_str) == Some(APPROVED)
}

/// BEFORE CREATE: a book named `Error` fails with an unhandled error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForcedError;

impl BeforeHandler for ForcedError {
    async fn before(&self, req: &mut Request, _cx: &Context) -> Result<(), HandlerError> {
        if req.field("name").and_then(Value::as_str) == Some("Error") {
            return Err(HandlerError::unhandled("Forced error for testing"));
        }
        Ok(())
    }
}

/// ON CREATE: inserts the payload and returns the stored record.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertBook;

impl OnHandler for InsertBook {
    async fn on(&self, req: &mut Request, cx: &Context) -> Result<Value, HandlerError> {
        let entity = target(req)?;
        tracing::info!("ON CREATE {entity}");
        let stored = cx.gateway().insert(entity, req.data().clone()).await?;
        Ok(Value::Object(stored))
    }
}

/// ON READ: runs the request's query, or selects every book.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadBooks;

impl OnHandler for ReadBooks {
    async fn on(&self, req: &mut Request, cx: &Context) -> Result<Value, HandlerError> {
        tracing::info!("ON READ {}", entity_of(req));
        let query = match req.query() {
            Some(query) => query.clone(),
            None => Query::from(target(req)?),
        };
        let rows = cx.gateway().query(&query).await?;
        Ok(query.shape(rows))
    }
}

/// ON UPDATE: returns the payload without persisting it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoUpdate;

impl OnHandler for EchoUpdate {
    async fn on(&self, req: &mut Request, _cx: &Context) -> Result<Value, HandlerError> {
        tracing::info!("ON UPDATE {}", entity_of(req));
        Ok(Value::Object(req.data().clone()))
    }
}

/// ON DELETE: acknowledges without touching storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcknowledgeDelete;

impl OnHandler for AcknowledgeDelete {
    async fn on(&self, req: &mut Request, _cx: &Context) -> Result<Value, HandlerError> {
        tracing::info!("ON DELETE {}", entity_of(req));
        Ok(Value::Null)
    }
}

fn entity_of(req: &Request) -> &str {
    req.target().unwrap_or("-")
}

fn target(req: &Request) -> Result<&str, HandlerError> {
    req.target()
        .ok_or_else(|| HandlerError::unhandled(format!("{} without a target entity", req.event())))
}
