//! Custom operations of the catalog.

use hookline::{
    Context, DefinitionError, HandlerError, OnHandler, OperationRouterBuilder, Predicate,
    Projection, Record, Request, serde_json::Value,
};

/// Action name for approving a book.
pub const APPROVE_BOOK: &str = "approveBook";

/// Function name for counting books.
pub const GET_BOOK_COUNT: &str = "getBookCount";

/// Marks the book with the given `id` as approved.
///
/// An unknown id is not an error; the update simply matches nothing.
#[derive(Debug, Clone)]
pub struct ApproveBook {
    entity: String,
}

impl ApproveBook {
    /// Approve books of `entity`.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
        }
    }
}

impl OnHandler for ApproveBook {
    async fn on(&self, req: &mut Request, cx: &Context) -> Result<Value, HandlerError> {
        let Some(id) = req.field("id").cloned() else {
            return Err(HandlerError::reject(400, "Book id is mandatory"));
        };
        let rendered = match &id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        tracing::info!("Action approveBook for ID: {rendered}");

        let mut patch = Record::new();
        patch.insert("status".to_owned(), Value::from(crate::handlers::books::APPROVED));
        let affected = cx
            .gateway()
            .update(&self.entity, &Predicate::eq("id", id), patch)
            .await?;
        tracing::debug!(affected, "approval applied");

        Ok(Value::String(format!("Book {rendered} approved successfully")))
    }
}

/// Returns the number of stored books.
#[derive(Debug, Clone)]
pub struct BookCount {
    entity: String,
}

impl BookCount {
    /// Count records of `entity`.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
        }
    }
}

impl OnHandler for BookCount {
    async fn on(&self, _req: &mut Request, cx: &Context) -> Result<Value, HandlerError> {
        let result = cx
            .gateway()
            .aggregate(&self.entity, &Projection::Count)
            .await?;
        match count_of(&result) {
            Some(count) => Ok(Value::from(count)),
            None => Err(HandlerError::unhandled(format!(
                "unexpected count result from gateway: {result}"
            ))),
        }
    }
}

/// Read a count aggregate: either a bare integer or a `{"count": n}` row.
pub fn count_of(result: &Value) -> Option<u64> {
    match result {
        Value::Object(row) => row.get("count").and_then(Value::as_u64),
        other => other.as_u64(),
    }
}

/// Register `approveBook` and `getBookCount` for `entity`.
pub fn register(builder: &mut OperationRouterBuilder, entity: &str) -> Result<(), DefinitionError> {
    builder
        .action(APPROVE_BOOK, ApproveBook::new(entity))?
        .function(GET_BOOK_COUNT, BookCount::new(entity))?;
    Ok(())
}
