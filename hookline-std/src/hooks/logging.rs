//! Logging handler for request observation.

use hookline_core::{AfterHandler, BeforeHandler, Context, HandlerError, Request, serde_json::Value};

/// A handler that logs every request it sees.
///
/// Register it with wildcard matchers in both BEFORE and AFTER to trace all
/// traffic. It never rejects.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler;

impl LoggingHandler {
    /// Create a logging handler.
    pub fn new() -> Self {
        Self
    }
}

impl BeforeHandler for LoggingHandler {
    async fn before(&self, req: &mut Request, _cx: &Context) -> Result<(), HandlerError> {
        tracing::info!(
            "BEFORE -> Event: {}, Entity: {}",
            req.event(),
            req.target().unwrap_or("-")
        );
        Ok(())
    }
}

impl AfterHandler for LoggingHandler {
    async fn after(
        &self,
        outcome: &Value,
        req: &Request,
        _cx: &Context,
    ) -> Result<(), HandlerError> {
        tracing::info!(
            ?outcome,
            "AFTER -> Event: {}, Entity: {}",
            req.event(),
            req.target().unwrap_or("-")
        );
        Ok(())
    }
}
