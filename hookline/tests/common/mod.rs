#![allow(dead_code)]

use hookline::{
    Dispatcher, Gateway, HandlerError, OnHandler, PipelineError, Record, RegistryBuilder, Request,
    on_fn, serde_json::Value, testing::RecordingGateway,
};
use std::sync::Arc;

// ============================================================================
// Test Data
// ============================================================================

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

pub fn book(id: i64, name: &str) -> Record {
    record(hookline::serde_json::json!({ "id": id, "name": name }))
}

// ============================================================================
// Test Handlers
// ============================================================================

/// ON handler that inserts the payload through the gateway.
pub fn insert_payload() -> impl OnHandler {
    on_fn(|req, cx| {
        Box::pin(async move {
            let entity = req.target().unwrap_or_default().to_owned();
            let stored = cx.gateway().insert(&entity, req.data().clone()).await?;
            Ok(Value::Object(stored))
        })
    })
}

/// ON handler that echoes the payload.
pub fn echo() -> impl OnHandler {
    on_fn(|req, _cx| Box::pin(async move { Ok(Value::Object(req.data().clone())) }))
}

/// ON handler that fails with `status`.
pub fn refuse(status: u16, message: &'static str) -> impl OnHandler {
    on_fn(move |_req, _cx| Box::pin(async move { Err(HandlerError::reject(status, message)) }))
}

// ============================================================================
// Fixtures
// ============================================================================

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub gateway: Arc<RecordingGateway>,
}

impl Harness {
    pub fn new(builder: RegistryBuilder) -> Self {
        let gateway = Arc::new(RecordingGateway::default());
        let dispatcher = Dispatcher::new(builder.build(), gateway.clone());
        Self {
            dispatcher,
            gateway,
        }
    }

    pub fn with_gateway(builder: RegistryBuilder, gateway: Arc<dyn Gateway>) -> Dispatcher {
        Dispatcher::new(builder.build(), gateway)
    }

    pub async fn create(&self, data: Record) -> Result<Value, PipelineError> {
        self.dispatcher.dispatch(Request::create("books", data)).await
    }
}
