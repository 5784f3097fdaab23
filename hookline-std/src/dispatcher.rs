//! # Pipeline Dispatcher
//!
//! Runs one [`Request`] through the BEFORE → ON → AFTER pipeline.
//!
//! # Rules
//!
//! - BEFORE handlers run in registration order. The first failure (returned
//!   error, recorded rejection, or panic) aborts the run.
//! - Exactly one ON handler runs. Custom events fall back to the
//!   [`OperationRouter`]; CRUD and draft events fall back to the default
//!   handlers when enabled, and otherwise fail with `NotImplemented`.
//! - AFTER handlers observe the outcome. If one fails, the run is reported
//!   as failed even though the outcome was already computed; the discarded
//!   outcome travels on the error.
//!
//! Handlers of one run execute strictly one after another. Separate runs may
//! execute concurrently on a shared `Dispatcher`; it holds no per-run state.

use crate::{
    guard::{check_errors, guarded},
    operations::OperationRouter,
    registry::Registry,
};
use hookline_core::{
    Cause, Context, EventKind, Gateway, HandlerError, Phase, PipelineError, Query, Record,
    Request, RunState, serde_json::Value,
};
use std::sync::Arc;
use tracing::Instrument;

/// Executes pipeline runs against a registry, an operation router and a gateway.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    operations: Arc<OperationRouter>,
    context: Context,
    default_handlers: bool,
}

impl Dispatcher {
    /// Create a dispatcher with no operations and default handlers disabled.
    pub fn new(registry: Registry, gateway: Arc<dyn Gateway>) -> Self {
        Self {
            registry: Arc::new(registry),
            operations: Arc::new(OperationRouter::default()),
            context: Context::new(gateway),
            default_handlers: false,
        }
    }

    /// Attach the custom operations.
    pub fn with_operations(mut self, operations: OperationRouter) -> Self {
        self.operations = Arc::new(operations);
        self
    }

    /// Enable or disable the per-verb default ON handlers.
    pub fn with_default_handlers(mut self, enabled: bool) -> Self {
        self.default_handlers = enabled;
        self
    }

    /// The handler registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The operation router.
    pub fn operations(&self) -> &OperationRouter {
        &self.operations
    }

    /// The context handed to handlers.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Whether default ON handlers are enabled.
    pub fn default_handlers(&self) -> bool {
        self.default_handlers
    }

    /// Run `req` through the full pipeline and return the outcome.
    pub async fn dispatch(&self, req: Request) -> Result<Value, PipelineError> {
        let span = tracing::info_span!(
            "pipeline",
            event = %req.event(),
            entity = req.target().unwrap_or("-"),
        );
        async move {
            let result = self.run(req).await;
            match &result {
                Ok(_) => tracing::debug!("pipeline completed"),
                Err(err) => tracing::debug!(
                    phase = %err.phase(),
                    state = ?err.state(),
                    status = err.status(),
                    error = %err,
                    "pipeline failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Invoke a custom operation directly, without BEFORE or AFTER phases.
    pub async fn invoke(&self, name: &str, args: Record) -> Result<Value, PipelineError> {
        let span = tracing::info_span!("operation", name);
        self.operations
            .invoke(name, args, &self.context)
            .instrument(span)
            .await
    }

    async fn run(&self, mut req: Request) -> Result<Value, PipelineError> {
        let cx = &self.context;
        let event = req.event().clone();
        let target = req.target().map(str::to_owned);
        let mut state = RunState::Pending;

        advance(&mut state, RunState::BeforeRunning);
        for handler in self.registry.before_handlers(&event, target.as_deref()) {
            guarded(Phase::Before, handler.before_dyn(&mut req, cx)).await?;
            check_errors(Phase::Before, &mut req)?;
        }

        advance(&mut state, RunState::OnRunning);
        let outcome = self.run_on(&event, target.as_deref(), &mut req).await?;

        advance(&mut state, RunState::AfterRunning);
        for handler in self.registry.after_handlers(&event, target.as_deref()) {
            if let Err(err) = guarded(Phase::After, handler.after_dyn(&outcome, &req, cx)).await {
                tracing::warn!(error = %err, "after handler failed; outcome discarded");
                return Err(err.with_discarded_outcome(outcome));
            }
        }

        advance(&mut state, RunState::Completed);
        Ok(outcome)
    }

    async fn run_on(
        &self,
        event: &EventKind,
        target: Option<&str>,
        req: &mut Request,
    ) -> Result<Value, PipelineError> {
        let cx = &self.context;

        let handler = self.registry.on_handler(event, target).or_else(|| {
            event
                .is_custom()
                .then(|| self.operations.get(event.name()))
                .flatten()
                .map(|op| op.handler())
        });

        let outcome = match handler {
            Some(handler) => guarded(Phase::On, handler.on_dyn(req, cx)).await?,
            None if event.is_custom() => {
                return Err(PipelineError::new(
                    Phase::On,
                    Cause::UnknownOperation(event.name().to_owned()),
                ));
            }
            None if self.default_handlers => match target {
                Some(entity) => guarded(Phase::On, Box::pin(default_on(event, entity, req, cx))).await?,
                None => return Err(not_implemented(event, target)),
            },
            None => return Err(not_implemented(event, target)),
        };
        check_errors(Phase::On, req)?;
        Ok(outcome)
    }
}

/// The generic ON behaviour for CRUD and draft events.
async fn default_on(
    event: &EventKind,
    entity: &str,
    req: &mut Request,
    cx: &Context,
) -> Result<Value, HandlerError> {
    match event {
        EventKind::Create => {
            let record = cx.gateway().insert(entity, req.data().clone()).await?;
            Ok(Value::Object(record))
        }
        EventKind::Read => {
            let query = req
                .query()
                .cloned()
                .unwrap_or_else(|| Query::from(entity));
            let rows = cx.gateway().query(&query).await?;
            Ok(query.shape(rows))
        }
        EventKind::Delete => Ok(Value::Null),
        EventKind::Update | EventKind::New | EventKind::Patch | EventKind::Save => {
            Ok(Value::Object(req.data().clone()))
        }
        EventKind::Custom(name) => Err(HandlerError::unhandled(format!(
            "no default behaviour for operation `{name}`"
        ))),
    }
}

fn not_implemented(event: &EventKind, target: Option<&str>) -> PipelineError {
    PipelineError::new(
        Phase::On,
        Cause::NotImplemented {
            event: event.clone(),
            target: target.unwrap_or("<unbound>").to_owned(),
        },
    )
}

fn advance(state: &mut RunState, next: RunState) {
    tracing::trace!(from = ?*state, to = ?next, "run state");
    *state = next;
}
