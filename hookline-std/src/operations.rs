//! Custom operation routing.
//!
//! Actions and functions are not tied to a CRUD verb. Each is resolved by
//! name to exactly one handler and, when invoked directly, runs without
//! BEFORE or AFTER phases.

use crate::guard::{check_errors, guarded};
use hookline_core::{
    Cause, Context, DefinitionError, DynOnHandler, EventKind, OnHandler, Phase, PipelineError,
    Record, Request, serde_json::Value,
};
use std::{collections::HashMap, fmt};

/// Whether an operation changes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// May have side effects.
    Action,
    /// Read-only.
    Function,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationKind::Action => "action",
            OperationKind::Function => "function",
        })
    }
}

/// A registered operation.
pub struct Operation {
    kind: OperationKind,
    handler: Box<dyn DynOnHandler>,
}

impl Operation {
    /// The operation's kind.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// The operation's handler.
    pub fn handler(&self) -> &dyn DynOnHandler {
        self.handler.as_ref()
    }
}

/// Builder for an [`OperationRouter`].
#[derive(Default)]
pub struct OperationRouterBuilder {
    map: HashMap<String, Operation>,
}

impl OperationRouterBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation under `name`.
    pub fn register<H: OnHandler>(
        &mut self,
        name: impl Into<String>,
        kind: OperationKind,
        handler: H,
    ) -> Result<&mut Self, DefinitionError> {
        let name = name.into();
        let parsed: EventKind = match name.parse() {
            Ok(event) => event,
            Err(never) => match never {},
        };
        if !parsed.is_custom() {
            return Err(DefinitionError::ReservedOperationName(name));
        }
        if self.map.contains_key(&name) {
            return Err(DefinitionError::DuplicateOperation(name));
        }
        self.map.insert(
            name,
            Operation {
                kind,
                handler: Box::new(handler),
            },
        );
        Ok(self)
    }

    /// Register a state-changing action.
    pub fn action<H: OnHandler>(
        &mut self,
        name: impl Into<String>,
        handler: H,
    ) -> Result<&mut Self, DefinitionError> {
        self.register(name, OperationKind::Action, handler)
    }

    /// Register a read-only function.
    pub fn function<H: OnHandler>(
        &mut self,
        name: impl Into<String>,
        handler: H,
    ) -> Result<&mut Self, DefinitionError> {
        self.register(name, OperationKind::Function, handler)
    }

    /// Build the router.
    pub fn build(self) -> OperationRouter {
        OperationRouter { map: self.map }
    }
}

/// Resolves custom operations by name.
#[derive(Default)]
pub struct OperationRouter {
    map: HashMap<String, Operation>,
}

impl OperationRouter {
    /// Start building a router.
    pub fn builder() -> OperationRouterBuilder {
        OperationRouterBuilder::new()
    }

    /// Look up an operation.
    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.map.get(name)
    }

    /// Names of all registered operations.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// Get the number of operations.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if no operations are registered.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Invoke an operation with `args` as its payload.
    pub async fn invoke(
        &self,
        name: &str,
        args: Record,
        cx: &Context,
    ) -> Result<Value, PipelineError> {
        let Some(operation) = self.get(name) else {
            return Err(PipelineError::new(
                Phase::On,
                Cause::UnknownOperation(name.to_owned()),
            ));
        };
        tracing::debug!(operation = name, kind = %operation.kind, "invoking operation");

        let mut req = Request::new(EventKind::custom(name.to_owned())).with_data(args);
        let outcome = guarded(Phase::On, operation.handler.on_dyn(&mut req, cx)).await?;
        check_errors(Phase::On, &mut req)?;
        Ok(outcome)
    }
}

impl fmt::Debug for OperationRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRouter")
            .field("operations", &self.map.keys().collect::<Vec<_>>())
            .finish()
    }
}
