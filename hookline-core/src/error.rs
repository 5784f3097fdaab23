//! Error types for Hookline.
//!
//! - [`Rejection`] - A `(status, message)` pair raised by validation
//! - [`HandlerError`] - What a handler returns when it fails
//! - [`GatewayError`] - Failures of the persistence gateway
//! - [`DefinitionError`] - Registration-time configuration conflicts
//! - [`PipelineError`] - The failure of a whole pipeline run, as seen by the caller

use crate::event::{EntityMatcher, EventKind, Matcher, Phase, RunState};
use serde_json::Value;
use std::{fmt, time::Duration};
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A business-rule or validation rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Status-like numeric code (HTTP semantics, e.g. `400`).
    pub status: u16,
    /// Human-readable message.
    pub message: String,
}

impl Rejection {
    /// Create a new rejection.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Fold several rejections into one, keeping the first status.
    pub fn merge(rejections: Vec<Rejection>) -> Option<Rejection> {
        let status = rejections.first()?.status;
        if rejections.len() == 1 {
            return rejections.into_iter().next();
        }
        let message = rejections
            .iter()
            .map(|r| r.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Some(Rejection { status, message })
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

impl std::error::Error for Rejection {}

/// Errors a handler may return.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The request was rejected (validation or business rule).
    #[error("rejected: {0}")]
    Rejected(Rejection),

    /// A gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Any error the pipeline does not model explicitly.
    #[error(transparent)]
    Unhandled(BoxError),
}

impl HandlerError {
    /// Reject the request with a status and message.
    pub fn reject(status: u16, message: impl Into<String>) -> Self {
        HandlerError::Rejected(Rejection::new(status, message))
    }

    /// Wrap an arbitrary error.
    pub fn unhandled(err: impl Into<BoxError>) -> Self {
        HandlerError::Unhandled(err.into())
    }
}

impl From<Rejection> for HandlerError {
    fn from(rejection: Rejection) -> Self {
        HandlerError::Rejected(rejection)
    }
}

impl From<BoxError> for HandlerError {
    fn from(err: BoxError) -> Self {
        HandlerError::Unhandled(err)
    }
}

/// Errors raised by a [`Gateway`](crate::Gateway).
#[derive(Error, Debug)]
pub enum GatewayError {
    /// A record with the same key already exists.
    #[error("duplicate key {key} in {entity}")]
    DuplicateKey {
        /// Entity name.
        entity: String,
        /// Rendered key value.
        key: String,
    },

    /// The call did not complete in time.
    #[error("gateway call timed out after {0:?}")]
    Timeout(Duration),

    /// The backend cannot serve requests.
    #[error("gateway unavailable")]
    Unavailable,

    /// A backend-specific failure.
    #[error("gateway backend error: {0}")]
    Backend(#[source] BoxError),
}

impl GatewayError {
    /// Wrap a backend error.
    pub fn backend(err: impl Into<BoxError>) -> Self {
        GatewayError::Backend(err.into())
    }

    /// Status-like code reported to callers.
    pub fn status(&self) -> u16 {
        match self {
            GatewayError::DuplicateKey { .. } => 409,
            GatewayError::Timeout(_) => 504,
            GatewayError::Unavailable => 503,
            GatewayError::Backend(_) => 500,
        }
    }
}

/// Registration-time configuration conflicts.
///
/// These are raised while building registries and routers, never while
/// dispatching a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// A second ON handler was registered for the same event and entity.
    #[error("an ON handler for {event} on {entity} is already registered")]
    DuplicateOn {
        /// Event of the conflicting registration.
        event: EventKind,
        /// Entity of the conflicting registration.
        entity: String,
    },

    /// An ON handler was registered with a wildcard or unbound matcher.
    #[error("ON handlers need a specific event and entity, got {event} on {entity}")]
    UnspecificOn {
        /// The event matcher supplied.
        event: Matcher<EventKind>,
        /// The entity matcher supplied.
        entity: EntityMatcher,
    },

    /// An operation name was registered twice.
    #[error("operation `{0}` is already registered")]
    DuplicateOperation(String),

    /// A CRUD or draft verb was used as an operation name.
    #[error("`{0}` is a built-in event and cannot name an operation")]
    ReservedOperationName(String),
}

/// Why a pipeline run failed.
#[derive(Error, Debug)]
pub enum Cause {
    /// A handler rejected the request.
    #[error("{0}")]
    Rejected(Rejection),

    /// A gateway call failed.
    #[error(transparent)]
    Gateway(GatewayError),

    /// A handler failed with an unmodelled error or panicked.
    #[error("unhandled error: {0}")]
    Unhandled(#[source] BoxError),

    /// No ON handler is registered and default handlers are disabled.
    #[error("no ON handler for {event} on {target}")]
    NotImplemented {
        /// Dispatched event.
        event: EventKind,
        /// Rendered target entity.
        target: String,
    },

    /// No operation is registered under this name.
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),
}

impl From<HandlerError> for Cause {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::Rejected(rejection) => Cause::Rejected(rejection),
            HandlerError::Gateway(err) => Cause::Gateway(err),
            HandlerError::Unhandled(err) => Cause::Unhandled(err),
        }
    }
}

/// The failure of a pipeline run.
///
/// Carries the phase that failed and, when an AFTER handler failed, the
/// outcome the ON phase had already produced.
#[derive(Error, Debug)]
#[error("{phase} phase failed: {cause}")]
pub struct PipelineError {
    phase: Phase,
    #[source]
    cause: Cause,
    discarded: Option<Value>,
}

impl PipelineError {
    /// Create a failure for the given phase.
    pub fn new(phase: Phase, cause: impl Into<Cause>) -> Self {
        Self {
            phase,
            cause: cause.into(),
            discarded: None,
        }
    }

    /// Attach the outcome that was computed before an AFTER failure.
    pub fn with_discarded_outcome(mut self, outcome: Value) -> Self {
        self.discarded = Some(outcome);
        self
    }

    /// The phase that produced the failure.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The underlying cause.
    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    /// Terminal state of the run.
    pub fn state(&self) -> RunState {
        match self.phase {
            Phase::Before | Phase::On => RunState::Aborted,
            Phase::After => RunState::Failed,
        }
    }

    /// Status-like code reported to the caller.
    pub fn status(&self) -> u16 {
        match &self.cause {
            Cause::Rejected(rejection) => rejection.status,
            Cause::Gateway(err) => err.status(),
            Cause::Unhandled(_) => 500,
            Cause::NotImplemented { .. } => 501,
            Cause::UnknownOperation(_) => 404,
        }
    }

    /// Message reported to the caller.
    pub fn message(&self) -> String {
        match &self.cause {
            Cause::Rejected(rejection) => rejection.message.clone(),
            other => other.to_string(),
        }
    }

    /// Whether a handler rejected the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self.cause, Cause::Rejected(_))
    }

    /// Whether the run failed with an unmodelled error.
    pub fn is_unhandled(&self) -> bool {
        matches!(self.cause, Cause::Unhandled(_))
    }

    /// The outcome discarded because an AFTER handler failed.
    pub fn discarded_outcome(&self) -> Option<&Value> {
        self.discarded.as_ref()
    }
}
