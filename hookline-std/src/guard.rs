//! Phase-boundary error capture.

use futures::{FutureExt, future::BoxFuture};
use hookline_core::{Cause, HandlerError, Phase, PipelineError, Rejection, Request};
use std::{any::Any, panic::AssertUnwindSafe};
use thiserror::Error;

/// A handler panicked while running.
#[derive(Error, Debug)]
#[error("handler panicked: {0}")]
pub struct HandlerPanic(pub String);

/// Await a handler future, converting errors and panics into a failure of `phase`.
pub(crate) async fn guarded<T>(
    phase: Phase,
    fut: BoxFuture<'_, Result<T, HandlerError>>,
) -> Result<T, PipelineError> {
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(PipelineError::new(phase, err)),
        Err(payload) => {
            let panic = HandlerPanic(panic_message(payload.as_ref()));
            tracing::error!(%phase, error = %panic, "handler panicked");
            Err(PipelineError::new(phase, Cause::Unhandled(Box::new(panic))))
        }
    }
}

/// Abort if the handler recorded rejections via [`Request::error`].
pub(crate) fn check_errors(phase: Phase, req: &mut Request) -> Result<(), PipelineError> {
    match Rejection::merge(req.take_errors()) {
        Some(rejection) => Err(PipelineError::new(phase, Cause::Rejected(rejection))),
        None => Ok(()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}
