//! # Phase Handlers
//!
//! One trait per phase:
//!
//! - [`BeforeHandler`] - validates and rewrites the request; may reject it
//! - [`OnHandler`] - produces the outcome; exactly one per event and entity
//! - [`AfterHandler`] - observes the outcome; cannot change it
//!
//! # Static vs Dynamic Dispatch
//!
//! The phase traits use native `async fn` so that struct handlers are written
//! without boxing. Registries store the object-safe [`DynBeforeHandler`],
//! [`DynOnHandler`] and [`DynAfterHandler`] forms, which every phase handler
//! implements automatically.
//!
//! # Closures
//!
//! [`before_fn`], [`on_fn`] and [`after_fn`] adapt closures that return a
//! boxed future:
//!
//! ```rust,ignore
//! let validate = before_fn(|req, _cx| Box::pin(async move {
//!     if req.field("name").is_none() {
//!         req.error(400, "name is mandatory");
//!     }
//!     Ok(())
//! }));
//! ```

use crate::{error::HandlerError, gateway::Context, request::Request};
use futures::future::BoxFuture;
use serde_json::Value;
use std::future::Future;

/// Runs before the ON phase.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a BEFORE handler",
    label = "missing `BeforeHandler` implementation",
    note = "Wrap closures with `before_fn` to use them as BEFORE handlers."
)]
pub trait BeforeHandler: Send + Sync + 'static {
    /// Inspect or rewrite the request. Returning an error aborts the run.
    fn before(
        &self,
        req: &mut Request,
        cx: &Context,
    ) -> impl Future<Output = Result<(), HandlerError>> + Send;
}

/// Produces the outcome of a request.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an ON handler",
    label = "missing `OnHandler` implementation",
    note = "Wrap closures with `on_fn` to use them as ON handlers."
)]
pub trait OnHandler: Send + Sync + 'static {
    /// Perform the core effect and return the outcome.
    fn on(
        &self,
        req: &mut Request,
        cx: &Context,
    ) -> impl Future<Output = Result<Value, HandlerError>> + Send;
}

/// Observes a successful outcome.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an AFTER handler",
    label = "missing `AfterHandler` implementation",
    note = "Wrap closures with `after_fn` to use them as AFTER handlers."
)]
pub trait AfterHandler: Send + Sync + 'static {
    /// Observe the outcome. An error fails the whole run.
    fn after(
        &self,
        outcome: &Value,
        req: &Request,
        cx: &Context,
    ) -> impl Future<Output = Result<(), HandlerError>> + Send;
}

/// Object-safe version of [`BeforeHandler`].
pub trait DynBeforeHandler: Send + Sync + 'static {
    /// Dynamic dispatch version of [`BeforeHandler::before`].
    fn before_dyn<'a>(
        &'a self,
        req: &'a mut Request,
        cx: &'a Context,
    ) -> BoxFuture<'a, Result<(), HandlerError>>;
}

impl<T: BeforeHandler> DynBeforeHandler for T {
    fn before_dyn<'a>(
        &'a self,
        req: &'a mut Request,
        cx: &'a Context,
    ) -> BoxFuture<'a, Result<(), HandlerError>> {
        Box::pin(self.before(req, cx))
    }
}

/// Object-safe version of [`OnHandler`].
pub trait DynOnHandler: Send + Sync + 'static {
    /// Dynamic dispatch version of [`OnHandler::on`].
    fn on_dyn<'a>(
        &'a self,
        req: &'a mut Request,
        cx: &'a Context,
    ) -> BoxFuture<'a, Result<Value, HandlerError>>;
}

impl<T: OnHandler> DynOnHandler for T {
    fn on_dyn<'a>(
        &'a self,
        req: &'a mut Request,
        cx: &'a Context,
    ) -> BoxFuture<'a, Result<Value, HandlerError>> {
        Box::pin(self.on(req, cx))
    }
}

/// Object-safe version of [`AfterHandler`].
pub trait DynAfterHandler: Send + Sync + 'static {
    /// Dynamic dispatch version of [`AfterHandler::after`].
    fn after_dyn<'a>(
        &'a self,
        outcome: &'a Value,
        req: &'a Request,
        cx: &'a Context,
    ) -> BoxFuture<'a, Result<(), HandlerError>>;
}

impl<T: AfterHandler> DynAfterHandler for T {
    fn after_dyn<'a>(
        &'a self,
        outcome: &'a Value,
        req: &'a Request,
        cx: &'a Context,
    ) -> BoxFuture<'a, Result<(), HandlerError>> {
        Box::pin(self.after(outcome, req, cx))
    }
}

// Closure adapters

/// A BEFORE handler backed by a closure. See [`before_fn`].
pub struct BeforeFn<F>(F);

/// An ON handler backed by a closure. See [`on_fn`].
pub struct OnFn<F>(F);

/// An AFTER handler backed by a closure. See [`after_fn`].
pub struct AfterFn<F>(F);

/// Adapt a closure into a [`BeforeHandler`].
pub fn before_fn<F>(f: F) -> BeforeFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a Context) -> BoxFuture<'a, Result<(), HandlerError>>
        + Send
        + Sync
        + 'static,
{
    BeforeFn(f)
}

/// Adapt a closure into an [`OnHandler`].
pub fn on_fn<F>(f: F) -> OnFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a Context) -> BoxFuture<'a, Result<Value, HandlerError>>
        + Send
        + Sync
        + 'static,
{
    OnFn(f)
}

/// Adapt a closure into an [`AfterHandler`].
pub fn after_fn<F>(f: F) -> AfterFn<F>
where
    F: for<'a> Fn(&'a Value, &'a Request, &'a Context) -> BoxFuture<'a, Result<(), HandlerError>>
        + Send
        + Sync
        + 'static,
{
    AfterFn(f)
}

impl<F> BeforeHandler for BeforeFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a Context) -> BoxFuture<'a, Result<(), HandlerError>>
        + Send
        + Sync
        + 'static,
{
    fn before(
        &self,
        req: &mut Request,
        cx: &Context,
    ) -> impl Future<Output = Result<(), HandlerError>> + Send {
        async move { (self.0)(req, cx).await }
    }
}

impl<F> OnHandler for OnFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a Context) -> BoxFuture<'a, Result<Value, HandlerError>>
        + Send
        + Sync
        + 'static,
{
    fn on(
        &self,
        req: &mut Request,
        cx: &Context,
    ) -> impl Future<Output = Result<Value, HandlerError>> + Send {
        async move { (self.0)(req, cx).await }
    }
}

impl<F> AfterHandler for AfterFn<F>
where
    F: for<'a> Fn(&'a Value, &'a Request, &'a Context) -> BoxFuture<'a, Result<(), HandlerError>>
        + Send
        + Sync
        + 'static,
{
    fn after(
        &self,
        outcome: &Value,
        req: &Request,
        cx: &Context,
    ) -> impl Future<Output = Result<(), HandlerError>> + Send {
        async move { (self.0)(outcome, req, cx).await }
    }
}
