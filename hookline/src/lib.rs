//! # hookline - Phased Request Pipeline
//!
//! `hookline` runs every inbound operation on a business entity through
//! three phases: BEFORE handlers validate and enrich, exactly one ON handler
//! performs the effect, and AFTER handlers observe the outcome.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hookline::prelude::*;
//!
//! let mut builder = Registry::builder();
//! builder
//!     .before(EventMatcher::Wildcard, EntityMatcher::Wildcard, LoggingHandler::new())
//!     .before(EventKind::Create, "books", before_fn(|req, _cx| Box::pin(async move {
//!         if req.field("name").is_none() {
//!             req.error(400, "name is mandatory");
//!         }
//!         Ok(())
//!     })));
//!
//! let dispatcher = Dispatcher::new(builder.build(), Arc::new(MemoryGateway::new()))
//!     .with_default_handlers(true);
//! let outcome = dispatcher.dispatch(Request::create("books", data)).await?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use hookline_core::{
    // Handlers
    AfterFn,
    AfterHandler,
    BeforeFn,
    BeforeHandler,
    // Error types
    BoxError,
    Cause,
    // Gateway
    Context,
    DefinitionError,
    DynAfterHandler,
    DynBeforeHandler,
    DynOnHandler,
    // Events
    EntityMatcher,
    EventKind,
    EventMatcher,
    Gateway,
    GatewayError,
    HandlerError,
    Matcher,
    OnFn,
    OnHandler,
    Phase,
    PipelineError,
    // Data
    Predicate,
    Projection,
    Query,
    Record,
    Rejection,
    Request,
    RunState,
    after_fn,
    async_trait,
    before_fn,
    on_fn,
    serde_json,
};

pub use hookline_std::{
    Dispatcher, HandlerPanic, MemoryGateway, Operation, OperationKind, OperationRouter,
    OperationRouterBuilder, PhaseHandler, Registration, Registry, RegistryBuilder,
};

/// Standard handler implementations.
pub mod hooks {
    #![allow(clippy::wildcard_imports)]
    pub use hookline_std::hooks::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use hookline_std::testing::*;
}

/// Prelude module - common imports for Hookline.
///
/// # Usage
///
/// ```rust,ignore
/// use hookline::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Core traits
        AfterHandler,
        BeforeHandler,
        Context,
        // Execution
        Dispatcher,
        EntityMatcher,
        EventKind,
        EventMatcher,
        Gateway,
        // Errors
        HandlerError,
        MemoryGateway,
        OnHandler,
        OperationRouter,
        PipelineError,
        Query,
        Record,
        Registry,
        RegistryBuilder,
        Request,
        after_fn,
        before_fn,
        hooks::LoggingHandler,
        on_fn,
    };
}
