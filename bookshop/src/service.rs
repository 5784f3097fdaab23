//! The assembled catalog service.

use crate::{
    config::CatalogConfig,
    error::Result,
    handlers::{self, drafts::DraftEvent},
    ids::{IdGenerator, RandomIds},
    operations::{self, APPROVE_BOOK, GET_BOOK_COUNT},
};
use hookline::{
    Cause, Dispatcher, Gateway, MemoryGateway, OperationRouter, Phase, PipelineError, Query,
    Record, Registry, Request, hooks::TimeoutGateway, serde_json::Value,
};
use std::sync::Arc;

/// Entry point for every catalog request.
///
/// Cheap to clone; clones share the registry, operations and gateway.
#[derive(Debug, Clone)]
pub struct CatalogService {
    dispatcher: Dispatcher,
    config: Arc<CatalogConfig>,
}

impl CatalogService {
    /// Build the service over `gateway`, drawing random ids.
    pub fn new(config: CatalogConfig, gateway: Arc<dyn Gateway>) -> Result<Self> {
        let ids = Arc::new(RandomIds::new(config.id_ceiling));
        Self::with_ids(config, gateway, ids)
    }

    /// Build the service with a custom id generator.
    pub fn with_ids(
        config: CatalogConfig,
        gateway: Arc<dyn Gateway>,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self> {
        config.validate()?;

        let gateway: Arc<dyn Gateway> = match config.gateway_timeout() {
            Some(limit) => Arc::new(TimeoutGateway::new(gateway, limit)),
            None => gateway,
        };

        let mut registry = Registry::builder();
        handlers::register(&mut registry, &config.entity, ids)?;

        let mut router = OperationRouter::builder();
        operations::register(&mut router, &config.entity)?;

        let dispatcher = Dispatcher::new(registry.build(), gateway)
            .with_operations(router.build())
            .with_default_handlers(config.default_handlers);

        tracing::info!(
            entity = %config.entity,
            handlers = dispatcher.registry().len(),
            operations = dispatcher.operations().len(),
            "catalog service ready"
        );
        Ok(Self {
            dispatcher,
            config: Arc::new(config),
        })
    }

    /// Build the service over a fresh [`MemoryGateway`].
    pub fn in_memory(config: CatalogConfig) -> Result<Self> {
        Self::new(config, Arc::new(MemoryGateway::new()))
    }

    /// The underlying dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The active configuration.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Run an arbitrary request.
    pub async fn dispatch(&self, req: Request) -> Result<Value, PipelineError> {
        self.dispatcher.dispatch(req).await
    }

    /// CREATE a book.
    pub async fn create(&self, data: Record) -> Result<Value, PipelineError> {
        self.dispatch(Request::create(self.entity(), data)).await
    }

    /// READ books matching `query`.
    pub async fn read(&self, query: Query) -> Result<Value, PipelineError> {
        self.dispatch(Request::read(query)).await
    }

    /// READ every book.
    pub async fn list(&self) -> Result<Value, PipelineError> {
        self.read(Query::from(self.entity())).await
    }

    /// READ the book with `id`, or `null` if none exists.
    pub async fn find(&self, id: impl Into<Value>) -> Result<Value, PipelineError> {
        self.read(Query::from(self.entity()).where_eq("id", id).one())
            .await
    }

    /// UPDATE a book.
    pub async fn update(&self, data: Record) -> Result<Value, PipelineError> {
        self.dispatch(Request::update(self.entity(), data)).await
    }

    /// DELETE a book.
    pub async fn delete(&self, data: Record) -> Result<Value, PipelineError> {
        self.dispatch(Request::delete(self.entity(), data)).await
    }

    /// Fire a draft event (`NEW`, `PATCH` or `SAVE`).
    pub async fn draft(&self, event: DraftEvent, data: Record) -> Result<Value, PipelineError> {
        self.dispatch(
            Request::new(event.into())
                .with_target(self.entity())
                .with_data(data),
        )
        .await
    }

    /// Invoke `approveBook(id)`.
    pub async fn approve_book(&self, id: impl Into<Value>) -> Result<String, PipelineError> {
        let mut args = Record::new();
        args.insert("id".to_owned(), id.into());
        let outcome = self.dispatcher.invoke(APPROVE_BOOK, args).await?;
        Ok(match outcome {
            Value::String(message) => message,
            other => other.to_string(),
        })
    }

    /// Invoke `getBookCount()`.
    pub async fn book_count(&self) -> Result<u64, PipelineError> {
        let outcome = self.dispatcher.invoke(GET_BOOK_COUNT, Record::new()).await?;
        outcome.as_u64().ok_or_else(|| {
            PipelineError::new(
                Phase::On,
                Cause::Unhandled(format!("{GET_BOOK_COUNT} returned {outcome}").into()),
            )
        })
    }

    fn entity(&self) -> &str {
        &self.config.entity
    }
}
