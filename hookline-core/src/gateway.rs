//! # Persistence Gateway
//!
//! The only way handlers read and write stored entities. The pipeline never
//! touches storage itself; it hands every handler a [`Context`] through which
//! the gateway is reached.
//!
//! Gateways are shared across concurrent runs, so consistency between runs
//! (locking, transactions, timeouts) is the gateway's concern.

use crate::{
    error::GatewayError,
    query::{Predicate, Projection, Query, Record},
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// External persistence collaborator.
#[async_trait]
pub trait Gateway: Send + Sync + 'static {
    /// Insert `record` into `entity`, returning the stored record.
    async fn insert(&self, entity: &str, record: Record) -> Result<Record, GatewayError>;

    /// Run a query, returning the matching rows.
    async fn query(&self, query: &Query) -> Result<Vec<Record>, GatewayError>;

    /// Merge `patch` into every record matching `predicate`.
    ///
    /// Returns the number of affected records.
    async fn update(
        &self,
        entity: &str,
        predicate: &Predicate,
        patch: Record,
    ) -> Result<usize, GatewayError>;

    /// Remove every record matching `predicate`.
    ///
    /// Returns the number of removed records.
    async fn delete(&self, entity: &str, predicate: &Predicate) -> Result<usize, GatewayError>;

    /// Compute an aggregate over `entity`.
    async fn aggregate(&self, entity: &str, projection: &Projection)
    -> Result<Value, GatewayError>;
}

#[async_trait]
impl<G: Gateway + ?Sized> Gateway for Arc<G> {
    async fn insert(&self, entity: &str, record: Record) -> Result<Record, GatewayError> {
        (**self).insert(entity, record).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Record>, GatewayError> {
        (**self).query(query).await
    }

    async fn update(
        &self,
        entity: &str,
        predicate: &Predicate,
        patch: Record,
    ) -> Result<usize, GatewayError> {
        (**self).update(entity, predicate, patch).await
    }

    async fn delete(&self, entity: &str, predicate: &Predicate) -> Result<usize, GatewayError> {
        (**self).delete(entity, predicate).await
    }

    async fn aggregate(
        &self,
        entity: &str,
        projection: &Projection,
    ) -> Result<Value, GatewayError> {
        (**self).aggregate(entity, projection).await
    }
}

/// Per-run services handed to every handler.
#[derive(Clone)]
pub struct Context {
    gateway: Arc<dyn Gateway>,
}

impl Context {
    /// Create a context around a shared gateway.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// The persistence gateway.
    pub fn gateway(&self) -> &dyn Gateway {
        &*self.gateway
    }

    /// A clone of the shared gateway handle.
    pub fn shared_gateway(&self) -> Arc<dyn Gateway> {
        Arc::clone(&self.gateway)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}
