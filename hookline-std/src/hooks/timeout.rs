//! Timeout wrapper for time-limited gateway calls.

use hookline_core::{
    Gateway, GatewayError, Predicate, Projection, Query, Record, async_trait, serde_json::Value,
};
use std::{future::Future, time::Duration};
use tokio::time::timeout;

/// A gateway that bounds every call of an inner gateway.
///
/// A call that exceeds the limit fails with [`GatewayError::Timeout`]. The
/// inner call is dropped, so its effect may or may not have been applied.
#[derive(Debug)]
pub struct TimeoutGateway<G> {
    inner: G,
    duration: Duration,
}

impl<G> TimeoutGateway<G> {
    /// Wrap `inner` with a per-call limit.
    pub fn new(inner: G, duration: Duration) -> Self {
        Self { inner, duration }
    }

    /// The per-call limit.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// The wrapped gateway.
    pub fn inner(&self) -> &G {
        &self.inner
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        match timeout(self.duration, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(limit = ?self.duration, "gateway call timed out");
                Err(GatewayError::Timeout(self.duration))
            }
        }
    }
}

#[async_trait]
impl<G: Gateway> Gateway for TimeoutGateway<G> {
    async fn insert(&self, entity: &str, record: Record) -> Result<Record, GatewayError> {
        self.bounded(self.inner.insert(entity, record)).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Record>, GatewayError> {
        self.bounded(self.inner.query(query)).await
    }

    async fn update(
        &self,
        entity: &str,
        predicate: &Predicate,
        patch: Record,
    ) -> Result<usize, GatewayError> {
        self.bounded(self.inner.update(entity, predicate, patch)).await
    }

    async fn delete(&self, entity: &str, predicate: &Predicate) -> Result<usize, GatewayError> {
        self.bounded(self.inner.delete(entity, predicate)).await
    }

    async fn aggregate(
        &self,
        entity: &str,
        projection: &Projection,
    ) -> Result<Value, GatewayError> {
        self.bounded(self.inner.aggregate(entity, projection)).await
    }
}
