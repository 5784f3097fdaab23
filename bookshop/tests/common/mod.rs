#![allow(dead_code)]

use bookshop::{CatalogConfig, CatalogService, SequentialIds};
use hookline::{
    Gateway, GatewayError, MemoryGateway, Predicate, Projection, Query, Record, async_trait,
    serde_json::Value, testing::RecordingGateway,
};
use std::{sync::Arc, time::Duration};

pub struct Catalog {
    pub service: CatalogService,
    pub gateway: Arc<RecordingGateway<MemoryGateway>>,
}

/// A catalog over a recording in-memory gateway with ids counting from 1000.
pub fn catalog() -> Catalog {
    catalog_with(CatalogConfig::default())
}

pub fn catalog_with(config: CatalogConfig) -> Catalog {
    let gateway = Arc::new(RecordingGateway::default());
    let service = CatalogService::with_ids(
        config,
        gateway.clone(),
        Arc::new(SequentialIds::starting_at(1000)),
    )
    .unwrap();
    Catalog { service, gateway }
}

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

/// A memory gateway whose `aggregate` results pass through `shape`, the
/// way a SQL backend returns `count(*)` as a row.
pub struct ShapedCounts {
    pub inner: MemoryGateway,
    pub shape: fn(Value) -> Value,
}

impl ShapedCounts {
    pub fn new(shape: fn(Value) -> Value) -> Self {
        Self {
            inner: MemoryGateway::new(),
            shape,
        }
    }
}

#[async_trait]
impl Gateway for ShapedCounts {
    async fn insert(&self, entity: &str, record: Record) -> Result<Record, GatewayError> {
        self.inner.insert(entity, record).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Record>, GatewayError> {
        self.inner.query(query).await
    }

    async fn update(
        &self,
        entity: &str,
        predicate: &Predicate,
        patch: Record,
    ) -> Result<usize, GatewayError> {
        self.inner.update(entity, predicate, patch).await
    }

    async fn delete(&self, entity: &str, predicate: &Predicate) -> Result<usize, GatewayError> {
        self.inner.delete(entity, predicate).await
    }

    async fn aggregate(
        &self,
        entity: &str,
        projection: &Projection,
    ) -> Result<Value, GatewayError> {
        let value = self.inner.aggregate(entity, projection).await?;
        Ok((self.shape)(value))
    }
}

/// A gateway that never answers within any reasonable deadline.
pub struct Stalled;

impl Stalled {
    async fn stall<T>(&self) -> Result<T, GatewayError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(GatewayError::Unavailable)
    }
}

#[async_trait]
impl Gateway for Stalled {
    async fn insert(&self, _entity: &str, _record: Record) -> Result<Record, GatewayError> {
        self.stall().await
    }

    async fn query(&self, _query: &Query) -> Result<Vec<Record>, GatewayError> {
        self.stall().await
    }

    async fn update(
        &self,
        _entity: &str,
        _predicate: &Predicate,
        _patch: Record,
    ) -> Result<usize, GatewayError> {
        self.stall().await
    }

    async fn delete(&self, _entity: &str, _predicate: &Predicate) -> Result<usize, GatewayError> {
        self.stall().await
    }

    async fn aggregate(
        &self,
        _entity: &str,
        _projection: &Projection,
    ) -> Result<Value, GatewayError> {
        self.stall().await
    }
}
