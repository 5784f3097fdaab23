//! In-process gateway backed by a map of tables.

use hookline_core::{
    Gateway, GatewayError, Predicate, Projection, Query, Record, async_trait, serde_json::Value,
};
use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

type Tables = HashMap<String, Vec<Record>>;

/// A [`Gateway`] that keeps every entity in memory.
///
/// Tables are created on first insert. Records carrying a non-null value in
/// the key column (default `id`) must be unique within their table.
#[derive(Debug)]
pub struct MemoryGateway {
    tables: RwLock<Tables>,
    key_column: String,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    /// Create an empty gateway keyed on `id`.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            key_column: "id".to_owned(),
        }
    }

    /// Use a different key column.
    pub fn with_key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = column.into();
        self
    }

    /// Number of records stored for `entity`.
    pub fn len(&self, entity: &str) -> usize {
        self.read()
            .map(|tables| tables.get(entity).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Whether `entity` holds no records.
    pub fn is_empty(&self, entity: &str) -> bool {
        self.len(entity) == 0
    }

    /// A copy of every record stored for `entity`.
    pub fn snapshot(&self, entity: &str) -> Vec<Record> {
        self.read()
            .map(|tables| tables.get(entity).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, GatewayError> {
        self.tables
            .read()
            .map_err(|_| GatewayError::backend("memory gateway lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, GatewayError> {
        self.tables
            .write()
            .map_err(|_| GatewayError::backend("memory gateway lock poisoned"))
    }

    fn key_of<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        record.get(&self.key_column).filter(|v| !v.is_null())
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn insert(&self, entity: &str, record: Record) -> Result<Record, GatewayError> {
        let mut tables = self.write()?;
        let table = tables.entry(entity.to_owned()).or_default();

        if let Some(key) = self.key_of(&record) {
            if table.iter().any(|row| self.key_of(row) == Some(key)) {
                return Err(GatewayError::DuplicateKey {
                    entity: entity.to_owned(),
                    key: key.to_string(),
                });
            }
        }
        table.push(record.clone());
        Ok(record)
    }

    async fn query(&self, query: &Query) -> Result<Vec<Record>, GatewayError> {
        let tables = self.read()?;
        let Some(table) = tables.get(query.entity()) else {
            return Ok(Vec::new());
        };
        let matching = table
            .iter()
            .filter(|row| query.predicate().matches(row))
            .map(|row| query.project(row));
        Ok(match query.row_limit() {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    async fn update(
        &self,
        entity: &str,
        predicate: &Predicate,
        patch: Record,
    ) -> Result<usize, GatewayError> {
        let mut tables = self.write()?;
        let Some(table) = tables.get_mut(entity) else {
            return Ok(0);
        };
        let mut affected = 0;
        for row in table.iter_mut().filter(|row| predicate.matches(row)) {
            for (field, value) in &patch {
                row.insert(field.clone(), value.clone());
            }
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete(&self, entity: &str, predicate: &Predicate) -> Result<usize, GatewayError> {
        let mut tables = self.write()?;
        let Some(table) = tables.get_mut(entity) else {
            return Ok(0);
        };
        let before = table.len();
        table.retain(|row| !predicate.matches(row));
        Ok(before - table.len())
    }

    async fn aggregate(
        &self,
        entity: &str,
        projection: &Projection,
    ) -> Result<Value, GatewayError> {
        let tables = self.read()?;
        let rows = tables.get(entity).map(Vec::as_slice).unwrap_or_default();

        Ok(match projection {
            Projection::Count => Value::from(rows.len() as u64),
            Projection::Sum(field) => sum(&numbers(rows, field)),
            Projection::Min(field) => extreme(&numbers(rows, field), |a, b| a < b),
            Projection::Max(field) => extreme(&numbers(rows, field), |a, b| a > b),
        })
    }
}

fn numbers<'a>(rows: &'a [Record], field: &str) -> Vec<&'a Value> {
    rows.iter()
        .filter_map(|row| row.get(field))
        .filter(|v| v.is_number())
        .collect()
}

fn sum(values: &[&Value]) -> Value {
    if values.iter().all(|v| v.is_i64()) {
        Value::from(values.iter().filter_map(|v| v.as_i64()).sum::<i64>())
    } else {
        Value::from(values.iter().filter_map(|v| v.as_f64()).sum::<f64>())
    }
}

fn extreme(values: &[&Value], better: impl Fn(f64, f64) -> bool) -> Value {
    values
        .iter()
        .copied()
        .filter_map(|v| v.as_f64().map(|n| (n, v)))
        .reduce(|best, next| if better(next.0, best.0) { next } else { best })
        .map(|(_, v)| v.clone())
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookline_core::serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    async fn seeded() -> MemoryGateway {
        let gateway = MemoryGateway::new();
        for (id, name, pages) in [(1, "Dune", 412), (2, "Emma", 474), (3, "Ubik", 202)] {
            gateway
                .insert(
                    "books",
                    record(json!({"id": id, "name": name, "pages": pages, "status": "Open"})),
                )
                .await
                .unwrap();
        }
        gateway
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_key() {
        let gateway = seeded().await;
        let err = gateway
            .insert("books", record(json!({"id": 2, "name": "Other"})))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::DuplicateKey { .. }));
        assert_eq!(err.status(), 409);

        // Records without a key are always accepted.
        gateway.insert("books", record(json!({"name": "Anon"}))).await.unwrap();
        gateway.insert("books", record(json!({"name": "Anon"}))).await.unwrap();
        assert_eq!(gateway.len("books"), 5);
    }

    #[tokio::test]
    async fn test_query_update_delete() {
        let gateway = seeded().await;

        let rows = gateway
            .query(&Query::from("books").where_eq("id", 2).columns(["name"]))
            .await
            .unwrap();
        assert_eq!(rows, vec![record(json!({"name": "Emma"}))]);

        let affected = gateway
            .update(
                "books",
                &Predicate::eq("id", 2),
                record(json!({"status": "Approved"})),
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);
        let rows = gateway
            .query(&Query::from("books").where_eq("status", "Approved"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], 2);

        let removed = gateway.delete("books", &Predicate::eq("id", 3)).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(gateway.len("books"), 2);
        assert!(gateway.query(&Query::from("authors")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_aggregates() {
        let gateway = seeded().await;

        let count = gateway.aggregate("books", &Projection::Count).await.unwrap();
        assert_eq!(count, json!(3));
        let sum = gateway
            .aggregate("books", &Projection::Sum("pages".into()))
            .await
            .unwrap();
        assert_eq!(sum, json!(1088));
        let max = gateway
            .aggregate("books", &Projection::Max("pages".into()))
            .await
            .unwrap();
        assert_eq!(max, json!(474));
        let min = gateway
            .aggregate("books", &Projection::Min("pages".into()))
            .await
            .unwrap();
        assert_eq!(min, json!(202));
        let empty = gateway.aggregate("authors", &Projection::Count).await.unwrap();
        assert_eq!(empty, json!(0));
    }
}
