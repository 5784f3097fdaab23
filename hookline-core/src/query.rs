//! Query descriptors handed to the gateway.
//!
//! The pipeline treats a [`Query`] as opaque: it is carried on the request and
//! only interpreted by the [`Gateway`](crate::Gateway).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored record or request payload: field name to value.
pub type Record = Map<String, Value>;

/// A conjunction of field equality clauses.
///
/// An empty predicate matches every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    clauses: Vec<(String, Value)>,
}

impl Predicate {
    /// A predicate matching every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// A predicate matching records where `field == value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    /// Add another equality clause.
    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    /// The clauses of this predicate.
    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }

    /// Returns `true` if `record` satisfies every clause.
    pub fn matches(&self, record: &Record) -> bool {
        self.clauses
            .iter()
            .all(|(field, value)| record.get(field) == Some(value))
    }
}

/// A read request against one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    entity: String,
    filter: Predicate,
    columns: Vec<String>,
    limit: Option<usize>,
    one: bool,
}

impl Query {
    /// Select every record of `entity`.
    pub fn from(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            filter: Predicate::all(),
            columns: Vec::new(),
            limit: None,
            one: false,
        }
    }

    /// Replace the filter.
    pub fn filter(mut self, filter: Predicate) -> Self {
        self.filter = filter;
        self
    }

    /// Add an equality clause to the filter.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter = self.filter.and(field, value);
        self
    }

    /// Restrict the returned columns.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Return at most `limit` records.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Return a single record (or nothing) instead of a rowset.
    pub fn one(mut self) -> Self {
        self.one = true;
        self.limit = Some(1);
        self
    }

    /// Target entity.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// The filter predicate.
    pub fn predicate(&self) -> &Predicate {
        &self.filter
    }

    /// Projected columns; empty means all.
    pub fn selected_columns(&self) -> &[String] {
        &self.columns
    }

    /// Row limit, if any.
    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Whether a single record is expected.
    pub fn is_one(&self) -> bool {
        self.one
    }

    /// Apply the column projection to a record.
    pub fn project(&self, record: &Record) -> Record {
        if self.columns.is_empty() {
            return record.clone();
        }
        self.columns
            .iter()
            .filter_map(|c| record.get(c).map(|v| (c.clone(), v.clone())))
            .collect()
    }

    /// Shape a rowset into the value a READ returns.
    pub fn shape(&self, rows: Vec<Record>) -> Value {
        if self.one {
            rows.into_iter()
                .next()
                .map(Value::Object)
                .unwrap_or(Value::Null)
        } else {
            Value::Array(rows.into_iter().map(Value::Object).collect())
        }
    }
}

/// An aggregate computed by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    /// Number of records.
    Count,
    /// Sum of a numeric field.
    Sum(String),
    /// Smallest value of a numeric field.
    Min(String),
    /// Largest value of a numeric field.
    Max(String),
}
