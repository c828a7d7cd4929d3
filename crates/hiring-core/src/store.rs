//! The `HiringStore` trait and the aggregate query value types.
//!
//! The trait is implemented by storage backends (e.g. `hiring-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::Value;

use crate::record::{EntityKind, Record};

// ─── Aggregate query types ───────────────────────────────────────────────────

/// A value bound to a named placeholder in an aggregate query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
}

impl From<i64> for QueryValue {
  fn from(v: i64) -> Self { QueryValue::Integer(v) }
}

impl From<f64> for QueryValue {
  fn from(v: f64) -> Self { QueryValue::Real(v) }
}

impl From<&str> for QueryValue {
  fn from(v: &str) -> Self { QueryValue::Text(v.to_owned()) }
}

impl From<String> for QueryValue {
  fn from(v: String) -> Self { QueryValue::Text(v) }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
  fn from(v: Option<T>) -> Self { v.map_or(QueryValue::Null, Into::into) }
}

/// One result row: column name to value, in select-list order.
///
/// Serialises as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
  columns: Vec<(String, Value)>,
}

impl ResultRow {
  pub fn new() -> Self { Self::default() }

  pub fn push(&mut self, column: impl Into<String>, value: Value) {
    self.columns.push((column.into(), value));
  }

  pub fn get(&self, column: &str) -> Option<&Value> {
    self
      .columns
      .iter()
      .find(|(name, _)| name == column)
      .map(|(_, value)| value)
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.columns.iter().map(|(name, _)| name.as_str())
  }

  pub fn values(&self) -> impl Iterator<Item = &Value> {
    self.columns.iter().map(|(_, value)| value)
  }

  pub fn len(&self) -> usize { self.columns.len() }

  pub fn is_empty(&self) -> bool { self.columns.is_empty() }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ResultRow {
  fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
    Self {
      columns: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
    }
  }
}

impl Serialize for ResultRow {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.columns.len()))?;
    for (name, value) in &self.columns {
      map.serialize_entry(name, value)?;
    }
    map.end()
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the relational store the ingest pipeline writes to.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait HiringStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist `records` in a single transaction and return how many rows were
  /// committed.
  ///
  /// Fails without touching the database if `records.len()` exceeds
  /// `max_batch_size`. Any insert failure (a dangling foreign key, a
  /// duplicate id) rolls back the whole batch.
  fn create_batch(
    &self,
    records: Vec<Record>,
    max_batch_size: usize,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Read every row of `kind`'s table, ordered by id.
  fn get_all(
    &self,
    kind: EntityKind,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_;

  /// Run a read-only aggregate query.
  ///
  /// `params` are bound to named placeholders (`:year` in the query text,
  /// `"year"` or `":year"` here); values are never interpolated into
  /// `query`.
  fn execute_aggregate<'a>(
    &'a self,
    query: &'a str,
    params: Vec<(String, QueryValue)>,
  ) -> impl Future<Output = Result<Vec<ResultRow>, Self::Error>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn result_row_serialises_in_column_order() {
    let row: ResultRow = [
      ("department", json!("Engineering")),
      ("job", json!("Software Engineer")),
      ("q1", json!(2)),
      ("a_column", json!(null)),
    ]
    .into_iter()
    .collect();

    let text = serde_json::to_string(&row).unwrap();
    assert_eq!(
      text,
      r#"{"department":"Engineering","job":"Software Engineer","q1":2,"a_column":null}"#
    );
    assert_eq!(row.keys().collect::<Vec<_>>(), ["department", "job", "q1", "a_column"]);
    assert_eq!(row.get("q1"), Some(&json!(2)));
  }

  #[test]
  fn optional_params_become_null() {
    assert_eq!(QueryValue::from(None::<i64>), QueryValue::Null);
    assert_eq!(QueryValue::from(Some("x")), QueryValue::Text("x".into()));
  }
}
