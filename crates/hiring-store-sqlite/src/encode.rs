//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Hire timestamps are stored as `YYYY-MM-DD HH:MM:SS` text so SQLite's date
//! functions (`strftime`, `date`) work on them directly.

use chrono::NaiveDateTime;
use hiring_core::{
  Department, HiredEmployee, Job, Record,
  store::QueryValue,
};
use rusqlite::types::{Value as SqlValue, ValueRef};
use serde_json::Value;

use crate::{Error, Result};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── NaiveDateTime ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: NaiveDateTime) -> String {
  dt.format(DATETIME_FORMAT).to_string()
}

pub fn decode_dt(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Aggregate parameters and cells ──────────────────────────────────────────

pub fn encode_query_value(v: QueryValue) -> SqlValue {
  match v {
    QueryValue::Null => SqlValue::Null,
    QueryValue::Integer(i) => SqlValue::Integer(i),
    QueryValue::Real(f) => SqlValue::Real(f),
    QueryValue::Text(s) => SqlValue::Text(s),
  }
}

/// Normalise a parameter name to SQLite's `:name` form unless it already
/// carries one of the accepted prefixes.
pub fn placeholder(name: String) -> String {
  if name.starts_with([':', '@', '$']) {
    name
  } else {
    format!(":{name}")
  }
}

/// Convert one result cell to JSON. Non-finite reals become `null`; blobs
/// become lowercase hex strings.
pub fn decode_cell(v: ValueRef<'_>) -> Value {
  match v {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(i) => Value::from(i),
    ValueRef::Real(f) => {
      serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
    }
    ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
    ValueRef::Blob(b) => Value::String(hex::encode(b)),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `hiredemployees` row.
pub struct RawHiredEmployee {
  pub id:            i64,
  pub name:          String,
  pub datetime:      String,
  pub department_id: i64,
  pub job_id:        i64,
}

impl RawHiredEmployee {
  pub fn into_record(self) -> Result<Record> {
    Ok(Record::HiredEmployee(HiredEmployee {
      id:            Some(self.id),
      name:          self.name,
      hired_at:      decode_dt(&self.datetime)?,
      department_id: self.department_id,
      job_id:        self.job_id,
    }))
  }
}

/// Raw values read from a `departments` or `jobs` row.
pub struct RawNamed {
  pub id:   i64,
  pub name: String,
}

impl RawNamed {
  pub fn into_department(self) -> Record {
    Record::Department(Department { id: Some(self.id), name: self.name })
  }

  pub fn into_job(self) -> Record {
    Record::Job(Job { id: Some(self.id), name: self.name })
  }
}
