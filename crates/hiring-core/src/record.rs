//! Importable entities.
//!
//! Entities are built transiently per upload and handed to a
//! [`HiringStore`](crate::store::HiringStore) as one batch. A missing `id`
//! means the store assigns one on insert.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// The three importable entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
  Department,
  Job,
  HiredEmployee,
}

impl EntityKind {
  pub const ALL: [EntityKind; 3] =
    [EntityKind::Department, EntityKind::Job, EntityKind::HiredEmployee];

  /// Plural label used in upload summaries and log lines.
  pub fn label(self) -> &'static str {
    match self {
      EntityKind::Department => "Departments",
      EntityKind::Job => "Jobs",
      EntityKind::HiredEmployee => "Employees",
    }
  }

  /// The SQL table backing this kind.
  pub fn table(self) -> &'static str {
    match self {
      EntityKind::Department => "departments",
      EntityKind::Job => "jobs",
      EntityKind::HiredEmployee => "hiredemployees",
    }
  }
}

// ─── Entities ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
  pub id:   Option<i64>,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
  pub id:   Option<i64>,
  pub name: String,
}

/// A hiring event. `department_id` and `job_id` must reference existing rows
/// when the batch is committed; the store enforces this, not the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiredEmployee {
  pub id:            Option<i64>,
  pub name:          String,
  /// Naive (no timezone) hire timestamp, stored in the `datetime` column.
  #[serde(rename = "datetime")]
  pub hired_at:      NaiveDateTime,
  pub department_id: i64,
  pub job_id:        i64,
}

/// Any one importable entity.
///
/// Serialises as the bare entity object; there is no `Deserialize` because
/// department and job rows share a shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
  Department(Department),
  Job(Job),
  HiredEmployee(HiredEmployee),
}

impl Record {
  pub fn kind(&self) -> EntityKind {
    match self {
      Record::Department(_) => EntityKind::Department,
      Record::Job(_) => EntityKind::Job,
      Record::HiredEmployee(_) => EntityKind::HiredEmployee,
    }
  }

  pub fn id(&self) -> Option<i64> {
    match self {
      Record::Department(d) => d.id,
      Record::Job(j) => j.id,
      Record::HiredEmployee(e) => e.id,
    }
  }

  pub fn name(&self) -> &str {
    match self {
      Record::Department(d) => &d.name,
      Record::Job(j) => &j.name,
      Record::HiredEmployee(e) => &e.name,
    }
  }
}

impl From<Department> for Record {
  fn from(d: Department) -> Self { Record::Department(d) }
}

impl From<Job> for Record {
  fn from(j: Job) -> Self { Record::Job(j) }
}

impl From<HiredEmployee> for Record {
  fn from(e: HiredEmployee) -> Self { Record::HiredEmployee(e) }
}
