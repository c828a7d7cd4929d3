//! Record schema registry.
//!
//! Each [`EntityKind`] has one static [`RecordSchema`]: the ordered column
//! list and the function that turns one row of raw strings into a
//! [`Record`]. CSV columns are matched to fields strictly by position; header
//! names are never consulted.

use chrono::NaiveDateTime;

use crate::{
  Error, Result,
  record::{Department, EntityKind, HiredEmployee, Job, Record},
};

/// The only literal form accepted for `datetime` cells.
pub const HIRED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// ─── Field values ────────────────────────────────────────────────────────────

/// Raw cell strings keyed by column name, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValues<'a> {
  pairs: Vec<(&'static str, &'a str)>,
}

impl<'a> FieldValues<'a> {
  /// Pair `fields` with `values` by position. Extra values on either side
  /// are dropped; callers check the column count first.
  pub fn zip<I>(fields: &'static [&'static str], values: I) -> Self
  where
    I: IntoIterator<Item = &'a str>,
  {
    Self {
      pairs: fields.iter().copied().zip(values).collect(),
    }
  }

  pub fn get(&self, field: &str) -> Option<&'a str> {
    self
      .pairs
      .iter()
      .find(|(name, _)| *name == field)
      .map(|(_, value)| *value)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'a str)> + '_ {
    self.pairs.iter().copied()
  }

  fn require(&self, field: &'static str) -> Result<&'a str> {
    self.get(field).ok_or(Error::MissingField { field })
  }

  /// Text field, passed through unchanged.
  fn text(&self, field: &'static str) -> Result<String> {
    self.require(field).map(str::to_owned)
  }

  fn id(&self, field: &'static str) -> Result<i64> {
    parse_integer(field, self.require(field)?)
  }

  fn timestamp(&self, field: &'static str) -> Result<NaiveDateTime> {
    parse_timestamp(field, self.require(field)?)
  }
}

fn parse_integer(field: &'static str, raw: &str) -> Result<i64> {
  raw.trim().parse::<i64>().map_err(|e| Error::InvalidField {
    field,
    value: raw.to_owned(),
    reason: e.to_string(),
  })
}

fn parse_timestamp(field: &'static str, raw: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(raw, HIRED_AT_FORMAT).map_err(|_| {
    Error::InvalidField {
      field,
      value: raw.to_owned(),
      reason: "Invalid datetime format. Expected: YYYY-MM-DDThh:mm:ssZ"
        .to_owned(),
    }
  })
}

// ─── Schemas ─────────────────────────────────────────────────────────────────

/// Converts one row of field values into a record.
pub type RowConverter = fn(&FieldValues<'_>) -> Result<Record>;

/// Column layout and row conversion for one entity kind.
pub struct RecordSchema {
  pub kind:   EntityKind,
  /// Column names in declaration order; this is the positional CSV contract.
  pub fields: &'static [&'static str],
  convert:    RowConverter,
}

impl std::fmt::Debug for RecordSchema {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RecordSchema")
      .field("kind", &self.kind)
      .field("fields", &self.fields)
      .finish_non_exhaustive()
  }
}

impl RecordSchema {
  pub fn field_count(&self) -> usize { self.fields.len() }

  /// Validate and convert one row. Pure; never touches the store.
  pub fn row_to_entity(&self, values: &FieldValues<'_>) -> Result<Record> {
    (self.convert)(values)
  }
}

fn department_from_row(v: &FieldValues<'_>) -> Result<Record> {
  Ok(Record::Department(Department {
    id:   Some(v.id("id")?),
    name: v.text("name")?,
  }))
}

fn job_from_row(v: &FieldValues<'_>) -> Result<Record> {
  Ok(Record::Job(Job {
    id:   Some(v.id("id")?),
    name: v.text("name")?,
  }))
}

fn hired_employee_from_row(v: &FieldValues<'_>) -> Result<Record> {
  Ok(Record::HiredEmployee(HiredEmployee {
    id:            Some(v.id("id")?),
    name:          v.text("name")?,
    hired_at:      v.timestamp("datetime")?,
    department_id: v.id("department_id")?,
    job_id:        v.id("job_id")?,
  }))
}

static DEPARTMENT_SCHEMA: RecordSchema = RecordSchema {
  kind:    EntityKind::Department,
  fields:  &["id", "name"],
  convert: department_from_row,
};

static JOB_SCHEMA: RecordSchema = RecordSchema {
  kind:    EntityKind::Job,
  fields:  &["id", "name"],
  convert: job_from_row,
};

static HIRED_EMPLOYEE_SCHEMA: RecordSchema = RecordSchema {
  kind:    EntityKind::HiredEmployee,
  fields:  &["id", "name", "datetime", "department_id", "job_id"],
  convert: hired_employee_from_row,
};

impl EntityKind {
  pub fn schema(self) -> &'static RecordSchema {
    match self {
      EntityKind::Department => &DEPARTMENT_SCHEMA,
      EntityKind::Job => &JOB_SCHEMA,
      EntityKind::HiredEmployee => &HIRED_EMPLOYEE_SCHEMA,
    }
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
