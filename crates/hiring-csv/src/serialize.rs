//! Report rows to CSV.
//!
//! Produces CRLF line endings. Cells are looked up by the header's column
//! names, so a row missing a column gets an empty cell.

use csv::{Terminator, WriterBuilder};
use hiring_core::store::ResultRow;
use serde_json::Value;

use crate::error::Result;

pub(crate) fn write_rows(rows: &[ResultRow]) -> Result<String> {
  let Some(first) = rows.first() else {
    return Ok(String::new());
  };
  let header: Vec<&str> = first.keys().collect();

  let mut writer = WriterBuilder::new()
    .terminator(Terminator::CRLF)
    .from_writer(Vec::new());

  writer.write_record(&header)?;
  for row in rows {
    writer.write_record(
      header
        .iter()
        .map(|column| row.get(column).map(cell).unwrap_or_default()),
    )?;
  }

  let bytes = writer.into_inner().map_err(|e| e.into_error())?;
  Ok(String::from_utf8(bytes)?)
}

fn cell(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
