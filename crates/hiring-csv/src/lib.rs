//! CSV codec for the hiring ingest service.
//!
//! Parses uploaded CSV text into [`hiring_core`] records and renders
//! aggregate report rows back to CSV. Pure synchronous; no HTTP or database
//! dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use hiring_core::EntityKind;
//!
//! let parsed = hiring_csv::parse("1,Engineering\n2,Marketing", EntityKind::Department, false);
//! println!("{} records, {} errors", parsed.records.len(), parsed.errors.len());
//! ```

pub mod error;
mod parse;
mod serialize;

pub use error::{Error, Result};
use hiring_core::{EntityKind, Record, store::ResultRow};
use serde::Serialize;

// ─── Public types
// ─────────────────────────────────────────────────────────────

/// Why one CSV row could not become a record.
///
/// `row` is 1-based over the physical rows handed to validation, blank lines
/// included (the header, if any, is not counted). Row `0` is reserved for
/// failures reading the input itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
  pub row:     usize,
  pub message: String,
}

impl RowError {
  pub fn new(row: usize, message: impl Into<String>) -> Self {
    Self { row, message: message.into() }
  }
}

/// The result of parsing one uploaded file: every valid row as a record, and
/// one error per rejected row, both in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCsv {
  pub records: Vec<Record>,
  pub errors:  Vec<RowError>,
}

// ─── Public API
// ───────────────────────────────────────────────────────────────

/// Parse comma-delimited `input` as rows of `kind`.
///
/// Columns are matched to the kind's schema by position. When
/// `has_header_row` is set the first line is skipped without validation.
/// Never fails: every problem ends up in [`ParsedCsv::errors`].
pub fn parse(input: &str, kind: EntityKind, has_header_row: bool) -> ParsedCsv {
  parse::parse_rows(input, kind, has_header_row)
}

/// Render aggregate rows as CSV text.
///
/// The header comes from the first row's column names; every row is written
/// in that column order. An empty slice renders as an empty string.
pub fn render_rows(rows: &[ResultRow]) -> Result<String> {
  serialize::write_rows(rows)
}
