//! Positional CSV row parser.
//!
//! Rows are validated one at a time, in order, against the entity kind's
//! [`RecordSchema`](hiring_core::RecordSchema). A bad row becomes a
//! [`RowError`] and parsing moves on; only a failure of the reader itself
//! stops early.
//!
//! Row numbers count physical rows, blank lines included. The `csv` reader
//! skips blank lines silently, so [`PhysicalRows`] recovers them from the
//! bytes the reader consumed and hands them on as zero-column rows.

use csv::{ReaderBuilder, StringRecord};
use hiring_core::{EntityKind, FieldValues};

use crate::{ParsedCsv, RowError};

pub(crate) fn parse_rows(
  input: &str,
  kind: EntityKind,
  has_header_row: bool,
) -> ParsedCsv {
  let schema = kind.schema();
  let mut parsed = ParsedCsv::default();
  let mut rows = PhysicalRows::new(input);

  if has_header_row {
    match rows.next() {
      Some(Ok(_)) => {}
      Some(Err(e)) => {
        parsed.errors.push(read_error(e));
        return parsed;
      }
      None => {
        parsed
          .errors
          .push(RowError::new(0, "File reading error: missing header row"));
        return parsed;
      }
    }
  }

  for (index, result) in rows.enumerate() {
    let row = index + 1;

    let record = match result {
      Ok(PhysicalRow::Record(record)) => record,
      Ok(PhysicalRow::Blank) => StringRecord::new(),
      Err(e) => {
        parsed.errors.push(read_error(e));
        break;
      }
    };

    if record.len() != schema.field_count() {
      parsed.errors.push(RowError::new(
        row,
        format!(
          "Expected {} columns ({}), got {}",
          schema.field_count(),
          schema.fields.join(", "),
          record.len()
        ),
      ));
      continue;
    }

    let values = FieldValues::zip(schema.fields, record.iter());
    match schema.row_to_entity(&values) {
      Ok(entity) => parsed.records.push(entity),
      Err(e) => parsed
        .errors
        .push(RowError::new(row, format!("Value error: {e}"))),
    }
  }

  parsed
}

fn read_error(e: csv::Error) -> RowError {
  RowError::new(0, format!("File reading error: {e}"))
}

// ─── Physical rows ────────────────────────────────────────────────────────────

enum PhysicalRow {
  Blank,
  Record(StringRecord),
}

/// Every row of the input in order: the reader's records, with the blank
/// lines it skipped put back in place.
struct PhysicalRows<'a> {
  reader:   csv::Reader<&'a [u8]>,
  input:    &'a [u8],
  /// Byte offset just past the last record the reader returned.
  consumed: usize,
  blanks:   usize,
  pending:  Option<StringRecord>,
  done:     bool,
}

impl<'a> PhysicalRows<'a> {
  fn new(input: &'a str) -> Self {
    // Flexible so that short or long rows reach the column-count check
    // instead of failing inside the reader.
    let reader = ReaderBuilder::new()
      .delimiter(b',')
      .has_headers(false)
      .flexible(true)
      .from_reader(input.as_bytes());

    Self {
      reader,
      input: input.as_bytes(),
      consumed: 0,
      blanks: 0,
      pending: None,
      done: false,
    }
  }

  /// Count the blank lines between the previous record and whatever the
  /// reader consumed next.
  fn skipped_blank_lines(&self) -> usize {
    let gap = self.input.get(self.consumed..).unwrap_or_default();
    let after_cr =
      self.consumed > 0 && self.input.get(self.consumed - 1) == Some(&b'\r');
    leading_blank_lines(gap, after_cr)
  }
}

impl Iterator for PhysicalRows<'_> {
  type Item = Result<PhysicalRow, csv::Error>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.blanks > 0 {
      self.blanks -= 1;
      return Some(Ok(PhysicalRow::Blank));
    }
    if let Some(record) = self.pending.take() {
      return Some(Ok(PhysicalRow::Record(record)));
    }
    if self.done {
      return None;
    }

    let mut record = StringRecord::new();
    match self.reader.read_record(&mut record) {
      Err(e) => {
        self.done = true;
        Some(Err(e))
      }
      Ok(more) => {
        self.blanks = self.skipped_blank_lines();
        self.consumed = usize::try_from(self.reader.position().byte())
          .unwrap_or(self.input.len());
        if more {
          self.pending = Some(record);
        } else {
          self.done = true;
        }
        self.next()
      }
    }
  }
}

/// Number of empty lines at the start of `gap`. `after_cr` means the byte
/// before `gap` was a `\r`, so a leading `\n` finishes that terminator
/// rather than starting a blank line.
fn leading_blank_lines(gap: &[u8], after_cr: bool) -> usize {
  let mut i = usize::from(after_cr && gap.first() == Some(&b'\n'));
  let mut count = 0;
  loop {
    match gap.get(i) {
      Some(b'\n') => i += 1,
      Some(b'\r') => {
        i += 1;
        if gap.get(i) == Some(&b'\n') {
          i += 1;
        }
      }
      _ => return count,
    }
    count += 1;
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
