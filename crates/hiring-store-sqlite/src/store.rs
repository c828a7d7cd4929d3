//! [`SqliteStore`], the SQLite implementation of [`HiringStore`].

use std::path::Path;

use hiring_core::{
  EntityKind, Record,
  store::{HiringStore, QueryValue, ResultRow},
};
use rusqlite::ToSql;

use crate::{
  Error, Result,
  encode::{
    RawHiredEmployee, RawNamed, decode_cell, encode_dt, encode_query_value,
    placeholder,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A hiring store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_named(&self, kind: EntityKind) -> Result<Vec<Record>> {
    // Table names come from `EntityKind::table`, never from input.
    let sql = format!("SELECT id, name FROM {} ORDER BY id", kind.table());

    let raws: Vec<RawNamed> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawNamed {
              id:   row.get(0)?,
              name: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let into_record = match kind {
      EntityKind::Job => RawNamed::into_job,
      _ => RawNamed::into_department,
    };
    Ok(raws.into_iter().map(into_record).collect())
  }

  async fn get_hired_employees(&self) -> Result<Vec<Record>> {
    let raws: Vec<RawHiredEmployee> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, datetime, department_id, job_id
           FROM hiredemployees
           ORDER BY id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawHiredEmployee {
              id:            row.get(0)?,
              name:          row.get(1)?,
              datetime:      row.get(2)?,
              department_id: row.get(3)?,
              job_id:        row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHiredEmployee::into_record).collect()
  }
}

/// Stage one record on `conn`. A `None` id is bound as NULL so SQLite picks
/// the next rowid.
fn insert_record(conn: &rusqlite::Connection, record: &Record) -> rusqlite::Result<usize> {
  match record {
    Record::Department(d) => conn
      .prepare_cached("INSERT INTO departments (id, name) VALUES (?1, ?2)")?
      .execute(rusqlite::params![d.id, d.name]),
    Record::Job(j) => conn
      .prepare_cached("INSERT INTO jobs (id, name) VALUES (?1, ?2)")?
      .execute(rusqlite::params![j.id, j.name]),
    Record::HiredEmployee(e) => conn
      .prepare_cached(
        "INSERT INTO hiredemployees (id, name, datetime, department_id, job_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
      )?
      .execute(rusqlite::params![
        e.id,
        e.name,
        encode_dt(e.hired_at),
        e.department_id,
        e.job_id,
      ]),
  }
}

// ─── HiringStore impl ────────────────────────────────────────────────────────

impl HiringStore for SqliteStore {
  type Error = Error;

  async fn create_batch(
    &self,
    records:        Vec<Record>,
    max_batch_size: usize,
  ) -> Result<usize> {
    if records.len() > max_batch_size {
      tracing::error!(
        size = records.len(),
        max = max_batch_size,
        "rejecting oversized batch"
      );
      return Err(Error::BatchTooLarge {
        size: records.len(),
        max:  max_batch_size,
      });
    }

    let committed = self
      .conn
      .call(move |conn| {
        // Dropping `tx` without commit rolls back everything staged so far.
        let tx = conn.transaction()?;
        for record in &records {
          insert_record(&tx, record)?;
        }
        tx.commit()?;
        Ok(records.len())
      })
      .await
      .inspect_err(|e| {
        tracing::error!(error = %e, "batch insert rolled back");
      })?;

    tracing::debug!(rows = committed, "batch committed");
    Ok(committed)
  }

  async fn get_all(&self, kind: EntityKind) -> Result<Vec<Record>> {
    match kind {
      EntityKind::Department | EntityKind::Job => self.get_named(kind).await,
      EntityKind::HiredEmployee => self.get_hired_employees().await,
    }
  }

  async fn execute_aggregate(
    &self,
    query:  &str,
    params: Vec<(String, QueryValue)>,
  ) -> Result<Vec<ResultRow>> {
    let sql = query.to_owned();
    let bound: Vec<(String, rusqlite::types::Value)> = params
      .into_iter()
      .map(|(name, value)| (placeholder(name), encode_query_value(value)))
      .collect();

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> =
          stmt.column_names().into_iter().map(str::to_owned).collect();

        let named: Vec<(&str, &dyn ToSql)> = bound
          .iter()
          .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
          .collect();

        let mut cursor = stmt.query(named.as_slice())?;
        let mut out = Vec::new();
        while let Some(row) = cursor.next()? {
          let mut result = ResultRow::new();
          for (index, column) in columns.iter().enumerate() {
            result.push(column.clone(), decode_cell(row.get_ref(index)?));
          }
          out.push(result);
        }
        Ok(out)
      })
      .await
      .inspect_err(|e| {
        tracing::error!(error = %e, "aggregate query failed");
      })?;

    Ok(rows)
  }
}
