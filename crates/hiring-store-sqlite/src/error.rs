//! Error type for `hiring-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// The batch was rejected before any row was written.
  #[error("Batch size exceeded: {size} > {max}")]
  BatchTooLarge { size: usize, max: usize },

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
