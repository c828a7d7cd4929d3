//! Error types for the hiring-csv codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("rendered CSV is not valid UTF-8: {0}")]
  Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
