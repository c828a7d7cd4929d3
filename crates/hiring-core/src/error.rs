//! Error types for `hiring-core`.

use thiserror::Error;

/// A field-level rejection raised while converting one CSV row into a
/// [`Record`](crate::record::Record).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("{field}: got '{value}' - {reason}")]
  InvalidField {
    field:  &'static str,
    value:  String,
    reason: String,
  },

  #[error("{field}: field required")]
  MissingField { field: &'static str },
}

impl Error {
  /// The schema column the error refers to.
  pub fn field(&self) -> &'static str {
    match self {
      Error::InvalidField { field, .. } | Error::MissingField { field } => field,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
