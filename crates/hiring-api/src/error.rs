//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use hiring_csv::RowError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  /// The request was well-formed but nothing in it was usable.
  #[error("unprocessable: {message}")]
  Unprocessable {
    message: String,
    errors:  Vec<RowError>,
  },

  #[error("internal error: {0}")]
  Internal(String),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Unprocessable { message, errors } => (
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "error": message, "errors": errors }),
      ),
      ApiError::Internal(m) => {
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": m }))
      }
    };
    (status, Json(body)).into_response()
  }
}
