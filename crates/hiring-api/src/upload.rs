//! Upload orchestration and the `/upload/*` handlers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/upload/departments` | multipart field `file`, `?has_headers=true\|false` |
//! | `POST` | `/upload/jobs` | same |
//! | `POST` | `/upload/employees` | same |
//!
//! Every upload passes four gates in order: file type, text encoding, row
//! validation, persistence. The first gate to fail decides the response.

use axum::{
  Json,
  extract::{Multipart, Query, State},
};
use bytes::Bytes;
use hiring_core::{EntityKind, store::HiringStore};
use hiring_csv::{ParsedCsv, RowError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AppState, error::ApiError};

/// Name of the multipart field carrying the CSV file.
pub const FILE_FIELD: &str = "file";

// ─── Types ────────────────────────────────────────────────────────────────────

/// A file as handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct UploadedFile {
  pub filename: Option<String>,
  pub contents: Bytes,
}

/// Body of a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResponse {
  pub message:       String,
  pub total_records: usize,
  pub errors:        Vec<RowError>,
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
  #[serde(default)]
  pub has_headers: bool,
}

/// Why an upload was refused. Each variant corresponds to one gate.
#[derive(Debug, Error)]
pub enum UploadError {
  #[error("File must be a CSV")]
  InvalidFile,

  #[error("Invalid CSV file encoding. Please use UTF-8")]
  InvalidEncoding(#[source] std::str::Utf8Error),

  #[error("No valid records found")]
  NoValidRecords { errors: Vec<RowError> },

  #[error("Database error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<UploadError> for ApiError {
  fn from(e: UploadError) -> Self {
    match e {
      UploadError::InvalidFile | UploadError::InvalidEncoding(_) => {
        ApiError::BadRequest(e.to_string())
      }
      UploadError::NoValidRecords { errors } => ApiError::Unprocessable {
        message: "No valid records found".to_string(),
        errors,
      },
      UploadError::Persistence(_) => ApiError::Internal(e.to_string()),
    }
  }
}

// ─── Gates ────────────────────────────────────────────────────────────────────

/// File-type gate: a file must be present and its name must end in `.csv`.
pub fn check_filename(filename: Option<&str>) -> Result<(), UploadError> {
  match filename {
    Some(name) if !name.is_empty() && name.ends_with(".csv") => Ok(()),
    other => {
      tracing::error!(filename = ?other, "rejected upload: not a CSV file");
      Err(UploadError::InvalidFile)
    }
  }
}

/// Run one upload of `kind` through all four gates and persist the valid
/// rows as a single batch.
///
/// Rows that fail validation are reported back alongside the success
/// message; they never block the valid ones.
pub async fn process_upload<S>(
  store:          &S,
  kind:           EntityKind,
  file:           Option<UploadedFile>,
  has_header_row: bool,
  max_batch_size: usize,
) -> Result<UploadResponse, UploadError>
where
  S: HiringStore,
{
  let label = kind.label();

  check_filename(file.as_ref().and_then(|f| f.filename.as_deref()))?;
  let Some(file) = file else {
    return Err(UploadError::InvalidFile);
  };

  let text = std::str::from_utf8(&file.contents).map_err(|e| {
    tracing::error!(kind = label, error = %e, "rejected upload: not UTF-8");
    UploadError::InvalidEncoding(e)
  })?;

  let ParsedCsv { records, errors } =
    hiring_csv::parse(text, kind, has_header_row);
  for e in &errors {
    tracing::warn!(kind = label, row = e.row, message = %e.message, "row rejected");
  }
  if records.is_empty() {
    tracing::error!(kind = label, errors = errors.len(), "no valid records");
    return Err(UploadError::NoValidRecords { errors });
  }

  let total_records = store
    .create_batch(records, max_batch_size)
    .await
    .map_err(|e| {
      tracing::error!(kind = label, error = %e, "upload not persisted");
      UploadError::Persistence(Box::new(e))
    })?;

  let mut message = format!("Successfully uploaded {total_records} {label} records");
  if !errors.is_empty() {
    message.push_str(&format!(" with {} validation errors", errors.len()));
  }
  tracing::info!(kind = label, total_records, errors = errors.len(), "upload committed");

  Ok(UploadResponse { message, total_records, errors })
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

/// `POST /upload/departments`
pub async fn departments<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<UploadParams>,
  multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError>
where
  S: HiringStore,
{
  upload(state, EntityKind::Department, params, multipart).await
}

/// `POST /upload/jobs`
pub async fn jobs<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<UploadParams>,
  multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError>
where
  S: HiringStore,
{
  upload(state, EntityKind::Job, params, multipart).await
}

/// `POST /upload/employees`
pub async fn employees<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<UploadParams>,
  multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError>
where
  S: HiringStore,
{
  upload(state, EntityKind::HiredEmployee, params, multipart).await
}

async fn upload<S>(
  state: AppState<S>,
  kind: EntityKind,
  params: UploadParams,
  mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError>
where
  S: HiringStore,
{
  let file = read_file_field(&mut multipart).await?;
  let response = process_upload(
    &*state.store,
    kind,
    file,
    params.has_headers,
    state.config.max_batch_size,
  )
  .await?;
  Ok(Json(response))
}

/// Pull the `file` field out of the form. The name is checked before the
/// body is read so a non-CSV upload is refused without buffering it.
async fn read_file_field(
  multipart: &mut Multipart,
) -> Result<Option<UploadedFile>, ApiError> {
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::BadRequest(e.body_text()))?
  {
    if field.name() != Some(FILE_FIELD) {
      continue;
    }
    let filename = field.file_name().map(str::to_owned);
    check_filename(filename.as_deref())?;

    let contents = field
      .bytes()
      .await
      .map_err(|e| ApiError::BadRequest(e.body_text()))?;
    return Ok(Some(UploadedFile { filename, contents }));
  }
  Ok(None)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
