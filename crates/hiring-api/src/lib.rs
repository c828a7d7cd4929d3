//! HTTP surface of the hiring ingest service.
//!
//! Exposes an axum [`Router`] backed by any [`HiringStore`]: CSV uploads for
//! departments, jobs and hired employees, plus the two 2021 hiring reports.
//! Auth and TLS are the caller's responsibility.

pub mod error;
pub mod reports;
pub mod upload;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use hiring_core::store::HiringStore;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Largest request body accepted on any route.
pub const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `HIRING_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  /// Upper bound on records committed by one upload.
  #[serde(default = "default_max_batch_size")]
  pub max_batch_size: usize,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("hiring.db") }
fn default_max_batch_size() -> usize { 2000 }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:           default_host(),
      port:           default_port(),
      store_path:     default_store_path(),
      max_batch_size: default_max_batch_size(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: HiringStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the ingest service.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: HiringStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/",                                     get(root))
    // Uploads
    .route("/upload/departments",                   post(upload::departments::<S>))
    .route("/upload/jobs",                          post(upload::jobs::<S>))
    .route("/upload/employees",                     post(upload::employees::<S>))
    // Reports
    .route("/reports/quarterly-hiring-2021",        get(reports::quarterly_hiring_2021::<S>))
    .route("/reports/departments-above-mean-2021",  get(reports::departments_above_mean_2021::<S>))
    .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct Message {
  pub message: String,
}

/// `GET /`
async fn root() -> Json<Message> {
  Json(Message { message: "Olá Mundo!!!".to_string() })
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
  };
  use hiring_core::EntityKind;
  use hiring_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  const BOUNDARY: &str = "hiring-test-boundary";

  const DEPARTMENTS: &str = "1,Engineering\n2,Marketing\n3,Sales\n4,Human Resources\n";
  const JOBS: &str =
    "1,Software Engineer\n2,Marketing Specialist\n3,Sales Representative\n4,HR Manager\n";
  const EMPLOYEES: &str = "\
1,John Doe,2021-01-15T00:00:00Z,1,1
2,Jane Smith,2021-02-01T00:00:00Z,1,1
3,Bob Johnson,2021-03-10T00:00:00Z,2,2
4,Alice Brown,2021-04-05T00:00:00Z,3,3
5,Charlie Wilson,2021-06-15T00:00:00Z,1,1
6,Diana Miller,2021-09-01T00:00:00Z,2,2
7,Edward Davis,2021-12-10T00:00:00Z,3,3
";

  async fn make_state(max_batch_size: usize) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store:  Arc::new(store),
      config: Arc::new(ServerConfig {
        max_batch_size,
        store_path: PathBuf::from(":memory:"),
        ..ServerConfig::default()
      }),
    }
  }

  fn multipart_body(filename: &str, contents: &[u8]) -> Vec<u8> {
    let mut body = format!(
      "--{BOUNDARY}\r\n\
       Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
       Content-Type: text/csv\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
  }

  async fn post_csv(
    state:    AppState<SqliteStore>,
    uri:      &str,
    filename: &str,
    contents: &[u8],
  ) -> Response {
    let req = Request::builder()
      .method("POST")
      .uri(uri)
      .header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
      )
      .body(Body::from(multipart_body(filename, contents)))
      .unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn fetch(state: AppState<SqliteStore>, uri: &str) -> Response {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn body_json(resp: Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn body_text(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  async fn seeded() -> AppState<SqliteStore> {
    let state = make_state(2000).await;
    for (uri, name, body) in [
      ("/upload/departments", "departments.csv", DEPARTMENTS),
      ("/upload/jobs", "jobs.csv", JOBS),
      ("/upload/employees", "hired_employees.csv", EMPLOYEES),
    ] {
      let resp = post_csv(state.clone(), uri, name, body.as_bytes()).await;
      assert_eq!(resp.status(), StatusCode::OK, "seeding {uri}");
    }
    state
  }

  // ── Root ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn root_returns_message() {
    let resp = fetch(make_state(2000).await, "/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "message": "Olá Mundo!!!" }));
  }

  // ── Uploads ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn upload_departments_succeeds() {
    let state = make_state(2000).await;
    let resp = post_csv(
      state.clone(),
      "/upload/departments",
      "departments.csv",
      DEPARTMENTS.as_bytes(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      body_json(resp).await,
      json!({
        "message": "Successfully uploaded 4 Departments records",
        "total_records": 4,
        "errors": [],
      })
    );
    assert_eq!(
      state.store.get_all(EntityKind::Department).await.unwrap().len(),
      4
    );
  }

  #[tokio::test]
  async fn upload_employees_after_dimensions_succeeds() {
    let state = seeded().await;
    assert_eq!(
      state.store.get_all(EntityKind::HiredEmployee).await.unwrap().len(),
      7
    );
  }

  #[tokio::test]
  async fn upload_with_no_valid_rows_returns_422() {
    let state = make_state(2000).await;
    let resp = post_csv(
      state.clone(),
      "/upload/departments",
      "departments.csv",
      b"invalid,data\nwithout,proper,columns",
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "No valid records found");
    let rows: Vec<_> = body["errors"]
      .as_array()
      .unwrap()
      .iter()
      .map(|e| e["row"].as_u64().unwrap())
      .collect();
    assert_eq!(rows, [1, 2]);
    assert!(state.store.get_all(EntityKind::Department).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn upload_of_empty_file_returns_422() {
    let resp =
      post_csv(make_state(2000).await, "/upload/jobs", "jobs.csv", b"").await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(resp).await["errors"], json!([]));
  }

  #[tokio::test]
  async fn upload_of_non_csv_returns_400() {
    let resp = post_csv(
      make_state(2000).await,
      "/upload/departments",
      "test.txt",
      b"1,Engineering",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await, json!({ "error": "File must be a CSV" }));
  }

  #[tokio::test]
  async fn upload_of_non_utf8_returns_400() {
    let resp = post_csv(
      make_state(2000).await,
      "/upload/jobs",
      "jobs.csv",
      b"1,Caf\xe9 Manager",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
      body_json(resp).await["error"],
      "Invalid CSV file encoding. Please use UTF-8"
    );
  }

  #[tokio::test]
  async fn upload_without_file_field_returns_400() {
    let body = format!(
      "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nx\r\n--{BOUNDARY}--\r\n"
    );
    let req = Request::builder()
      .method("POST")
      .uri("/upload/departments")
      .header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
      )
      .body(Body::from(body))
      .unwrap();
    let resp = router(make_state(2000).await).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn partial_upload_reports_row_errors() {
    let resp = post_csv(
      make_state(2000).await,
      "/upload/jobs",
      "jobs.csv",
      b"1,Welder\nnot-a-number,Painter\n3,Plumber,extra\n4,Electrician",
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(
      body["message"],
      "Successfully uploaded 2 Jobs records with 2 validation errors"
    );
    assert_eq!(body["total_records"], 2);
    assert_eq!(body["errors"][1]["row"], 3);
  }

  #[tokio::test]
  async fn row_errors_follow_physical_lines() {
    let resp = post_csv(
      make_state(2000).await,
      "/upload/departments",
      "departments.csv",
      b"1,Engineering\n\n,Marketing\n4,Sales",
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["total_records"], 2);
    assert_eq!(
      body["errors"],
      json!([
        { "row": 2, "message": "Expected 2 columns (id, name), got 0" },
        { "row": 3, "message": "Value error: id: got '' - cannot parse integer from empty string" },
      ])
    );
  }

  #[tokio::test]
  async fn header_row_is_skipped_when_requested() {
    let resp = post_csv(
      make_state(2000).await,
      "/upload/departments?has_headers=true",
      "departments.csv",
      b"id,name\n1,Engineering\n2,Marketing",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["total_records"], 2);
  }

  #[tokio::test]
  async fn dangling_foreign_keys_return_500_and_persist_nothing() {
    let state = make_state(2000).await;
    let resp = post_csv(
      state.clone(),
      "/upload/employees",
      "hired_employees.csv",
      EMPLOYEES.as_bytes(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = body_json(resp).await["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Database error: "), "{error}");
    assert!(
      state.store.get_all(EntityKind::HiredEmployee).await.unwrap().is_empty()
    );
  }

  #[tokio::test]
  async fn oversized_upload_returns_500() {
    let state = make_state(3).await;
    let resp = post_csv(
      state.clone(),
      "/upload/departments",
      "departments.csv",
      DEPARTMENTS.as_bytes(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
      body_json(resp).await["error"],
      "Database error: Batch size exceeded: 4 > 3"
    );
    assert!(state.store.get_all(EntityKind::Department).await.unwrap().is_empty());
  }

  // ── Reports ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn quarterly_report_as_json() {
    let resp = fetch(seeded().await, "/reports/quarterly-hiring-2021").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      body_json(resp).await,
      json!([
        { "department": "Engineering", "job": "Software Engineer",
          "q1": 2, "q2": 1, "q3": 0, "q4": 0 },
        { "department": "Marketing", "job": "Marketing Specialist",
          "q1": 1, "q2": 0, "q3": 1, "q4": 0 },
        { "department": "Sales", "job": "Sales Representative",
          "q1": 0, "q2": 1, "q3": 0, "q4": 1 },
      ])
    );
  }

  #[tokio::test]
  async fn quarterly_report_as_csv() {
    let resp =
      fetch(seeded().await, "/reports/quarterly-hiring-2021?format=csv").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
      resp.headers()[header::CONTENT_DISPOSITION],
      "attachment;filename=quarterly_hiring_2021.csv"
    );

    let text = body_text(resp).await;
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("department,job,q1,q2,q3,q4"));
    assert_eq!(lines.next(), Some("Engineering,Software Engineer,2,1,0,0"));
    assert_eq!(lines.count(), 2);
  }

  #[tokio::test]
  async fn quarterly_report_ignores_other_years() {
    let state = seeded().await;
    let resp = post_csv(
      state.clone(),
      "/upload/employees",
      "hired_employees.csv",
      b"8,Fiona Green,2022-02-01T00:00:00Z,4,4",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body =
      body_json(fetch(state, "/reports/quarterly-hiring-2021").await).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
  }

  #[tokio::test]
  async fn empty_report_renders_empty_csv() {
    let resp = fetch(
      make_state(2000).await,
      "/reports/departments-above-mean-2021?format=csv",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "");
  }

  #[tokio::test]
  async fn above_mean_report_as_json() {
    let resp =
      fetch(seeded().await, "/reports/departments-above-mean-2021").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      body_json(resp).await,
      json!([{ "id": 1, "name": "Engineering", "hired_employees": 3 }])
    );
  }

  #[tokio::test]
  async fn unknown_report_format_is_rejected() {
    let resp = fetch(
      make_state(2000).await,
      "/reports/quarterly-hiring-2021?format=xml",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }
}
