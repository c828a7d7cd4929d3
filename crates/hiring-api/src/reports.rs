//! Handlers for the `/reports/*` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/reports/quarterly-hiring-2021` | `?format=json\|csv` |
//! | `GET`  | `/reports/departments-above-mean-2021` | `?format=json\|csv` |
//!
//! Both reports are plain SQL run through
//! [`HiringStore::execute_aggregate`] with the year bound as a parameter.

use axum::{
  Json,
  extract::{Query, State},
  http::header,
  response::{IntoResponse, Response},
};
use hiring_core::store::{HiringStore, QueryValue};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

const REPORT_YEAR: &str = "2021";

/// Hires per department and job, split by quarter of the year.
pub const QUARTERLY_HIRING_SQL: &str = "
WITH hires AS (
    SELECT
        d.name AS department,
        j.name AS job,
        (CAST(strftime('%m', e.datetime) AS INTEGER) + 2) / 3 AS quarter
    FROM hiredemployees e
    INNER JOIN departments d ON d.id = e.department_id
    INNER JOIN jobs        j ON j.id = e.job_id
    WHERE strftime('%Y', e.datetime) = :year
)
SELECT
    department,
    job,
    SUM(CASE WHEN quarter = 1 THEN 1 ELSE 0 END) AS q1,
    SUM(CASE WHEN quarter = 2 THEN 1 ELSE 0 END) AS q2,
    SUM(CASE WHEN quarter = 3 THEN 1 ELSE 0 END) AS q3,
    SUM(CASE WHEN quarter = 4 THEN 1 ELSE 0 END) AS q4
FROM hires
GROUP BY department, job
ORDER BY department, job
";

/// Departments that hired more people than the per-department mean.
pub const DEPARTMENTS_ABOVE_MEAN_SQL: &str = "
WITH department_hires AS (
    SELECT d.id, d.name, COUNT(*) AS hired_count
    FROM hiredemployees e
    INNER JOIN departments d ON d.id = e.department_id
    WHERE strftime('%Y', e.datetime) = :year
    GROUP BY d.id, d.name
)
SELECT id, name, hired_count AS hired_employees
FROM department_hires
WHERE hired_count > (SELECT AVG(hired_count) FROM department_hires)
ORDER BY hired_count DESC, id
";

// ─── Parameters ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
  #[default]
  Json,
  Csv,
}

#[derive(Debug, Deserialize)]
pub struct ReportParams {
  #[serde(default)]
  pub format: ReportFormat,
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

/// `GET /reports/quarterly-hiring-2021[?format=csv]`
pub async fn quarterly_hiring_2021<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ReportParams>,
) -> Result<Response, ApiError>
where
  S: HiringStore,
{
  run_report(
    &*state.store,
    QUARTERLY_HIRING_SQL,
    "quarterly hiring",
    "quarterly_hiring_2021.csv",
    params.format,
  )
  .await
}

/// `GET /reports/departments-above-mean-2021[?format=csv]`
pub async fn departments_above_mean_2021<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ReportParams>,
) -> Result<Response, ApiError>
where
  S: HiringStore,
{
  run_report(
    &*state.store,
    DEPARTMENTS_ABOVE_MEAN_SQL,
    "departments above mean",
    "departments_above_mean_2021.csv",
    params.format,
  )
  .await
}

async fn run_report<S>(
  store:    &S,
  sql:      &str,
  name:     &str,
  filename: &str,
  format:   ReportFormat,
) -> Result<Response, ApiError>
where
  S: HiringStore,
{
  let params = vec![("year".to_string(), QueryValue::from(REPORT_YEAR))];
  let rows = store.execute_aggregate(sql, params).await.map_err(|e| {
    tracing::error!(report = name, error = %e, "report query failed");
    ApiError::Internal(format!("Error generating {name} report: {e}"))
  })?;
  tracing::debug!(report = name, rows = rows.len(), ?format, "report generated");

  match format {
    ReportFormat::Json => Ok(Json(rows).into_response()),
    ReportFormat::Csv => {
      let body = hiring_csv::render_rows(&rows).map_err(|e| {
        ApiError::Internal(format!("Error generating {name} report: {e}"))
      })?;
      Ok(
        (
          [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
              header::CONTENT_DISPOSITION,
              format!("attachment;filename={filename}"),
            ),
          ],
          body,
        )
          .into_response(),
      )
    }
  }
}
