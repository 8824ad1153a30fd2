//! Handlers for the performance ledger.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/profiles/:id/performance` | Newest first; optional `subject`, `limit` |
//! | `POST` | `/profiles/:id/performance` | Body: [`NewRecordBody`]; 201 |
//! | `GET`  | `/profiles/:id/performance/trend` | `?subject=` required; oldest first |
//!
//! Recording a score does not evaluate it; the client follows up with
//! `POST /interventions/performance` when it wants outreach.

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use compass_core::{
  performance::{NewPerformanceRecord, PerformanceQuery, PerformanceRecord},
  store::StudentStore,
};
use compass_gateway::ChatCompletion;
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub subject: Option<String>,
  pub limit:   Option<usize>,
}

/// `GET /profiles/:id/performance[?subject=...][&limit=...]`
pub async fn list<S, G>(
  State(state): State<AppState<S, G>>,
  student_id: Result<Path<Uuid>, PathRejection>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<PerformanceRecord>>, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Path(student_id) = student_id?;
  let Query(params) = params?;
  let query = PerformanceQuery { subject: params.subject, limit: params.limit };
  let records = state
    .store
    .recent_performance(student_id, &query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(records))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /profiles/:id/performance`.
#[derive(Debug, Deserialize)]
pub struct NewRecordBody {
  pub subject:    String,
  pub score:      f64,
  pub attendance: Option<f64>,
  pub notes:      Option<String>,
}

/// `POST /profiles/:id/performance`: returns 201 + the stored record.
pub async fn create<S, G>(
  State(state): State<AppState<S, G>>,
  student_id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<NewRecordBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Path(student_id) = student_id?;
  let Json(body) = body?;
  let record = state
    .store
    .record_performance(NewPerformanceRecord {
      student_id,
      subject: body.subject,
      score: body.score,
      attendance: body.attendance,
      notes: body.notes,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Trend ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TrendParams {
  pub subject: String,
}

/// `GET /profiles/:id/performance/trend?subject=...`
pub async fn trend<S, G>(
  State(state): State<AppState<S, G>>,
  student_id: Result<Path<Uuid>, PathRejection>,
  params: Result<Query<TrendParams>, QueryRejection>,
) -> Result<Json<Vec<PerformanceRecord>>, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Path(student_id) = student_id?;
  let Query(params) = params?;
  let records = state
    .store
    .performance_trend(student_id, &params.subject)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(records))
}
