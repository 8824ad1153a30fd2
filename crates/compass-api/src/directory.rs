//! Handlers for the mentor and support-resource directory.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/mentors` | `?municipality=&location=&available=true&limit=` |
//! | `POST` | `/mentors` | Body: [`NewMentor`]; 201 |
//! | `PUT`  | `/mentors/:id/availability` | Body: `{"available": bool}` |
//! | `GET`  | `/resources` | Same filters as `/mentors` |
//! | `POST` | `/resources` | Body: [`NewSupportResource`]; 201 |
//! | `PUT`  | `/resources/:id/availability` | Body: `{"available": bool}` |

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
  directory::{
    DirectoryQuery, Mentor, NewMentor, NewSupportResource, SupportResource,
  },
  store::StudentStore,
};
use compass_gateway::ChatCompletion;
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub municipality: Option<String>,
  pub location:     Option<String>,
  /// If `true`, hide unavailable entries. Default `false`.
  #[serde(default)]
  pub available:    bool,
  pub limit:        Option<usize>,
}

impl From<ListParams> for DirectoryQuery {
  fn from(p: ListParams) -> Self {
    DirectoryQuery {
      municipality:   p.municipality,
      location:       p.location,
      available_only: p.available,
      limit:          p.limit,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityBody {
  pub available: bool,
}

// ─── Mentors ──────────────────────────────────────────────────────────────────

/// `GET /mentors`
pub async fn list_mentors<S, G>(
  State(state): State<AppState<S, G>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Mentor>>, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Query(params) = params?;
  let query = DirectoryQuery::from(params);
  let mentors = state
    .store
    .find_mentors(&query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(mentors))
}

/// `POST /mentors`
pub async fn create_mentor<S, G>(
  State(state): State<AppState<S, G>>,
  body: Result<Json<NewMentor>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Json(body) = body?;
  let mentor = state.store.add_mentor(body).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(mentor)))
}

/// `PUT /mentors/:id/availability`
pub async fn mentor_availability<S, G>(
  State(state): State<AppState<S, G>>,
  id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<AvailabilityBody>, JsonRejection>,
) -> Result<Json<Mentor>, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Path(id) = id?;
  let Json(body) = body?;
  let mentor = state
    .store
    .set_mentor_availability(id, body.available)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(mentor))
}

// ─── Resources ────────────────────────────────────────────────────────────────

/// `GET /resources`
pub async fn list_resources<S, G>(
  State(state): State<AppState<S, G>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<SupportResource>>, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Query(params) = params?;
  let query = DirectoryQuery::from(params);
  let resources = state
    .store
    .find_resources(&query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(resources))
}

/// `POST /resources`
pub async fn create_resource<S, G>(
  State(state): State<AppState<S, G>>,
  body: Result<Json<NewSupportResource>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Json(body) = body?;
  let resource = state.store.add_resource(body).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(resource)))
}

/// `PUT /resources/:id/availability`
pub async fn resource_availability<S, G>(
  State(state): State<AppState<S, G>>,
  id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<AvailabilityBody>, JsonRejection>,
) -> Result<Json<SupportResource>, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Path(id) = id?;
  let Json(body) = body?;
  let resource = state
    .store
    .set_resource_availability(id, body.available)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(resource))
}
