//! Handlers for `/profiles` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/profiles` | All profiles, by name |
//! | `POST` | `/profiles` | Body: [`NewProfile`]; 201, 409 if the identity has one |
//! | `GET`  | `/profiles/:id` | 404 if not found |
//! | `PUT`  | `/profiles/:id` | Body: [`ProfileUpdate`]; partial |
//! | `GET`  | `/profiles/:id/context` | Assembled counselor context, `text/plain` |

use axum::{
  Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use compass_core::{
  context::assemble_context,
  profile::{NewProfile, ProfileUpdate, StudentProfile},
  store::StudentStore,
};
use compass_gateway::ChatCompletion;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `GET /profiles`
pub async fn list<S, G>(
  State(state): State<AppState<S, G>>,
) -> Result<Json<Vec<StudentProfile>>, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let profiles = state.store.list_profiles().await.map_err(ApiError::from_store)?;
  Ok(Json(profiles))
}

/// `POST /profiles`: called once at signup with the new identity's id.
pub async fn create<S, G>(
  State(state): State<AppState<S, G>>,
  body: Result<Json<NewProfile>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Json(body) = body?;
  let profile = state
    .store
    .create_profile(body)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(student_id = %profile.student_id, "profile created");
  Ok((StatusCode::CREATED, Json(profile)))
}

/// `GET /profiles/:id`
pub async fn get_one<S, G>(
  State(state): State<AppState<S, G>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<StudentProfile>, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Path(id) = id?;
  let profile = state
    .store
    .get_profile(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("profile {id} not found")))?;
  Ok(Json(profile))
}

/// `PUT /profiles/:id`
pub async fn update<S, G>(
  State(state): State<AppState<S, G>>,
  id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<StudentProfile>, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Path(id) = id?;
  let Json(body) = body?;
  let profile = state
    .store
    .update_profile(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(profile))
}

/// `GET /profiles/:id/context`: exactly what the counselor sees.
pub async fn context<S, G>(
  State(state): State<AppState<S, G>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<String, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Path(id) = id?;
  assemble_context(&*state.store, id, &state.settings.default_region)
    .await
    .map_err(ApiError::from_store)
}
