//! JSON HTTP API for Compass.
//!
//! Exposes an axum [`Router`] backed by any
//! [`compass_core::store::StudentStore`] and any
//! [`compass_gateway::ChatCompletion`]. TLS and transport concerns are the
//! caller's responsibility; authentication and row-level access rules live
//! in front of this service.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", compass_api::api_router(state.clone()))
//! ```

pub mod chat;
pub mod directory;
pub mod error;
pub mod intervention;
pub mod performance;
pub mod profiles;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post, put},
};
use compass_core::store::StudentStore;
use compass_gateway::ChatCompletion;
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};

pub use error::ApiError;

/// Settings the orchestration paths need at request time. Validated once at
/// startup by the server binary.
#[derive(Debug, Clone)]
pub struct ChatSettings {
  /// Municipality used for directory matching when a profile has none.
  pub default_region: String,
}

impl Default for ChatSettings {
  fn default() -> Self { Self { default_region: "Central".to_owned() } }
}

/// Shared state threaded through all handlers.
pub struct AppState<S, G> {
  pub store:    Arc<S>,
  pub gateway:  Arc<G>,
  pub settings: Arc<ChatSettings>,
}

// Manual impl: `derive` would demand `S: Clone` and `G: Clone`.
impl<S, G> Clone for AppState<S, G> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      gateway:  self.gateway.clone(),
      settings: self.settings.clone(),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type. Every route answers CORS preflight requests and
/// carries permissive cross-origin headers.
pub fn api_router<S, G>(state: AppState<S, G>) -> Router<()>
where
  S: StudentStore + 'static,
  G: ChatCompletion + 'static,
{
  Router::new()
    .route("/health", get(health))
    // Orchestration
    .route("/chat", post(chat::handler::<S, G>))
    .route("/interventions/performance", post(intervention::handler::<S, G>))
    // Profiles
    .route("/profiles", get(profiles::list::<S, G>).post(profiles::create::<S, G>))
    .route("/profiles/{id}", get(profiles::get_one::<S, G>).put(profiles::update::<S, G>))
    .route("/profiles/{id}/context", get(profiles::context::<S, G>))
    .route("/profiles/{id}/chat", get(chat::history::<S, G>))
    // Performance ledger
    .route(
      "/profiles/{id}/performance",
      get(performance::list::<S, G>).post(performance::create::<S, G>),
    )
    .route("/profiles/{id}/performance/trend", get(performance::trend::<S, G>))
    // Directory
    .route(
      "/mentors",
      get(directory::list_mentors::<S, G>).post(directory::create_mentor::<S, G>),
    )
    .route("/mentors/{id}/availability", put(directory::mentor_availability::<S, G>))
    .route(
      "/resources",
      get(directory::list_resources::<S, G>).post(directory::create_resource::<S, G>),
    )
    .route(
      "/resources/{id}/availability",
      put(directory::resource_availability::<S, G>),
    )
    .layer(cors_layer())
    .with_state(state)
}

/// Wildcard CORS: any origin, method and header.
pub fn cors_layer() -> CorsLayer {
  CorsLayer::new()
    .allow_origin(Any)
    .allow_headers(Any)
    .allow_methods(Any)
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }
