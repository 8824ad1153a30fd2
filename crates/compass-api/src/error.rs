//! API error type and [`axum::response::IntoResponse`] implementation.

use std::time::Duration;

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use compass_gateway::GatewayError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// Persistence failures of the conversation log never show up here: they
/// are logged where they happen and the request carries on.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("invalid request: {0}")]
  Validation(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("configuration error: {0}")]
  Config(String),

  #[error("upstream timed out after {0:?}")]
  GatewayTimeout(Duration),

  /// The AI upstream failed: a non-2xx status, or no HTTP response at all.
  #[error("{}", describe_upstream(.upstream_status))]
  Gateway { upstream_status: Option<u16> },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("{0}")]
  Unknown(String),
}

impl ApiError {
  /// Translate a store error, surfacing the domain errors underneath as
  /// 4xx responses.
  pub fn from_store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    classify(&e).unwrap_or_else(|| ApiError::Store(Box::new(e)))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
      ApiError::Gateway { .. } => StatusCode::BAD_GATEWAY,
      ApiError::Config(_) | ApiError::Store(_) | ApiError::Unknown(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  /// Short, stable label for the `error` field.
  fn label(&self) -> &'static str {
    match self {
      ApiError::Validation(_) => "Invalid request",
      ApiError::NotFound(_) => "Not found",
      ApiError::Conflict(_) => "Conflict",
      ApiError::Config(_) => "Server misconfigured",
      ApiError::GatewayTimeout(_) => "AI service timed out",
      ApiError::Gateway { .. } => "AI service error",
      ApiError::Store(_) => "Database error",
      ApiError::Unknown(_) => "Internal server error",
    }
  }
}

fn describe_upstream(status: &Option<u16>) -> String {
  match status {
    Some(s) => format!("upstream returned HTTP {s}"),
    None => "upstream unreachable".to_owned(),
  }
}

/// Find a `compass_core::Error` anywhere in the source chain.
fn classify(e: &(dyn std::error::Error + 'static)) -> Option<ApiError> {
  let mut cur = Some(e);
  while let Some(err) = cur {
    if let Some(core) = err.downcast_ref::<compass_core::Error>() {
      use compass_core::Error as Core;
      return match core {
        Core::ProfileNotFound(_) | Core::MentorNotFound(_) | Core::ResourceNotFound(_) => {
          Some(ApiError::NotFound(core.to_string()))
        }
        Core::ProfileExists(_) => Some(ApiError::Conflict(core.to_string())),
        Core::Validation(m) => Some(ApiError::Validation(m.clone())),
        Core::Serialization(_) => None,
      };
    }
    cur = err.source();
  }
  None
}

impl From<GatewayError> for ApiError {
  fn from(e: GatewayError) -> Self {
    match e {
      GatewayError::Config(m) => ApiError::Config(m),
      GatewayError::Timeout(d) => ApiError::GatewayTimeout(d),
      GatewayError::Upstream { status } => ApiError::Gateway { upstream_status: Some(status) },
      GatewayError::Transport(_) => ApiError::Gateway { upstream_status: None },
      GatewayError::Cancelled => ApiError::Unknown("completion call was cancelled".into()),
    }
  }
}

// Extractor rejections become JSON 400s instead of axum's plain-text bodies.

impl From<JsonRejection> for ApiError {
  fn from(e: JsonRejection) -> Self { ApiError::Validation(e.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(e: QueryRejection) -> Self { ApiError::Validation(e.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(e: PathRejection) -> Self { ApiError::Validation(e.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.label(), "details": self.to_string() })))
      .into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Error)]
  enum Wrapper {
    #[error("core error: {0}")]
    Core(#[from] compass_core::Error),
    #[error("disk on fire")]
    Other,
  }

  #[test]
  fn domain_errors_are_unwrapped_from_store_errors() {
    let id = uuid::Uuid::new_v4();
    let e = ApiError::from_store(Wrapper::from(compass_core::Error::ProfileNotFound(id)));
    assert_eq!(e.status(), StatusCode::NOT_FOUND);

    let e = ApiError::from_store(Wrapper::from(compass_core::Error::ProfileExists(id)));
    assert_eq!(e.status(), StatusCode::CONFLICT);

    let e = ApiError::from_store(Wrapper::Other);
    assert!(matches!(e, ApiError::Store(_)));
  }

  #[test]
  fn gateway_errors_map_to_stable_statuses() {
    let e = ApiError::from(GatewayError::Upstream { status: 500 });
    assert_eq!(e.status(), StatusCode::BAD_GATEWAY);
    let e = ApiError::from(GatewayError::Timeout(Duration::from_secs(15)));
    assert_eq!(e.status(), StatusCode::GATEWAY_TIMEOUT);
    let e = ApiError::from(GatewayError::Config("no key".into()));
    assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
