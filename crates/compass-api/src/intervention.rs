//! Handler for `POST /interventions/performance`.
//!
//! Evaluates a newly recorded grade and, when it warrants outreach, asks the
//! AI counselor for a message addressed to the student. Every failure maps
//! to `500 {error, intervention_triggered: false}`.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use compass_core::{
  context::local_directory,
  conversation::{ChatTurn, NewChatMessage},
  intervention::{Evaluation, evaluate},
  prompt::{GradeEvent, grade_event_turn, intervention_prompt},
  store::StudentStore,
};
use compass_gateway::ChatCompletion;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, chat::append_best_effort, error::ApiError};

/// Metadata `trigger` tag on intervention messages.
pub const TRIGGER_TAG: &str = "performance_intervention";

#[derive(Debug, Deserialize)]
pub struct InterventionRequest {
  pub student_id:     Uuid,
  pub subject:        String,
  pub new_grade:      f64,
  /// The previous grade for the same subject, if any.
  pub previous_grade: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InterventionResponse {
  Triggered {
    intervention_triggered: bool,
    message:                String,
    subject:                String,
    chat_id:                Uuid,
  },
  NotTriggered {
    intervention_triggered: bool,
    reason:                 String,
  },
}

/// Wraps [`ApiError`] with this endpoint's failure shape.
#[derive(Debug)]
pub struct InterventionError(pub ApiError);

impl From<ApiError> for InterventionError {
  fn from(e: ApiError) -> Self { Self(e) }
}

impl IntoResponse for InterventionError {
  fn into_response(self) -> Response {
    tracing::error!(error = %self.0, "performance intervention failed");
    (
      StatusCode::INTERNAL_SERVER_ERROR,
      Json(json!({ "error": self.0.to_string(), "intervention_triggered": false })),
    )
      .into_response()
  }
}

/// `POST /interventions/performance`
pub async fn handler<S, G>(
  State(state): State<AppState<S, G>>,
  body: Result<Json<InterventionRequest>, JsonRejection>,
) -> Result<Json<InterventionResponse>, InterventionError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Json(req) = body.map_err(ApiError::from)?;
  Ok(Json(intervene(&state, req).await?))
}

/// Evaluate the grade event and, if triggered, generate and log the
/// counselor's message.
pub async fn intervene<S, G>(
  state: &AppState<S, G>,
  req: InterventionRequest,
) -> Result<InterventionResponse, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  if req.subject.trim().is_empty() {
    return Err(ApiError::Validation("subject must not be empty".into()));
  }
  if !req.new_grade.is_finite() || req.previous_grade.is_some_and(|p| !p.is_finite()) {
    return Err(ApiError::Validation("grades must be finite numbers".into()));
  }

  let evaluation = evaluate(req.new_grade, req.previous_grade);
  let Evaluation::Intervene(situation) = evaluation else {
    tracing::info!(student_id = %req.student_id, subject = %req.subject, "no intervention needed");
    return Ok(InterventionResponse::NotTriggered {
      intervention_triggered: false,
      reason:                 evaluation.reason().to_owned(),
    });
  };

  tracing::info!(
    student_id = %req.student_id,
    subject = %req.subject,
    new_grade = req.new_grade,
    previous_grade = ?req.previous_grade,
    situation = situation.label(),
    "triggering performance intervention"
  );

  let profile = state
    .store
    .get_profile(req.student_id)
    .await
    .map_err(ApiError::from_store)?;
  let directory = local_directory(&*state.store, profile.as_ref(), &state.settings.default_region)
    .await
    .map_err(ApiError::from_store)?;

  let event = GradeEvent {
    subject:        &req.subject,
    new_score:      req.new_grade,
    previous_score: req.previous_grade,
    situation,
  };
  let prompt = intervention_prompt(
    &event,
    profile.as_ref().map(|p| p.full_name.as_str()),
    &directory,
  );
  let turns = [ChatTurn::user(grade_event_turn(&event))];

  let reply = state.gateway.complete(&prompt, &turns).await?.into_text();
  let chat_id = Uuid::new_v4();

  let metadata = json!({
    "trigger":        TRIGGER_TAG,
    "subject":        req.subject,
    "grade":          req.new_grade,
    "previous_grade": req.previous_grade,
  });
  append_best_effort(
    &*state.store,
    NewChatMessage::new(req.student_id, ChatTurn::assistant(reply.clone()))
      .with_id(chat_id)
      .with_metadata(metadata),
  )
  .await;

  Ok(InterventionResponse::Triggered {
    intervention_triggered: true,
    message: reply,
    subject: req.subject,
    chat_id,
  })
}
