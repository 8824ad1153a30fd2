//! Direct conversational chat.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/chat` | Body: [`ChatRequest`]; returns [`ChatResponse`] |
//! | `GET`  | `/profiles/:id/chat` | Conversation log, oldest first |

use axum::{
  Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
};
use compass_core::{
  context::assemble_context,
  conversation::{ChatMessage, ChatRole, ChatTurn, NewChatMessage},
  prompt::{COUNSELOR_PROMPT, counselor_prompt_with_context},
  store::StudentStore,
};
use compass_gateway::ChatCompletion;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Direct chat ──────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
  /// The full turn history, oldest first. Required and non-empty.
  pub messages:   Option<Vec<ChatTurn>>,
  /// When present the system prompt is enriched with the student's context
  /// and the exchange is persisted.
  pub student_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
  pub message: String,
  /// Id of the assistant reply in the conversation log.
  pub chat_id: Uuid,
}

/// `POST /chat`
pub async fn handler<S, G>(
  State(state): State<AppState<S, G>>,
  body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Json(req) = body?;
  let turns = req
    .messages
    .ok_or_else(|| ApiError::Validation("`messages` must be an array".into()))?;

  let response = direct_chat(&state, turns, req.student_id).await?;
  Ok(Json(response))
}

/// Answer one chat request: build the system prompt, ask the gateway, log
/// the exchange.
pub async fn direct_chat<S, G>(
  state: &AppState<S, G>,
  turns: Vec<ChatTurn>,
  student_id: Option<Uuid>,
) -> Result<ChatResponse, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Some(last_turn) = turns.last().cloned() else {
    return Err(ApiError::Validation("`messages` must not be empty".into()));
  };
  if last_turn.role != ChatRole::User {
    return Err(ApiError::Validation("the last message must have role `user`".into()));
  }

  let system_prompt = match student_id {
    Some(id) => {
      match assemble_context(&*state.store, id, &state.settings.default_region).await {
        Ok(context) => counselor_prompt_with_context(&context),
        Err(e) => {
          tracing::warn!(
            student_id = %id,
            error = %e,
            "could not assemble context; using plain prompt"
          );
          COUNSELOR_PROMPT.to_owned()
        }
      }
    }
    None => COUNSELOR_PROMPT.to_owned(),
  };

  let reply = state.gateway.complete(&system_prompt, &turns).await?.into_text();
  let chat_id = Uuid::new_v4();

  match student_id {
    Some(id) => {
      append_best_effort(&*state.store, NewChatMessage::new(id, last_turn)).await;
      append_best_effort(
        &*state.store,
        NewChatMessage::new(id, ChatTurn::assistant(reply.clone())).with_id(chat_id),
      )
      .await;
    }
    None => tracing::debug!("no student_id on chat request; exchange not persisted"),
  }

  Ok(ChatResponse { message: reply, chat_id })
}

/// Append to the conversation log, logging instead of failing. Runs after
/// the reply exists; errors never reach the caller.
pub(crate) async fn append_best_effort<S: StudentStore>(store: &S, message: NewChatMessage) {
  let role = message.role;
  let student_id = message.student_id;
  if let Err(e) = store.append_message(message).await {
    tracing::warn!(
      ?student_id,
      role = role.as_str(),
      error = %e,
      "failed to persist chat message"
    );
  }
}

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /profiles/:id/chat`
pub async fn history<S, G>(
  State(state): State<AppState<S, G>>,
  student_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<ChatMessage>>, ApiError>
where
  S: StudentStore,
  G: ChatCompletion,
{
  let Path(student_id) = student_id?;
  let messages = state
    .store
    .chat_history(student_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(messages))
}
