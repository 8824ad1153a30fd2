//! Conversation log entries and chat turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a turn. System prompts are never persisted, so they have no
/// role here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
  User,
  Assistant,
}

impl ChatRole {
  pub fn as_str(self) -> &'static str {
    match self {
      ChatRole::User => "user",
      ChatRole::Assistant => "assistant",
    }
  }
}

/// One turn of a conversation as exchanged with the caller and the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
  pub role:    ChatRole,
  pub content: String,
}

impl ChatTurn {
  pub fn user(content: impl Into<String>) -> Self {
    Self { role: ChatRole::User, content: content.into() }
  }

  pub fn assistant(content: impl Into<String>) -> Self {
    Self { role: ChatRole::Assistant, content: content.into() }
  }
}

/// A persisted conversation-log row. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub message_id: Uuid,
  /// Nullable in the log; the HTTP layer only ever writes owned rows.
  pub student_id: Option<Uuid>,
  pub role:       ChatRole,
  pub content:    String,
  /// Free-form tags, e.g. which subject triggered an intervention.
  pub metadata:   Option<serde_json::Value>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`StudentStore::append_message`](crate::store::StudentStore::append_message).
#[derive(Debug, Clone)]
pub struct NewChatMessage {
  /// Caller-supplied id; the store generates one when `None`.
  pub message_id: Option<Uuid>,
  pub student_id: Option<Uuid>,
  pub role:       ChatRole,
  pub content:    String,
  pub metadata:   Option<serde_json::Value>,
}

impl NewChatMessage {
  pub fn new(student_id: Uuid, turn: ChatTurn) -> Self {
    Self {
      message_id: None,
      student_id: Some(student_id),
      role:       turn.role,
      content:    turn.content,
      metadata:   None,
    }
  }

  pub fn with_id(mut self, id: Uuid) -> Self {
    self.message_id = Some(id);
    self
  }

  pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
    self.metadata = Some(metadata);
    self
  }
}
