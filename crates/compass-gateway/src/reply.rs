//! [`GatewayReply`]: the upstream response body, parsed without ever
//! failing.

use serde::Deserialize;

/// Raw bodies are cut to this many characters when the expected shape is
/// missing.
pub const MAX_RAW_CHARS: usize = 500;

/// What the upstream answered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayReply {
  /// The assistant text from `choices[0].message.content`.
  Success(String),
  /// The body did not have the expected shape; holds the (truncated) body,
  /// re-serialised if it was JSON.
  MalformedBody(String),
}

// ─── Wire shape ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CompletionBody {
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
  content: Option<String>,
}

impl GatewayReply {
  /// Interpret a 2xx response body.
  pub fn from_body(raw: &str) -> Self {
    let value: serde_json::Value = match serde_json::from_str(raw) {
      Ok(v) => v,
      Err(_) => return Self::MalformedBody(truncate(raw)),
    };

    let content = serde_json::from_value::<CompletionBody>(value.clone())
      .ok()
      .and_then(|body| body.choices.into_iter().next())
      .and_then(|choice| choice.message.content);

    match content {
      Some(text) => Self::Success(text),
      None => Self::MalformedBody(truncate(&value.to_string())),
    }
  }

  pub fn is_success(&self) -> bool { matches!(self, Self::Success(_)) }

  /// The text to show the student: the assistant reply, or the truncated
  /// raw body.
  pub fn into_text(self) -> String {
    match self {
      Self::Success(text) | Self::MalformedBody(text) => text,
    }
  }
}

fn truncate(s: &str) -> String { s.chars().take(MAX_RAW_CHARS).collect() }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_first_choice() {
    let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"You can do this."},"finish_reason":"stop"}]}"#;
    assert_eq!(
      GatewayReply::from_body(body),
      GatewayReply::Success("You can do this.".into())
    );
  }

  #[test]
  fn unexpected_json_shape_is_reserialised() {
    let reply = GatewayReply::from_body(r#"{ "error": { "message": "quota" } }"#);
    assert!(!reply.is_success());
    assert_eq!(reply.into_text(), r#"{"error":{"message":"quota"}}"#);
  }

  #[test]
  fn empty_choices_is_malformed() {
    assert!(matches!(
      GatewayReply::from_body(r#"{"choices":[]}"#),
      GatewayReply::MalformedBody(_)
    ));
  }

  #[test]
  fn non_json_body_is_truncated() {
    let raw = "é".repeat(MAX_RAW_CHARS + 100);
    let text = GatewayReply::from_body(&raw).into_text();
    assert_eq!(text.chars().count(), MAX_RAW_CHARS);
  }
}
