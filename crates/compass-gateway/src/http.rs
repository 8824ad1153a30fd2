//! [`HttpGateway`]: OpenAI-compatible chat-completion client over reqwest.

use std::time::Duration;

use compass_core::conversation::ChatTurn;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{ChatCompletion, CompletionCall, GatewayError, GatewayReply};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Gateway settings, usually the `[gateway]` table of the server config.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
  /// Bearer credential for the upstream. Required.
  #[serde(default)]
  pub api_key:      String,
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  #[serde(default = "default_model")]
  pub model:        String,
  /// Upper bound on one completion call, for every caller.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  #[serde(default = "default_temperature")]
  pub temperature:  f32,
  #[serde(default = "default_max_tokens")]
  pub max_tokens:   u32,
}

fn default_base_url() -> String { "https://api.openai.com/v1".to_owned() }
fn default_model() -> String { "gpt-4o-mini".to_owned() }
fn default_timeout_secs() -> u64 { 15 }
fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 500 }

impl GatewayConfig {
  /// Defaults for everything except the key.
  pub fn with_api_key(api_key: impl Into<String>) -> Self {
    Self {
      api_key:      api_key.into(),
      base_url:     default_base_url(),
      model:        default_model(),
      timeout_secs: default_timeout_secs(),
      temperature:  default_temperature(),
      max_tokens:   default_max_tokens(),
    }
  }

  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct CompletionRequest<'a> {
  model:       &'a str,
  messages:    Vec<WireMessage<'a>>,
  temperature: f32,
  max_tokens:  u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
  role:    &'a str,
  content: &'a str,
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Chat-completion client.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpGateway {
  client:  Client,
  config:  GatewayConfig,
  timeout: Duration,
}

impl HttpGateway {
  /// Validate `config` and build the client. A blank API key is a
  /// [`GatewayError::Config`].
  pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
    if config.api_key.trim().is_empty() {
      return Err(GatewayError::Config("gateway api_key is not set".into()));
    }
    if config.timeout_secs == 0 {
      return Err(GatewayError::Config("gateway timeout_secs must be positive".into()));
    }
    let client = Client::builder().build()?;
    let timeout = config.timeout();
    Ok(Self { client, config, timeout })
  }

  /// Override the per-call bound. Mostly useful in tests.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn timeout(&self) -> Duration { self.timeout }

  fn url(&self) -> String {
    format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
  }

  /// Run one completion under a caller-supplied [`CompletionCall`].
  pub async fn complete_with(
    &self,
    call: CompletionCall,
    system_prompt: &str,
    turns: &[ChatTurn],
  ) -> Result<GatewayReply, GatewayError> {
    call.run(self.send(system_prompt, turns)).await
  }

  async fn send(
    &self,
    system_prompt: &str,
    turns: &[ChatTurn],
  ) -> Result<GatewayReply, GatewayError> {
    let messages = std::iter::once(WireMessage { role: "system", content: system_prompt })
      .chain(turns.iter().map(|t| WireMessage {
        role:    t.role.as_str(),
        content: &t.content,
      }))
      .collect();

    let body = CompletionRequest {
      model: &self.config.model,
      messages,
      temperature: self.config.temperature,
      max_tokens: self.config.max_tokens,
    };

    let resp = self
      .client
      .post(self.url())
      .bearer_auth(&self.config.api_key)
      .json(&body)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      tracing::error!(%status, "chat-completion upstream returned an error");
      return Err(GatewayError::Upstream { status: status.as_u16() });
    }

    let raw = resp.text().await?;
    let reply = GatewayReply::from_body(&raw);
    if !reply.is_success() {
      tracing::warn!("chat-completion body had an unexpected shape");
    }
    Ok(reply)
  }
}

impl ChatCompletion for HttpGateway {
  async fn complete(
    &self,
    system_prompt: &str,
    turns: &[ChatTurn],
  ) -> Result<GatewayReply, GatewayError> {
    let call = CompletionCall::with_timeout(self.timeout);
    self.complete_with(call, system_prompt, turns).await
  }
}

#[cfg(test)]
mod tests {
  use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    routing::post,
  };
  use serde_json::{Value, json};

  use super::*;

  /// Serve `router` on an ephemeral local port; returns its base URL.
  async fn upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
  }

  fn gateway(base_url: String) -> HttpGateway {
    let mut config = GatewayConfig::with_api_key("test-key");
    config.base_url = base_url;
    HttpGateway::new(config).unwrap()
  }

  #[test]
  fn blank_api_key_is_a_config_error() {
    let err = HttpGateway::new(GatewayConfig::with_api_key("  ")).err().unwrap();
    assert!(matches!(err, GatewayError::Config(_)));
  }

  #[test]
  fn default_timeout_is_fifteen_seconds() {
    let gw = HttpGateway::new(GatewayConfig::with_api_key("k")).unwrap();
    assert_eq!(gw.timeout(), Duration::from_secs(15));
  }

  #[tokio::test]
  async fn sends_system_prompt_then_turns() {
    let router = Router::new().route(
      "/chat/completions",
      post(|headers: HeaderMap, Json(body): Json<Value>| async move {
        assert_eq!(headers["authorization"], "Bearer test-key");
        let roles: Vec<_> = body["messages"]
          .as_array()
          .unwrap()
          .iter()
          .map(|m| m["role"].as_str().unwrap().to_owned())
          .collect();
        Json(json!({
          "choices": [{ "message": { "role": "assistant", "content": roles.join(",") } }]
        }))
      }),
    );
    let gw = gateway(upstream(router).await);

    let turns = [ChatTurn::user("hi"), ChatTurn::assistant("hello"), ChatTurn::user("help")];
    let reply = gw.complete("be kind", &turns).await.unwrap();
    assert_eq!(reply, GatewayReply::Success("system,user,assistant,user".into()));
  }

  #[tokio::test]
  async fn non_success_status_is_upstream_error() {
    let router = Router::new().route(
      "/chat/completions",
      post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let gw = gateway(upstream(router).await);

    let err = gw.complete("p", &[ChatTurn::user("x")]).await.unwrap_err();
    assert!(matches!(err, GatewayError::Upstream { status: 500 }));
  }

  #[tokio::test]
  async fn malformed_body_degrades_to_raw_text() {
    let router = Router::new().route(
      "/chat/completions",
      post(|| async { "definitely not json" }),
    );
    let gw = gateway(upstream(router).await);

    let reply = gw.complete("p", &[ChatTurn::user("x")]).await.unwrap();
    assert_eq!(reply, GatewayReply::MalformedBody("definitely not json".into()));
  }

  #[tokio::test]
  async fn silent_upstream_times_out_within_bound() {
    let router = Router::new().route(
      "/chat/completions",
      post(|| async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        "too late"
      }),
    );
    let bound = Duration::from_millis(200);
    let gw = gateway(upstream(router).await).with_timeout(bound);

    let started = std::time::Instant::now();
    let err = gw.complete("p", &[ChatTurn::user("x")]).await.unwrap_err();
    assert!(matches!(err, GatewayError::Timeout(t) if t == bound));
    assert!(started.elapsed() < Duration::from_secs(5));
  }

  #[tokio::test]
  async fn unreachable_upstream_is_transport_error() {
    // Bind then drop to get a port nobody is listening on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gw = gateway(format!("http://{addr}"));
    let err = gw.complete("p", &[ChatTurn::user("x")]).await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
  }
}
