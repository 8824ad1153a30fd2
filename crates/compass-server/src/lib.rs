//! Configuration and application assembly for the Compass server binary.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use compass_api::{AppState, ChatSettings, api_router};
use compass_core::store::StudentStore;
use compass_gateway::{GatewayConfig, GatewayError, HttpGateway};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Environment variable prefix, e.g. `COMPASS_GATEWAY__API_KEY`.
pub const ENV_PREFIX: &str = "COMPASS";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `compass.toml` and the
/// environment.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  /// Municipality used for directory matching when a profile has none.
  #[serde(default = "default_region")]
  pub default_region: String,
  #[serde(default = "default_gateway")]
  pub gateway:        GatewayConfig,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("compass.db") }
fn default_region() -> String { ChatSettings::default().default_region }
fn default_gateway() -> GatewayConfig { GatewayConfig::with_api_key("") }

impl ServerConfig {
  /// Read `path` (if it exists) layered under `COMPASS_*` variables. Nested
  /// keys use `__`, so `COMPASS_GATEWAY__MODEL` sets `gateway.model`.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Config::builder()
      .add_source(File::from(path).required(false))
      .add_source(
        Environment::with_prefix(ENV_PREFIX)
          .prefix_separator("_")
          .separator("__"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn chat_settings(&self) -> ChatSettings {
    if self.default_region.trim().is_empty() {
      return ChatSettings::default();
    }
    ChatSettings { default_region: self.default_region.clone() }
  }
}

// ─── Application ──────────────────────────────────────────────────────────────

/// Validate the gateway settings and build the traced API router over
/// `store`. Fails with [`GatewayError::Config`] before anything is served.
pub fn build_app<S>(store: S, config: &ServerConfig) -> Result<Router, GatewayError>
where
  S: StudentStore + 'static,
{
  let gateway = HttpGateway::new(config.gateway.clone())?;
  let state = AppState {
    store:    Arc::new(store),
    gateway:  Arc::new(gateway),
    settings: Arc::new(config.chat_settings()),
  };
  Ok(api_router(state).layer(TraceLayer::new_for_http()))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use axum::{body::Body, http::Request};
  use compass_store_sqlite::SqliteStore;
  use config::FileFormat;
  use tower::ServiceExt as _;

  use super::*;

  fn from_toml(text: &str) -> ServerConfig {
    Config::builder()
      .add_source(File::from_str(text, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_file_yields_defaults() {
    let cfg = from_toml("");
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.store_path, PathBuf::from("compass.db"));
    assert_eq!(cfg.chat_settings().default_region, "Central");
    assert!(cfg.gateway.api_key.is_empty());
    assert_eq!(cfg.gateway.timeout_secs, 15);
  }

  #[test]
  fn gateway_table_overrides_defaults() {
    let cfg = from_toml(
      r#"
        port = 9000
        default_region = "Polokwane"

        [gateway]
        api_key = "sk-test"
        model = "gpt-4o"
      "#,
    );
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.chat_settings().default_region, "Polokwane");
    assert_eq!(cfg.gateway.api_key, "sk-test");
    assert_eq!(cfg.gateway.model, "gpt-4o");
    assert_eq!(cfg.gateway.max_tokens, 500);
  }

  #[test]
  fn blank_region_falls_back() {
    let cfg = from_toml(r#"default_region = "  ""#);
    assert_eq!(cfg.chat_settings().default_region, "Central");
  }

  #[tokio::test]
  async fn missing_api_key_is_rejected_at_startup() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let err = build_app(store, &from_toml("")).unwrap_err();
    assert!(matches!(err, GatewayError::Config(_)));
  }

  #[tokio::test]
  async fn built_app_serves_health() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let cfg = from_toml("[gateway]\napi_key = \"sk-test\"");
    let app = build_app(store, &cfg).unwrap();

    let resp = app
      .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert!(resp.status().is_success());
  }

  #[test]
  fn tilde_is_expanded_only_at_start() {
    let plain = Path::new("/var/lib/compass.db");
    assert_eq!(expand_tilde(plain), plain.to_path_buf());
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(
        expand_tilde(Path::new("~/compass.db")),
        PathBuf::from(home).join("compass.db")
      );
    }
  }
}
