//! Compass server binary.
//!
//! Reads `compass.toml` (or the path given with `--config`) layered under
//! `COMPASS_*` environment variables, opens the SQLite store, validates the
//! AI gateway settings and serves the JSON API over HTTP.
//!
//! ```sh
//! COMPASS_GATEWAY__API_KEY=sk-... cargo run -p compass-server
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use compass_server::{ServerConfig, build_app, expand_tilde};
use compass_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Compass student-support server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "compass.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let app = build_app(store, &server_cfg).context("invalid gateway configuration")?;
  let address = server_cfg.address();

  tracing::info!(
    model = %server_cfg.gateway.model,
    default_region = %server_cfg.default_region,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
