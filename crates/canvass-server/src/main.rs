//! canvass-server binary.
//!
//! Reads `canvass.toml` (or the path given with `--config`), opens the
//! SQLite store, optionally seeds the sample district, and serves the JSON
//! API over HTTP.

mod config;
mod demo;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use canvass_api::AppState;
use canvass_core::demo::seed_if_empty;
use canvass_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use crate::{config::ServerConfig, demo::SampleDistrict};

#[derive(Parser)]
#[command(author, version, about = "Door-to-door canvassing server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "canvass.toml")]
  config: PathBuf,

  /// Seed the sample district if the store is empty.
  #[arg(long)]
  seed_demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(cli.config)?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if cli.seed_demo || server_cfg.seed_demo_data {
    seed_if_empty(&store, &SampleDistrict::default())
      .await
      .context("failed to seed demo data")?;
  }

  let state = AppState::new(Arc::new(store), server_cfg.api_settings());
  let app = canvass_api::api_router(state).layer(TraceLayer::new_for_http());

  let address = server_cfg.address();
  info!(
    response_policy = ?server_cfg.response_policy,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  info!("server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!(error = %e, "failed to listen for Ctrl+C");
    std::future::pending::<()>().await;
  }
  info!("received Ctrl+C, shutting down");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
