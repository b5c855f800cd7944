use std::net::SocketAddr;
use std::path::Path;

use anyhow::Result;
use repo_summarizer_core::config::{load_ignore_rules, RuntimeConfig};
use tracing::info;

mod app;
mod config;
mod dto;
mod error;
mod middleware;
mod routes;
mod state;
mod telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let args = config::Args::parse();
    let cfg = config::load_config(args.config.as_deref())?;

    telemetry::init(&cfg.telemetry)?;

    let runtime_config = RuntimeConfig::load_from_path(Path::new(&cfg.runtime_config_path))?;
    runtime_config
        .validate_startup()
        .map_err(|e| anyhow::anyhow!("startup config validation failed: {e}"))?;
    let ignore = load_ignore_rules(Path::new(&cfg.ignore_rules_path))?;

    let app_state = state::AppState::new(cfg.clone(), runtime_config, ignore)?;
    let router = app::build_router(app_state);

    let addr: SocketAddr = cfg.listen_addr.parse()?;
    info!(%addr, "starting repo-summarizer-api");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
