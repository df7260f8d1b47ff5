//! Lotka HTTP server binary.
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from the environment
//! 3. Serve until `Ctrl-C`

use std::sync::Arc;

use anyhow::Context;
use lotka_server::{start_server, AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = ServerConfig::from_env().context("failed to load configuration")?;
    info!(
        host = %config.host,
        port = config.port,
        max_duration = config.limits.max_duration,
        samples = config.limits.samples,
        method = %config.settings.method,
        timeout_ms = config.timeout.as_millis() as u64,
        "Configuration loaded"
    );

    let state = Arc::new(AppState::from_config(&config));
    start_server(&config, state)
        .await
        .context("server terminated with an error")?;
    Ok(())
}
