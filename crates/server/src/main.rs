//! # sheetbase-server
//!
//! Entry point: read configuration, set up logging, serve.

use anyhow::{Context, Result};
use clap::Parser;
use sheetbase_server::{create_router, AppState, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = AppState::from_config(&config).context("Failed to set up spreadsheet access")?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!(
        addr = %config.bind,
        memory = config.memory,
        "sheetbase-server listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
