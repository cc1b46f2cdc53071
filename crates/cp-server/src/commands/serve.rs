//! Serve command: runs the HTTP service until Ctrl-C.

use anyhow::{Context, Result};
use cp_core::{Dispatcher, SharedDispatcher};
use tokio::net::TcpListener;

use crate::Config;
use crate::http;

pub async fn run(config: &Config) -> Result<()> {
    let dispatcher =
        Dispatcher::with_fleet(&config.seed_fleet).context("failed to load seed fleet")?;

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    let address = listener
        .local_addr()
        .context("failed to read listener address")?;

    tracing::info!(
        %address,
        vehicles = config.seed_fleet.len(),
        "car pooling service listening"
    );

    http::serve(listener, SharedDispatcher::new(dispatcher), shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "cannot listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
