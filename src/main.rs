use anyhow::{Context, Result};
use tokio::net::TcpListener;

use wxgate_api::AppState;
use wxgate_core::{Config, ConfigError};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    wxgate_core::init()?;

    if let Some(path) = Config::config_path() {
        tracing::info!("Using config file {}", path.display());
    }
    let (config, _) = Config::load_validated().map_err(|e| {
        if let Some(config_err) = e.downcast_ref::<ConfigError>() {
            tracing::error!("{}", config_err.user_message());
        }
        e
    })?;

    let state = AppState::from_config(&config).context("Failed to build upstream clients")?;

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::AddrInUse => anyhow::anyhow!(
            "Failed to bind to {}: address already in use. Set PORT to pick another port.",
            addr
        ),
        std::io::ErrorKind::PermissionDenied => anyhow::anyhow!(
            "Failed to bind to {}: permission denied. Use a port above 1024.",
            addr
        ),
        _ => anyhow::anyhow!("Failed to bind to {}: {}", addr, e),
    })?;

    wxgate_api::serve(listener, state, shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal, stopping server...");
}
