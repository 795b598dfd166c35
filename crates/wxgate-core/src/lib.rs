pub mod config;
pub mod error;

pub use config::{
    CacheConfig, Config, RateLimitConfig, ServerConfig, UpstreamConfig, ValidationResult,
};
pub use error::ConfigError;

use anyhow::Result;

/// Initialize tracing/logging. `RUST_LOG` overrides the default `info` filter.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("wxgate core initialized");
    Ok(())
}
