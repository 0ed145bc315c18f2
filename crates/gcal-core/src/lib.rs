pub mod config;
pub mod error;

pub use config::{Config, GoogleConfig, ServerConfig, ValidationResult};
pub use error::ConfigError;

use anyhow::Result;

/// Initialize logging.
///
/// stdout carries protocol frames, so every log line goes to stderr.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::debug!("gcal-mcp core initialized");
    Ok(())
}
