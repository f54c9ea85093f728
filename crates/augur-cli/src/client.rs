use crate::args::CliConfig;
use anyhow::{Context, Result};
use augur_core::AiServices;

/// Build the services from the loaded configuration and environment
pub fn from_config(cli_config: &CliConfig) -> Result<AiServices> {
    let proxy_config = cli_config.config.proxy_config()?;
    tracing::debug!(
        "using proxy {} (timeout {}s, {} attempts)",
        proxy_config.url(),
        proxy_config.timeout_seconds,
        proxy_config.retry.max_attempts
    );

    AiServices::new(&proxy_config).context("Failed to create the proxy client")
}
