use anyhow::{Context, Result, bail};
use augur_core::config::{
    DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECONDS, PROXY_ENDPOINT_ENV, PROXY_URL_ENV, TIMEOUT_ENV,
};
use augur_core::{ModelSet, ProxyConfig, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::CONFIG_FILE_NAME;

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the augur proxy, e.g. http://localhost:3000
    pub proxy_url: Option<String>,
    /// Path of the proxy endpoint
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub retry: RetryPolicy,
    pub models: ModelSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy_url: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            retry: RetryPolicy::default(),
            models: ModelSet::default(),
        }
    }
}

impl Config {
    pub fn load(base_path: &Path) -> Result<Config> {
        let config_path = base_path.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            // Create default config
            let default_config = Config::default();
            default_config.save(base_path)?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", config_path.display()))?;

        Ok(config)
    }

    pub fn save(&self, base_path: &Path) -> Result<()> {
        let config_path = base_path.join(CONFIG_FILE_NAME);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    /// Proxy settings from the environment, falling back to this file
    pub fn proxy_config(&self) -> Result<ProxyConfig> {
        self.proxy_config_with(|key| std::env::var(key).ok())
    }

    pub fn proxy_config_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ProxyConfig> {
        let Some(base_url) = lookup(PROXY_URL_ENV).or_else(|| self.proxy_url.clone()) else {
            bail!("No proxy configured. Set {PROXY_URL_ENV} or proxy_url in {CONFIG_FILE_NAME}");
        };

        let endpoint = lookup(PROXY_ENDPOINT_ENV).unwrap_or_else(|| self.endpoint.clone());

        let timeout_seconds = match lookup(TIMEOUT_ENV) {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("{TIMEOUT_ENV} must be a whole number, got '{value}'"))?,
            None => self.timeout_seconds,
        };

        let config = ProxyConfig::new(base_url)
            .with_endpoint(endpoint)
            .with_timeout(timeout_seconds)
            .with_retry_policy(self.retry)
            .with_models(self.models.clone());

        config.validate()?;
        Ok(config)
    }
}
