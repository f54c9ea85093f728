use crate::error::AugurError;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Path of the proxy endpoint relative to the base URL
pub const DEFAULT_ENDPOINT: &str = "/api/gemini";

/// Generous default: video and image generation calls are slow
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

pub const PROXY_URL_ENV: &str = "AUGUR_PROXY_URL";
pub const PROXY_ENDPOINT_ENV: &str = "AUGUR_PROXY_ENDPOINT";
pub const TIMEOUT_ENV: &str = "AUGUR_TIMEOUT_SECONDS";

/// Model identifiers used by each service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSet {
    /// Text, fortunes, transcription
    pub flash: String,
    /// Chat and video analysis
    pub pro: String,
    /// High quality image generation
    pub imagen: String,
    /// Image generation and editing through generateContent
    pub flash_image: String,
    pub veo: String,
    pub tts: String,
}

impl Default for ModelSet {
    fn default() -> Self {
        Self {
            flash: "gemini-2.5-flash".to_string(),
            pro: "gemini-2.5-pro".to_string(),
            imagen: "imagen-4.0-generate-001".to_string(),
            flash_image: "gemini-2.5-flash-image".to_string(),
            veo: "veo-3.1-fast-generate-preview".to_string(),
            tts: "gemini-2.5-flash-preview-tts".to_string(),
        }
    }
}

/// Where the proxy lives and how calls to it behave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub base_url: String,
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub retry: RetryPolicy,
    pub models: ModelSet,
}

impl ProxyConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            retry: RetryPolicy::default(),
            models: ModelSet::default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_models(mut self, models: ModelSet) -> Self {
        self.models = models;
        self
    }

    /// Full endpoint URL
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.endpoint)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn validate(&self) -> Result<(), AugurError> {
        if self.base_url.is_empty() {
            return Err(AugurError::configuration("Proxy base URL is required"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(AugurError::configuration(
                "Proxy base URL must be a valid HTTP/HTTPS URL",
            ));
        }

        if !self.endpoint.starts_with('/') {
            return Err(AugurError::configuration(
                "Proxy endpoint must start with '/'",
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(AugurError::configuration(
                "Timeout must be at least one second",
            ));
        }

        self.retry.validate()
    }
}

/// Builds a [`ProxyConfig`] from environment variables
pub struct ConfigBuilder;

impl ConfigBuilder {
    pub fn from_env() -> Result<ProxyConfig, AugurError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigBuilder::from_env`] with a custom variable source
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ProxyConfig, AugurError> {
        let base_url = lookup(PROXY_URL_ENV).ok_or_else(|| {
            AugurError::configuration(format!("{PROXY_URL_ENV} environment variable not set"))
        })?;

        let mut config = ProxyConfig::new(base_url);

        if let Some(endpoint) = lookup(PROXY_ENDPOINT_ENV) {
            config = config.with_endpoint(endpoint);
        }

        if let Some(timeout) = lookup(TIMEOUT_ENV) {
            let seconds = timeout.trim().parse().map_err(|_| {
                AugurError::configuration(format!(
                    "{TIMEOUT_ENV} must be a whole number of seconds, got '{timeout}'"
                ))
            })?;
            config = config.with_timeout(seconds);
        }

        config.validate()?;
        Ok(config)
    }
}
