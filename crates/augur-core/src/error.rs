use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Message surfaced once rate-limit retries are exhausted
pub const QUOTA_EXCEEDED_MESSAGE: &str =
    "API quota exceeded. Please check your plan and billing details or try again later.";

/// Message surfaced for overload and transport failures
pub const MODEL_OVERLOADED_MESSAGE: &str =
    "The model is currently overloaded. Please try again later.";

/// Fallback when the proxy answers with an error body we cannot read
pub const UNKNOWN_SERVER_ERROR_MESSAGE: &str = "An unknown server error occurred.";

const RETRY_INFO_TYPE: &str = "type.googleapis.com/google.rpc.RetryInfo";

/// Canonical status carried by an upstream error payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorStatus {
    ResourceExhausted,
    Unavailable,
    InvalidArgument,
    PermissionDenied,
    ProxyError,
    Other(String),
}

impl ErrorStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "RESOURCE_EXHAUSTED" => Self::ResourceExhausted,
            "UNAVAILABLE" => Self::Unavailable,
            "INVALID_ARGUMENT" => Self::InvalidArgument,
            "PERMISSION_DENIED" => Self::PermissionDenied,
            "PROXY_ERROR" => Self::ProxyError,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::Unavailable => "UNAVAILABLE",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ProxyError => "PROXY_ERROR",
            Self::Other(status) => status.as_str(),
        }
    }
}

/// Structured error reported by the AI service or the proxy in front of it.
///
/// Mirrors the `{"error": {"code", "message", "status", "details"}}` envelope
/// returned by Google APIs; the proxy uses the same shape with status
/// `PROXY_ERROR` for failures it raises itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorEnvelope {
    error: UpstreamError,
}

impl UpstreamError {
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            status: Some(status.into()),
            details: Vec::new(),
        }
    }

    /// Error raised by the proxy itself rather than the upstream service
    pub fn proxy(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::ProxyError.as_str(), message)
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details.push(detail);
        self
    }

    /// Parse an `{"error": {...}}` envelope. Returns `None` for anything else.
    pub fn from_json(text: &str) -> Option<Self> {
        serde_json::from_str::<ErrorEnvelope>(text)
            .ok()
            .map(|envelope| envelope.error)
    }

    /// Serialize back into the envelope form
    pub fn to_json(&self) -> String {
        let envelope = serde_json::json!({ "error": self });
        envelope.to_string()
    }

    pub fn status_code(&self) -> Option<ErrorStatus> {
        self.status.as_deref().map(ErrorStatus::parse)
    }

    /// Server-suggested wait before retrying, from a `google.rpc.RetryInfo` detail.
    ///
    /// Only the leading whole seconds of `retryDelay` are honoured, so `"28s"`
    /// and `"28.9s"` both yield 28 seconds.
    pub fn retry_delay_hint(&self) -> Option<Duration> {
        self.details
            .iter()
            .find(|detail| detail.get("@type").and_then(|t| t.as_str()) == Some(RETRY_INFO_TYPE))
            .and_then(|detail| detail.get("retryDelay"))
            .and_then(|delay| delay.as_str())
            .and_then(parse_whole_seconds)
            .map(Duration::from_secs)
    }
}

fn parse_whole_seconds(raw: &str) -> Option<u64> {
    let raw = raw.replacen('s', "", 1);
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Some(status) => write!(f, "{} ({status})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Main error type for the augur library
#[derive(Error, Debug)]
pub enum AugurError {
    /// Transport-level failures: connection refused, DNS, broken body
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Structured error from the AI service or the proxy
    #[error("Upstream error: {0}")]
    Upstream(UpstreamError),

    /// Rate limiting persisted after every retry
    #[error("{}", QUOTA_EXCEEDED_MESSAGE)]
    QuotaExceeded,

    /// Model overloaded, or unreachable
    #[error("{}", MODEL_OVERLOADED_MESSAGE)]
    ModelOverloaded,

    /// The requested model is restricted to billed accounts
    #[error("This model is only accessible to billed users")]
    BillingRequired,

    /// The model stopped generating because of its safety filters
    #[error("Generation blocked by safety filters: {message}")]
    SafetyBlocked { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The service answered but produced nothing usable
    #[error("Empty response: {message}")]
    EmptyResponse { message: String },

    #[error("Unexpected error: {message}")]
    Unknown {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AugurError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    pub fn network_with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn upstream(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream(UpstreamError::new(status, message))
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn serialization(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Serialization {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn safety_blocked(message: impl Into<String>) -> Self {
        Self::SafetyBlocked {
            message: message.into(),
        }
    }

    pub fn empty_response(message: impl Into<String>) -> Self {
        Self::EmptyResponse {
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
            source: None,
        }
    }

    /// Adapt an SDK-style error message.
    ///
    /// Some client libraries report upstream failures as the JSON error
    /// envelope stringified into a plain message. When the message parses as
    /// such an envelope the structured error is recovered; a generic fetch
    /// failure becomes a network error; anything else is kept opaque.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if let Some(upstream) = UpstreamError::from_json(&message) {
            return Self::Upstream(upstream);
        }
        if message.contains("Failed to fetch") {
            return Self::network(message);
        }
        Self::unknown(message)
    }

    /// Structured upstream payload, if this error carries one
    pub fn upstream_error(&self) -> Option<&UpstreamError> {
        match self {
            Self::Upstream(upstream) => Some(upstream),
            _ => None,
        }
    }

    /// Check if the error is worth another attempt
    pub fn is_retryable(&self) -> bool {
        crate::retry::Classification::of(self).is_retryable()
    }
}

/// Convert from reqwest errors
impl From<reqwest::Error> for AugurError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            AugurError::configuration(format!("Invalid HTTP client setup: {err}"))
        } else if err.is_decode() {
            AugurError::serialization("Failed to decode response body", err)
        } else if err.is_timeout() {
            AugurError::network_with_source("Request timed out", err)
        } else if err.is_connect() {
            AugurError::network_with_source("Connection failed", err)
        } else {
            AugurError::network_with_source("HTTP request failed", err)
        }
    }
}

/// Convert from serde_json errors
impl From<serde_json::Error> for AugurError {
    fn from(err: serde_json::Error) -> Self {
        AugurError::serialization("JSON serialization failed", err)
    }
}
