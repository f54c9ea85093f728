//! HTTP client for the generative-AI proxy.
//!
//! The proxy exposes a single endpoint that accepts
//! `{"operation": "...", "params": {...}}` and forwards it to the upstream
//! SDK. Every operation answers with JSON except `fetchVideo`, which streams
//! the video bytes back.

use crate::config::ProxyConfig;
use crate::error::{AugurError, ErrorStatus, UNKNOWN_SERVER_ERROR_MESSAGE, UpstreamError};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use strum_macros::{AsRefStr, Display, EnumString};
use tower_service::Service;

/// Operations understood by the proxy
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Operation {
    GenerateContent,
    GenerateImages,
    GenerateVideos,
    GetVideosOperation,
    FetchVideo,
}

impl Operation {
    /// Whether the proxy answers with raw bytes instead of JSON
    pub fn returns_bytes(&self) -> bool {
        matches!(self, Self::FetchVideo)
    }
}

/// Body posted to the proxy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyRequest {
    pub operation: Operation,
    pub params: serde_json::Value,
}

impl ProxyRequest {
    pub fn new(operation: Operation, params: impl Serialize) -> Result<Self, AugurError> {
        let params = serde_json::to_value(params).map_err(|e| {
            AugurError::serialization(format!("Failed to encode {operation} parameters"), e)
        })?;
        Ok(Self { operation, params })
    }
}

/// What the proxy sent back
#[derive(Debug, Clone)]
pub enum ProxyResponse {
    Json(serde_json::Value),
    Bytes {
        content_type: Option<String>,
        data: Bytes,
    },
}

impl ProxyResponse {
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, AugurError> {
        match self {
            Self::Json(value) => serde_json::from_value(value).map_err(|e| {
                AugurError::serialization(format!("Unexpected response shape: {e}"), e)
            }),
            Self::Bytes { .. } => Err(AugurError::validation(
                "Expected a JSON response but received binary content",
            )),
        }
    }

    pub fn into_bytes(self) -> Result<(Option<String>, Bytes), AugurError> {
        match self {
            Self::Bytes { content_type, data } => Ok((content_type, data)),
            Self::Json(_) => Err(AugurError::validation(
                "Expected binary content but received JSON",
            )),
        }
    }
}

#[derive(Deserialize)]
struct ProxyMessage {
    message: Option<String>,
}

/// Client for the proxy endpoint
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    url: String,
}

impl ProxyClient {
    pub fn new(config: &ProxyConfig) -> Result<Self, AugurError> {
        config.validate()?;

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            url: config.url(),
        })
    }

    /// Send one request to the proxy. No retries happen here.
    pub async fn dispatch(&self, request: ProxyRequest) -> Result<ProxyResponse, AugurError> {
        log::debug!("POST {} operation={}", self.url, request.operation);

        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::debug!("proxy answered {status} for {}: {body}", request.operation);
            return Err(error_from_body(status, &body));
        }

        if request.operation.returns_bytes() {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let data = response.bytes().await?;
            return Ok(ProxyResponse::Bytes { content_type, data });
        }

        let text = response.text().await?;
        let value = serde_json::from_str(&text).map_err(|e| {
            AugurError::serialization(
                format!("Failed to parse {} response", request.operation),
                e,
            )
        })?;

        Ok(ProxyResponse::Json(value))
    }
}

/// Turn a non-2xx proxy answer into a structured error.
///
/// A full upstream envelope is kept as-is. A bare `{"message": ...}` becomes
/// a `PROXY_ERROR`, except that HTTP 429 and 503 are promoted to
/// `RESOURCE_EXHAUSTED` and `UNAVAILABLE` so the retry layer still sees them.
fn error_from_body(status: StatusCode, body: &str) -> AugurError {
    if let Some(mut upstream) = UpstreamError::from_json(body) {
        upstream.code.get_or_insert(status.as_u16());
        return AugurError::Upstream(upstream);
    }

    let message = serde_json::from_str::<ProxyMessage>(body)
        .ok()
        .and_then(|m| m.message)
        .unwrap_or_else(|| UNKNOWN_SERVER_ERROR_MESSAGE.to_string());

    let upstream = match status {
        StatusCode::TOO_MANY_REQUESTS => {
            UpstreamError::new(ErrorStatus::ResourceExhausted.as_str(), message)
        }
        StatusCode::SERVICE_UNAVAILABLE => {
            UpstreamError::new(ErrorStatus::Unavailable.as_str(), message)
        }
        _ => UpstreamError::proxy(message),
    };

    AugurError::Upstream(upstream.with_code(status.as_u16()))
}

impl Service<ProxyRequest> for ProxyClient {
    type Response = ProxyResponse;
    type Error = AugurError;
    type Future = Pin<Box<dyn Future<Output = Result<ProxyResponse, AugurError>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: ProxyRequest) -> Self::Future {
        let client = self.clone();
        Box::pin(async move { client.dispatch(request).await })
    }
}
