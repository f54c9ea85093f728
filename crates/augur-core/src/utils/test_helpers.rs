//! Test utilities for driving the retry layer and service functions
//!
//! [`RecordingSleeper`] captures the delays the retry layer asks for instead
//! of waiting them out, [`ScriptedOp`] fails with a queued list of errors
//! before succeeding, and [`RecordingTransport`] stands in for the proxy.
//! [`capture_logs`] collects `log` records emitted on the calling thread.

use crate::error::{AugurError, UpstreamError};
use crate::proxy::{ProxyRequest, ProxyResponse};
use crate::retry::Sleeper;
use serde_json::json;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower_service::Service;

/// Sleeper that records requested delays and returns immediately
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Operation that fails with each queued error in turn, then succeeds with
/// the number of calls made so far
#[derive(Debug, Clone)]
pub struct ScriptedOp {
    failures: Arc<Mutex<VecDeque<AugurError>>>,
    calls: Arc<Mutex<u32>>,
}

impl ScriptedOp {
    pub fn new(failures: Vec<AugurError>) -> Self {
        Self {
            failures: Arc::new(Mutex::new(failures.into())),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }

    pub fn call(&self) -> impl Future<Output = Result<u32, AugurError>> + Send + 'static {
        let calls = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        let next = self.failures.lock().unwrap().pop_front();
        async move {
            match next {
                Some(error) => Err(error),
                None => Ok(calls),
            }
        }
    }
}

thread_local! {
    static CAPTURED: RefCell<Vec<(log::Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let message = record.args().to_string();
        CAPTURED.with(|captured| captured.borrow_mut().push((record.level(), message)));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// Handle on the records logged by the current thread since [`capture_logs`]
pub struct LogCapture;

impl LogCapture {
    pub fn records(&self) -> Vec<(log::Level, String)> {
        CAPTURED.with(|captured| captured.borrow().clone())
    }

    pub fn messages(&self, level: log::Level) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(record_level, _)| *record_level == level)
            .map(|(_, message)| message)
            .collect()
    }
}

/// Install the capturing logger (once per process) and clear this thread's
/// records. Use with a current-thread runtime so records stay on the test thread.
pub fn capture_logs() -> LogCapture {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Trace);
    CAPTURED.with(|captured| captured.borrow_mut().clear());
    LogCapture
}

/// `RESOURCE_EXHAUSTED` error, optionally carrying a `RetryInfo` delay like `"12s"`
pub fn rate_limited(retry_delay: Option<&str>) -> AugurError {
    let mut upstream =
        UpstreamError::new("RESOURCE_EXHAUSTED", "Resource has been exhausted").with_code(429);
    if let Some(delay) = retry_delay {
        upstream = upstream.with_detail(json!({
            "@type": "type.googleapis.com/google.rpc.RetryInfo",
            "retryDelay": delay
        }));
    }
    AugurError::Upstream(upstream)
}

/// `UNAVAILABLE` error
pub fn overloaded() -> AugurError {
    AugurError::Upstream(
        UpstreamError::new("UNAVAILABLE", "The model is overloaded").with_code(503),
    )
}

type Reply = Box<dyn Fn(&ProxyRequest) -> Result<ProxyResponse, AugurError> + Send + Sync>;

/// Proxy stand-in that records every request and answers through a closure
#[derive(Clone)]
pub struct RecordingTransport {
    requests: Arc<Mutex<Vec<ProxyRequest>>>,
    reply: Arc<Reply>,
}

impl RecordingTransport {
    pub fn new(
        reply: impl Fn(&ProxyRequest) -> Result<ProxyResponse, AugurError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            reply: Arc::new(Box::new(reply)),
        }
    }

    /// Transport answering every request with the same JSON body
    pub fn json(body: serde_json::Value) -> Self {
        Self::new(move |_| Ok(ProxyResponse::Json(body.clone())))
    }

    pub fn requests(&self) -> Vec<ProxyRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_params(&self) -> serde_json::Value {
        self.requests()
            .last()
            .map(|request| request.params.clone())
            .unwrap_or_default()
    }
}

impl Service<ProxyRequest> for RecordingTransport {
    type Response = ProxyResponse;
    type Error = AugurError;
    type Future = Pin<Box<dyn Future<Output = Result<ProxyResponse, AugurError>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: ProxyRequest) -> Self::Future {
        let reply = (self.reply)(&request);
        self.requests.lock().unwrap().push(request);
        Box::pin(async move { reply })
    }
}

/// Canned generateContent body with a single text candidate
pub fn text_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    #[tokio::test]
    async fn scripted_op_fails_then_counts() {
        let op = ScriptedOp::new(vec![overloaded()]);

        assert!(op.call().await.is_err());
        assert_eq!(op.call().await.unwrap(), 2);
        assert_eq!(op.calls(), 2);
    }

    #[tokio::test]
    async fn recording_transport_keeps_requests() {
        let transport = RecordingTransport::json(text_response("hi"));
        let request = ProxyRequest::new(
            crate::proxy::Operation::GenerateContent,
            json!({ "model": "m" }),
        )
        .unwrap();

        let response = transport.clone().oneshot(request).await.unwrap();

        assert!(matches!(response, ProxyResponse::Json(_)));
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(transport.last_params(), json!({ "model": "m" }));
    }
}
