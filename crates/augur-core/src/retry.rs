//! Retry and backoff for calls to the AI service.
//!
//! Every remote call goes through [`Retrier::run`], either directly or via
//! [`RetryLayer`] on a tower stack. Failures are classified from the
//! structured upstream error:
//!
//! | upstream status      | outcome                                             |
//! |----------------------|-----------------------------------------------------|
//! | `RESOURCE_EXHAUSTED` | retried; server hint or exponential delay           |
//! | `UNAVAILABLE`        | retried; exponential delay                          |
//! | transport failure    | not retried; surfaced as [`AugurError::ModelOverloaded`] |
//! | anything else        | not retried; returned unchanged                     |
//!
//! Once the attempt budget is spent a rate limit becomes
//! [`AugurError::QuotaExceeded`] and an overload becomes
//! [`AugurError::ModelOverloaded`].

use crate::error::{AugurError, ErrorStatus};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tower::{Layer, ServiceExt};
use tower_service::Service;

/// Bounds and delays applied by [`Retrier`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each later retry
    pub initial_delay_ms: u64,
    /// Added on top of a server-suggested delay
    pub hint_buffer_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            hint_buffer_ms: 500,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay_ms: u64::try_from(initial_delay.as_millis()).unwrap_or(u64::MAX),
            ..Self::default()
        }
    }

    pub fn with_hint_buffer(mut self, buffer: Duration) -> Self {
        self.hint_buffer_ms = u64::try_from(buffer.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// A policy that makes exactly one attempt
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn hint_buffer(&self) -> Duration {
        Duration::from_millis(self.hint_buffer_ms)
    }

    /// Delay before the retry that follows failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32, classification: &Classification) -> Duration {
        if let Classification::RateLimited {
            retry_hint: Some(hint),
        } = classification
        {
            return *hint + self.hint_buffer();
        }

        let exponent = attempt.saturating_sub(1).min(31);
        Duration::from_millis(self.initial_delay_ms.saturating_mul(1u64 << exponent))
    }

    pub fn validate(&self) -> Result<(), AugurError> {
        if self.max_attempts == 0 {
            return Err(AugurError::configuration(
                "retry max_attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

/// How a failed attempt should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// `RESOURCE_EXHAUSTED`, optionally with a server-suggested wait
    RateLimited { retry_hint: Option<Duration> },
    /// `UNAVAILABLE`
    Overloaded,
    /// The request never reached the service
    Transport,
    /// Anything the retry layer should not touch
    Fatal,
}

impl Classification {
    pub fn of(error: &AugurError) -> Self {
        match error {
            AugurError::Upstream(upstream) => match upstream.status_code() {
                Some(ErrorStatus::ResourceExhausted) => Self::RateLimited {
                    retry_hint: upstream.retry_delay_hint(),
                },
                Some(ErrorStatus::Unavailable) => Self::Overloaded,
                _ => Self::Fatal,
            },
            AugurError::Network { .. } => Self::Transport,
            _ => Self::Fatal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Overloaded)
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "Rate limit exceeded",
            Self::Overloaded => "Model overloaded",
            Self::Transport => "Service unreachable",
            Self::Fatal => "Request failed",
        }
    }

    /// Error surfaced once the attempt budget is spent
    fn exhausted(&self) -> AugurError {
        match self {
            Self::RateLimited { .. } => AugurError::QuotaExceeded,
            _ => AugurError::ModelOverloaded,
        }
    }
}

/// Classify a failure for retry purposes
pub fn classify(error: &AugurError) -> Classification {
    Classification::of(error)
}

/// Waits between attempts.
///
/// Abstracted so tests can observe the requested delays without sleeping.
#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs an operation under a [`RetryPolicy`]
#[derive(Debug, Clone)]
pub struct Retrier<S = TokioSleeper> {
    policy: RetryPolicy,
    sleeper: S,
}

impl Retrier<TokioSleeper> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: TokioSleeper,
        }
    }
}

impl Default for Retrier<TokioSleeper> {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl<S: Sleeper> Retrier<S> {
    pub fn with_sleeper(policy: RetryPolicy, sleeper: S) -> Self {
        Self { policy, sleeper }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Call `op` until it succeeds, fails fatally, or the attempt budget runs out.
    ///
    /// Each attempt is a fresh call to `op`; making that safe to repeat is the
    /// caller's job.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, AugurError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AugurError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempts = 0;

        loop {
            let error = match op().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            let classification = Classification::of(&error);
            match classification {
                Classification::Transport => {
                    log::warn!("Service unreachable, not retrying: {error}");
                    return Err(AugurError::ModelOverloaded);
                }
                Classification::Fatal => return Err(error),
                Classification::RateLimited { .. } | Classification::Overloaded => {}
            }

            attempts += 1;
            if attempts >= max_attempts {
                log::warn!(
                    "{} after {attempts} attempts, giving up: {error}",
                    classification.reason()
                );
                return Err(classification.exhausted());
            }

            let delay = self.policy.delay_for(attempts, &classification);
            log::info!(
                "{}. Retrying in {}ms... (Attempt {attempts}/{max_attempts})",
                classification.reason(),
                delay.as_millis()
            );
            self.sleeper.sleep(delay).await;
        }
    }
}

/// Run `op` under the default policy
pub async fn with_retry<T, F, Fut>(op: F) -> Result<T, AugurError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AugurError>>,
{
    Retrier::default().run(op).await
}

/// Tower layer applying a [`Retrier`] to every request of the wrapped service
#[derive(Debug, Clone)]
pub struct RetryLayer<S = TokioSleeper> {
    retrier: Retrier<S>,
}

impl RetryLayer<TokioSleeper> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            retrier: Retrier::new(policy),
        }
    }
}

impl<S: Sleeper> RetryLayer<S> {
    pub fn with_retrier(retrier: Retrier<S>) -> Self {
        Self { retrier }
    }
}

impl<Svc, S: Clone> Layer<Svc> for RetryLayer<S> {
    type Service = RetryService<Svc, S>;

    fn layer(&self, inner: Svc) -> Self::Service {
        RetryService {
            inner,
            retrier: self.retrier.clone(),
        }
    }
}

/// Service produced by [`RetryLayer`]
#[derive(Debug, Clone)]
pub struct RetryService<Svc, S = TokioSleeper> {
    inner: Svc,
    retrier: Retrier<S>,
}

impl<Svc, S> RetryService<Svc, S> {
    pub fn policy(&self) -> &RetryPolicy {
        &self.retrier.policy
    }
}

impl<Svc, S, Req> Service<Req> for RetryService<Svc, S>
where
    Svc: Service<Req, Error = AugurError> + Clone + Send + 'static,
    Svc::Response: Send + 'static,
    Svc::Future: Send + 'static,
    S: Sleeper + Clone + 'static,
    Req: Clone + Send + 'static,
{
    type Response = Svc::Response;
    type Error = AugurError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, AugurError>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Readiness is checked per attempt by `oneshot`
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Req) -> Self::Future {
        let inner = self.inner.clone();
        let retrier = self.retrier.clone();
        Box::pin(async move {
            retrier
                .run(move || inner.clone().oneshot(request.clone()))
                .await
        })
    }
}
