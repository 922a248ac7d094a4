//! Bounded retry with exponential backoff around any `CompletionService`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::llm_client::{ChatRequest, CompletionError, CompletionResult, CompletionService};

/// Abstracts waiting so backoff can be observed in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based): base, 2×base, 4×base, …, capped.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Retries rate-limit and other transient failures; authentication and
/// invalid-request failures are returned on the first attempt.
pub struct RetryingClient<S> {
    inner: S,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl<S: CompletionService> RetryingClient<S> {
    pub fn new(inner: S, policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            inner,
            policy,
            sleeper,
        }
    }
}

#[async_trait]
impl<S: CompletionService> CompletionService for RetryingClient<S> {
    async fn complete(&self, request: &ChatRequest) -> CompletionResult {
        let mut retry = 0;
        loop {
            let err = match self.inner.complete(request).await {
                Ok(text) => return Ok(text),
                Err(err) => err,
            };

            if !err.is_retryable() || retry >= self.policy.max_retries {
                return Err(err);
            }

            let mut delay = self.policy.backoff(retry);
            if let CompletionError::RateLimited {
                retry_after: Some(wait),
                ..
            } = &err
            {
                delay = delay.max((*wait).min(self.policy.max_delay));
            }

            warn!(
                "Completion attempt {} failed ({}: {}), retrying after {}ms...",
                retry + 1,
                err.tag(),
                err,
                delay.as_millis()
            );
            self.sleeper.sleep(delay).await;
            retry += 1;
        }
    }
}
