//! Retry logic.
//!
//! # Responsibilities
//! - Classify failures as retryable or fatal
//! - Execute retries with exponential backoff + jitter
//! - Stop early when the caller cancels
//!
//! # Design Decisions
//! - Classification is an exact match on [`FailureClass`], never on message text
//! - Connection errors, timeouts and rate limiting are always retryable
//! - HTTP statuses are retryable only if listed in the policy
//! - The executor does not deduplicate; operations must tolerate re-invocation

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::blockchain::error::{FailureClass, RpcError, RpcResult};
use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::timeouts::{run_cancellable, sleep_cancellable};

/// Retry parameters. Plain data; each executor owns its copy.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first try; total attempts is `max_retries + 1`.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Delay is scaled by a uniform factor in `[1 - jitter, 1 + jitter]`.
    pub jitter_factor: f64,
    pub retryable_status_codes: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(15_000),
            backoff_multiplier: 1.5,
            jitter_factor: 0.1,
            retryable_status_codes: vec![429, 500, 502, 503, 504],
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff_multiplier: config.backoff_multiplier,
            jitter_factor: config.jitter_factor,
            retryable_status_codes: config.retryable_status_codes.clone(),
        }
    }
}

impl RetryPolicy {
    /// Decide whether `err` may be retried under this policy.
    pub fn is_retryable(&self, err: &RpcError) -> bool {
        match err {
            RpcError::Transport(e) => match e.class {
                FailureClass::Connect | FailureClass::Timeout | FailureClass::RateLimited => true,
                FailureClass::HttpStatus(code) => self.retryable_status_codes.contains(&code),
                FailureClass::Rpc { .. } | FailureClass::Decode => false,
            },
            _ => false,
        }
    }
}

/// Runs fallible async operations under a [`RetryPolicy`].
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invoke `op` until it succeeds, fails fatally, or attempts run out.
    ///
    /// Fatal errors are returned unchanged after a single invocation. When
    /// every attempt failed with a retryable error the last one is wrapped in
    /// [`RpcError::RetryExhausted`]. Backoff sleeps suspend only this task.
    pub async fn execute<T, F, Fut>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        mut op: F,
    ) -> RpcResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RpcResult<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match run_cancellable(cancel, op()).await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::debug!(operation, attempts = attempt + 1, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if !self.policy.is_retryable(&err) => {
                    if !matches!(err, RpcError::Cancelled) {
                        tracing::error!(operation, attempt, error = %err, "Non-retryable error");
                    }
                    return Err(err);
                }
                Err(err) if attempt >= self.policy.max_retries => {
                    tracing::error!(
                        operation,
                        max_retries = self.policy.max_retries,
                        error = %err,
                        "Maximum retries exceeded"
                    );
                    return Err(RpcError::RetryExhausted {
                        attempts: attempt + 1,
                        source: Box::new(err),
                    });
                }
                Err(err) => {
                    let delay = calculate_backoff(&self.policy, attempt);
                    tracing::warn!(
                        operation,
                        attempt = attempt + 1,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Request failed, retrying"
                    );
                    metrics::record_retry(operation);
                    sleep_cancellable(cancel, delay).await?;
                    attempt += 1;
                }
            }
        }
    }
}
