//! Exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

use crate::resilience::retries::RetryPolicy;

/// Calculate the delay before retry number `attempt + 1`.
///
/// `attempt` is zero-based: the delay after the first failed try uses
/// `attempt == 0`. The exponential base is capped at `max_delay` before
/// jitter is applied, so the result lies in
/// `[base * (1 - jitter), base * (1 + jitter)]`.
pub fn calculate_backoff(policy: &RetryPolicy, attempt: u32) -> Duration {
    let initial_ms = policy.initial_delay.as_millis() as f64;
    let max_ms = policy.max_delay.as_millis() as f64;

    let exponential = initial_ms * policy.backoff_multiplier.powi(attempt.min(i32::MAX as u32) as i32);
    let capped = if exponential.is_finite() {
        exponential.min(max_ms)
    } else {
        max_ms
    };

    let jitter = policy.jitter_factor.clamp(0.0, 1.0);
    let factor = if jitter > 0.0 {
        rand::thread_rng().gen_range((1.0 - jitter)..=(1.0 + jitter))
    } else {
        1.0
    };

    Duration::from_millis((capped * factor).floor() as u64)
}
