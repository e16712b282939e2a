//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call:
//!     → timeouts.rs (race the call against the caller's cancellation token)
//!     → On failure: retries.rs (classify, retry if transient)
//!     → backoff.rs (exponential delay with jitter, capped)
//!     → Last retryable failure wrapped in RetryExhausted
//! ```
//!
//! # Design Decisions
//! - Per-request timeouts live in the HTTP transport; cancellation lives here
//! - Classification is structural, never based on error text
//! - No circuit breaker: a failing endpoint is handled by the startup health gate

pub mod backoff;
pub mod retries;
pub mod timeouts;
