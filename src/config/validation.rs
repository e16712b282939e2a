//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_http_url(field: String, raw: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        // Never echo the raw value: proxy URLs may carry credentials.
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {e}"))),
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.rpc.endpoints.is_empty() {
        errors.push(ValidationError::new("rpc.endpoints", "at least one endpoint is required"));
    }
    for (i, endpoint) in config.rpc.endpoints.iter().enumerate() {
        check_http_url(format!("rpc.endpoints[{i}]"), endpoint, &mut errors);
    }
    for (i, proxy) in config.rpc.proxies.iter().enumerate() {
        check_http_url(format!("rpc.proxies[{i}]"), proxy, &mut errors);
    }
    if config.rpc.request_timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.request_timeout_secs", "must be greater than 0"));
    }
    if config.rpc.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.connect_timeout_secs", "must be greater than 0"));
    }

    let retry = &config.retry;
    if !(0.0..=1.0).contains(&retry.jitter_factor) {
        errors.push(ValidationError::new("retry.jitter_factor", "must be within [0, 1]"));
    }
    if !(retry.backoff_multiplier >= 1.0) {
        errors.push(ValidationError::new("retry.backoff_multiplier", "must be at least 1"));
    }
    if retry.initial_delay_ms > retry.max_delay_ms {
        errors.push(ValidationError::new(
            "retry.initial_delay_ms",
            "must not exceed retry.max_delay_ms",
        ));
    }

    if config.transfer.gas_budget == 0 {
        errors.push(ValidationError::new("transfer.gas_budget", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
