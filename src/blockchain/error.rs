//! Error definitions shared by every layer of the client.
//!
//! Transport failures carry a [`FailureClass`] fixed at the point where the
//! HTTP/JSON-RPC response is interpreted. Retry classification is an exact
//! match on that field.

use std::fmt;
use thiserror::Error;

use crate::health::state::HealthReport;

/// Category of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Connection could not be established or was dropped mid-request.
    Connect,
    /// Request exceeded its deadline.
    Timeout,
    /// Upstream answered with a non-success HTTP status.
    HttpStatus(u16),
    /// Upstream signalled rate limiting.
    RateLimited,
    /// JSON-RPC error object returned by the node.
    Rpc { code: i64 },
    /// Response body could not be decoded.
    Decode,
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureClass::Connect => f.write_str("connect"),
            FailureClass::Timeout => f.write_str("timeout"),
            FailureClass::HttpStatus(code) => write!(f, "http {code}"),
            FailureClass::RateLimited => f.write_str("rate limited"),
            FailureClass::Rpc { code } => write!(f, "rpc error {code}"),
            FailureClass::Decode => f.write_str("decode"),
        }
    }
}

/// A failed call to one upstream endpoint.
#[derive(Debug, Clone, Error)]
#[error("{class} from {endpoint}: {message}")]
pub struct TransportError {
    pub endpoint: String,
    pub class: FailureClass,
    pub message: String,
}

impl TransportError {
    pub fn new(endpoint: impl Into<String>, class: FailureClass, message: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            class,
            message: message.into(),
        }
    }
}

/// Errors surfaced by the client pool and the transfer pipeline.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Caller supplied a malformed request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Owned balance does not cover the requested total.
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u128, available: u128 },

    /// Pool used before initialization.
    #[error("Provider pool not initialized")]
    NotInitialized,

    /// Network-level failure talking to an endpoint.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Retryable failures persisted past the configured attempts.
    #[error("Retries exhausted after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<RpcError>,
    },

    /// Submission succeeded but the ledger rejected execution.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Startup health gate found inactive endpoints.
    #[error("Inactive RPC endpoints: {}", .0.inactive.join(", "))]
    EndpointsUnavailable(HealthReport),

    /// Caller aborted the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// Key loading or signing failed.
    #[error("Signing error: {0}")]
    Signing(String),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl RpcError {
    /// Transport failure class, if this is (or wraps) a transport error.
    pub fn failure_class(&self) -> Option<FailureClass> {
        match self {
            RpcError::Transport(e) => Some(e.class),
            RpcError::RetryExhausted { source, .. } => source.failure_class(),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type RpcResult<T> = Result<T, RpcError>;
