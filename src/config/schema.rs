//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Public mainnet fullnode used when no endpoint is configured.
pub const DEFAULT_RPC_URL: &str = "https://fullnode.mainnet.sui.io:443";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Upstream endpoints and egress proxies.
    pub rpc: RpcConfig,

    /// Retry policy applied to every outbound call.
    pub retry: RetryConfig,

    /// Transfer execution settings.
    pub transfer: TransferConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Upstream RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Ordered list of JSON-RPC endpoint URLs. One client is built per entry.
    pub endpoints: Vec<String>,

    /// Ordered list of egress proxy URLs, rotated per outbound call.
    pub proxies: Vec<String>,

    /// Total request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![DEFAULT_RPC_URL.to_string()],
            proxies: Vec::new(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds.
    pub initial_delay_ms: u64,

    /// Upper bound for a single backoff delay in milliseconds.
    pub max_delay_ms: u64,

    /// Growth factor between consecutive delays.
    pub backoff_multiplier: f64,

    /// Relative jitter (0.1 = ±10%).
    pub jitter_factor: f64,

    /// HTTP status codes treated as transient.
    pub retryable_status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 1000,
            max_delay_ms: 15_000,
            backoff_multiplier: 1.5,
            jitter_factor: 0.1,
            retryable_status_codes: vec![429, 500, 502, 503, 504],
        }
    }
}

/// Transfer execution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Gas budget per transaction, in base units of the native coin.
    pub gas_budget: u64,

    /// Environment variable holding the default signer's hex secret key.
    pub signer_env: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            gas_budget: 10_000_000,
            signer_env: "SUI_DEFAULT_SIGNER_HEX".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable output.
    pub json_logs: bool,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9184".to_string(),
        }
    }
}
