//! Startup orchestration.
//!
//! # Responsibilities
//! - Install logging and, when enabled, the metrics exporter
//! - Build the provider pool from configuration
//! - Run the health gate before any other call
//!
//! # Design Decisions
//! - Fail fast: an inactive endpoint aborts startup
//! - Order: observability, pool, health gate

use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;

use crate::blockchain::error::{RpcError, RpcResult};
use crate::config::{ClientConfig, ObservabilityConfig};
use crate::load_balancer::pool::ProviderPool;
use crate::observability::{logging, metrics};
use crate::resilience::retries::RetryPolicy;

/// Install the tracing subscriber and the Prometheus exporter if configured.
pub fn init_observability(config: &ObservabilityConfig) {
    logging::init_logging(config);

    if config.metrics_enabled {
        match config.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }
}

/// Build the pool without probing it.
pub fn build_pool(config: &ClientConfig) -> RpcResult<ProviderPool> {
    let pool = ProviderPool::new(RetryPolicy::from(&config.retry));
    pool.init(&config.rpc)?;
    Ok(pool)
}

/// Build the pool and pass the all-or-nothing health gate.
pub async fn bootstrap(config: &ClientConfig, cancel: &CancellationToken) -> RpcResult<ProviderPool> {
    let pool = build_pool(config)?;
    match pool.check_health(cancel).await {
        Ok(report) => {
            tracing::info!(active = ?report.active, "Provider pool passed health gate");
            Ok(pool)
        }
        Err(RpcError::EndpointsUnavailable(report)) => {
            tracing::error!(inactive = ?report.inactive, "Startup aborted by health gate");
            Err(RpcError::EndpointsUnavailable(report))
        }
        Err(e) => Err(e),
    }
}
