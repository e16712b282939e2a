//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rpc_requests_total` (counter): outbound JSON-RPC calls by method, outcome
//! - `rpc_request_duration_seconds` (histogram): call latency by method
//! - `rpc_retries_total` (counter): backoff retries by operation
//! - `rpc_endpoint_health` (gauge): 1=active, 0=inactive per endpoint
//! - `transfers_total` (counter): multi-send outcomes
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Instant;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_rpc_request(method: &str, outcome: &'static str, start: Instant) {
    metrics::counter!("rpc_requests_total", "method" => method.to_string(), "outcome" => outcome)
        .increment(1);
    metrics::histogram!("rpc_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_retry(operation: &str) {
    metrics::counter!("rpc_retries_total", "operation" => operation.to_string()).increment(1);
}

pub fn record_endpoint_health(endpoint: &str, healthy: bool) {
    metrics::gauge!("rpc_endpoint_health", "endpoint" => endpoint.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_transfer(outcome: &'static str) {
    metrics::counter!("transfers_total", "outcome" => outcome).increment(1);
}
