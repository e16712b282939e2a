//! Active health checking.
//!
//! # Responsibilities
//! - Probe every endpoint concurrently with a liveness call
//! - Partition endpoints into active and inactive
//! - Publish per-endpoint health gauges

use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::blockchain::error::{RpcError, RpcResult};
use crate::health::state::HealthReport;
use crate::load_balancer::endpoint::Endpoint;
use crate::observability::metrics;
use crate::resilience::retries::RetryExecutor;

/// Probe every endpoint once (under the retry policy) and wait for all of them.
///
/// Returns the partition in endpoint order. Only cancellation fails the sweep
/// itself; any other probe error marks that endpoint inactive.
pub async fn probe_all(
    endpoints: &[Endpoint],
    retry: &RetryExecutor,
    cancel: &CancellationToken,
) -> RpcResult<HealthReport> {
    tracing::info!(endpoints = endpoints.len(), "Running RPC health check");

    let probes = endpoints.iter().map(|endpoint| async move {
        let client = endpoint.client.as_ref();
        let result = retry
            .execute("latest_checkpoint", cancel, move || client.latest_checkpoint())
            .await;
        (endpoint, result)
    });

    let mut report = HealthReport::default();
    for (endpoint, result) in join_all(probes).await {
        match result {
            Ok(checkpoint) => {
                tracing::debug!(endpoint = %endpoint.url, checkpoint, "Endpoint active");
                metrics::record_endpoint_health(&endpoint.url, true);
                report.active.push(endpoint.url.clone());
            }
            Err(RpcError::Cancelled) => return Err(RpcError::Cancelled),
            Err(e) => {
                tracing::warn!(endpoint = %endpoint.url, error = %e, "Endpoint inactive");
                metrics::record_endpoint_health(&endpoint.url, false);
                report.inactive.push(endpoint.url.clone());
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::error::FailureClass;
    use crate::blockchain::mock::MockLedger;
    use crate::load_balancer::pool::tests::fast_policy;
    use std::sync::Arc;

    fn endpoint(ledger: MockLedger) -> Endpoint {
        Endpoint::new(Arc::new(ledger))
    }

    #[tokio::test]
    async fn test_one_failing_endpoint_of_many() {
        let endpoints: Vec<Endpoint> = (0..5)
            .map(|i| {
                let builder = MockLedger::builder().endpoint(&format!("mock://{i}"));
                if i == 3 {
                    endpoint(builder.unreachable().build())
                } else {
                    endpoint(builder.build())
                }
            })
            .collect();
        let retry = RetryExecutor::new(fast_policy());
        let cancel = CancellationToken::new();

        let report = probe_all(&endpoints, &retry, &cancel).await.unwrap();
        assert_eq!(report.active.len(), 4);
        assert_eq!(report.inactive, vec!["mock://3"]);
    }

    #[tokio::test]
    async fn test_fatal_probe_error_is_inactive_without_retry() {
        let ledger = Arc::new(
            MockLedger::builder()
                .fail_next(FailureClass::Rpc { code: -32601 }, 1)
                .build(),
        );
        let endpoints = vec![Endpoint::new(ledger.clone())];
        let retry = RetryExecutor::new(fast_policy());
        let cancel = CancellationToken::new();

        let report = probe_all(&endpoints, &retry, &cancel).await.unwrap();
        assert_eq!(report.inactive.len(), 1);
        assert_eq!(ledger.calls("latest_checkpoint"), 1);
    }
}
