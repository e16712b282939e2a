//! Provider pool management.
//!
//! # Responsibilities
//! - Build one client per configured endpoint, exactly once per process
//! - Pick a uniformly random provider for read calls
//! - Gate usage on the most recent liveness check
//! - Run pool-level reads (decimals, balance, events) under the retry policy

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::blockchain::error::{RpcError, RpcResult};
use crate::blockchain::types::{
    is_native_coin, Balance, EventId, EventPage, SuiAddress, SUI_DECIMALS,
};
use crate::blockchain::{JsonRpcClient, LedgerRpc};
use crate::config::RpcConfig;
use crate::health::{active, HealthReport, HealthState};
use crate::load_balancer::endpoint::Endpoint;
use crate::load_balancer::proxy::{ProxyRotator, TransportTimeouts};
use crate::resilience::retries::{RetryExecutor, RetryPolicy};

/// The set of endpoint clients shared by every operation in the process.
#[derive(Debug)]
pub struct ProviderPool {
    endpoints: OnceLock<Vec<Endpoint>>,
    retry: RetryExecutor,
    /// [`HealthState`] of the last liveness sweep.
    state: AtomicU8,
    last_report: RwLock<HealthReport>,
}

impl ProviderPool {
    /// Create an empty pool. Nothing is usable until [`ProviderPool::init`].
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            endpoints: OnceLock::new(),
            retry: RetryExecutor::new(policy),
            state: AtomicU8::new(HealthState::Unknown as u8),
            last_report: RwLock::new(HealthReport::default()),
        }
    }

    /// Build one JSON-RPC client per endpoint URL, all sharing one proxy rotator.
    ///
    /// A second call after a successful one is a logged no-op.
    pub fn init(&self, config: &RpcConfig) -> RpcResult<()> {
        if self.is_initialized() {
            tracing::warn!("Provider pool already initialized, ignoring re-init");
            return Ok(());
        }

        let timeouts = TransportTimeouts {
            request: Duration::from_secs(config.request_timeout_secs),
            connect: Duration::from_secs(config.connect_timeout_secs),
        };
        let rotator = Arc::new(ProxyRotator::new(&config.proxies, timeouts)?);

        let endpoints = config
            .endpoints
            .iter()
            .map(|url| Endpoint::new(Arc::new(JsonRpcClient::new(url.as_str(), rotator.clone()))))
            .collect();

        tracing::info!(
            endpoints = config.endpoints.len(),
            proxies = config.proxies.len(),
            "Initializing provider pool"
        );
        self.init_with(endpoints)
    }

    /// Install pre-built endpoints. Same once-only semantics as [`ProviderPool::init`].
    pub fn init_with(&self, endpoints: Vec<Endpoint>) -> RpcResult<()> {
        if endpoints.is_empty() {
            return Err(RpcError::Config("at least one RPC endpoint is required".into()));
        }
        let urls: Vec<String> = endpoints.iter().map(|e| e.url.clone()).collect();
        match self.endpoints.set(endpoints) {
            Ok(()) => tracing::info!(endpoints = ?urls, "Provider pool ready"),
            Err(_) => tracing::warn!("Provider pool already initialized, ignoring re-init"),
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.endpoints.get().is_some()
    }

    /// Configured endpoints in order.
    pub fn endpoints(&self) -> RpcResult<&[Endpoint]> {
        self.endpoints
            .get()
            .map(Vec::as_slice)
            .ok_or(RpcError::NotInitialized)
    }

    pub fn retry(&self) -> &RetryExecutor {
        &self.retry
    }

    pub fn health_state(&self) -> HealthState {
        HealthState::from(self.state.load(Ordering::Acquire))
    }

    /// Report of the most recent liveness sweep.
    pub fn last_report(&self) -> HealthReport {
        self.last_report
            .read()
            .map(|report| report.clone())
            .unwrap_or_default()
    }

    /// A uniformly random client.
    ///
    /// Fails with `NotInitialized` before init and with `EndpointsUnavailable`
    /// while the last liveness sweep has inactive endpoints.
    pub fn random_provider(&self) -> RpcResult<Arc<dyn LedgerRpc>> {
        let endpoints = self.endpoints()?;
        if self.health_state() == HealthState::Unhealthy {
            return Err(RpcError::EndpointsUnavailable(self.last_report()));
        }
        let endpoint = &endpoints[fastrand::usize(..endpoints.len())];
        tracing::trace!(endpoint = %endpoint.url, "Selected provider");
        Ok(endpoint.client.clone())
    }

    /// Probe every endpoint concurrently and gate the pool on the result.
    ///
    /// Any inactive endpoint fails the whole check.
    pub async fn check_health(&self, cancel: &CancellationToken) -> RpcResult<HealthReport> {
        let endpoints = self.endpoints()?;
        let report = active::probe_all(endpoints, &self.retry, cancel).await?;

        let state = report.state();
        self.state.store(state as u8, Ordering::Release);
        if let Ok(mut last) = self.last_report.write() {
            *last = report.clone();
        }

        if state == HealthState::Unhealthy {
            tracing::error!(
                active = ?report.active,
                inactive = ?report.inactive,
                "Health check failed"
            );
            return Err(RpcError::EndpointsUnavailable(report));
        }
        tracing::info!(active = report.active.len(), "All RPC endpoints healthy");
        Ok(report)
    }

    /// Decimals of `coin_type`. The native coin needs no network call.
    pub async fn coin_decimals(&self, coin_type: &str, cancel: &CancellationToken) -> RpcResult<u8> {
        if is_native_coin(coin_type) {
            return Ok(SUI_DECIMALS);
        }
        let provider = self.random_provider()?;
        let provider = provider.as_ref();
        let metadata = self
            .retry
            .execute("get_coin_metadata", cancel, move || provider.get_coin_metadata(coin_type))
            .await?;
        Ok(metadata.decimals)
    }

    /// Total balance of `coin_type` owned by `owner`.
    pub async fn balance(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
        cancel: &CancellationToken,
    ) -> RpcResult<Balance> {
        let provider = self.random_provider()?;
        let provider = provider.as_ref();
        self.retry
            .execute("get_balance", cancel, move || provider.get_balance(owner, coin_type))
            .await
    }

    /// One page of events matching `filter`.
    pub async fn query_events(
        &self,
        filter: &serde_json::Value,
        cursor: Option<&EventId>,
        limit: usize,
        descending: bool,
        cancel: &CancellationToken,
    ) -> RpcResult<EventPage> {
        let provider = self.random_provider()?;
        let provider = provider.as_ref();
        self.retry
            .execute("query_events", cancel, move || {
                provider.query_events(filter, cursor, limit, descending)
            })
            .await
    }
}
