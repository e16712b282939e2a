//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (signer key, RPC URLs, proxies)
//!     → wallet.rs (key loading, signing)
//!     → client.rs (JSON-RPC over a per-call rotated transport)
//!     → transaction.rs (build once, sign once, execute with retries, dry-run)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables or explicit hex input
//! - Never log private keys or proxy credentials
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod error;
#[cfg(test)]
pub mod mock;
mod protocol;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::JsonRpcClient;
pub use error::{FailureClass, RpcError, RpcResult, TransportError};
pub use transaction::TransactionExecutor;
pub use types::{CoinObject, ObjectId, SuiAddress, TransactionDigest};
pub use wallet::{Ed25519Signer, TransactionSigner};

use async_trait::async_trait;

use crate::blockchain::types::{
    Balance, CoinMetadata, CoinPage, EventId, EventPage, ExecutionStatus, GasCostSummary,
    SubmitResponse,
};
use crate::transfer::TransferPlan;

/// The ledger capabilities this crate depends on.
///
/// Implementations own transport concerns (timeouts, proxies, decoding) and
/// report failures as [`RpcError::Transport`] with a fixed [`FailureClass`].
/// They never retry; retrying is the caller's decision.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Endpoint URL, for logs and health reports.
    fn endpoint(&self) -> &str;

    /// One page of coins of `coin_type` owned by `owner`.
    async fn get_coins(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
        cursor: Option<&str>,
    ) -> RpcResult<CoinPage>;

    /// Metadata (decimals, symbol) of a coin type.
    async fn get_coin_metadata(&self, coin_type: &str) -> RpcResult<CoinMetadata>;

    /// Liveness probe: latest checkpoint sequence number.
    async fn latest_checkpoint(&self) -> RpcResult<u64>;

    /// Have the node lower `plan` into transaction bytes (base64).
    ///
    /// Each call may return different bytes for the same plan, since the
    /// node resolves current coin versions.
    async fn build_transaction(&self, plan: &TransferPlan, gas_budget: u64) -> RpcResult<String>;

    /// Execute already signed bytes, requesting effects and events.
    ///
    /// Re-sending identical bytes and signature names the same digest, so the
    /// ledger applies the transaction at most once.
    async fn execute_transaction(&self, tx_bytes: &str, signature: &str) -> RpcResult<SubmitResponse>;

    /// Ledger-reported execution status of a submitted transaction.
    async fn get_execution_status(&self, digest: &TransactionDigest) -> RpcResult<ExecutionStatus>;

    /// Total balance of `coin_type` owned by `owner`.
    async fn get_balance(&self, owner: &SuiAddress, coin_type: &str) -> RpcResult<Balance>;

    /// Simulate built transaction bytes without submitting them.
    async fn dry_run(&self, tx_bytes: &str) -> RpcResult<(ExecutionStatus, GasCostSummary)>;

    /// Query events matching a JSON filter.
    async fn query_events(
        &self,
        filter: &serde_json::Value,
        cursor: Option<&EventId>,
        limit: usize,
        descending: bool,
    ) -> RpcResult<EventPage>;
}
