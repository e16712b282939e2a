//! Sui JSON-RPC client pool and atomic multi-recipient transfers.

pub mod blockchain;
pub mod config;
pub mod health;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod resilience;
pub mod transfer;

pub use blockchain::{
    Ed25519Signer, JsonRpcClient, LedgerRpc, RpcError, RpcResult, SuiAddress, TransactionExecutor,
    TransactionSigner,
};
pub use config::ClientConfig;
pub use lifecycle::Shutdown;
pub use load_balancer::ProviderPool;
pub use resilience::retries::{RetryExecutor, RetryPolicy};
pub use transfer::{MultiSender, TransferReceipt, TransferRequest};
