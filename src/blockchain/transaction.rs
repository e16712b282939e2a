//! Transaction submission and confirmation.
//!
//! # Responsibilities
//! - Verify a plan's conservation invariants before signing
//! - Build and sign exactly once per plan
//! - Execute the signed bytes through a random provider under the retry policy
//! - Resolve the execution status, looking it up when the node omitted effects
//! - Estimate gas with a dry run

use tokio_util::sync::CancellationToken;

use crate::blockchain::error::{RpcError, RpcResult};
use crate::blockchain::types::{ExecutionStatus, GasCostSummary, TransactionDigest};
use crate::blockchain::wallet::{sign_serialized, TransactionSigner};
use crate::load_balancer::pool::ProviderPool;
use crate::transfer::TransferPlan;

/// Submits transfer plans and waits for their ledger status.
#[derive(Debug, Clone, Copy)]
pub struct TransactionExecutor<'a> {
    pool: &'a ProviderPool,
    gas_budget: u64,
}

impl<'a> TransactionExecutor<'a> {
    pub fn new(pool: &'a ProviderPool, gas_budget: u64) -> Self {
        Self { pool, gas_budget }
    }

    /// Sign and submit `plan`, returning its digest once execution succeeded.
    ///
    /// The transaction is built and signed once. Only the execute call is
    /// retried, always with the same bytes and signature, so a retry after a
    /// lost response resolves to the same digest instead of a second transfer.
    pub async fn execute(
        &self,
        plan: &TransferPlan,
        signer: &dyn TransactionSigner,
        cancel: &CancellationToken,
    ) -> RpcResult<TransactionDigest> {
        plan.verify()?;
        if signer.address() != plan.sender {
            return Err(RpcError::Signing(format!(
                "signer {} does not own plan sender {}",
                signer.address(),
                plan.sender
            )));
        }

        let tx_bytes = self.build(plan, cancel).await?;
        let signature = sign_serialized(signer, &tx_bytes)?;

        let pool = self.pool;
        let (tx_bytes, signature) = (tx_bytes.as_str(), signature.as_str());
        let response = pool
            .retry()
            .execute("execute_transaction", cancel, move || async move {
                let provider = pool.random_provider()?;
                provider.execute_transaction(tx_bytes, signature).await
            })
            .await?;

        let digest = response.digest;
        tracing::info!(digest = %digest, "Transaction submitted");

        let status = match response.status {
            Some(status) => status,
            None => {
                let digest = &digest;
                pool.retry()
                    .execute("get_execution_status", cancel, move || async move {
                        let provider = pool.random_provider()?;
                        provider.get_execution_status(digest).await
                    })
                    .await?
            }
        };

        match status {
            ExecutionStatus::Success => {
                if let Some(gas) = response.gas_used {
                    let fee = gas.fee_info();
                    tracing::info!(
                        digest = %digest,
                        total_gas_fee = %fee.total_gas_fee,
                        net_gas_fee = %fee.net_gas_fee,
                        "Transaction executed"
                    );
                }
                Ok(digest)
            }
            ExecutionStatus::Failure { error } => {
                tracing::error!(digest = %digest, error = %error, "Transaction execution failed");
                Err(RpcError::TransactionFailed(format!("{digest}: {error}")))
            }
        }
    }

    /// Dry-run `plan` and return the gas it would consume.
    pub async fn estimate_gas(
        &self,
        plan: &TransferPlan,
        cancel: &CancellationToken,
    ) -> RpcResult<GasCostSummary> {
        plan.verify()?;

        let tx_bytes = self.build(plan, cancel).await?;
        let pool = self.pool;
        let tx_bytes = tx_bytes.as_str();
        let (status, gas) = pool
            .retry()
            .execute("dry_run", cancel, move || async move {
                let provider = pool.random_provider()?;
                provider.dry_run(tx_bytes).await
            })
            .await?;

        match status {
            ExecutionStatus::Success => Ok(gas),
            ExecutionStatus::Failure { error } => Err(RpcError::TransactionFailed(format!(
                "dry run failed: {error}"
            ))),
        }
    }

    /// Node-built transaction bytes for `plan`.
    async fn build(&self, plan: &TransferPlan, cancel: &CancellationToken) -> RpcResult<String> {
        let pool = self.pool;
        let gas_budget = self.gas_budget;
        pool.retry()
            .execute("build_transaction", cancel, move || async move {
                let provider = pool.random_provider()?;
                provider.build_transaction(plan, gas_budget).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::error::FailureClass;
    use crate::blockchain::mock::{coin, MockLedger};
    use crate::blockchain::types::SUI_COIN_TYPE;
    use crate::blockchain::wallet::Ed25519Signer;
    use crate::load_balancer::pool::tests::pool_with;
    use crate::transfer::builder::assemble_plan;
    use crate::transfer::request::{Recipient, TransferRequest};
    use crate::transfer::selector::CoinSelection;

    const KEY: &str = "6d9b74ed12f7c14e3576caa51a939c503820d2721076f70664cac914100f513b";
    const GAS_BUDGET: u64 = 10_000_000;

    fn signer() -> Ed25519Signer {
        Ed25519Signer::from_private_key(KEY).unwrap()
    }

    fn plan_for(signer: &Ed25519Signer) -> TransferPlan {
        let request = TransferRequest::new(
            SUI_COIN_TYPE,
            vec![Recipient { address: "0xa".parse().unwrap(), amount: 100 }],
        );
        let selection = CoinSelection {
            coins: vec![coin(SUI_COIN_TYPE, 1_000_000_000, 1)],
            total: 1_000_000_000,
        };
        assemble_plan(signer.address(), &request, selection, GAS_BUDGET).unwrap()
    }

    #[tokio::test]
    async fn test_execute_success() {
        let (pool, ledger) = pool_with(MockLedger::builder().build());
        let signer = signer();
        let plan = plan_for(&signer);
        let cancel = CancellationToken::new();

        let digest = TransactionExecutor::new(&pool, GAS_BUDGET)
            .execute(&plan, &signer, &cancel)
            .await
            .unwrap();

        assert_eq!(digest.0, "mock-digest-1");
        assert_eq!(ledger.built_plans(), vec![plan]);
        assert_eq!(ledger.executions().len(), 1);
        assert_eq!(ledger.calls("get_execution_status"), 0);
    }

    #[tokio::test]
    async fn test_missing_effects_looks_up_status() {
        let ledger = MockLedger::builder().submit_status(None).build();
        let (pool, ledger) = pool_with(ledger);
        let signer = signer();
        let cancel = CancellationToken::new();

        TransactionExecutor::new(&pool, GAS_BUDGET)
            .execute(&plan_for(&signer), &signer, &cancel)
            .await
            .unwrap();
        assert_eq!(ledger.calls("get_execution_status"), 1);
    }

    #[tokio::test]
    async fn test_failed_status_is_transaction_failed() {
        let ledger = MockLedger::builder()
            .submit_status(Some(ExecutionStatus::Failure { error: "InsufficientGas".into() }))
            .build();
        let (pool, _) = pool_with(ledger);
        let signer = signer();
        let cancel = CancellationToken::new();

        let err = TransactionExecutor::new(&pool, GAS_BUDGET)
            .execute(&plan_for(&signer), &signer, &cancel)
            .await
            .unwrap_err();
        match err {
            RpcError::TransactionFailed(msg) => assert!(msg.contains("InsufficientGas")),
            other => panic!("expected TransactionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_build_is_retried_on_transient_failure() {
        let ledger = MockLedger::builder()
            .fail_next(FailureClass::HttpStatus(503), 2)
            .build();
        let (pool, ledger) = pool_with(ledger);
        let signer = signer();
        let cancel = CancellationToken::new();

        TransactionExecutor::new(&pool, GAS_BUDGET)
            .execute(&plan_for(&signer), &signer, &cancel)
            .await
            .unwrap();
        assert_eq!(ledger.calls("build_transaction"), 3);
        assert_eq!(ledger.built_plans().len(), 1);
        assert_eq!(ledger.calls("execute_transaction"), 1);
    }

    #[tokio::test]
    async fn test_retried_execute_resends_identical_signed_bytes() {
        let ledger = MockLedger::builder()
            .fail_on("execute_transaction", FailureClass::HttpStatus(502), 2)
            .build();
        let (pool, ledger) = pool_with(ledger);
        let signer = signer();
        let cancel = CancellationToken::new();

        let digest = TransactionExecutor::new(&pool, GAS_BUDGET)
            .execute(&plan_for(&signer), &signer, &cancel)
            .await
            .unwrap();

        assert_eq!(ledger.calls("build_transaction"), 1);
        assert_eq!(ledger.calls("execute_transaction"), 3);
        assert_eq!(digest.0, "mock-digest-1");

        let executions = ledger.executions();
        assert_eq!(executions.len(), 3);
        assert!(executions.iter().all(|attempt| *attempt == executions[0]));
        assert_eq!(executions[0].1, sign_serialized(&signer, &executions[0].0).unwrap());
    }

    #[tokio::test]
    async fn test_lost_response_is_not_rebuilt() {
        let ledger = MockLedger::builder()
            .submit_status(None)
            .fail_on("get_execution_status", FailureClass::Timeout, 1)
            .build();
        let (pool, ledger) = pool_with(ledger);
        let signer = signer();
        let cancel = CancellationToken::new();

        TransactionExecutor::new(&pool, GAS_BUDGET)
            .execute(&plan_for(&signer), &signer, &cancel)
            .await
            .unwrap();
        assert_eq!(ledger.calls("build_transaction"), 1);
        assert_eq!(ledger.calls("execute_transaction"), 1);
        assert_eq!(ledger.calls("get_execution_status"), 2);
    }

    #[tokio::test]
    async fn test_foreign_signer_makes_no_network_call() {
        let (pool, ledger) = pool_with(MockLedger::builder().build());
        let signer = signer();
        let mut plan = plan_for(&signer);
        plan.sender = "0xdead".parse().unwrap();
        let cancel = CancellationToken::new();

        let err = TransactionExecutor::new(&pool, GAS_BUDGET)
            .execute(&plan, &signer, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Signing(_)));
        assert_eq!(ledger.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_estimate_gas() {
        let gas = GasCostSummary {
            computation_cost: 1_000,
            storage_cost: 2_000,
            storage_rebate: 500,
        };
        let ledger = MockLedger::builder().dry_run(ExecutionStatus::Success, gas).build();
        let (pool, ledger) = pool_with(ledger);
        let signer = signer();
        let cancel = CancellationToken::new();

        let estimate = TransactionExecutor::new(&pool, GAS_BUDGET)
            .estimate_gas(&plan_for(&signer), &cancel)
            .await
            .unwrap();
        assert_eq!(estimate.fee_info().net_gas_fee, 2_500);
        assert_eq!(ledger.calls("build_transaction"), 1);
        assert_eq!(ledger.calls("execute_transaction"), 0);
    }

    #[tokio::test]
    async fn test_estimate_gas_failure() {
        let ledger = MockLedger::builder()
            .dry_run(
                ExecutionStatus::Failure { error: "MoveAbort".into() },
                GasCostSummary::default(),
            )
            .build();
        let (pool, _) = pool_with(ledger);
        let signer = signer();
        let cancel = CancellationToken::new();

        let err = TransactionExecutor::new(&pool, GAS_BUDGET)
            .estimate_gas(&plan_for(&signer), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::TransactionFailed(_)));
    }
}
