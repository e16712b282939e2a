//! End-to-end multi-recipient transfer.
//!
//! # States
//! ```text
//! Building → CoinSelected → PlanAssembled → Submitted → Confirmed
//!                                                     → Failed(reason)
//!                                                     → RetryExhausted
//! ```
//! Every transition is logged with the request's correlation id. A failure
//! before submission also ends in `Failed`.

use std::fmt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::blockchain::error::{RpcError, RpcResult};
use crate::blockchain::types::{GasCostSummary, SuiAddress};
use crate::blockchain::wallet::TransactionSigner;
use crate::blockchain::TransactionExecutor;
use crate::load_balancer::pool::ProviderPool;
use crate::observability::metrics;
use crate::transfer::builder::{TransferBuilder, TransferPlan};
use crate::transfer::request::{TransferReceipt, TransferRequest};

/// Progress of one multi-send request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferState {
    Building,
    CoinSelected,
    PlanAssembled,
    Submitted,
    Confirmed,
    Failed(String),
    RetryExhausted,
}

impl TransferState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferState::Confirmed | TransferState::Failed(_) | TransferState::RetryExhausted
        )
    }

    fn outcome(&self) -> &'static str {
        match self {
            TransferState::Confirmed => "confirmed",
            TransferState::RetryExhausted => "retry_exhausted",
            _ => "failed",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferState::Building => f.write_str("building"),
            TransferState::CoinSelected => f.write_str("coin_selected"),
            TransferState::PlanAssembled => f.write_str("plan_assembled"),
            TransferState::Submitted => f.write_str("submitted"),
            TransferState::Confirmed => f.write_str("confirmed"),
            TransferState::Failed(_) => f.write_str("failed"),
            TransferState::RetryExhausted => f.write_str("retry_exhausted"),
        }
    }
}

/// Tracks and logs the state of one request.
struct Progress {
    request_id: Uuid,
    state: TransferState,
}

impl Progress {
    fn start() -> Self {
        let progress = Self {
            request_id: Uuid::new_v4(),
            state: TransferState::Building,
        };
        tracing::info!(request_id = %progress.request_id, state = %progress.state, "Transfer started");
        progress
    }

    fn advance(&mut self, next: TransferState) {
        tracing::info!(
            request_id = %self.request_id,
            from = %self.state,
            to = %next,
            "Transfer state changed"
        );
        self.state = next;
    }

    /// Move to the terminal state matching `err` and hand it back.
    fn fail(&mut self, err: RpcError) -> RpcError {
        let next = match &err {
            RpcError::RetryExhausted { .. } => TransferState::RetryExhausted,
            other => TransferState::Failed(other.to_string()),
        };
        tracing::error!(request_id = %self.request_id, state = %self.state, error = %err, "Transfer failed");
        self.advance(next);
        metrics::record_transfer(self.state.outcome());
        err
    }
}

/// Runs the select → build → submit pipeline.
#[derive(Debug, Clone, Copy)]
pub struct MultiSender<'a> {
    pool: &'a ProviderPool,
    gas_budget: u64,
}

impl<'a> MultiSender<'a> {
    pub fn new(pool: &'a ProviderPool, gas_budget: u64) -> Self {
        Self { pool, gas_budget }
    }

    /// Distribute `request` from `signer`'s address in one atomic transaction.
    pub async fn multi_send(
        &self,
        request: &TransferRequest,
        signer: &dyn TransactionSigner,
        cancel: &CancellationToken,
    ) -> RpcResult<TransferReceipt> {
        let mut progress = Progress::start();
        let sender = signer.address();

        let plan = match TransferBuilder::new(self.pool, self.gas_budget).build(&sender, request, cancel).await {
            Ok(plan) => plan,
            Err(e) => return Err(progress.fail(e)),
        };
        progress.advance(TransferState::CoinSelected);
        tracing::debug!(
            request_id = %progress.request_id,
            coins = plan.coins.len(),
            available = %plan.available,
            "Coins selected"
        );

        progress.advance(TransferState::PlanAssembled);
        tracing::debug!(
            request_id = %progress.request_id,
            recipients = request.recipients.len(),
            merges = plan.merge_count(),
            total = plan.total_amount,
            change = %plan.change(),
            "Plan assembled"
        );

        progress.advance(TransferState::Submitted);
        let executor = TransactionExecutor::new(self.pool, self.gas_budget);
        match executor.execute(&plan, signer, cancel).await {
            Ok(digest) => {
                progress.advance(TransferState::Confirmed);
                metrics::record_transfer(progress.state.outcome());
                Ok(TransferReceipt {
                    transaction_hash: digest.0,
                })
            }
            Err(e) => Err(progress.fail(e)),
        }
    }

    /// Build the plan for `request` and dry-run it without submitting.
    pub async fn preview(
        &self,
        request: &TransferRequest,
        sender: &SuiAddress,
        cancel: &CancellationToken,
    ) -> RpcResult<(TransferPlan, GasCostSummary)> {
        let plan = TransferBuilder::new(self.pool, self.gas_budget).build(sender, request, cancel).await?;
        let gas = TransactionExecutor::new(self.pool, self.gas_budget)
            .estimate_gas(&plan, cancel)
            .await?;
        Ok((plan, gas))
    }
}
