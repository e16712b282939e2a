//! Transfer plan assembly.
//!
//! # Plan shape
//! ```text
//! native coin:   SplitCoins(GasCoin, [a1..an])            → TransferObjects × n
//! other coins:   MergeCoins(primary ← c2) … (primary ← ck)
//!                SplitCoins(primary, [a1..an])            → TransferObjects × n
//! ```
//! The split amounts sum to exactly the requested total. Whatever the
//! selected coins hold beyond that stays on the gas coin / primary coin as
//! sender-owned change. Native coins also pay gas, so their selection must
//! cover the total plus the gas budget.

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::blockchain::error::{RpcError, RpcResult};
use crate::blockchain::types::{is_native_coin, CoinObject, GasCostSummary, ObjectId, SuiAddress};
use crate::load_balancer::pool::ProviderPool;
use crate::transfer::request::TransferRequest;
use crate::transfer::selector::{CoinSelection, CoinSelector};

/// Where a split draws its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoinSource {
    /// The transaction's fee-paying coin.
    GasCoin,
    Object(ObjectId),
}

/// One step of an atomic transfer plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PlanCommand {
    /// Fold `source` into `destination`.
    MergeCoins { destination: ObjectId, source: ObjectId },
    /// Produce one new coin per amount.
    SplitCoins { source: CoinSource, amounts: Vec<u64> },
    /// Send split output `split_index` to `recipient`.
    TransferObjects { split_index: usize, recipient: SuiAddress },
}

/// An atomic multi-recipient transfer, owned by exactly one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferPlan {
    pub sender: SuiAddress,
    pub coin_type: String,
    /// Coins consumed by the plan; for the native coin these pay gas.
    pub coins: Vec<CoinObject>,
    pub commands: Vec<PlanCommand>,
    /// Sum of split outputs.
    pub total_amount: u64,
    /// Combined balance of `coins`.
    pub available: u128,
    /// Gas budget the coins must also cover; zero unless native.
    pub gas_reserve: u64,
}

impl TransferPlan {
    pub fn is_native(&self) -> bool {
        is_native_coin(&self.coin_type)
    }

    /// Amounts of the split outputs, in recipient order.
    pub fn split_amounts(&self) -> &[u64] {
        self.commands
            .iter()
            .find_map(|cmd| match cmd {
                PlanCommand::SplitCoins { amounts, .. } => Some(amounts.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// `(recipient, amount)` per transfer instruction, in input order.
    pub fn transfers(&self) -> impl Iterator<Item = (SuiAddress, u64)> + '_ {
        let amounts = self.split_amounts();
        self.commands.iter().filter_map(move |cmd| match cmd {
            PlanCommand::TransferObjects { split_index, recipient } => {
                amounts.get(*split_index).map(|amount| (*recipient, *amount))
            }
            _ => None,
        })
    }

    pub fn merge_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, PlanCommand::MergeCoins { .. }))
            .count()
    }

    /// Total the selected coins must hold: transfers plus any gas reserve.
    pub fn required(&self) -> u128 {
        self.total_amount as u128 + self.gas_reserve as u128
    }

    /// Balance left on the selected coins after the transfers, before gas.
    ///
    /// For native plans the same coins also pay the fee; see
    /// [`TransferPlan::change_after_gas`].
    pub fn change(&self) -> u128 {
        self.available.saturating_sub(self.total_amount as u128)
    }

    /// Change once `gas` is charged. Non-native plans pay gas elsewhere.
    pub fn change_after_gas(&self, gas: &GasCostSummary) -> u128 {
        if !self.is_native() {
            return self.change();
        }
        let change = i128::try_from(self.change()).unwrap_or(i128::MAX);
        change.saturating_sub(gas.fee_info().net_gas_fee).max(0) as u128
    }

    /// Check the conservation invariants before anything is signed.
    pub fn verify(&self) -> RpcResult<()> {
        let split_sum: u128 = self.split_amounts().iter().map(|a| *a as u128).sum();
        if split_sum != self.total_amount as u128 {
            return Err(RpcError::Unknown(format!(
                "plan splits {split_sum} but requests {}",
                self.total_amount
            )));
        }
        let transfer_count = self.transfers().count();
        if transfer_count != self.split_amounts().len() {
            return Err(RpcError::Unknown(format!(
                "plan has {} outputs but {transfer_count} transfers",
                self.split_amounts().len()
            )));
        }
        if self.available < self.required() {
            return Err(RpcError::InsufficientBalance {
                requested: self.required(),
                available: self.available,
            });
        }
        Ok(())
    }
}

/// Gas the transfer coins themselves must cover for `coin_type`.
fn gas_reserve(coin_type: &str, gas_budget: u64) -> u64 {
    if is_native_coin(coin_type) {
        gas_budget
    } else {
        0
    }
}

/// Assemble a plan from an already-selected set of coins. Pure.
pub fn assemble_plan(
    sender: SuiAddress,
    request: &TransferRequest,
    selection: CoinSelection,
    gas_budget: u64,
) -> RpcResult<TransferPlan> {
    let total = request.validate()?;
    let gas_reserve = gas_reserve(&request.coin_type, gas_budget);
    let requested = total as u128 + gas_reserve as u128;

    let coins: Vec<CoinObject> = selection
        .coins
        .into_iter()
        .filter(|coin| {
            coin.coin_type == request.coin_type
                || (is_native_coin(&request.coin_type) && is_native_coin(&coin.coin_type))
        })
        .collect();
    let available: u128 = coins.iter().map(|c| c.balance as u128).sum();
    if coins.is_empty() || available < requested {
        return Err(RpcError::InsufficientBalance { requested, available });
    }

    let amounts: Vec<u64> = request.recipients.iter().map(|r| r.amount).collect();
    let mut commands = Vec::with_capacity(coins.len() + request.recipients.len());

    if is_native_coin(&request.coin_type) {
        commands.push(PlanCommand::SplitCoins {
            source: CoinSource::GasCoin,
            amounts,
        });
    } else {
        let primary = coins[0].object_id;
        commands.extend(coins[1..].iter().map(|coin| PlanCommand::MergeCoins {
            destination: primary,
            source: coin.object_id,
        }));
        commands.push(PlanCommand::SplitCoins {
            source: CoinSource::Object(primary),
            amounts,
        });
    }

    commands.extend(
        request
            .recipients
            .iter()
            .enumerate()
            .map(|(split_index, r)| PlanCommand::TransferObjects {
                split_index,
                recipient: r.address,
            }),
    );

    let plan = TransferPlan {
        sender,
        coin_type: request.coin_type.clone(),
        coins,
        commands,
        total_amount: total,
        available,
        gas_reserve,
    };
    plan.verify()?;
    Ok(plan)
}

/// Builds transfer plans against live coin listings.
#[derive(Debug, Clone, Copy)]
pub struct TransferBuilder<'a> {
    selector: CoinSelector<'a>,
    gas_budget: u64,
}

impl<'a> TransferBuilder<'a> {
    pub fn new(pool: &'a ProviderPool, gas_budget: u64) -> Self {
        Self {
            selector: CoinSelector::new(pool),
            gas_budget,
        }
    }

    /// Validate `request`, select `sender`'s coins and assemble the plan.
    ///
    /// Invalid requests fail before any network call. Native selections
    /// stop only once they also cover the gas budget.
    pub async fn build(
        &self,
        sender: &SuiAddress,
        request: &TransferRequest,
        cancel: &CancellationToken,
    ) -> RpcResult<TransferPlan> {
        let total = request.validate()?;
        let required = total as u128 + gas_reserve(&request.coin_type, self.gas_budget) as u128;

        let selection = self
            .selector
            .owned_coins(sender, &request.coin_type, Some(required), cancel)
            .await?;
        if !selection.covers(required) {
            return Err(RpcError::InsufficientBalance {
                requested: required,
                available: selection.total,
            });
        }

        assemble_plan(*sender, request, selection, self.gas_budget)
    }
}
