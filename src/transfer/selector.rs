//! Owned-coin selection.
//!
//! Coins are taken in ledger pagination order until the running sum covers
//! the target. There is no minimal-coin-count optimization, so a fragmented
//! balance may select more coins (and pay more gas) than strictly needed.

use tokio_util::sync::CancellationToken;

use crate::blockchain::error::RpcResult;
use crate::blockchain::types::{CoinObject, SuiAddress};
use crate::load_balancer::pool::ProviderPool;

/// Coins selected for a transfer and their combined balance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoinSelection {
    pub coins: Vec<CoinObject>,
    pub total: u128,
}

impl CoinSelection {
    pub fn covers(&self, target: u128) -> bool {
        self.total >= target
    }
}

/// Pages an owner's coins of one type through the provider pool.
#[derive(Debug, Clone, Copy)]
pub struct CoinSelector<'a> {
    pool: &'a ProviderPool,
}

impl<'a> CoinSelector<'a> {
    pub fn new(pool: &'a ProviderPool) -> Self {
        Self { pool }
    }

    /// Collect `owner`'s coins of `coin_type`.
    ///
    /// With a `target`, stops at the first coin that brings the running sum
    /// to or above it. Without one, pages until the listing is exhausted.
    /// Each page fetch runs under the pool's retry policy.
    pub async fn owned_coins(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
        target: Option<u128>,
        cancel: &CancellationToken,
    ) -> RpcResult<CoinSelection> {
        let provider = self.pool.random_provider()?;
        let provider = provider.as_ref();
        let mut selection = CoinSelection::default();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page_cursor = cursor.as_deref();
            let page = self
                .pool
                .retry()
                .execute("get_coins", cancel, move || {
                    provider.get_coins(owner, coin_type, page_cursor)
                })
                .await?;
            pages += 1;

            for coin in page.data {
                selection.total += coin.balance as u128;
                selection.coins.push(coin);
                if target.is_some_and(|t| selection.covers(t)) {
                    tracing::debug!(
                        owner = %owner,
                        coin_type,
                        coins = selection.coins.len(),
                        total = %selection.total,
                        pages,
                        "Coin selection reached target"
                    );
                    return Ok(selection);
                }
            }

            match page.next_cursor {
                Some(next) if page.has_next_page => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!(
            owner = %owner,
            coin_type,
            coins = selection.coins.len(),
            total = %selection.total,
            pages,
            "Coin listing exhausted"
        );
        Ok(selection)
    }
}
