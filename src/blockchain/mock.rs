//! In-memory ledger for unit tests.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::blockchain::error::{FailureClass, RpcError, RpcResult, TransportError};
use crate::blockchain::types::{
    is_native_coin, Balance, CoinMetadata, CoinObject, CoinPage, EventId, EventPage,
    ExecutionStatus, GasCostSummary, ObjectId, SubmitResponse, SuiAddress, TransactionDigest,
};
use crate::blockchain::LedgerRpc;
use crate::transfer::TransferPlan;

/// A coin of `coin_type` with a deterministic object id derived from `seed`.
pub fn coin(coin_type: &str, balance: u64, seed: u8) -> CoinObject {
    let mut id = [0u8; 32];
    id[0] = 0xc0;
    id[31] = seed;
    CoinObject {
        object_id: ObjectId::new(id),
        coin_type: coin_type.to_string(),
        balance,
        owner: SuiAddress::new([0u8; 32]),
        previous_transaction: format!("tx-{seed}"),
    }
}

pub struct MockLedgerBuilder {
    endpoint: String,
    coins: Vec<CoinObject>,
    page_size: usize,
    failures: Option<(FailureClass, u32)>,
    method_failures: HashMap<&'static str, (FailureClass, u32)>,
    unreachable: bool,
    checkpoint: u64,
    decimals: u8,
    submit_status: Option<ExecutionStatus>,
    execution_status: ExecutionStatus,
    dry_run: (ExecutionStatus, GasCostSummary),
    events: Vec<serde_json::Value>,
}

impl MockLedgerBuilder {
    pub fn endpoint(mut self, url: &str) -> Self {
        self.endpoint = url.to_string();
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    pub fn with_coins(mut self, coins: impl IntoIterator<Item = CoinObject>) -> Self {
        self.coins.extend(coins);
        self
    }

    /// Fail the next `times` calls, whatever the method, with `class`.
    pub fn fail_next(mut self, class: FailureClass, times: u32) -> Self {
        self.failures = Some((class, times));
        self
    }

    /// Fail the next `times` calls of `method` only.
    pub fn fail_on(mut self, method: &'static str, class: FailureClass, times: u32) -> Self {
        self.method_failures.insert(method, (class, times));
        self
    }

    /// Fail every call with a connection error.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    /// Status reported directly by execution; `None` means no effects.
    pub fn submit_status(mut self, status: Option<ExecutionStatus>) -> Self {
        self.submit_status = status;
        self
    }

    /// Status reported by a follow-up status lookup.
    pub fn execution_status(mut self, status: ExecutionStatus) -> Self {
        self.execution_status = status;
        self
    }

    pub fn dry_run(mut self, status: ExecutionStatus, gas: GasCostSummary) -> Self {
        self.dry_run = (status, gas);
        self
    }

    pub fn events(mut self, events: Vec<serde_json::Value>) -> Self {
        self.events = events;
        self
    }

    pub fn build(self) -> MockLedger {
        MockLedger {
            endpoint: self.endpoint,
            coins: self.coins,
            page_size: self.page_size,
            failures: Mutex::new(self.failures),
            method_failures: Mutex::new(self.method_failures),
            unreachable: self.unreachable,
            checkpoint: self.checkpoint,
            decimals: self.decimals,
            submit_status: self.submit_status,
            execution_status: self.execution_status,
            dry_run: self.dry_run,
            events: self.events,
            calls: Mutex::new(HashMap::new()),
            built: Mutex::new(Vec::new()),
            executed: Mutex::new(Vec::new()),
        }
    }
}

/// Scriptable [`LedgerRpc`] that counts calls per method.
pub struct MockLedger {
    endpoint: String,
    coins: Vec<CoinObject>,
    page_size: usize,
    failures: Mutex<Option<(FailureClass, u32)>>,
    method_failures: Mutex<HashMap<&'static str, (FailureClass, u32)>>,
    unreachable: bool,
    checkpoint: u64,
    decimals: u8,
    submit_status: Option<ExecutionStatus>,
    execution_status: ExecutionStatus,
    dry_run: (ExecutionStatus, GasCostSummary),
    events: Vec<serde_json::Value>,
    calls: Mutex<HashMap<&'static str, usize>>,
    built: Mutex<Vec<TransferPlan>>,
    executed: Mutex<Vec<(String, String)>>,
}

impl MockLedger {
    pub fn builder() -> MockLedgerBuilder {
        MockLedgerBuilder {
            endpoint: "mock://ledger".to_string(),
            coins: Vec::new(),
            page_size: 50,
            failures: None,
            method_failures: HashMap::new(),
            unreachable: false,
            checkpoint: 1_000,
            decimals: 9,
            submit_status: Some(ExecutionStatus::Success),
            execution_status: ExecutionStatus::Success,
            dry_run: (ExecutionStatus::Success, GasCostSummary::default()),
            events: Vec::new(),
        }
    }

    /// Number of invocations of `method`, failed ones included.
    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// Plans lowered by a successful build, in order.
    pub fn built_plans(&self) -> Vec<TransferPlan> {
        self.built.lock().unwrap().clone()
    }

    /// `(tx_bytes, signature)` of every execution attempt, failed ones included.
    pub fn executions(&self) -> Vec<(String, String)> {
        self.executed.lock().unwrap().clone()
    }

    fn enter(&self, method: &'static str) -> RpcResult<()> {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;

        if self.unreachable {
            return Err(self.failure(FailureClass::Connect));
        }
        let mut failures = self.failures.lock().unwrap();
        if let Some((class, remaining)) = failures.as_mut() {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(self.failure(*class));
            }
        }
        let mut method_failures = self.method_failures.lock().unwrap();
        if let Some((class, remaining)) = method_failures.get_mut(method) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(self.failure(*class));
            }
        }
        Ok(())
    }

    fn failure(&self, class: FailureClass) -> RpcError {
        TransportError::new(self.endpoint.as_str(), class, "injected failure").into()
    }

    fn owned(&self, coin_type: &str) -> Vec<&CoinObject> {
        self.coins
            .iter()
            .filter(|c| c.coin_type == coin_type || (is_native_coin(coin_type) && is_native_coin(&c.coin_type)))
            .collect()
    }
}

#[async_trait]
impl LedgerRpc for MockLedger {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_coins(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
        cursor: Option<&str>,
    ) -> RpcResult<CoinPage> {
        self.enter("get_coins")?;
        let owned = self.owned(coin_type);
        let start = cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
        let end = (start + self.page_size).min(owned.len());
        let data = owned[start.min(end)..end]
            .iter()
            .map(|c| CoinObject { owner: *owner, ..(*c).clone() })
            .collect();
        let has_next_page = end < owned.len();
        Ok(CoinPage {
            data,
            next_cursor: has_next_page.then(|| end.to_string()),
            has_next_page,
        })
    }

    async fn get_coin_metadata(&self, coin_type: &str) -> RpcResult<CoinMetadata> {
        self.enter("get_coin_metadata")?;
        Ok(CoinMetadata {
            decimals: self.decimals,
            symbol: coin_type.rsplit("::").next().unwrap_or_default().to_string(),
            name: coin_type.to_string(),
        })
    }

    async fn latest_checkpoint(&self) -> RpcResult<u64> {
        self.enter("latest_checkpoint")?;
        Ok(self.checkpoint)
    }

    async fn build_transaction(&self, plan: &TransferPlan, _gas_budget: u64) -> RpcResult<String> {
        self.enter("build_transaction")?;
        let mut built = self.built.lock().unwrap();
        built.push(plan.clone());
        // Fresh bytes per build, like a node resolving new coin versions.
        Ok(STANDARD.encode(format!("mock-tx-{}", built.len())))
    }

    async fn execute_transaction(&self, tx_bytes: &str, signature: &str) -> RpcResult<SubmitResponse> {
        self.executed
            .lock()
            .unwrap()
            .push((tx_bytes.to_string(), signature.to_string()));
        self.enter("execute_transaction")?;
        let raw = STANDARD
            .decode(tx_bytes)
            .map_err(|e| RpcError::InvalidInput(format!("txBytes is not base64: {e}")))?;
        Ok(SubmitResponse {
            digest: TransactionDigest(String::from_utf8_lossy(&raw).replace("mock-tx", "mock-digest")),
            status: self.submit_status.clone(),
            gas_used: Some(self.dry_run.1),
        })
    }

    async fn get_execution_status(&self, _digest: &TransactionDigest) -> RpcResult<ExecutionStatus> {
        self.enter("get_execution_status")?;
        Ok(self.execution_status.clone())
    }

    async fn get_balance(&self, _owner: &SuiAddress, coin_type: &str) -> RpcResult<Balance> {
        self.enter("get_balance")?;
        let owned = self.owned(coin_type);
        Ok(Balance {
            coin_type: coin_type.to_string(),
            coin_object_count: owned.len() as u64,
            total_balance: owned.iter().map(|c| c.balance as u128).sum(),
        })
    }

    async fn dry_run(&self, _tx_bytes: &str) -> RpcResult<(ExecutionStatus, GasCostSummary)> {
        self.enter("dry_run")?;
        Ok(self.dry_run.clone())
    }

    async fn query_events(
        &self,
        _filter: &serde_json::Value,
        cursor: Option<&EventId>,
        limit: usize,
        _descending: bool,
    ) -> RpcResult<EventPage> {
        self.enter("query_events")?;
        let start = cursor.and_then(|c| c.event_seq.parse::<usize>().ok()).unwrap_or(0);
        let end = (start + limit.max(1)).min(self.events.len());
        let has_next_page = end < self.events.len();
        Ok(EventPage {
            data: self.events[start.min(end)..end].to_vec(),
            next_cursor: has_next_page.then(|| EventId {
                tx_digest: "mock".to_string(),
                event_seq: end.to_string(),
            }),
            has_next_page,
        })
    }
}
