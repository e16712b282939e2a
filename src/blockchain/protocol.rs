//! JSON-RPC 2.0 envelope and the node's wire shapes.

use serde::{Deserialize, Serialize};

use crate::blockchain::error::{FailureClass, RpcError, TransportError};
use crate::blockchain::types::{
    CoinObject, ExecutionStatus, GasCostSummary, SuiAddress, TransactionDigest,
};

#[derive(Serialize)]
pub(super) struct JsonRpcRequest<'a> {
    pub(super) jsonrpc: &'static str,
    pub(super) id: u64,
    pub(super) method: &'a str,
    pub(super) params: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
pub(super) struct JsonRpcResponse {
    pub(super) result: Option<serde_json::Value>,
    pub(super) error: Option<serde_json::Value>,
}

/// Parse a JSON-RPC error value into a transport error.
///
/// A well-formed `{"code", "message"}` object keeps its code in the failure
/// class; anything else is a decode failure carrying the raw JSON.
pub(super) fn parse_jsonrpc_error(endpoint: &str, err: serde_json::Value) -> RpcError {
    #[derive(Deserialize)]
    struct JsonRpcError {
        code: i64,
        message: String,
    }

    match serde_json::from_value::<JsonRpcError>(err.clone()) {
        Ok(parsed) => TransportError::new(
            endpoint,
            FailureClass::Rpc { code: parsed.code },
            parsed.message,
        )
        .into(),
        Err(_) => TransportError::new(
            endpoint,
            FailureClass::Decode,
            format!("non-standard JSON-RPC error: {err}"),
        )
        .into(),
    }
}

/// Integers the node may render either as JSON numbers or decimal strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum WireU64 {
    Num(u64),
    Str(String),
}

impl WireU64 {
    pub(super) fn value(&self) -> Result<u64, String> {
        match self {
            WireU64::Num(n) => Ok(*n),
            WireU64::Str(s) => s.parse().map_err(|e| format!("invalid integer '{s}': {e}")),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireCoin {
    pub(super) coin_type: String,
    pub(super) coin_object_id: String,
    pub(super) balance: WireU64,
    #[serde(default)]
    pub(super) previous_transaction: String,
}

impl WireCoin {
    pub(super) fn into_coin(self, owner: SuiAddress) -> Result<CoinObject, String> {
        Ok(CoinObject {
            object_id: self
                .coin_object_id
                .parse()
                .map_err(|e: RpcError| e.to_string())?,
            coin_type: self.coin_type,
            balance: self.balance.value()?,
            owner,
            previous_transaction: self.previous_transaction,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireCoinPage {
    pub(super) data: Vec<WireCoin>,
    pub(super) next_cursor: Option<String>,
    #[serde(default)]
    pub(super) has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireBalance {
    pub(super) coin_type: String,
    pub(super) coin_object_count: u64,
    pub(super) total_balance: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireTransactionBytes {
    pub(super) tx_bytes: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireStatus {
    pub(super) status: String,
    pub(super) error: Option<String>,
}

impl WireStatus {
    pub(super) fn into_status(self) -> ExecutionStatus {
        if self.status == "success" {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failure {
                error: self.error.unwrap_or(self.status),
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireGas {
    pub(super) computation_cost: WireU64,
    pub(super) storage_cost: WireU64,
    pub(super) storage_rebate: WireU64,
}

impl WireGas {
    pub(super) fn into_summary(self) -> Result<GasCostSummary, String> {
        Ok(GasCostSummary {
            computation_cost: self.computation_cost.value()?,
            storage_cost: self.storage_cost.value()?,
            storage_rebate: self.storage_rebate.value()?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireEffects {
    pub(super) status: WireStatus,
    pub(super) gas_used: Option<WireGas>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireTransactionResponse {
    pub(super) digest: TransactionDigest,
    pub(super) effects: Option<WireEffects>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireDryRun {
    pub(super) effects: WireEffects,
}
