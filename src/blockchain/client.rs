//! Sui JSON-RPC client over HTTP(S).
//!
//! # Responsibilities
//! - Issue one JSON-RPC 2.0 request per capability call
//! - Route every request through the next egress transport
//! - Classify failures once, at this boundary
//! - Lower transfer plans to node-built transactions and execute signed bytes

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::blockchain::error::{FailureClass, RpcError, RpcResult, TransportError};
use crate::blockchain::protocol::{
    parse_jsonrpc_error, JsonRpcRequest, JsonRpcResponse, WireBalance, WireCoinPage, WireDryRun,
    WireTransactionBytes, WireTransactionResponse, WireU64,
};
use crate::blockchain::types::{
    Balance, CoinMetadata, CoinPage, EventId, EventPage, ExecutionStatus, GasCostSummary,
    SubmitResponse, SuiAddress, TransactionDigest,
};
use crate::blockchain::LedgerRpc;
use crate::load_balancer::proxy::ProxyRotator;
use crate::observability::metrics;
use crate::transfer::TransferPlan;

/// Request type for execution: wait until the node has applied the effects.
const EXECUTE_REQUEST_TYPE: &str = "WaitForLocalExecution";

/// JSON-RPC client bound to one endpoint URL.
pub struct JsonRpcClient {
    url: String,
    transports: Arc<ProxyRotator>,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create a client for `url` sharing the process-wide proxy rotator.
    pub fn new(url: impl Into<String>, transports: Arc<ProxyRotator>) -> Self {
        Self {
            url: url.into(),
            transports,
            next_id: AtomicU64::new(1),
        }
    }

    fn error(&self, class: FailureClass, message: impl Into<String>) -> RpcError {
        TransportError::new(self.url.as_str(), class, message).into()
    }

    fn classify(&self, err: &reqwest::Error) -> RpcError {
        let class = if err.is_timeout() {
            FailureClass::Timeout
        } else if err.is_decode() {
            FailureClass::Decode
        } else {
            FailureClass::Connect
        };
        self.error(class, err.to_string())
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> RpcResult<T> {
        let start = Instant::now();
        let result = self.call_inner(method, params).await;
        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::record_rpc_request(method, outcome, start);
        result
    }

    async fn call_inner<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> RpcResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let transport = self.transports.next();
        tracing::debug!(
            rpc.id = id,
            rpc.method = method,
            endpoint = %self.url,
            via = %transport.label,
            "rpc call"
        );

        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let response = transport
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(self.error(FailureClass::RateLimited, status.to_string()));
        }
        if !status.is_success() {
            return Err(self.error(FailureClass::HttpStatus(status.as_u16()), status.to_string()));
        }

        let body = response.text().await.map_err(|e| self.classify(&e))?;
        tracing::trace!(rpc.id = id, rpc.method = method, body = %body, "rpc response body");

        let decoded: JsonRpcResponse = serde_json::from_str(&body).map_err(|e| {
            self.error(FailureClass::Decode, format!("decode JSON-RPC response: {e}"))
        })?;
        if let Some(err) = decoded.error {
            return Err(parse_jsonrpc_error(&self.url, err));
        }

        serde_json::from_value(decoded.result.unwrap_or(Value::Null))
            .map_err(|e| self.error(FailureClass::Decode, format!("decode {method} result: {e}")))
    }
}

#[async_trait]
impl LedgerRpc for JsonRpcClient {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn get_coins(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
        cursor: Option<&str>,
    ) -> RpcResult<CoinPage> {
        let page: WireCoinPage = self
            .call("suix_getCoins", vec![json!(owner), json!(coin_type), json!(cursor), Value::Null])
            .await?;

        let data = page
            .data
            .into_iter()
            .map(|coin| coin.into_coin(*owner))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.error(FailureClass::Decode, e))?;

        Ok(CoinPage {
            data,
            next_cursor: page.next_cursor,
            has_next_page: page.has_next_page,
        })
    }

    async fn get_coin_metadata(&self, coin_type: &str) -> RpcResult<CoinMetadata> {
        let metadata: Option<CoinMetadata> =
            self.call("suix_getCoinMetadata", vec![json!(coin_type)]).await?;
        metadata.ok_or_else(|| RpcError::InvalidInput(format!("no metadata for coin type {coin_type}")))
    }

    async fn latest_checkpoint(&self) -> RpcResult<u64> {
        let sequence: WireU64 = self.call("sui_getLatestCheckpointSequenceNumber", Vec::new()).await?;
        sequence.value().map_err(|e| self.error(FailureClass::Decode, e))
    }

    /// Native plans use `unsafe_paySui`: the selected coins are the gas payment
    /// and are split directly. Other plans use `unsafe_pay`, which merges the
    /// extra coins into the first one before splitting; the node picks gas.
    async fn build_transaction(&self, plan: &TransferPlan, gas_budget: u64) -> RpcResult<String> {
        let coins: Vec<String> = plan.coins.iter().map(|c| c.object_id.to_string()).collect();
        let (recipients, amounts): (Vec<String>, Vec<String>) = plan
            .transfers()
            .map(|(recipient, amount)| (recipient.to_string(), amount.to_string()))
            .unzip();

        let (method, params) = if plan.is_native() {
            (
                "unsafe_paySui",
                vec![
                    json!(plan.sender),
                    json!(coins),
                    json!(recipients),
                    json!(amounts),
                    json!(gas_budget.to_string()),
                ],
            )
        } else {
            (
                "unsafe_pay",
                vec![
                    json!(plan.sender),
                    json!(coins),
                    json!(recipients),
                    json!(amounts),
                    Value::Null,
                    json!(gas_budget.to_string()),
                ],
            )
        };

        let built: WireTransactionBytes = self.call(method, params).await?;
        Ok(built.tx_bytes)
    }

    async fn execute_transaction(&self, tx_bytes: &str, signature: &str) -> RpcResult<SubmitResponse> {
        let response: WireTransactionResponse = self
            .call(
                "sui_executeTransactionBlock",
                vec![
                    json!(tx_bytes),
                    json!([signature]),
                    json!({"showEffects": true, "showEvents": true}),
                    json!(EXECUTE_REQUEST_TYPE),
                ],
            )
            .await?;

        let (status, gas_used) = match response.effects {
            Some(effects) => {
                let gas = match effects.gas_used {
                    Some(gas) => Some(gas.into_summary().map_err(|e| self.error(FailureClass::Decode, e))?),
                    None => None,
                };
                (Some(effects.status.into_status()), gas)
            }
            None => (None, None),
        };

        Ok(SubmitResponse {
            digest: response.digest,
            status,
            gas_used,
        })
    }

    async fn get_execution_status(&self, digest: &TransactionDigest) -> RpcResult<ExecutionStatus> {
        let response: WireTransactionResponse = self
            .call("sui_getTransactionBlock", vec![json!(digest), json!({"showEffects": true})])
            .await?;
        response
            .effects
            .map(|effects| effects.status.into_status())
            .ok_or_else(|| self.error(FailureClass::Decode, format!("no effects for {digest}")))
    }

    async fn get_balance(&self, owner: &SuiAddress, coin_type: &str) -> RpcResult<Balance> {
        let balance: WireBalance = self
            .call("suix_getBalance", vec![json!(owner), json!(coin_type)])
            .await?;
        let total_balance = balance.total_balance.parse::<u128>().map_err(|e| {
            self.error(FailureClass::Decode, format!("invalid totalBalance: {e}"))
        })?;
        Ok(Balance {
            coin_type: balance.coin_type,
            coin_object_count: balance.coin_object_count,
            total_balance,
        })
    }

    async fn dry_run(&self, tx_bytes: &str) -> RpcResult<(ExecutionStatus, GasCostSummary)> {
        let response: WireDryRun = self
            .call("sui_dryRunTransactionBlock", vec![json!(tx_bytes)])
            .await?;

        let gas = match response.effects.gas_used {
            Some(gas) => gas.into_summary().map_err(|e| self.error(FailureClass::Decode, e))?,
            None => GasCostSummary::default(),
        };
        Ok((response.effects.status.into_status(), gas))
    }

    async fn query_events(
        &self,
        filter: &Value,
        cursor: Option<&EventId>,
        limit: usize,
        descending: bool,
    ) -> RpcResult<EventPage> {
        self.call(
            "suix_queryEvents",
            vec![filter.clone(), json!(cursor), json!(limit), json!(descending)],
        )
        .await
    }
}

impl std::fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("url", &self.url)
            .field("transports", &self.transports.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::proxy::TransportTimeouts;
    use std::time::Duration;

    fn unreachable_client() -> JsonRpcClient {
        let timeouts = TransportTimeouts {
            request: Duration::from_secs(2),
            connect: Duration::from_secs(1),
        };
        let rotator = Arc::new(ProxyRotator::new(&[], timeouts).unwrap());
        // Port 9 (discard) on loopback is closed in test environments.
        JsonRpcClient::new("http://127.0.0.1:9", rotator)
    }

    #[tokio::test]
    async fn test_connection_refused_is_connect_class() {
        let client = unreachable_client();
        let err = client.latest_checkpoint().await.unwrap_err();
        assert!(matches!(
            err.failure_class(),
            Some(FailureClass::Connect) | Some(FailureClass::Timeout)
        ));
        assert!(err.to_string().contains("127.0.0.1:9"));
    }

    #[test]
    fn test_request_ids_increase() {
        let client = unreachable_client();
        let a = client.next_id.fetch_add(1, Ordering::Relaxed);
        let b = client.next_id.fetch_add(1, Ordering::Relaxed);
        assert!(b > a);
        assert_eq!(client.endpoint(), "http://127.0.0.1:9");
    }
}
