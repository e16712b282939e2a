//! Chain-specific types.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::blockchain::error::{RpcError, RpcResult};

/// Fully-qualified type of the chain's native, fee-paying coin.
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

/// Long form of [`SUI_COIN_TYPE`] as returned by some RPC methods.
pub const SUI_COIN_TYPE_LONG: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI";

/// Decimals of the native coin.
pub const SUI_DECIMALS: u8 = 9;

/// Return true if `coin_type` names the native fee-paying coin.
pub fn is_native_coin(coin_type: &str) -> bool {
    coin_type == SUI_COIN_TYPE || coin_type == SUI_COIN_TYPE_LONG
}

fn parse_hex32(kind: &str, s: &str) -> RpcResult<[u8; 32]> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| RpcError::InvalidInput(format!("{kind} '{s}' must start with 0x")))?;
    if digits.is_empty() || digits.len() > 64 {
        return Err(RpcError::InvalidInput(format!(
            "{kind} '{s}' must have 1 to 64 hex digits"
        )));
    }
    let padded = format!("{digits:0>64}");
    let mut out = [0u8; 32];
    hex::decode_to_slice(&padded, &mut out)
        .map_err(|e| RpcError::InvalidInput(format!("{kind} '{s}' is not valid hex: {e}")))?;
    Ok(out)
}

macro_rules! hex32_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; 32]);

        impl $name {
            /// Wrap raw bytes.
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Raw 32 bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = RpcError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_hex32($kind, s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex32_id!(
    /// 32-byte account address, rendered as `0x` + 64 hex digits.
    SuiAddress,
    "address"
);

hex32_id!(
    /// Unique identifier of an on-chain object.
    ObjectId,
    "object id"
);

/// Digest identifying a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionDigest(pub String);

impl fmt::Display for TransactionDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A coin object owned by an address. Fetched fresh per request, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoinObject {
    pub object_id: ObjectId,
    pub coin_type: String,
    /// Balance in base units.
    pub balance: u64,
    pub owner: SuiAddress,
    pub previous_transaction: String,
}

/// One page of an owned-coin listing.
#[derive(Debug, Clone, Default)]
pub struct CoinPage {
    pub data: Vec<CoinObject>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Subset of coin metadata this crate consumes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CoinMetadata {
    pub decimals: u8,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
}

/// Aggregate balance of one coin type for an owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub coin_type: String,
    pub coin_object_count: u64,
    pub total_balance: u128,
}

/// Ledger-reported outcome of executing a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }
}

/// Gas consumed by a transaction, in base units of the native coin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GasCostSummary {
    pub computation_cost: u64,
    pub storage_cost: u64,
    pub storage_rebate: u64,
}

/// Gross and net fee derived from a [`GasCostSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GasFeeInfo {
    /// computation + storage
    pub total_gas_fee: u128,
    /// total - rebate; negative when the rebate exceeds the charge
    pub net_gas_fee: i128,
}

impl GasCostSummary {
    pub fn fee_info(&self) -> GasFeeInfo {
        let total = self.computation_cost as u128 + self.storage_cost as u128;
        GasFeeInfo {
            total_gas_fee: total,
            net_gas_fee: total as i128 - self.storage_rebate as i128,
        }
    }
}

/// Result of a sign-and-submit call.
#[derive(Debug, Clone)]
pub struct SubmitResponse {
    pub digest: TransactionDigest,
    /// `None` when the node returned no effects.
    pub status: Option<ExecutionStatus>,
    pub gas_used: Option<GasCostSummary>,
}

/// Cursor into an event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventId {
    pub tx_digest: String,
    pub event_seq: String,
}

/// One page of an event query. Events are passed through untyped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    pub data: Vec<serde_json::Value>,
    pub next_cursor: Option<EventId>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// Render a base-unit amount with `decimals` fractional digits.
pub fn format_amount(base_units: u128, decimals: u8) -> String {
    if decimals == 0 {
        return base_units.to_string();
    }
    let scale = 10u128.pow(decimals as u32);
    let whole = base_units / scale;
    let frac = base_units % scale;
    let frac = format!("{:0width$}", frac, width = decimals as usize);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}
