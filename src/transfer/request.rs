//! Multi-recipient transfer requests.

use serde::Serialize;

use crate::blockchain::error::{RpcError, RpcResult};
use crate::blockchain::types::SuiAddress;

/// One output of a multi-send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub address: SuiAddress,
    /// Amount in base units.
    pub amount: u64,
}

/// Distribute exact amounts of one coin type to an ordered list of recipients.
///
/// Duplicate addresses are kept: each entry yields its own output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub coin_type: String,
    pub recipients: Vec<Recipient>,
}

impl TransferRequest {
    pub fn new(coin_type: impl Into<String>, recipients: Vec<Recipient>) -> Self {
        Self {
            coin_type: coin_type.into(),
            recipients,
        }
    }

    /// Parse `(address, amount)` pairs where amounts are decimal base-unit strings.
    pub fn parse<A, B>(coin_type: impl Into<String>, entries: &[(A, B)]) -> RpcResult<Self>
    where
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let recipients = entries
            .iter()
            .enumerate()
            .map(|(i, (address, amount))| {
                let address = address.as_ref().trim().parse::<SuiAddress>()?;
                let raw = amount.as_ref().trim();
                let amount = raw.parse::<u64>().map_err(|_| {
                    RpcError::InvalidInput(format!(
                        "recipient #{i}: amount '{raw}' is not a positive integer"
                    ))
                })?;
                Ok(Recipient { address, amount })
            })
            .collect::<RpcResult<Vec<_>>>()?;

        let request = Self::new(coin_type, recipients);
        request.validate()?;
        Ok(request)
    }

    /// Check the request and return the total amount to distribute.
    ///
    /// Pure: performs no I/O.
    pub fn validate(&self) -> RpcResult<u64> {
        if self.coin_type.trim().is_empty() {
            return Err(RpcError::InvalidInput("coin type is empty".into()));
        }
        if self.recipients.is_empty() {
            return Err(RpcError::InvalidInput("recipient list is empty".into()));
        }

        let mut total: u64 = 0;
        for (i, recipient) in self.recipients.iter().enumerate() {
            if recipient.amount == 0 {
                return Err(RpcError::InvalidInput(format!(
                    "recipient #{i} ({}) has a non-positive amount",
                    recipient.address
                )));
            }
            total = total.checked_add(recipient.amount).ok_or_else(|| {
                RpcError::InvalidInput("total amount overflows u64".into())
            })?;
        }
        Ok(total)
    }
}

/// Successful outcome of a multi-send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub transaction_hash: String,
}
