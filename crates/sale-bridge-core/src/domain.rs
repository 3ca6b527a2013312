use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ports::BridgeError;

/// Fixed bridge configuration, decided at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Chain every transaction flow requires the wallet to be on.
    pub chain_id: u64,
    pub sale_address: Address,
    pub spend_token_address: Address,
    /// Price per sale token in whole spend-token units, before precision
    /// scaling.
    pub price_per_token: U256,
}

/// Inbound request kinds. Anything outside this set is dropped without a
/// reply so unrelated traffic on the channel stays silent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Request {
    Connect,
    Approve {
        #[serde(default)]
        payload: Option<SpendPayload>,
    },
    Buy {
        #[serde(default)]
        payload: Option<SpendPayload>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SpendPayload {
    /// Raw `tokens` field as sent by the caller; see
    /// [`token_count_from_payload`] for the coercion rules.
    #[serde(default)]
    pub tokens: Option<Value>,
}

/// Outbound replies, serialized as `{type, payload}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum Reply {
    Connected { address: Address },
    Status { msg: String },
    Approved { hash: B256 },
    Bought { hash: B256 },
    Error { message: String },
}

/// Where a reply goes: the requester handle and the origin it declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyTarget {
    pub requester: String,
    pub origin: String,
}

/// Requested token quantity from a spend payload. Absent, non-numeric and
/// zero values all collapse to 1.
pub fn token_count_from_payload(payload: Option<&SpendPayload>) -> u64 {
    payload
        .and_then(|p| p.tokens.as_ref())
        .and_then(Value::as_u64)
        .filter(|tokens| *tokens > 0)
        .unwrap_or(1)
}

/// Spend amount in the token's smallest unit:
/// `token_count * price_per_token * 10^decimals`. Integer arithmetic
/// throughout; overflow is an error, never a wrap.
pub fn spend_amount(
    token_count: u64,
    price_per_token: U256,
    decimals: u8,
) -> Result<U256, BridgeError> {
    let scale = U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .ok_or_else(|| BridgeError::Validation(format!("precision out of range: {decimals}")))?;
    U256::from(token_count)
        .checked_mul(price_per_token)
        .and_then(|raw| raw.checked_mul(scale))
        .ok_or_else(|| {
            BridgeError::Validation(format!(
                "spend amount overflow: {token_count} tokens at {price_per_token}"
            ))
        })
}
