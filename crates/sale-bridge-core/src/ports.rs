use alloy::primitives::{Address, B256, U256};
use thiserror::Error;

use crate::domain::{Reply, ReplyTarget};

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("wallet unavailable: {0}")]
    WalletUnavailable(String),
    #[error("wrong network: wallet is on chain {actual}, please switch to chain {expected} manually")]
    WrongNetwork { expected: u64, actual: u64 },
    #[error("contract read failed: {0}")]
    ContractRead(String),
    #[error("transaction rejected: {0}")]
    TransactionRejected(String),
    #[error("transaction reverted: {0}")]
    TransactionReverted(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
}

#[allow(async_fn_in_trait)]
pub trait WalletPort {
    /// Ask the wallet for account access. The first account is the signer.
    async fn request_accounts(&self) -> Result<Vec<Address>, BridgeError>;
    async fn chain_id(&self) -> Result<u64, BridgeError>;
    async fn switch_chain(&self, chain_id: u64) -> Result<(), BridgeError>;
    /// Block until the transaction is included and final, or reports a revert.
    async fn wait_for_confirmation(&self, hash: B256) -> Result<(), BridgeError>;
}

#[allow(async_fn_in_trait)]
pub trait SpendTokenPort {
    /// Fractional precision as declared by the token contract, read live.
    async fn decimals(&self) -> Result<u8, BridgeError>;
    async fn balance_of(&self, owner: Address) -> Result<U256, BridgeError>;
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, BridgeError>;
    /// Submit an allowance approval for `spender`; returns the transaction hash.
    async fn approve(
        &self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<B256, BridgeError>;
}

#[allow(async_fn_in_trait)]
pub trait SalePort {
    /// Submit a purchase paying `amount` of the spend token; returns the
    /// transaction hash.
    async fn buy(&self, buyer: Address, amount: U256) -> Result<B256, BridgeError>;
    /// On-chain price per token. Exposed by the sale contract but not used in
    /// amount computation; the configured price is authoritative.
    async fn token_price(&self) -> Result<U256, BridgeError>;
}

/// Best-effort reply delivery. Implementations must swallow transport
/// failures: a lost reply must never fail the request that produced it.
pub trait ReplyPort {
    fn deliver(&self, target: &ReplyTarget, reply: Reply);
}
