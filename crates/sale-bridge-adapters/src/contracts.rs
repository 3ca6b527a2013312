use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};

use sale_bridge_core::{BridgeError, SalePort, SpendTokenPort};

use crate::Eip1193Adapter;

pub(crate) const ERC20_DECIMALS: &str = "decimals()";
pub(crate) const ERC20_BALANCE_OF: &str = "balanceOf(address)";
pub(crate) const ERC20_ALLOWANCE: &str = "allowance(address,address)";
pub(crate) const ERC20_APPROVE: &str = "approve(address,uint256)";
pub(crate) const SALE_BUY: &str = "buyWithUSDT(uint256)";
pub(crate) const SALE_PRICE: &str = "tokenPriceUSD()";

pub(crate) fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash.as_slice()[0..4]);
    out
}

fn encode_call(signature: &str, args: &[DynSolValue]) -> Bytes {
    let mut data = selector(signature).to_vec();
    if !args.is_empty() {
        data.extend(DynSolValue::Tuple(args.to_vec()).abi_encode_params());
    }
    Bytes::from(data)
}

fn decode_uint(signature: &str, data: &Bytes) -> Result<U256, BridgeError> {
    DynSolType::Uint(256)
        .abi_decode(data)
        .ok()
        .and_then(|value| value.as_uint().map(|(value, _)| value))
        .ok_or_else(|| BridgeError::ContractRead(format!("undecodable {signature} return")))
}

/// Spend-token (ERC-20) surface, routed through the wallet provider.
#[derive(Debug, Clone)]
pub struct SpendTokenAdapter {
    provider: Eip1193Adapter,
    address: Address,
}

impl SpendTokenAdapter {
    pub fn new(provider: Eip1193Adapter, address: Address) -> Self {
        Self { provider, address }
    }
}

impl SpendTokenPort for SpendTokenAdapter {
    async fn decimals(&self) -> Result<u8, BridgeError> {
        let ret = self
            .provider
            .call(self.address, encode_call(ERC20_DECIMALS, &[]))
            .await?;
        Ok(decode_uint(ERC20_DECIMALS, &ret)?.saturating_to::<u8>())
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, BridgeError> {
        let data = encode_call(ERC20_BALANCE_OF, &[DynSolValue::Address(owner)]);
        decode_uint(ERC20_BALANCE_OF, &self.provider.call(self.address, data).await?)
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, BridgeError> {
        let data = encode_call(
            ERC20_ALLOWANCE,
            &[DynSolValue::Address(owner), DynSolValue::Address(spender)],
        );
        decode_uint(ERC20_ALLOWANCE, &self.provider.call(self.address, data).await?)
    }

    async fn approve(
        &self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<B256, BridgeError> {
        let data = encode_call(
            ERC20_APPROVE,
            &[
                DynSolValue::Address(spender),
                DynSolValue::Uint(amount, 256),
            ],
        );
        self.provider.submit(owner, self.address, data).await
    }
}

/// Sale contract surface, routed through the wallet provider.
#[derive(Debug, Clone)]
pub struct SaleAdapter {
    provider: Eip1193Adapter,
    address: Address,
}

impl SaleAdapter {
    pub fn new(provider: Eip1193Adapter, address: Address) -> Self {
        Self { provider, address }
    }
}

impl SalePort for SaleAdapter {
    async fn buy(&self, buyer: Address, amount: U256) -> Result<B256, BridgeError> {
        let data = encode_call(SALE_BUY, &[DynSolValue::Uint(amount, 256)]);
        self.provider.submit(buyer, self.address, data).await
    }

    async fn token_price(&self) -> Result<U256, BridgeError> {
        let ret = self
            .provider
            .call(self.address, encode_call(SALE_PRICE, &[]))
            .await?;
        decode_uint(SALE_PRICE, &ret)
    }
}
