use alloy::primitives::{Address, U256};

use sale_bridge_core::BridgeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeProfile {
    Dev,
    Production,
}

#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub runtime_profile: RuntimeProfile,
    /// JSON-RPC endpoint of the wallet provider proxy. Unset in dev profile
    /// selects the deterministic in-memory provider.
    pub rpc_url: Option<String>,
    pub rpc_timeout_ms: u64,
    pub receipt_poll_interval_ms: u64,
    pub chain_id: u64,
    pub sale_address: Address,
    pub spend_token_address: Address,
    pub price_per_token: U256,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            runtime_profile: RuntimeProfile::Dev,
            rpc_url: None,
            rpc_timeout_ms: 15_000,
            receipt_poll_interval_ms: 1_000,
            chain_id: 11155111,
            sale_address: "0x3c87689C514EDF1d61d4bCF0EA85fD040507Eef7"
                .parse()
                .expect("valid built-in sale address"),
            spend_token_address: "0x87A2eA23BfE0c17086C53C692a00Db81a4C316Df"
                .parse()
                .expect("valid built-in spend token address"),
            price_per_token: U256::from(1000u64),
        }
    }
}

impl AdapterConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Environment-shaped configuration with an injectable lookup so tests
    /// do not have to mutate process globals.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(raw) = lookup("SALE_BRIDGE_RUNTIME_PROFILE") {
            if raw.eq_ignore_ascii_case("production") {
                cfg.runtime_profile = RuntimeProfile::Production;
            }
        }
        if let Some(url) = lookup("SALE_BRIDGE_RPC_URL") {
            if !url.is_empty() {
                cfg.rpc_url = Some(url);
            }
        }
        if let Some(raw) = lookup("SALE_BRIDGE_RPC_TIMEOUT_MS") {
            if let Ok(value) = raw.parse() {
                cfg.rpc_timeout_ms = value;
            }
        }
        if let Some(raw) = lookup("SALE_BRIDGE_RECEIPT_POLL_INTERVAL_MS") {
            if let Ok(value) = raw.parse() {
                cfg.receipt_poll_interval_ms = value;
            }
        }
        if let Some(raw) = lookup("SALE_BRIDGE_CHAIN_ID") {
            if let Ok(value) = raw.parse() {
                cfg.chain_id = value;
            }
        }
        if let Some(raw) = lookup("SALE_BRIDGE_SALE_ADDRESS") {
            if let Ok(value) = raw.parse() {
                cfg.sale_address = value;
            }
        }
        if let Some(raw) = lookup("SALE_BRIDGE_SPEND_TOKEN_ADDRESS") {
            if let Ok(value) = raw.parse() {
                cfg.spend_token_address = value;
            }
        }
        if let Some(raw) = lookup("SALE_BRIDGE_PRICE_PER_TOKEN") {
            if let Ok(value) = raw.parse() {
                cfg.price_per_token = value;
            }
        }
        cfg
    }

    /// The immutable slice of configuration the orchestrator sees.
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            chain_id: self.chain_id,
            sale_address: self.sale_address,
            spend_token_address: self.spend_token_address,
            price_per_token: self.price_per_token,
        }
    }

    pub fn strict_runtime_required(&self) -> bool {
        self.runtime_profile == RuntimeProfile::Production
    }
}
