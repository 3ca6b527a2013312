use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use serde_json::{json, Value};

use sale_bridge_core::{BridgeError, WalletPort};

use crate::contracts;
use crate::AdapterConfig;

/// EIP-1193-shaped wallet provider. `Deterministic` keeps an in-memory
/// provider for tests and development, `Proxy` speaks JSON-RPC to a real
/// provider endpoint, `Disabled` fails every call with the unavailability
/// reason.
#[derive(Debug, Clone)]
pub struct Eip1193Adapter {
    mode: ProviderMode,
    state: Arc<Mutex<ProviderState>>,
    receipt_poll_interval_ms: u64,
}

#[derive(Debug, Clone)]
enum ProviderMode {
    Disabled(String),
    Deterministic,
    Proxy(ProxyRuntime),
}

#[derive(Debug, Clone)]
struct ProxyRuntime {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug)]
struct ProviderState {
    accounts: Vec<Address>,
    chain_id: u64,
    accept_chain_switch: bool,
    reject_submissions: bool,
    revert_next_submission: bool,
    submission_seq: u64,
    call_responses: HashMap<[u8; 4], Bytes>,
    reverted: Vec<B256>,
    submissions: Vec<SubmittedTx>,
}

#[derive(Debug, Clone)]
pub struct SubmittedTx {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub hash: B256,
}

impl ProviderState {
    fn for_config(config: &AdapterConfig) -> Self {
        let mut call_responses = HashMap::new();
        call_responses.insert(
            contracts::selector(contracts::ERC20_DECIMALS),
            encode_word(DynSolValue::Uint(U256::from(6u64), 8)),
        );
        call_responses.insert(
            contracts::selector(contracts::ERC20_BALANCE_OF),
            encode_word(DynSolValue::Uint(U256::ZERO, 256)),
        );
        call_responses.insert(
            contracts::selector(contracts::ERC20_ALLOWANCE),
            encode_word(DynSolValue::Uint(U256::ZERO, 256)),
        );
        call_responses.insert(
            contracts::selector(contracts::SALE_PRICE),
            encode_word(DynSolValue::Uint(config.price_per_token, 256)),
        );
        Self {
            accounts: vec!["0x1000000000000000000000000000000000000001"
                .parse()
                .expect("valid built-in deterministic account")],
            chain_id: config.chain_id,
            accept_chain_switch: true,
            reject_submissions: false,
            revert_next_submission: false,
            submission_seq: 0,
            call_responses,
            reverted: Vec::new(),
            submissions: Vec::new(),
        }
    }
}

impl Default for Eip1193Adapter {
    fn default() -> Self {
        Self::with_config(AdapterConfig::default())
    }
}

impl Eip1193Adapter {
    pub fn with_config(config: AdapterConfig) -> Self {
        let mode = if let Some(base_url) = config.rpc_url.clone() {
            let timeout = Duration::from_millis(config.rpc_timeout_ms);
            match reqwest::Client::builder().timeout(timeout).build() {
                Ok(client) => ProviderMode::Proxy(ProxyRuntime { base_url, client }),
                Err(e) => {
                    if config.strict_runtime_required() {
                        ProviderMode::Disabled(format!(
                            "no wallet provider available: rpc client init failed: {e}"
                        ))
                    } else {
                        ProviderMode::Deterministic
                    }
                }
            }
        } else if config.strict_runtime_required() {
            ProviderMode::Disabled(
                "no wallet provider available: rpc endpoint not configured in production profile"
                    .to_owned(),
            )
        } else {
            ProviderMode::Deterministic
        };

        Self {
            mode,
            state: Arc::new(Mutex::new(ProviderState::for_config(&config))),
            receipt_poll_interval_ms: config.receipt_poll_interval_ms,
        }
    }

    fn check_mode(&self) -> Result<(), BridgeError> {
        if let ProviderMode::Disabled(reason) = &self.mode {
            return Err(BridgeError::WalletUnavailable(reason.clone()));
        }
        Ok(())
    }

    fn guard(&self) -> Result<MutexGuard<'_, ProviderState>, BridgeError> {
        self.state
            .lock()
            .map_err(|e| BridgeError::Transport(format!("provider lock poisoned: {e}")))
    }

    pub fn debug_set_chain(&self, chain_id: u64) -> Result<(), BridgeError> {
        self.guard()?.chain_id = chain_id;
        Ok(())
    }

    pub fn debug_deny_chain_switch(&self) -> Result<(), BridgeError> {
        self.guard()?.accept_chain_switch = false;
        Ok(())
    }

    pub fn debug_reject_submissions(&self) -> Result<(), BridgeError> {
        self.guard()?.reject_submissions = true;
        Ok(())
    }

    pub fn debug_revert_next_submission(&self) -> Result<(), BridgeError> {
        self.guard()?.revert_next_submission = true;
        Ok(())
    }

    pub fn debug_set_call_response(
        &self,
        selector: [u8; 4],
        response: Bytes,
    ) -> Result<(), BridgeError> {
        self.guard()?.call_responses.insert(selector, response);
        Ok(())
    }

    pub fn submissions(&self) -> Result<Vec<SubmittedTx>, BridgeError> {
        Ok(self.guard()?.submissions.clone())
    }

    /// Read-only contract call routed through the provider.
    pub async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, BridgeError> {
        self.check_mode()?;

        if matches!(self.mode, ProviderMode::Proxy(_)) {
            let result = self
                .proxy_call(
                    "eth_call",
                    json!([{"to": to, "data": data}, "latest"]),
                )
                .await?;
            let raw = result
                .as_str()
                .ok_or_else(|| BridgeError::ContractRead("eth_call: hex expected".to_owned()))?;
            return raw
                .parse()
                .map_err(|e| BridgeError::ContractRead(format!("invalid eth_call return: {e}")));
        }

        let g = self.guard()?;
        if data.len() < 4 {
            return Err(BridgeError::ContractRead("calldata too short".to_owned()));
        }
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&data[0..4]);
        g.call_responses.get(&selector).cloned().ok_or_else(|| {
            BridgeError::ContractRead(format!(
                "no response for selector 0x{}",
                alloy::hex::encode(selector)
            ))
        })
    }

    /// Sign-and-submit routed through the provider; returns the pending
    /// transaction hash.
    pub async fn submit(&self, from: Address, to: Address, data: Bytes) -> Result<B256, BridgeError> {
        self.check_mode()?;

        if matches!(self.mode, ProviderMode::Proxy(_)) {
            let result = self
                .proxy_call(
                    "eth_sendTransaction",
                    json!([{"from": from, "to": to, "data": data}]),
                )
                .await?;
            let raw = result.as_str().ok_or_else(|| {
                BridgeError::Transport("eth_sendTransaction must return hash".to_owned())
            })?;
            return raw
                .parse()
                .map_err(|e| BridgeError::Transport(format!("invalid tx hash: {e}")));
        }

        let mut g = self.guard()?;
        if g.reject_submissions {
            return Err(BridgeError::TransactionRejected(
                "signing request declined".to_owned(),
            ));
        }
        g.submission_seq = g.submission_seq.saturating_add(1);
        let mut seed = Vec::new();
        seed.extend_from_slice(from.as_slice());
        seed.extend_from_slice(to.as_slice());
        seed.extend_from_slice(&data);
        seed.extend_from_slice(&g.submission_seq.to_be_bytes());
        let hash = keccak256(seed);
        if g.revert_next_submission {
            g.revert_next_submission = false;
            g.reverted.push(hash);
        }
        g.submissions.push(SubmittedTx {
            from,
            to,
            data,
            hash,
        });
        Ok(hash)
    }

    async fn proxy_call(&self, method: &str, params: Value) -> Result<Value, BridgeError> {
        let proxy = match &self.mode {
            ProviderMode::Proxy(proxy) => proxy,
            ProviderMode::Disabled(reason) => {
                return Err(BridgeError::WalletUnavailable(reason.clone()))
            }
            ProviderMode::Deterministic => {
                return Err(BridgeError::Transport("rpc proxy not enabled".to_owned()))
            }
        };

        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = proxy
            .client
            .post(&proxy.base_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| BridgeError::Transport(format!("rpc request failed: {e}")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| BridgeError::Transport(format!("rpc json decode failed: {e}")))?;
        if !status.is_success() {
            return Err(BridgeError::Transport(format!(
                "rpc status {status}: {body}"
            )));
        }
        if let Some(err) = body.get("error") {
            return Err(rpc_error(method, err));
        }
        // result is legitimately null for a pending receipt
        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }
}

impl WalletPort for Eip1193Adapter {
    async fn request_accounts(&self) -> Result<Vec<Address>, BridgeError> {
        self.check_mode()?;

        if matches!(self.mode, ProviderMode::Proxy(_)) {
            let result = self.proxy_call("eth_requestAccounts", json!([])).await?;
            let arr = result.as_array().ok_or_else(|| {
                BridgeError::Transport("eth_requestAccounts: array expected".to_owned())
            })?;
            let mut accounts = Vec::with_capacity(arr.len());
            for item in arr {
                let raw = item.as_str().ok_or_else(|| {
                    BridgeError::Transport("eth_requestAccounts: string expected".to_owned())
                })?;
                let parsed: Address = raw
                    .parse()
                    .map_err(|e| BridgeError::Validation(format!("invalid account: {e}")))?;
                accounts.push(parsed);
            }
            return Ok(accounts);
        }

        let g = self.guard()?;
        Ok(g.accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, BridgeError> {
        self.check_mode()?;

        if matches!(self.mode, ProviderMode::Proxy(_)) {
            let result = self.proxy_call("eth_chainId", json!([])).await?;
            return json_chain_id_to_u64(&result);
        }

        let g = self.guard()?;
        Ok(g.chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), BridgeError> {
        self.check_mode()?;

        if matches!(self.mode, ProviderMode::Proxy(_)) {
            self.proxy_call(
                "wallet_switchEthereumChain",
                json!([{"chainId": format!("{chain_id:#x}")}]),
            )
            .await?;
            return Ok(());
        }

        let mut g = self.guard()?;
        if g.accept_chain_switch {
            g.chain_id = chain_id;
            Ok(())
        } else {
            Err(BridgeError::TransactionRejected(
                "chain switch declined by wallet".to_owned(),
            ))
        }
    }

    async fn wait_for_confirmation(&self, hash: B256) -> Result<(), BridgeError> {
        self.check_mode()?;

        if matches!(self.mode, ProviderMode::Proxy(_)) {
            loop {
                let receipt = self
                    .proxy_call("eth_getTransactionReceipt", json!([hash]))
                    .await?;
                if receipt.is_null() {
                    tokio::time::sleep(Duration::from_millis(self.receipt_poll_interval_ms)).await;
                    continue;
                }
                if receipt.get("status").and_then(Value::as_str) == Some("0x0") {
                    return Err(BridgeError::TransactionReverted(format!(
                        "transaction {hash} reverted"
                    )));
                }
                return Ok(());
            }
        }

        let g = self.guard()?;
        if g.reverted.contains(&hash) {
            return Err(BridgeError::TransactionReverted(format!(
                "transaction {hash} reverted"
            )));
        }
        Ok(())
    }
}

fn encode_word(value: DynSolValue) -> Bytes {
    Bytes::from(value.abi_encode())
}

fn rpc_error(method: &str, err: &Value) -> BridgeError {
    let message = err
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown provider error")
        .to_owned();
    match method {
        "eth_call" => BridgeError::ContractRead(message),
        "eth_sendTransaction" | "wallet_switchEthereumChain" => {
            BridgeError::TransactionRejected(message)
        }
        _ => BridgeError::Transport(message),
    }
}

fn json_chain_id_to_u64(value: &Value) -> Result<u64, BridgeError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    let s = value
        .as_str()
        .ok_or_else(|| BridgeError::Validation("chain id must be string or number".to_owned()))?;
    parse_chain_id_str(s)
}

fn parse_chain_id_str(raw: &str) -> Result<u64, BridgeError> {
    if raw.starts_with("0x") || raw.starts_with("0X") {
        u64::from_str_radix(raw.trim_start_matches("0x").trim_start_matches("0X"), 16)
            .map_err(|e| BridgeError::Validation(format!("invalid hex chain id: {e}")))
    } else {
        raw.parse()
            .map_err(|e| BridgeError::Validation(format!("invalid chain id: {e}")))
    }
}
