#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use alloy::primitives::{Address, B256, U256};

use sale_bridge_core::{
    Bridge, BridgeConfig, BridgeError, Reply, ReplyPort, ReplyTarget, SalePort, SpendTokenPort,
    WalletPort,
};

pub struct FakeWalletState {
    pub available: bool,
    pub accounts: Vec<Address>,
    pub chain_id: u64,
    pub accept_switch: bool,
    pub chain_reads: u64,
    pub switch_requests: u64,
}

pub struct FakeWallet {
    pub state: Mutex<FakeWalletState>,
}

impl FakeWallet {
    pub fn on_chain(chain_id: u64) -> Self {
        Self {
            state: Mutex::new(FakeWalletState {
                available: true,
                accounts: vec![signer_address()],
                chain_id,
                accept_switch: true,
                chain_reads: 0,
                switch_requests: 0,
            }),
        }
    }

    pub fn unavailable() -> Self {
        let wallet = Self::on_chain(0);
        wallet.state.lock().expect("wallet state").available = false;
        wallet
    }

    pub fn deny_switch(self) -> Self {
        self.state.lock().expect("wallet state").accept_switch = false;
        self
    }

    pub fn chain_reads(&self) -> u64 {
        self.state.lock().expect("wallet state").chain_reads
    }

    pub fn switch_requests(&self) -> u64 {
        self.state.lock().expect("wallet state").switch_requests
    }
}

impl WalletPort for FakeWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, BridgeError> {
        let g = self.state.lock().expect("wallet state");
        if !g.available {
            return Err(BridgeError::WalletUnavailable(
                "no wallet provider found".to_owned(),
            ));
        }
        Ok(g.accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, BridgeError> {
        let mut g = self.state.lock().expect("wallet state");
        if !g.available {
            return Err(BridgeError::WalletUnavailable(
                "no wallet provider found".to_owned(),
            ));
        }
        g.chain_reads += 1;
        Ok(g.chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), BridgeError> {
        let mut g = self.state.lock().expect("wallet state");
        g.switch_requests += 1;
        if g.accept_switch {
            g.chain_id = chain_id;
            Ok(())
        } else {
            Err(BridgeError::TransactionRejected(
                "chain switch declined".to_owned(),
            ))
        }
    }

    async fn wait_for_confirmation(&self, _hash: B256) -> Result<(), BridgeError> {
        Ok(())
    }
}

pub struct FakeSpendToken {
    pub decimals: Option<u8>,
    pub approvals: Mutex<Vec<(Address, Address, U256)>>,
    pub reads: Mutex<Vec<&'static str>>,
    seq: AtomicU64,
}

impl FakeSpendToken {
    pub fn with_decimals(decimals: u8) -> Self {
        Self {
            decimals: Some(decimals),
            approvals: Mutex::new(Vec::new()),
            reads: Mutex::new(Vec::new()),
            seq: AtomicU64::new(0),
        }
    }

    pub fn unreadable() -> Self {
        let mut token = Self::with_decimals(0);
        token.decimals = None;
        token
    }

    pub fn read_count(&self) -> usize {
        self.reads.lock().expect("token reads").len()
    }

    pub fn approvals(&self) -> Vec<(Address, Address, U256)> {
        self.approvals.lock().expect("token approvals").clone()
    }
}

impl SpendTokenPort for FakeSpendToken {
    async fn decimals(&self) -> Result<u8, BridgeError> {
        self.reads.lock().expect("token reads").push("decimals");
        self.decimals
            .ok_or_else(|| BridgeError::ContractRead("decimals() call failed".to_owned()))
    }

    async fn balance_of(&self, _owner: Address) -> Result<U256, BridgeError> {
        self.reads.lock().expect("token reads").push("balance_of");
        Ok(U256::ZERO)
    }

    async fn allowance(&self, _owner: Address, _spender: Address) -> Result<U256, BridgeError> {
        self.reads.lock().expect("token reads").push("allowance");
        Ok(U256::ZERO)
    }

    async fn approve(
        &self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<B256, BridgeError> {
        self.approvals
            .lock()
            .expect("token approvals")
            .push((owner, spender, amount));
        Ok(next_hash(&self.seq, 0xA0))
    }
}

pub struct FakeSale {
    pub purchases: Mutex<Vec<(Address, U256)>>,
    seq: AtomicU64,
}

impl Default for FakeSale {
    fn default() -> Self {
        Self {
            purchases: Mutex::new(Vec::new()),
            seq: AtomicU64::new(0),
        }
    }
}

impl FakeSale {
    pub fn purchases(&self) -> Vec<(Address, U256)> {
        self.purchases.lock().expect("sale purchases").clone()
    }
}

impl SalePort for FakeSale {
    async fn buy(&self, buyer: Address, amount: U256) -> Result<B256, BridgeError> {
        self.purchases
            .lock()
            .expect("sale purchases")
            .push((buyer, amount));
        Ok(next_hash(&self.seq, 0xB0))
    }

    async fn token_price(&self) -> Result<U256, BridgeError> {
        Ok(U256::from(1000u64))
    }
}

#[derive(Default)]
pub struct RecordingPostback {
    pub deliveries: Mutex<Vec<(ReplyTarget, Reply)>>,
}

impl RecordingPostback {
    pub fn replies(&self) -> Vec<Reply> {
        self.deliveries
            .lock()
            .expect("postback deliveries")
            .iter()
            .map(|(_, reply)| reply.clone())
            .collect()
    }
}

impl ReplyPort for RecordingPostback {
    fn deliver(&self, target: &ReplyTarget, reply: Reply) {
        self.deliveries
            .lock()
            .expect("postback deliveries")
            .push((target.clone(), reply));
    }
}

pub type TestBridge = Bridge<FakeWallet, FakeSpendToken, FakeSale, RecordingPostback>;

pub fn test_config() -> BridgeConfig {
    BridgeConfig {
        chain_id: 11155111,
        sale_address: sale_address(),
        spend_token_address: spend_token_address(),
        price_per_token: U256::from(1000u64),
    }
}

pub fn bridge(wallet: FakeWallet, spend_token: FakeSpendToken, sale: FakeSale) -> TestBridge {
    Bridge::new(
        wallet,
        spend_token,
        sale,
        RecordingPostback::default(),
        test_config(),
    )
}

pub fn target() -> ReplyTarget {
    ReplyTarget {
        requester: "frame-1".to_owned(),
        origin: "https://shop.example".to_owned(),
    }
}

pub fn signer_address() -> Address {
    "0x1000000000000000000000000000000000000001"
        .parse()
        .expect("valid signer address")
}

pub fn sale_address() -> Address {
    "0x000000000000000000000000000000000000BEEF"
        .parse()
        .expect("valid sale address")
}

pub fn spend_token_address() -> Address {
    "0x000000000000000000000000000000000000CAFE"
        .parse()
        .expect("valid token address")
}

fn next_hash(seq: &AtomicU64, tag: u8) -> B256 {
    let n = seq.fetch_add(1, Ordering::SeqCst) + 1;
    let mut bytes = [0u8; 32];
    bytes[0] = tag;
    bytes[24..].copy_from_slice(&n.to_be_bytes());
    B256::from(bytes)
}
