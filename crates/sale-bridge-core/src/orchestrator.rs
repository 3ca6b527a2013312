use alloy::primitives::{Address, B256};
use serde_json::Value;

use crate::domain::{
    spend_amount, token_count_from_payload, BridgeConfig, Reply, ReplyTarget, Request,
};
use crate::ports::{BridgeError, ReplyPort, SalePort, SpendTokenPort, WalletPort};
use crate::state_machine::{PhaseTracker, PhaseTransition, RequestAction};

/// Outcome of one dispatched envelope. `terminal` is `None` only when the
/// request was dropped without a reply.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub transitions: Vec<PhaseTransition>,
    pub terminal: Option<Reply>,
}

impl DispatchOutcome {
    fn dropped() -> Self {
        Self {
            transitions: Vec::new(),
            terminal: None,
        }
    }
}

/// The privileged side of the channel: holds the wallet and contract ports
/// and mediates every request from the untrusted caller. Requests share no
/// state; signer, network and precision are re-derived on every flow.
pub struct Bridge<W, T, S, R>
where
    W: WalletPort,
    T: SpendTokenPort,
    S: SalePort,
    R: ReplyPort,
{
    pub wallet: W,
    pub spend_token: T,
    pub sale: S,
    pub postback: R,
    pub config: BridgeConfig,
}

impl<W, T, S, R> Bridge<W, T, S, R>
where
    W: WalletPort,
    T: SpendTokenPort,
    S: SalePort,
    R: ReplyPort,
{
    pub fn new(wallet: W, spend_token: T, sale: S, postback: R, config: BridgeConfig) -> Self {
        Self {
            wallet,
            spend_token,
            sale,
            postback,
            config,
        }
    }

    /// Handle one inbound envelope. Every recognized request yields exactly
    /// one terminal reply to `target`; unrecognized kinds produce nothing.
    pub async fn dispatch(&self, target: &ReplyTarget, raw: &Value) -> DispatchOutcome {
        let Ok(request) = serde_json::from_value::<Request>(raw.clone()) else {
            return DispatchOutcome::dropped();
        };

        let mut tracker = PhaseTracker::new();
        let terminal = match self.run(&mut tracker, target, request).await {
            Ok(reply) => {
                let _ = tracker.apply(RequestAction::Succeed);
                reply
            }
            Err(err) => {
                let _ = tracker.apply(RequestAction::Fail);
                Reply::Error {
                    message: err.to_string(),
                }
            }
        };
        self.postback.deliver(target, terminal.clone());
        DispatchOutcome {
            transitions: tracker.into_transitions(),
            terminal: Some(terminal),
        }
    }

    async fn run(
        &self,
        tracker: &mut PhaseTracker,
        target: &ReplyTarget,
        request: Request,
    ) -> Result<Reply, BridgeError> {
        tracker.apply(RequestAction::Validate)?;
        match request {
            Request::Connect => {
                // A bare connect takes no network precondition.
                tracker.apply(RequestAction::Execute)?;
                let address = self.signer().await?;
                Ok(Reply::Connected { address })
            }
            Request::Approve { payload } => {
                self.postback.deliver(
                    target,
                    Reply::Status {
                        msg: "Approving...".to_owned(),
                    },
                );
                let tokens = token_count_from_payload(payload.as_ref());
                let hash = self.approve_flow(tracker, tokens).await?;
                Ok(Reply::Approved { hash })
            }
            Request::Buy { payload } => {
                self.postback.deliver(
                    target,
                    Reply::Status {
                        msg: "Buying...".to_owned(),
                    },
                );
                let tokens = token_count_from_payload(payload.as_ref());
                let hash = self.buy_flow(tracker, tokens).await?;
                Ok(Reply::Bought { hash })
            }
        }
    }

    /// Allowance grant: approve the sale contract to pull the spend amount.
    async fn approve_flow(
        &self,
        tracker: &mut PhaseTracker,
        token_count: u64,
    ) -> Result<B256, BridgeError> {
        self.ensure_network(tracker).await?;
        tracker.apply(RequestAction::Execute)?;
        let owner = self.signer().await?;
        let decimals = self.spend_token.decimals().await?;
        let amount = spend_amount(token_count, self.config.price_per_token, decimals)?;
        let hash = self
            .spend_token
            .approve(owner, self.config.sale_address, amount)
            .await?;
        self.wallet.wait_for_confirmation(hash).await?;
        Ok(hash)
    }

    /// Purchase: the amount is recomputed from scratch; no allowance check
    /// happens here, an insufficient allowance surfaces as an on-chain
    /// failure.
    async fn buy_flow(
        &self,
        tracker: &mut PhaseTracker,
        token_count: u64,
    ) -> Result<B256, BridgeError> {
        self.ensure_network(tracker).await?;
        tracker.apply(RequestAction::Execute)?;
        let buyer = self.signer().await?;
        let decimals = self.spend_token.decimals().await?;
        let amount = spend_amount(token_count, self.config.price_per_token, decimals)?;
        let hash = self.sale.buy(buyer, amount).await?;
        self.wallet.wait_for_confirmation(hash).await?;
        Ok(hash)
    }

    /// One corrective switch attempt, then a definitive answer. The switch
    /// request itself may be declined by the wallet; only the re-read of the
    /// chain id decides the outcome.
    async fn ensure_network(&self, tracker: &mut PhaseTracker) -> Result<(), BridgeError> {
        let required = self.config.chain_id;
        let active = self.wallet.chain_id().await?;
        if active == required {
            return Ok(());
        }

        tracker.apply(RequestAction::BeginNetworkFix)?;
        let _ = self.wallet.switch_chain(required).await;
        let active = self.wallet.chain_id().await?;
        if active == required {
            tracker.apply(RequestAction::NetworkFixed)?;
            return Ok(());
        }
        Err(BridgeError::WrongNetwork {
            expected: required,
            actual: active,
        })
    }

    async fn signer(&self) -> Result<Address, BridgeError> {
        self.wallet
            .request_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BridgeError::WalletUnavailable("wallet returned no accounts".to_owned()))
    }
}
