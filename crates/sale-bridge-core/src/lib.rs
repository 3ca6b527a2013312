pub mod domain;
pub mod orchestrator;
pub mod ports;
pub mod state_machine;

pub use domain::{
    spend_amount, token_count_from_payload, BridgeConfig, Reply, ReplyTarget, Request,
    SpendPayload,
};
pub use orchestrator::{Bridge, DispatchOutcome};
pub use ports::{BridgeError, ReplyPort, SalePort, SpendTokenPort, WalletPort};
pub use state_machine::{
    phase_transition, PhaseTracker, PhaseTransition, RequestAction, RequestPhase,
};
