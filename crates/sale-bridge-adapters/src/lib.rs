pub mod config;
pub mod contracts;
pub mod eip1193;
pub mod reply;

pub use config::{AdapterConfig, RuntimeProfile};
pub use contracts::{SaleAdapter, SpendTokenAdapter};
pub use eip1193::{Eip1193Adapter, SubmittedTx};
pub use reply::{OutboundFrame, PostbackAdapter};
