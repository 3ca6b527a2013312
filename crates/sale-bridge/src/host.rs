//! Host loop: wires adapters into the orchestrator and serves the message
//! channel as newline-delimited JSON on stdin/stdout.
//! This must remain the only transport-facing boundary of the bridge.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use sale_bridge_adapters::{
    AdapterConfig, Eip1193Adapter, PostbackAdapter, SaleAdapter, SpendTokenAdapter,
};
use sale_bridge_core::{Bridge, ReplyTarget};

pub type SaleBridge = Bridge<Eip1193Adapter, SpendTokenAdapter, SaleAdapter, PostbackAdapter>;

pub fn build_bridge(config: &AdapterConfig, sender: mpsc::UnboundedSender<String>) -> SaleBridge {
    let provider = Eip1193Adapter::with_config(config.clone());
    Bridge::new(
        provider.clone(),
        SpendTokenAdapter::new(provider.clone(), config.spend_token_address),
        SaleAdapter::new(provider, config.sale_address),
        PostbackAdapter::new(sender),
        config.bridge_config(),
    )
}

pub async fn serve() -> eyre::Result<()> {
    let config = AdapterConfig::from_env();
    let (sender, mut outbound) = mpsc::unbounded_channel::<String>();
    let bridge = Arc::new(build_bridge(&config, sender));

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = outbound.recv().await {
            if stdout.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if stdout.write_all(b"\n").await.is_err() {
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    tracing::info!(chain_id = config.chain_id, "sale-bridge serving on stdio");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Ok(raw) = serde_json::from_str::<Value>(&line) else {
            tracing::debug!("dropping unparseable frame");
            continue;
        };
        let Some(target) = reply_target(&raw) else {
            tracing::debug!("dropping frame without requester");
            continue;
        };

        let bridge = Arc::clone(&bridge);
        tokio::spawn(async move {
            let outcome = bridge.dispatch(&target, &raw).await;
            match outcome.terminal {
                Some(reply) => tracing::debug!(
                    requester = %target.requester,
                    ?reply,
                    transitions = outcome.transitions.len(),
                    "request settled"
                ),
                None => tracing::debug!(requester = %target.requester, "request dropped"),
            }
        });
    }

    drop(bridge);
    writer.await?;
    Ok(())
}

fn reply_target(raw: &Value) -> Option<ReplyTarget> {
    let requester = raw.get("requester")?.as_str()?.to_owned();
    let origin = raw
        .get("origin")
        .and_then(Value::as_str)
        .unwrap_or("*")
        .to_owned();
    Some(ReplyTarget { requester, origin })
}
