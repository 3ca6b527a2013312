use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use sale_bridge_core::{Reply, ReplyPort, ReplyTarget};

/// Outbound frame as written to the transport: the reply target echoed next
/// to the `{type, payload}` envelope.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundFrame {
    pub requester: String,
    pub origin: String,
    #[serde(flatten)]
    pub reply: Reply,
}

/// Fire-and-forget postback over an in-process channel. Serialization and
/// send failures are swallowed: a dead reply channel must not fail the
/// request that produced the reply.
#[derive(Debug, Clone)]
pub struct PostbackAdapter {
    sender: UnboundedSender<String>,
}

impl PostbackAdapter {
    pub fn new(sender: UnboundedSender<String>) -> Self {
        Self { sender }
    }
}

impl ReplyPort for PostbackAdapter {
    fn deliver(&self, target: &ReplyTarget, reply: Reply) {
        let frame = OutboundFrame {
            requester: target.requester.clone(),
            origin: target.origin.clone(),
            reply,
        };
        if let Ok(line) = serde_json::to_string(&frame) {
            let _ = self.sender.send(line);
        }
    }
}
