// src/relay/protocol.rs
//!
//! Message protocol between extension contexts and the relay
//!

use crate::fetch::FetchResult;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Reply payload for `backgroundPing`.
pub const PING_STATUS: &str = "background active";

/// Role a peer declares with its `hello` message. Peers start out
/// `Unknown` and stay that way if they never introduce themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PeerRole {
    ContentScript,
    Panel,
    Unknown,
}

/// Who sent an inbound message, as known to the bridge layer.
#[derive(Debug, Clone)]
pub struct SenderContext {
    pub peer_id: u64,
    pub role: PeerRole,
}

/// Inbound messages, tagged by `action`.
///
/// Unit variants tolerate extra payload fields; the relay never inspects
/// pass-through payloads, the bridge forwards the original text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum InboundMessage {
    /// Peer introduces itself. Content-script peers gain pass-through
    /// rights; the bridge applies the role before dispatch.
    Hello { role: PeerRole },
    /// Fetch a page on behalf of the sender. `request_id` is echoed in the
    /// reply so callers can correlate over a shared socket.
    FetchContent {
        url: String,
        #[serde(default)]
        timeout: Option<u64>,
        #[serde(default, rename = "requestId", skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    /// Liveness check.
    BackgroundPing,
    // Status actions a content script emits for the panel to consume.
    ScrapingComplete,
    ScrapingError,
    ProgressUpdate,
    QueryError,
}

impl InboundMessage {
    /// Actions the relay forwards to panel peers instead of answering.
    pub fn is_pass_through(&self) -> bool {
        matches!(
            self,
            InboundMessage::ScrapingComplete
                | InboundMessage::ScrapingError
                | InboundMessage::ProgressUpdate
                | InboundMessage::QueryError
        )
    }
}

/// Fixed liveness payload.
pub fn ping_reply() -> JsonValue {
    json!({ "status": PING_STATUS })
}

/// Reply payload for a `fetchContent` request, echoing the request id
/// when the caller supplied one.
pub fn fetch_reply(result: &FetchResult, request_id: Option<&str>) -> JsonValue {
    let mut reply = json!({
        "content": result.content.clone(),
        "error": result.error.clone(),
    });
    if let Some(id) = request_id {
        reply["requestId"] = json!(id);
    }
    reply
}
