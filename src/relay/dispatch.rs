// src/relay/dispatch.rs
//!
//! Host-free routing of inbound messages
//!

use crate::relay::protocol::{fetch_reply, ping_reply, InboundMessage, PeerRole, SenderContext};
use crate::RelayState;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

/// What the bridge layer should do with an inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Send this payload back to the sender.
    Reply(JsonValue),
    /// Forward the original text to panel peers; no reply to the sender.
    Forward,
    /// Consume silently (already logged where warranted).
    Ignored,
}

/// Routes one inbound message.
///
/// The relay holds no state of its own between invocations; the outbound
/// fetch is the only suspension point. Concurrent calls for independent
/// messages may overlap freely.
pub async fn dispatch(
    message: InboundMessage,
    ctx: &SenderContext,
    state: &RelayState,
) -> Dispatch {
    match message {
        InboundMessage::FetchContent {
            url,
            timeout,
            request_id,
        } => {
            let result = state.fetcher.fetch(&url, timeout).await;
            Dispatch::Reply(fetch_reply(&result, request_id.as_deref()))
        }

        InboundMessage::BackgroundPing => Dispatch::Reply(ping_reply()),

        msg if msg.is_pass_through() => {
            if ctx.role == PeerRole::ContentScript {
                Dispatch::Forward
            } else {
                debug!(
                    peer = ctx.peer_id,
                    action = ?msg,
                    "status action from a non-content-script peer, dropping"
                );
                Dispatch::Ignored
            }
        }

        // Role changes are applied by the bridge before dispatch, so a
        // hello reaching this point needs no further handling.
        InboundMessage::Hello { .. } => Dispatch::Ignored,

        other => {
            warn!(peer = ctx.peer_id, action = ?other, "unhandled action");
            Dispatch::Ignored
        }
    }
}
