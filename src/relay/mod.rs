// src/relay/mod.rs
//!
//! Relay module
//!
//! Routes action-tagged messages from extension contexts: `fetchContent`
//! goes to the fetch wrapper, a fixed allow-list of status actions is
//! forwarded verbatim from content scripts to panels, `backgroundPing`
//! answers a liveness payload, and anything else is logged and dropped.
//!
//! Dispatch is host-free; all socket I/O stays in the bridge layer.
//!

mod dispatch;
mod protocol;

pub use dispatch::{dispatch, Dispatch};
pub use protocol::{
    fetch_reply, ping_reply, InboundMessage, PeerRole, SenderContext, PING_STATUS,
};
