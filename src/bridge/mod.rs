// src/bridge/mod.rs
//!
//! Bridge module
//!
//! Host integration: a loopback WebSocket server that extension contexts
//! connect to in place of the browser runtime's messaging channel. All
//! routing decisions live in the relay module; this layer only moves
//! frames.
//!

mod error;
mod server;

pub use error::BridgeError;
pub use server::{BridgeServer, DEFAULT_LISTEN_ADDR};
