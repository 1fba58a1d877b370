// src/bridge/server.rs
//!
//! Loopback WebSocket server standing in for the browser runtime's
//! messaging channel.
//!
//! One task per connection with a dedicated writer task; peers declare a
//! role with their first `hello` and are dropped from the registry on
//! disconnect.
//!

use crate::bridge::error::BridgeError;
use crate::relay::{dispatch, Dispatch, InboundMessage, PeerRole, SenderContext};
use crate::RelayState;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// Default loopback address the bridge binds.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:19456";

/// A connected extension context.
struct ConnectedPeer {
    role: PeerRole,
    tx: mpsc::UnboundedSender<Message>,
}

type PeerMap = Arc<RwLock<HashMap<u64, ConnectedPeer>>>;

/// The relay's host-integration layer.
pub struct BridgeServer {
    state: Arc<RelayState>,
    peers: PeerMap,
    next_peer_id: Arc<AtomicU64>,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl BridgeServer {
    pub fn new(state: Arc<RelayState>) -> Self {
        Self {
            state,
            peers: Arc::new(RwLock::new(HashMap::new())),
            next_peer_id: Arc::new(AtomicU64::new(1)),
            local_addr: None,
            shutdown_tx: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    /// Address the server is bound to while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Binds `listen_addr` and starts serving; returns the bound address
    /// (useful when binding port 0).
    pub async fn start(&mut self, listen_addr: &str) -> Result<SocketAddr, BridgeError> {
        if self.shutdown_tx.is_some() {
            return Err(BridgeError::AlreadyRunning);
        }

        let listener = TcpListener::bind(listen_addr).await?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "bridge listening");

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        self.shutdown_tx = Some(shutdown_tx);
        self.local_addr = Some(local_addr);

        let peers = self.peers.clone();
        let state = self.state.clone();
        let next_peer_id = self.next_peer_id.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, addr)) => {
                                let peer_id = next_peer_id.fetch_add(1, Ordering::SeqCst);
                                debug!(peer = peer_id, %addr, "new connection");
                                let peers = peers.clone();
                                let state = state.clone();

                                tokio::spawn(async move {
                                    if let Err(e) =
                                        handle_connection(stream, peer_id, peers, state).await
                                    {
                                        warn!(peer = peer_id, error = %e, "connection error");
                                    }
                                });
                            }
                            Err(e) => {
                                warn!(error = %e, "accept error");
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("bridge shutdown signal received");
                        break;
                    }
                }
            }
        });

        Ok(local_addr)
    }

    /// Stops accepting and drops all connected peers.
    pub async fn stop(&mut self) -> Result<(), BridgeError> {
        let shutdown_tx = self.shutdown_tx.take().ok_or(BridgeError::NotRunning)?;
        let _ = shutdown_tx.send(()).await;

        self.peers.write().await.clear();
        self.local_addr = None;
        info!("bridge stopped");
        Ok(())
    }
}

/// Handles a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    peer_id: u64,
    peers: PeerMap,
    state: Arc<RelayState>,
) -> Result<(), BridgeError> {
    let ws_stream = accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();

    // Channel for sending messages to this peer; the writer task owns the
    // sink so dispatch and pass-through can both reach it.
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if write.send(msg).await.is_err() {
                break;
            }
        }
    });

    peers.write().await.insert(
        peer_id,
        ConnectedPeer {
            role: PeerRole::Unknown,
            tx: tx.clone(),
        },
    );

    while let Some(msg_result) = read.next().await {
        let msg = match msg_result {
            Ok(m) => m,
            Err(e) => {
                warn!(peer = peer_id, error = %e, "read error");
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                handle_text(text.as_str(), peer_id, &tx, &peers, &state).await?;
            }

            Message::Ping(data) => {
                tx.send(Message::Pong(data))?;
            }

            Message::Close(_) => {
                break;
            }

            // Binary frames, pongs and raw frames are not part of the
            // protocol.
            _ => {}
        }
    }

    peers.write().await.remove(&peer_id);
    debug!(peer = peer_id, "peer disconnected");

    write_task.abort();

    Ok(())
}

/// Parses one text frame and acts on the dispatch outcome.
async fn handle_text(
    text: &str,
    peer_id: u64,
    tx: &mpsc::UnboundedSender<Message>,
    peers: &PeerMap,
    state: &Arc<RelayState>,
) -> Result<(), BridgeError> {
    let raw: JsonValue = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            warn!(peer = peer_id, error = %e, "parse error");
            let reply = serde_json::json!({ "error": format!("parse error: {e}") });
            tx.send(Message::Text(reply.to_string().into()))?;
            return Ok(());
        }
    };

    let message: InboundMessage = match serde_json::from_value(raw.clone()) {
        Ok(message) => message,
        Err(_) => {
            // Unrecognized actions get logged, never answered.
            let action = raw
                .get("action")
                .and_then(|a| a.as_str())
                .unwrap_or("<missing>");
            warn!(peer = peer_id, action, "unrecognized action");
            return Ok(());
        }
    };

    // Hello mutates the registry; everything else goes through dispatch.
    if let InboundMessage::Hello { role } = message {
        if let Some(peer) = peers.write().await.get_mut(&peer_id) {
            peer.role = role;
        }
        debug!(peer = peer_id, ?role, "peer registered");
        return Ok(());
    }

    let ctx = {
        let peers_guard = peers.read().await;
        SenderContext {
            peer_id,
            role: peers_guard
                .get(&peer_id)
                .map(|p| p.role)
                .unwrap_or(PeerRole::Unknown),
        }
    };

    match message {
        // Fetches run in their own task so a slow page never blocks this
        // peer's read loop or any other peer.
        InboundMessage::FetchContent { .. } => {
            let state = Arc::clone(state);
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Dispatch::Reply(payload) = dispatch(message, &ctx, &state).await {
                    let _ = tx.send(Message::Text(payload.to_string().into()));
                }
            });
        }

        other => match dispatch(other, &ctx, state).await {
            Dispatch::Reply(payload) => {
                tx.send(Message::Text(payload.to_string().into()))?;
            }
            Dispatch::Forward => {
                forward_to_panels(peers, peer_id, text).await;
            }
            Dispatch::Ignored => {}
        },
    }

    Ok(())
}

/// Sends the original text, unmodified, to every panel peer.
async fn forward_to_panels(peers: &PeerMap, sender_id: u64, text: &str) {
    let peers_guard = peers.read().await;
    for (id, peer) in peers_guard.iter() {
        if *id == sender_id || peer.role != PeerRole::Panel {
            continue;
        }
        // A closed peer is cleaned up by its own connection task.
        let _ = peer.tx.send(Message::Text(text.to_owned().into()));
    }
}
