// src/ratelimit/sweeper.rs
//!
//! Background sweep keeping the throttle map bounded
//!

use super::DomainThrottle;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Handle to the periodic sweep task.
pub struct ThrottleSweeper {
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl ThrottleSweeper {
    /// Spawns a task that purges stale throttle entries on a fixed cadence.
    pub fn spawn(
        throttle: Arc<DomainThrottle>,
        interval: Duration,
        retention: Duration,
    ) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; skip it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = throttle.sweep(retention);
                        if removed > 0 {
                            debug!(removed, "purged stale throttle entries");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("sweeper shutdown signal received");
                        break;
                    }
                }
            }
        });

        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Signals the task to stop and waits for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.handle.await;
    }
}
