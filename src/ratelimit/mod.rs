// src/ratelimit/mod.rs
//!
//! Rate limit module
//!
//! A process-wide map from hostname to the instant of the last permitted
//! fetch. The gate allows at most one fetch per host per interval; a
//! background sweep drops entries old enough that they can no longer
//! influence a gate decision.
//!

mod sweeper;
#[cfg(test)]
mod tests;

pub use sweeper::ThrottleSweeper;

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Minimum spacing between permitted fetches against one host.
pub const MIN_FETCH_INTERVAL: Duration = Duration::from_millis(1000);

/// Entries untouched for this long are dropped by the sweeper.
pub const ENTRY_RETENTION: Duration = Duration::from_secs(60 * 60);

/// Cadence of the background sweep.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Per-domain fetch gate with explicit `check`/`record`/`sweep` operations.
///
/// Constructed once at startup and shared via `Arc`; the map is the only
/// mutable state in the relay. Sweeping bounds memory, it never changes a
/// gate decision.
#[derive(Debug)]
pub struct DomainThrottle {
    min_interval: Duration,
    last_fetch: RwLock<HashMap<String, Instant>>,
}

impl Default for DomainThrottle {
    fn default() -> Self {
        Self::new(MIN_FETCH_INTERVAL)
    }
}

impl DomainThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_fetch: RwLock::new(HashMap::new()),
        }
    }

    /// Returns true when a fetch against `url`'s host is currently allowed,
    /// recording the attempt as a side effect.
    ///
    /// URLs without a parseable hostname bypass the gate and record
    /// nothing (fail-open); the fetch path is the one that reports them.
    pub fn check_and_record(&self, url: &str) -> bool {
        self.check_and_record_at(url, Instant::now())
    }

    fn check_and_record_at(&self, url: &str, now: Instant) -> bool {
        let host = match url::Url::parse(url) {
            Ok(parsed) => match parsed.host_str() {
                Some(host) => host.to_string(),
                None => return true,
            },
            Err(_) => return true,
        };

        {
            let last_fetch = self.last_fetch.read().unwrap();
            if let Some(last) = last_fetch.get(&host) {
                if now.duration_since(*last) < self.min_interval {
                    return false;
                }
            }
        }

        let mut last_fetch = self.last_fetch.write().unwrap();
        last_fetch.insert(host, now);
        true
    }

    /// Drops entries older than `retention`; returns how many were removed.
    pub fn sweep(&self, retention: Duration) -> usize {
        self.sweep_at(retention, Instant::now())
    }

    fn sweep_at(&self, retention: Duration, now: Instant) -> usize {
        let mut last_fetch = self.last_fetch.write().unwrap();
        let before = last_fetch.len();
        last_fetch.retain(|_, stamp| now.duration_since(*stamp) < retention);
        before - last_fetch.len()
    }

    /// Number of hosts currently tracked.
    pub fn tracked_hosts(&self) -> usize {
        self.last_fetch.read().unwrap().len()
    }
}
