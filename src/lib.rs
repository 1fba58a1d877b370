//! pagebridge: background relay for the page-scraper extension.
//!
//! Extension contexts (content script, side panel) connect over a loopback
//! WebSocket. The relay answers `fetchContent` requests with a
//! rate-limited, CORS-free page fetch and forwards status/progress
//! messages from the content script to panel peers.

pub mod bridge;
pub mod config;
pub mod fetch;
pub mod ratelimit;
pub mod relay;

use crate::config::RelayConfig;
use crate::fetch::PageFetcher;
use crate::ratelimit::DomainThrottle;
use std::sync::Arc;

/// Long-lived services shared by every connection.
pub struct RelayState {
    pub fetcher: PageFetcher,
    pub throttle: Arc<DomainThrottle>,
}

impl RelayState {
    pub fn new(config: &RelayConfig) -> Result<Self, reqwest::Error> {
        let throttle = Arc::new(DomainThrottle::new(config.ratelimit.min_interval()));
        let fetcher =
            PageFetcher::with_default_timeout(throttle.clone(), config.fetch.default_timeout_ms)?;

        Ok(Self { fetcher, throttle })
    }
}
