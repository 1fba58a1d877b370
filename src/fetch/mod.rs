// src/fetch/mod.rs
//!
//! Fetch module
//!
//! Performs CORS-free page fetches on behalf of extension contexts, with
//! browser-emulating headers, a per-request deadline, and per-domain
//! throttling.
//!

mod client;
mod types;

pub use client::PageFetcher;
pub use types::FetchResult;

/// Default deadline for a single page fetch, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
