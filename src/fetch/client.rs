// src/fetch/client.rs
//!
//! HTTP GET with browser-emulating headers and normalized error strings
//!

use crate::fetch::types::FetchResult;
use crate::fetch::DEFAULT_TIMEOUT_MS;
use crate::ratelimit::DomainThrottle;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, CONTENT_TYPE, DNT,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Fetches pages the way a browser tab would.
///
/// One shared client carries the fixed header set and follows redirects;
/// the deadline is applied per request so a timeout cancels only its own
/// in-flight fetch. Accept-Encoding is negotiated by the client's enabled
/// compression codecs.
pub struct PageFetcher {
    client: reqwest::Client,
    throttle: Arc<DomainThrottle>,
    default_timeout_ms: u64,
}

impl PageFetcher {
    pub fn new(throttle: Arc<DomainThrottle>) -> Result<Self, reqwest::Error> {
        Self::with_default_timeout(throttle, DEFAULT_TIMEOUT_MS)
    }

    pub fn with_default_timeout(
        throttle: Arc<DomainThrottle>,
        default_timeout_ms: u64,
    ) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(UA));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(DNT, HeaderValue::from_static("1"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            throttle,
            default_timeout_ms,
        })
    }

    /// Fetches `url` and returns the page body as text.
    ///
    /// Exactly one attempt per call, no retries. Every failure mode is
    /// reported as a string inside the result; none are fatal.
    pub async fn fetch(&self, url: &str, timeout_ms: Option<u64>) -> FetchResult {
        let timeout_ms = timeout_ms.unwrap_or(self.default_timeout_ms);

        if !self.throttle.check_and_record(url) {
            debug!(url, "fetch denied by domain throttle");
            return FetchResult::err("Rate limited");
        }

        let response = match self
            .client
            .get(url)
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return FetchResult::err(normalize_error(&e)),
        };

        // Redirects were already followed; this is the final status.
        let status = response.status();
        if !status.is_success() {
            return FetchResult::err(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_html(&content_type) {
            // Body is intentionally not read for non-HTML responses.
            return FetchResult::err(format!("Unsupported content type: {content_type}"));
        }

        match response.text().await {
            Ok(body) => FetchResult::ok(body),
            Err(e) => FetchResult::err(normalize_error(&e)),
        }
    }
}

fn is_html(content_type: &str) -> bool {
    content_type
        .parse::<mime::Mime>()
        .map(|m| m.type_() == mime::TEXT && m.subtype() == mime::HTML)
        .unwrap_or(false)
}

/// Maps transport failures onto the small set of user-facing strings the
/// extension shows. Anything unclassified passes through its own text.
fn normalize_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_builder() {
        "Invalid URL or network error".to_string()
    } else if e.is_connect() || e.is_request() {
        "Network error or CORS blocked".to_string()
    } else {
        e.to_string()
    }
}
