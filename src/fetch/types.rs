// src/fetch/types.rs
//!
//! Wire types for the fetch path
//!

use serde::{Deserialize, Serialize};

/// Result of a single page fetch, as delivered to the requesting context.
///
/// Exactly one side carries information: a present `error` implies an
/// empty `content`. `error` is serialized as an explicit `null` on success
/// because extension-side callers check it with `result.error === null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    pub content: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl FetchResult {
    pub fn ok(content: String) -> Self {
        Self {
            content,
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            error: Some(message.into()),
        }
    }
}
