// src/config.rs
//!
//! Runtime configuration
//!
//! Loaded from an optional TOML file; every field is defaulted so the
//! binary runs without one.
//!

use crate::bridge::DEFAULT_LISTEN_ADDR;
use crate::fetch::DEFAULT_TIMEOUT_MS;
use crate::ratelimit::{ENTRY_RETENTION, MIN_FETCH_INTERVAL, SWEEP_INTERVAL};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    pub bridge: BridgeConfig,
    pub fetch: FetchConfig,
    pub ratelimit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Loopback address the WebSocket server binds.
    pub listen_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Deadline applied when a request does not carry its own timeout.
    pub default_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateLimitConfig {
    pub min_interval_ms: u64,
    pub retention_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: MIN_FETCH_INTERVAL.as_millis() as u64,
            retention_secs: ENTRY_RETENTION.as_secs(),
            sweep_interval_secs: SWEEP_INTERVAL.as_secs(),
        }
    }
}

impl RateLimitConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl RelayConfig {
    /// Reads the config file at `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RelayConfig::load(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.bridge.listen_addr, DEFAULT_LISTEN_ADDR);
        assert_eq!(config.fetch.default_timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.ratelimit.min_interval(), MIN_FETCH_INTERVAL);
        assert_eq!(config.ratelimit.retention(), ENTRY_RETENTION);
        assert_eq!(config.ratelimit.sweep_interval(), SWEEP_INTERVAL);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pagebridge.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[ratelimit]\nmin_interval_ms = 250").unwrap();

        let config = RelayConfig::load(&path).unwrap();
        assert_eq!(config.ratelimit.min_interval(), Duration::from_millis(250));
        assert_eq!(config.ratelimit.retention(), ENTRY_RETENTION);
        assert_eq!(config.bridge.listen_addr, DEFAULT_LISTEN_ADDR);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pagebridge.toml");
        std::fs::write(&path, "[fetch]\ntimeout = 1\n").unwrap();

        assert!(matches!(
            RelayConfig::load(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
