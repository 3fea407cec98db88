//! Browser engine configuration types.
//!
//! These live outside `#[cfg(feature = "browser")]` so config parsing and
//! serialization work without the browser feature.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Browser engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Proxy server URL (e.g., "socks5://127.0.0.1:1080").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// CDP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Explicit Chrome/Chromium executable (auto-detected when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,

    /// Additional Chrome arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chrome_args: Vec<String>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to existing browser instead of launching one.
    /// Can also be set via BROWSER_URL environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,

    /// User agent presented by the page.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language sent with every request.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            proxy: None,
            timeout: default_timeout(),
            executable: None,
            chrome_args: Vec::new(),
            remote_url: None,
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

impl BrowserEngineConfig {
    /// Apply environment variable overrides.
    ///
    /// - `BROWSER_URL` - Remote Chrome DevTools URL
    /// - `BROWSER_PROXY` - Proxy for browser traffic
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = non_empty_env("BROWSER_URL") {
            self.remote_url = Some(url);
        }
        if let Some(proxy) = non_empty_env("BROWSER_PROXY") {
            self.proxy = Some(proxy);
        }
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn default_headless() -> bool {
    true
}

pub fn default_timeout() -> u64 {
    60
}

pub fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0".to_string()
}

pub fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let config: BrowserEngineConfig = toml::from_str("").unwrap();
        assert_eq!(config, BrowserEngineConfig::default());
        assert!(config.headless);
        assert_eq!(config.timeout, 60);
    }

    #[test]
    fn remote_url_round_trips_through_toml() {
        let config: BrowserEngineConfig =
            toml::from_str("remote_url = \"ws://localhost:9222\"\nheadless = false").unwrap();
        assert_eq!(config.remote_url.as_deref(), Some("ws://localhost:9222"));
        assert!(!config.headless);
    }
}
