//! Timeout and polling budgets for page interactions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Wait budgets used by both pipelines.
///
/// These bound condition polling; nothing sleeps for the full budget unless
/// the awaited condition never becomes true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    /// Delay between condition probes.
    pub poll_interval_ms: u64,
    /// Page navigation timeout.
    pub navigation_timeout_secs: u64,
    /// How long the first listing tile may take to appear.
    pub tile_timeout_secs: u64,
    /// How long the product name may take to appear on a detail page.
    pub detail_timeout_secs: u64,
    /// How long to look for a consent overlay.
    pub consent_timeout_secs: u64,
    /// Pause after dismissing a consent overlay.
    pub consent_pause_ms: u64,
    /// Growth budget after clicking the load-more control.
    pub load_more_wait_ms: u64,
    /// Growth budget after a scroll step.
    pub scroll_wait_ms: u64,
    /// Upper bound for waiting on late tiles once expansion ends.
    pub settle_timeout_secs: u64,
    /// Pause after opening the product details disclosure.
    pub disclosure_pause_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            navigation_timeout_secs: 60,
            tile_timeout_secs: 30,
            detail_timeout_secs: 15,
            consent_timeout_secs: 5,
            consent_pause_ms: 1000,
            load_more_wait_ms: 3000,
            scroll_wait_ms: 1000,
            settle_timeout_secs: 10,
            disclosure_pause_ms: 1000,
        }
    }
}

impl Pacing {
    /// Zero budgets everywhere: each condition is probed exactly once.
    pub fn instant() -> Self {
        Self {
            poll_interval_ms: 0,
            navigation_timeout_secs: 0,
            tile_timeout_secs: 0,
            detail_timeout_secs: 0,
            consent_timeout_secs: 0,
            consent_pause_ms: 0,
            load_more_wait_ms: 0,
            scroll_wait_ms: 0,
            settle_timeout_secs: 0,
            disclosure_pause_ms: 0,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn tile_timeout(&self) -> Duration {
        Duration::from_secs(self.tile_timeout_secs)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }

    pub fn consent_timeout(&self) -> Duration {
        Duration::from_secs(self.consent_timeout_secs)
    }

    pub fn consent_pause(&self) -> Duration {
        Duration::from_millis(self.consent_pause_ms)
    }

    pub fn load_more_wait(&self) -> Duration {
        Duration::from_millis(self.load_more_wait_ms)
    }

    pub fn scroll_wait(&self) -> Duration {
        Duration::from_millis(self.scroll_wait_ms)
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_secs(self.settle_timeout_secs)
    }

    pub fn disclosure_pause(&self) -> Duration {
        Duration::from_millis(self.disclosure_pause_ms)
    }
}
