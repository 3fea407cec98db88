//! Errors raised by page automation backends.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while driving a page.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Timed out after {:.1}s waiting for {what}", after.as_secs_f64())]
    Timeout { what: String, after: Duration },

    #[error("Invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Element operation failed: {0}")]
    Element(String),

    #[error("Not supported by this page backend: {0}")]
    Unsupported(&'static str),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AutomationError {
    /// Build a timeout error for the given condition.
    pub fn timeout(what: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            what: what.into(),
            after,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type AutomationResult<T> = Result<T, AutomationError>;
