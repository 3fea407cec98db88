//! Page automation capability consumed by the harvesting pipelines.
//!
//! The pipelines never talk to a browser directly. They drive anything that
//! implements [`PageAutomation`]: a live Chromium tab (see
//! [`crate::browser::ChromiumPage`]) or a saved HTML document
//! ([`SnapshotPage`]).

mod error;
mod snapshot;
mod wait;

pub use error::{AutomationError, AutomationResult};
pub use snapshot::{SnapshotElement, SnapshotPage};
pub use wait::{wait_for_selector, wait_until};

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

/// Operations a page backend must provide.
///
/// Element handles are opaque to the pipelines; they are only ever passed
/// back into the backend that produced them.
#[async_trait]
pub trait PageAutomation: Send + Sync {
    /// Handle to an element on the current page.
    type Element: Send + Sync;

    /// Navigate to `url`, failing if the page does not load within `timeout`.
    async fn navigate(&self, url: &str, timeout: Duration) -> AutomationResult<()>;

    /// First element matching `selector`, if any.
    async fn query(&self, selector: &str) -> AutomationResult<Option<Self::Element>>;

    /// All elements matching `selector`, in document order.
    async fn query_all(&self, selector: &str) -> AutomationResult<Vec<Self::Element>>;

    /// First descendant of `scope` matching `selector`.
    async fn query_within(
        &self,
        scope: &Self::Element,
        selector: &str,
    ) -> AutomationResult<Option<Self::Element>>;

    /// All descendants of `scope` matching `selector`.
    async fn query_all_within(
        &self,
        scope: &Self::Element,
        selector: &str,
    ) -> AutomationResult<Vec<Self::Element>>;

    /// Number of elements matching `selector`.
    async fn count(&self, selector: &str) -> AutomationResult<usize> {
        Ok(self.query_all(selector).await?.len())
    }

    /// Rendered text of an element.
    async fn inner_text(&self, element: &Self::Element) -> AutomationResult<String>;

    /// Attribute value, `None` when the attribute is absent.
    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> AutomationResult<Option<String>>;

    async fn click(&self, element: &Self::Element) -> AutomationResult<()>;

    /// Evaluate a script in the page context and return its JSON result.
    async fn evaluate(&self, script: &str) -> AutomationResult<serde_json::Value>;

    /// Write a full-page PNG screenshot to `path`.
    async fn screenshot(&self, path: &Path) -> AutomationResult<()>;
}
