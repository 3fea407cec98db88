//! `PageAutomation` over a chromiumoxide tab.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::element::Element;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use tracing::debug;

use crate::automation::{AutomationError, AutomationResult, PageAutomation};

/// A live browser tab.
#[derive(Debug, Clone)]
pub struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// The underlying chromiumoxide page.
    pub fn inner(&self) -> &Page {
        &self.page
    }
}

fn element_error(e: impl std::fmt::Display) -> AutomationError {
    AutomationError::Element(e.to_string())
}

/// Quote a selector as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[async_trait]
impl PageAutomation for ChromiumPage {
    type Element = Element;

    async fn navigate(&self, url: &str, timeout: Duration) -> AutomationResult<()> {
        debug!("Navigating to {}", url);
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(AutomationError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(AutomationError::timeout(format!("navigation to {}", url), timeout)),
        }
    }

    async fn query(&self, selector: &str) -> AutomationResult<Option<Element>> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    async fn query_all(&self, selector: &str) -> AutomationResult<Vec<Element>> {
        self.page
            .find_elements(selector)
            .await
            .map_err(|e| AutomationError::Browser(format!("query '{}': {}", selector, e)))
    }

    async fn query_within(
        &self,
        scope: &Element,
        selector: &str,
    ) -> AutomationResult<Option<Element>> {
        Ok(self.query_all_within(scope, selector).await?.into_iter().next())
    }

    async fn query_all_within(
        &self,
        scope: &Element,
        selector: &str,
    ) -> AutomationResult<Vec<Element>> {
        scope
            .find_elements(selector)
            .await
            .map_err(|e| element_error(format!("query '{}' in scope: {}", selector, e)))
    }

    async fn count(&self, selector: &str) -> AutomationResult<usize> {
        let script = format!("document.querySelectorAll({}).length", js_string(selector));
        let value = self.evaluate(&script).await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| AutomationError::Script(format!("unexpected count result: {}", value)))
    }

    async fn inner_text(&self, element: &Element) -> AutomationResult<String> {
        Ok(element
            .inner_text()
            .await
            .map_err(element_error)?
            .unwrap_or_default())
    }

    async fn attribute(&self, element: &Element, name: &str) -> AutomationResult<Option<String>> {
        element.attribute(name).await.map_err(element_error)
    }

    async fn click(&self, element: &Element) -> AutomationResult<()> {
        element.click().await.map_err(element_error)?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> AutomationResult<serde_json::Value> {
        let result = self
            .page
            .evaluate(script.to_string())
            .await
            .map_err(|e| AutomationError::Script(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn screenshot(&self, path: &Path) -> AutomationResult<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        let bytes = self
            .page
            .screenshot(params)
            .await
            .map_err(|e| AutomationError::Browser(e.to_string()))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_are_quoted_for_scripts() {
        assert_eq!(js_string("div.a"), r#""div.a""#);
        assert_eq!(js_string(r#"a[title="x"]"#), r#""a[title=\"x\"]""#);
    }
}
