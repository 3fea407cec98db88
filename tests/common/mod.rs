//! Shared fixtures and fake page backends for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use catalog_harvest::automation::{
    AutomationError, AutomationResult, PageAutomation, SnapshotElement, SnapshotPage,
};

pub const PREFIX: &str = "https://www.michaelkors.com";
pub const CATEGORY_URL: &str = "https://www.michaelkors.com/women/jewelry/";

/// A category page with a mix of well-formed and awkward tiles.
pub const LISTING_HTML: &str = r#"<!DOCTYPE html>
<html><body>
  <button class="consent">Accept All</button>
  <div class="row">
    <div class="col-6 col-md-3 product-tile-wrapper">
      <div class="tile-body">
        <a class="link back-to-product-anchor-js" href="/badge">SALE</a>
        <a class="link back-to-product-anchor-js" href="/gold-hoop-earrings/123.html">Gold Hoop Earrings</a>
        <a class="link back-to-product-anchor-js" href="/new">NEW</a>
        <div class="price"><span class="value"> $98.00 </span></div>
      </div>
    </div>
    <div class="col-6 col-md-3 product-tile-wrapper">
      <div class="tile-body">
        <a class="link back-to-product-anchor-js" href="https://www.michaelkors.com/pavé-ring/456.html">Pavé Ring</a>
        <span class="value">$150.00</span>
      </div>
    </div>
    <div class="col-6 col-md-3 product-tile-wrapper">
      <div class="tile-body">
        <a class="link back-to-product-anchor-js" href="/badge">SALE</a>
        <a class="link back-to-product-anchor-js" href="/new">NEW</a>
        <span class="value">$40.00</span>
      </div>
    </div>
    <div class="col-6 col-md-3 product-tile-wrapper">
      <div class="placeholder">Loading</div>
    </div>
    <div class="col-6 col-md-3 product-tile-wrapper">
      <div class="tile-body">
        <a class="link back-to-product-anchor-js">Chain Bracelet</a>
      </div>
    </div>
  </div>
  <button class="more desktop-load-more" disabled>Load More</button>
</body></html>
"#;

/// A product detail page.
pub fn product_html(name: &str, price: &str, description: &str) -> String {
    format!(
        r#"<html><body>
  <button>Accept All Cookies</button>
  <h1 class="product-name overflow-hidden"> {name} </h1>
  <div class="prices"><span class="value">{price}</span><span class="value">$999.00</span></div>
  <img class="zoom-image d-block img-fluid mouseFocusUnActive" src="https://img.test/{name}.jpg">
  <button class="product-details--js">Product Details</button>
  <div class="product-details-tabs__item"><p>
    {description}
  </p></div>
</body></html>"#
    )
}

/// Delegates to a snapshot page, but navigation to one URL times out and
/// elements with one particular text cannot be read.
pub struct FlakyPage {
    pub inner: SnapshotPage,
    pub failing_url: String,
    pub unreadable_text: Option<String>,
    pub navigations: AtomicUsize,
}

impl FlakyPage {
    pub fn new(inner: SnapshotPage, failing_url: &str) -> Self {
        Self {
            inner,
            failing_url: failing_url.to_string(),
            unreadable_text: None,
            navigations: AtomicUsize::new(0),
        }
    }

    pub fn with_unreadable_text(mut self, text: &str) -> Self {
        self.unreadable_text = Some(text.to_string());
        self
    }
}

#[async_trait]
impl PageAutomation for FlakyPage {
    type Element = SnapshotElement;

    async fn navigate(&self, url: &str, timeout: Duration) -> AutomationResult<()> {
        self.navigations.fetch_add(1, Ordering::SeqCst);
        if url == self.failing_url {
            return Err(AutomationError::timeout(format!("navigation to {}", url), timeout));
        }
        self.inner.navigate(url, timeout).await
    }

    async fn query(&self, selector: &str) -> AutomationResult<Option<SnapshotElement>> {
        self.inner.query(selector).await
    }

    async fn query_all(&self, selector: &str) -> AutomationResult<Vec<SnapshotElement>> {
        self.inner.query_all(selector).await
    }

    async fn query_within(
        &self,
        scope: &SnapshotElement,
        selector: &str,
    ) -> AutomationResult<Option<SnapshotElement>> {
        self.inner.query_within(scope, selector).await
    }

    async fn query_all_within(
        &self,
        scope: &SnapshotElement,
        selector: &str,
    ) -> AutomationResult<Vec<SnapshotElement>> {
        self.inner.query_all_within(scope, selector).await
    }

    async fn inner_text(&self, element: &SnapshotElement) -> AutomationResult<String> {
        let text = self.inner.inner_text(element).await?;
        if self.unreadable_text.as_deref() == Some(text.trim()) {
            return Err(AutomationError::Element("node detached".to_string()));
        }
        Ok(text)
    }

    async fn attribute(
        &self,
        element: &SnapshotElement,
        name: &str,
    ) -> AutomationResult<Option<String>> {
        self.inner.attribute(element, name).await
    }

    async fn click(&self, element: &SnapshotElement) -> AutomationResult<()> {
        self.inner.click(element).await
    }

    async fn evaluate(&self, script: &str) -> AutomationResult<serde_json::Value> {
        self.inner.evaluate(script).await
    }

    async fn screenshot(&self, path: &Path) -> AutomationResult<()> {
        self.inner.screenshot(path).await
    }
}

/// How a scripted listing reacts to the expansion loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Every scroll appends tiles; there is no load-more control.
    GrowsOnScroll,
    /// An enabled load-more control that never loads anything.
    StuckLoadMore,
    /// Every load-more click appends tiles.
    GrowsOnClick,
    /// Nothing ever changes.
    Static,
    /// A load-more control that is detached on first inspection and
    /// disabled afterwards.
    DetachingLoadMore,
}

/// A listing page simulated entirely in memory.
pub struct ScriptedListing {
    pub behavior: Behavior,
    pub tiles: AtomicUsize,
    pub scrolls: AtomicUsize,
    pub clicks: AtomicUsize,
    pub inspections: AtomicUsize,
    pub scripts: Mutex<Vec<String>>,
}

impl ScriptedListing {
    pub const TILE: &'static str = "div.col-6.col-md-3.product-tile-wrapper";
    pub const LOAD_MORE: &'static str = "button.more.desktop-load-more";
    const BATCH: usize = 24;

    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            tiles: AtomicUsize::new(Self::BATCH),
            scrolls: AtomicUsize::new(0),
            clicks: AtomicUsize::new(0),
            inspections: AtomicUsize::new(0),
            scripts: Mutex::new(Vec::new()),
        }
    }

    fn has_load_more(&self) -> bool {
        matches!(
            self.behavior,
            Behavior::StuckLoadMore | Behavior::GrowsOnClick | Behavior::DetachingLoadMore
        )
    }
}

#[async_trait]
impl PageAutomation for ScriptedListing {
    type Element = &'static str;

    async fn navigate(&self, _url: &str, _timeout: Duration) -> AutomationResult<()> {
        Ok(())
    }

    async fn query(&self, selector: &str) -> AutomationResult<Option<&'static str>> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    async fn query_all(&self, selector: &str) -> AutomationResult<Vec<&'static str>> {
        match selector {
            Self::TILE => Ok(vec![Self::TILE; self.tiles.load(Ordering::SeqCst)]),
            Self::LOAD_MORE if self.has_load_more() => Ok(vec![Self::LOAD_MORE]),
            _ => Ok(Vec::new()),
        }
    }

    async fn query_within(
        &self,
        _scope: &&'static str,
        _selector: &str,
    ) -> AutomationResult<Option<&'static str>> {
        Ok(None)
    }

    async fn query_all_within(
        &self,
        _scope: &&'static str,
        _selector: &str,
    ) -> AutomationResult<Vec<&'static str>> {
        Ok(Vec::new())
    }

    async fn count(&self, selector: &str) -> AutomationResult<usize> {
        Ok(match selector {
            Self::TILE => self.tiles.load(Ordering::SeqCst),
            _ => self.query_all(selector).await?.len(),
        })
    }

    async fn inner_text(&self, _element: &&'static str) -> AutomationResult<String> {
        Ok(String::new())
    }

    async fn attribute(
        &self,
        element: &&'static str,
        name: &str,
    ) -> AutomationResult<Option<String>> {
        if self.behavior != Behavior::DetachingLoadMore
            || *element != Self::LOAD_MORE
            || name != "disabled"
        {
            return Ok(None);
        }
        if self.inspections.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(AutomationError::Element("node detached".to_string()));
        }
        Ok(Some(String::new()))
    }

    async fn click(&self, element: &&'static str) -> AutomationResult<()> {
        if *element == Self::LOAD_MORE {
            self.clicks.fetch_add(1, Ordering::SeqCst);
            if self.behavior == Behavior::GrowsOnClick {
                self.tiles.fetch_add(Self::BATCH, Ordering::SeqCst);
            }
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> AutomationResult<serde_json::Value> {
        self.scripts
            .lock()
            .unwrap()
            .push(script.to_string());
        if script.starts_with("window.scrollBy") {
            self.scrolls.fetch_add(1, Ordering::SeqCst);
            if self.behavior == Behavior::GrowsOnScroll {
                self.tiles.fetch_add(Self::BATCH, Ordering::SeqCst);
            }
        }
        Ok(serde_json::Value::Null)
    }

    async fn screenshot(&self, _path: &Path) -> AutomationResult<()> {
        Err(AutomationError::Unsupported("screenshots of scripted listings"))
    }
}
