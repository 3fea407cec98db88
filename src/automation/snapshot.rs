//! Static HTML page backend.
//!
//! Serves previously saved pages keyed by URL. Selectors are matched with the
//! `scraper` crate; scripts and clicks have no effect since there is no live
//! DOM behind the document.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::error::{AutomationError, AutomationResult};
use super::PageAutomation;

/// Per-node data captured once when a document is loaded.
#[derive(Debug)]
struct NodeInfo {
    is_element: bool,
    /// Exclusive end of this node's subtree in pre-order.
    subtree_end: usize,
    text: String,
    attributes: Vec<(String, String)>,
}

/// A parsed snapshot.
///
/// `scraper::Html` cannot be shared across tasks, so only the source text and
/// a pre-order index of its nodes are kept. Selector matches are computed by
/// re-parsing once per distinct selector and cached as node indices.
#[derive(Debug)]
struct SnapshotDocument {
    url: String,
    html: String,
    nodes: Vec<NodeInfo>,
    matches: Mutex<HashMap<String, Arc<Vec<usize>>>>,
}

impl SnapshotDocument {
    fn parse(url: &str, html: String) -> Self {
        let document = Html::parse_document(&html);
        let nodes = document
            .tree
            .root()
            .descendants()
            .enumerate()
            .map(|(index, node)| {
                let subtree_end = index + node.descendants().count();
                match ElementRef::wrap(node) {
                    Some(element) => NodeInfo {
                        is_element: true,
                        subtree_end,
                        text: collapse_whitespace(&element.text().collect::<String>()),
                        attributes: element
                            .value()
                            .attrs()
                            .map(|(k, v)| (k.to_string(), v.to_string()))
                            .collect(),
                    },
                    None => NodeInfo {
                        is_element: false,
                        subtree_end,
                        text: String::new(),
                        attributes: Vec::new(),
                    },
                }
            })
            .collect();

        Self {
            url: url.to_string(),
            html,
            nodes,
            matches: Mutex::new(HashMap::new()),
        }
    }

    /// Pre-order indices of every element matching `selector`.
    fn matches(&self, selector: &str) -> AutomationResult<Arc<Vec<usize>>> {
        let mut cache = self.matches.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(hit) = cache.get(selector) {
            return Ok(Arc::clone(hit));
        }

        let parsed = Selector::parse(selector).map_err(|e| AutomationError::InvalidSelector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;

        let document = Html::parse_document(&self.html);
        let hits: Vec<usize> = document
            .tree
            .root()
            .descendants()
            .enumerate()
            .filter_map(|(index, node)| {
                ElementRef::wrap(node)
                    .filter(|element| parsed.matches(element))
                    .map(|_| index)
            })
            .collect();

        let hits = Arc::new(hits);
        cache.insert(selector.to_string(), Arc::clone(&hits));
        Ok(hits)
    }

    fn node(&self, index: usize) -> AutomationResult<&NodeInfo> {
        self.nodes
            .get(index)
            .filter(|n| n.is_element)
            .ok_or_else(|| AutomationError::Element(format!("no element at index {}", index)))
    }

    fn is_descendant(&self, scope: usize, index: usize) -> bool {
        self.nodes
            .get(scope)
            .is_some_and(|n| index > scope && index < n.subtree_end)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Handle to an element inside a snapshot document.
#[derive(Debug, Clone)]
pub struct SnapshotElement {
    document: Arc<SnapshotDocument>,
    index: usize,
}

/// Page backend serving saved HTML documents.
#[derive(Debug, Default)]
pub struct SnapshotPage {
    documents: HashMap<String, Arc<SnapshotDocument>>,
    current: Mutex<Option<Arc<SnapshotDocument>>>,
}

impl SnapshotPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the HTML served for `url`.
    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        let document = SnapshotDocument::parse(url, html.into());
        self.documents.insert(url.to_string(), Arc::new(document));
        self
    }

    /// Load a saved page from disk and serve it for `url`.
    pub async fn from_file(url: &str, path: &Path) -> AutomationResult<Self> {
        let html = tokio::fs::read_to_string(path).await?;
        debug!("Loaded snapshot {} ({} bytes) for {}", path.display(), html.len(), url);
        Ok(Self::new().with_page(url, html))
    }

    /// URL of the document currently loaded, if any.
    pub fn current_url(&self) -> Option<String> {
        self.lock_current().as_ref().map(|d| d.url.clone())
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Option<Arc<SnapshotDocument>>> {
        self.current.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn current(&self) -> AutomationResult<Arc<SnapshotDocument>> {
        self.lock_current()
            .clone()
            .ok_or_else(|| AutomationError::Browser("no document loaded".to_string()))
    }

    fn elements(document: &Arc<SnapshotDocument>, indices: impl Iterator<Item = usize>) -> Vec<SnapshotElement> {
        indices
            .map(|index| SnapshotElement {
                document: Arc::clone(document),
                index,
            })
            .collect()
    }

    fn select_within(
        scope: &SnapshotElement,
        selector: &str,
    ) -> AutomationResult<Vec<SnapshotElement>> {
        let document = &scope.document;
        let hits = document.matches(selector)?;
        let inside = hits
            .iter()
            .copied()
            .filter(|&i| document.is_descendant(scope.index, i));
        Ok(Self::elements(document, inside))
    }
}

#[async_trait]
impl PageAutomation for SnapshotPage {
    type Element = SnapshotElement;

    async fn navigate(&self, url: &str, _timeout: Duration) -> AutomationResult<()> {
        let document = self
            .documents
            .get(url)
            .cloned()
            .ok_or_else(|| AutomationError::Navigation {
                url: url.to_string(),
                reason: "no snapshot registered for this URL".to_string(),
            })?;
        *self.lock_current() = Some(document);
        Ok(())
    }

    async fn query(&self, selector: &str) -> AutomationResult<Option<SnapshotElement>> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    async fn query_all(&self, selector: &str) -> AutomationResult<Vec<SnapshotElement>> {
        let document = self.current()?;
        let hits = document.matches(selector)?;
        Ok(Self::elements(&document, hits.iter().copied()))
    }

    async fn query_within(
        &self,
        scope: &SnapshotElement,
        selector: &str,
    ) -> AutomationResult<Option<SnapshotElement>> {
        Ok(Self::select_within(scope, selector)?.into_iter().next())
    }

    async fn query_all_within(
        &self,
        scope: &SnapshotElement,
        selector: &str,
    ) -> AutomationResult<Vec<SnapshotElement>> {
        Self::select_within(scope, selector)
    }

    async fn count(&self, selector: &str) -> AutomationResult<usize> {
        Ok(self.current()?.matches(selector)?.len())
    }

    async fn inner_text(&self, element: &SnapshotElement) -> AutomationResult<String> {
        Ok(element.document.node(element.index)?.text.clone())
    }

    async fn attribute(
        &self,
        element: &SnapshotElement,
        name: &str,
    ) -> AutomationResult<Option<String>> {
        let node = element.document.node(element.index)?;
        Ok(node
            .attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone()))
    }

    async fn click(&self, element: &SnapshotElement) -> AutomationResult<()> {
        element.document.node(element.index)?;
        debug!("Ignoring click on static snapshot element {}", element.index);
        Ok(())
    }

    async fn evaluate(&self, _script: &str) -> AutomationResult<serde_json::Value> {
        debug!("Scripts are not executed against static snapshots");
        Ok(serde_json::Value::Null)
    }

    async fn screenshot(&self, _path: &Path) -> AutomationResult<()> {
        Err(AutomationError::Unsupported("screenshots of static snapshots"))
    }
}
