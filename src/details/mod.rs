//! Detail fetcher: visit each harvested product page in turn.
//!
//! Records are processed sequentially on a single page. A failure aborts only
//! the record it happened in; the rest of the run continues.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::automation::{wait_for_selector, AutomationError, PageAutomation};
use crate::config::{Pacing, SiteProfile};
use crate::consent::dismiss_consent;
use crate::models::{DetailItem, ListingItem};
use crate::output::{read_listing, write_records, OutputError};

/// Progress of a single record through the fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStage {
    Pending,
    Navigated,
    ConsentHandled,
    DetailsExtracted,
    Saved,
    Failed,
}

impl fmt::Display for RecordStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Navigated => "navigation",
            Self::ConsentHandled => "consent handling",
            Self::DetailsExtracted => "detail extraction",
            Self::Saved => "save",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A record-scoped failure, tagged with the stage it could not reach.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct RecordError {
    pub stage: RecordStage,
    #[source]
    pub source: AutomationError,
}

impl RecordError {
    fn at(stage: RecordStage) -> impl Fn(AutomationError) -> Self + Copy {
        move |source| Self { stage, source }
    }
}

/// Run-level failures of the detail fetcher.
#[derive(Debug, Error)]
pub enum DetailError {
    #[error("Failed to read listing input: {0}")]
    Input(#[source] OutputError),

    #[error("Failed to write details: {0}")]
    Output(#[source] OutputError),
}

/// Progress notifications for observers such as a progress bar.
#[derive(Debug, Clone)]
pub enum DetailEvent {
    Loaded { total: usize },
    Started { index: usize, total: usize, url: String },
    Skipped { index: usize },
    Saved { index: usize, name: String },
    Failed { index: usize, url: String, error: String },
    Finished { saved: usize, skipped: usize, failed: usize },
}

/// A record that was dropped from the output.
#[derive(Debug)]
pub struct FailedRecord {
    pub index: usize,
    pub url: String,
    pub error: RecordError,
}

/// Result of a fetch run.
#[derive(Debug, Default)]
pub struct DetailSummary {
    pub records: Vec<DetailItem>,
    /// Input positions skipped for lacking a product URL.
    pub skipped: Vec<usize>,
    pub failed: Vec<FailedRecord>,
}

/// Screenshot file name for the record at `index` (zero-based).
pub fn screenshot_name(index: usize) -> String {
    format!("debug_product_{}.png", index + 1)
}

pub struct DetailFetcher<'a> {
    site: &'a SiteProfile,
    pacing: &'a Pacing,
    screenshot_dir: Option<PathBuf>,
    events: Option<mpsc::Sender<DetailEvent>>,
}

impl<'a> DetailFetcher<'a> {
    pub fn new(site: &'a SiteProfile, pacing: &'a Pacing) -> Self {
        Self {
            site,
            pacing,
            screenshot_dir: None,
            events: None,
        }
    }

    /// Save a full-page screenshot of every product into `dir`.
    pub fn with_screenshots(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = Some(dir.into());
        self
    }

    pub fn with_events(mut self, events: mpsc::Sender<DetailEvent>) -> Self {
        self.events = Some(events);
        self
    }

    async fn emit(&self, event: DetailEvent) {
        if let Some(ref tx) = self.events {
            // A closed receiver only means nobody is watching
            let _ = tx.send(event).await;
        }
    }

    /// Fetch details for one product page.
    pub async fn fetch_one<P>(
        &self,
        page: &P,
        index: usize,
        url: &str,
    ) -> Result<DetailItem, RecordError>
    where
        P: PageAutomation + ?Sized,
    {
        let pacing = self.pacing;
        let selectors = &self.site.detail;
        debug!("[{}] {}", index + 1, RecordStage::Pending);

        page.navigate(url, pacing.navigation_timeout())
            .await
            .map_err(RecordError::at(RecordStage::Navigated))?;
        debug!("[{}] {}", index + 1, RecordStage::Navigated);

        dismiss_consent(page, self.site, pacing).await;
        debug!("[{}] {}", index + 1, RecordStage::ConsentHandled);

        if let Some(ref dir) = self.screenshot_dir {
            let path = dir.join(screenshot_name(index));
            match page.screenshot(&path).await {
                Ok(()) => debug!("Saved screenshot {}", path.display()),
                Err(e @ AutomationError::Unsupported(_)) => debug!("No screenshot: {}", e),
                Err(e) => warn!("Screenshot {} failed: {}", path.display(), e),
            }
        }

        let extracted = RecordError::at(RecordStage::DetailsExtracted);
        let name_el = wait_for_selector(
            page,
            &selectors.name,
            pacing.detail_timeout(),
            pacing.poll_interval(),
        )
        .await
        .map_err(extracted)?;
        let name = page.inner_text(&name_el).await.map_err(extracted)?;

        let price_el = page
            .query(&selectors.price)
            .await
            .map_err(extracted)?
            .ok_or_else(|| {
                extracted(AutomationError::Element(format!(
                    "no price matching '{}'",
                    selectors.price
                )))
            })?;
        let price = page.inner_text(&price_el).await.map_err(extracted)?;

        let image_url = match page.query(&selectors.image).await.map_err(extracted)? {
            Some(img) => page
                .attribute(&img, "src")
                .await
                .map_err(extracted)?
                .unwrap_or_default(),
            None => String::new(),
        };

        self.open_disclosure(page).await;
        let description = self.description(page).await;

        Ok(DetailItem {
            name: name.trim().to_string(),
            price: price.trim().to_string(),
            image_url,
            description,
            product_url: url.to_string(),
        })
    }

    async fn open_disclosure<P>(&self, page: &P)
    where
        P: PageAutomation + ?Sized,
    {
        let control = match page.query(&self.site.detail.disclosure).await {
            Ok(Some(control)) => control,
            Ok(None) => return,
            Err(e) => {
                debug!("Disclosure lookup failed: {}", e);
                return;
            }
        };
        match page.click(&control).await {
            Ok(()) => tokio::time::sleep(self.pacing.disclosure_pause()).await,
            Err(e) => debug!("Disclosure click failed: {}", e),
        }
    }

    async fn description<P>(&self, page: &P) -> String
    where
        P: PageAutomation + ?Sized,
    {
        match page.query(&self.site.detail.description).await {
            Ok(Some(el)) => match page.inner_text(&el).await {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    debug!("Description unreadable: {}", e);
                    String::new()
                }
            },
            Ok(None) => String::new(),
            Err(e) => {
                debug!("Description lookup failed: {}", e);
                String::new()
            }
        }
    }

    /// Fetch every item with a product URL, in input order.
    pub async fn fetch_all<P>(&self, page: &P, items: &[ListingItem]) -> DetailSummary
    where
        P: PageAutomation + ?Sized,
    {
        let total = items.len();
        let mut summary = DetailSummary::default();
        self.emit(DetailEvent::Loaded { total }).await;

        for (index, item) in items.iter().enumerate() {
            if !item.has_url() {
                debug!("[{}/{}] Skipping item without product URL", index + 1, total);
                summary.skipped.push(index);
                self.emit(DetailEvent::Skipped { index }).await;
                continue;
            }

            let url = item.product_url.trim();
            info!("[{}/{}] Scraping: {}", index + 1, total, url);
            self.emit(DetailEvent::Started {
                index,
                total,
                url: url.to_string(),
            })
            .await;

            match self.fetch_one(page, index, url).await {
                Ok(record) => {
                    debug!("[{}] {}", index + 1, RecordStage::Saved);
                    self.emit(DetailEvent::Saved {
                        index,
                        name: record.name.clone(),
                    })
                    .await;
                    summary.records.push(record);
                }
                Err(error) => {
                    warn!("Error scraping {}: {}", url, error);
                    debug!("[{}] {}", index + 1, RecordStage::Failed);
                    self.emit(DetailEvent::Failed {
                        index,
                        url: url.to_string(),
                        error: error.to_string(),
                    })
                    .await;
                    summary.failed.push(FailedRecord {
                        index,
                        url: url.to_string(),
                        error,
                    });
                }
            }
        }

        self.emit(DetailEvent::Finished {
            saved: summary.records.len(),
            skipped: summary.skipped.len(),
            failed: summary.failed.len(),
        })
        .await;
        summary
    }

    /// Read `input`, fetch every record and write the results to `output`.
    pub async fn run<P>(
        &self,
        page: &P,
        input: &Path,
        output: &Path,
    ) -> Result<DetailSummary, DetailError>
    where
        P: PageAutomation + ?Sized,
    {
        let items = read_listing(input).await.map_err(DetailError::Input)?;
        info!("Loaded {} items from {}", items.len(), input.display());

        let summary = self.fetch_all(page, &items).await;

        write_records(output, &summary.records)
            .await
            .map_err(DetailError::Output)?;
        info!(
            "Saved {} detailed items to {}",
            summary.records.len(),
            output.display()
        );
        Ok(summary)
    }
}
