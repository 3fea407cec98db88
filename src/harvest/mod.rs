//! Listing harvester: expand a category page and collect its product tiles.

mod expand;
mod extract;

pub use expand::{expand, settle, ExpansionReport, StopReason};
pub use extract::{
    build_product_url, extract_all, extract_tile, is_product_name, product_name,
    select_product_name,
};

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::automation::{wait_for_selector, AutomationError, PageAutomation};
use crate::config::{Pacing, SiteProfile};
use crate::consent::dismiss_consent;
use crate::models::ListingItem;
use crate::output::{write_records, OutputError};

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("No product tiles matching '{selector}' appeared on {url}: {source}")]
    NoTiles {
        url: String,
        selector: String,
        #[source]
        source: AutomationError,
    },

    #[error(transparent)]
    Automation(#[from] AutomationError),

    #[error("Failed to write listing: {0}")]
    Output(#[from] OutputError),
}

/// Items collected from one listing page.
#[derive(Debug, Clone)]
pub struct Harvest {
    pub items: Vec<ListingItem>,
    pub expansion: ExpansionReport,
}

/// Drives one category page through consent, expansion and extraction.
pub struct ListingHarvester<'a> {
    site: &'a SiteProfile,
    pacing: &'a Pacing,
}

impl<'a> ListingHarvester<'a> {
    pub fn new(site: &'a SiteProfile, pacing: &'a Pacing) -> Self {
        Self { site, pacing }
    }

    /// Harvest every tile from `url` once pagination is exhausted.
    pub async fn harvest<P>(&self, page: &P, url: &str) -> Result<Harvest, HarvestError>
    where
        P: PageAutomation + ?Sized,
    {
        let pacing = self.pacing;

        page.navigate(url, pacing.navigation_timeout()).await?;
        dismiss_consent(page, self.site, pacing).await;

        // Reload so the listing renders without the overlay
        page.navigate(url, pacing.navigation_timeout()).await?;

        let tile = &self.site.listing.tile;
        wait_for_selector(page, tile, pacing.tile_timeout(), pacing.poll_interval())
            .await
            .map_err(|source| HarvestError::NoTiles {
                url: url.to_string(),
                selector: tile.clone(),
                source,
            })?;

        let expansion = expand(page, self.site, pacing).await;
        let settled = settle(page, self.site, pacing).await;
        info!("Listing settled with {} tiles", settled);

        let items = extract_all(page, self.site).await?;
        info!("Extracted {} items from {}", items.len(), url);

        Ok(Harvest { items, expansion })
    }

    /// Harvest `url` and write the items to `output`, replacing it.
    pub async fn harvest_to_file<P>(
        &self,
        page: &P,
        url: &str,
        output: &Path,
    ) -> Result<Harvest, HarvestError>
    where
        P: PageAutomation + ?Sized,
    {
        let harvest = self.harvest(page, url).await?;
        write_records(output, &harvest.items).await?;
        info!("Saved {} items to {}", harvest.items.len(), output.display());
        Ok(harvest)
    }
}
