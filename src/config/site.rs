//! Site profiles: the selectors and URLs describing one storefront catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_DOMAIN_PREFIX: &str = "https://www.michaelkors.com";

/// Selectors used on a category listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    /// One product card in the grid.
    pub tile: String,
    /// Content area inside a tile.
    pub tile_body: String,
    /// Candidate product-name links inside the tile body.
    pub name_link: String,
    pub price: String,
    pub load_more: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            tile: "div.col-6.col-md-3.product-tile-wrapper".to_string(),
            tile_body: ".tile-body".to_string(),
            name_link: "a.link.back-to-product-anchor-js".to_string(),
            price: ".value".to_string(),
            load_more: "button.more.desktop-load-more".to_string(),
        }
    }
}

/// Selectors used on a product detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailSelectors {
    pub name: String,
    pub price: String,
    pub image: String,
    /// Control that reveals the product description.
    pub disclosure: String,
    pub description: String,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            name: ".product-name.overflow-hidden".to_string(),
            price: ".value".to_string(),
            image: "img.zoom-image.d-block.img-fluid.mouseFocusUnActive".to_string(),
            disclosure: "button.product-details--js".to_string(),
            description: ".product-details-tabs__item p".to_string(),
        }
    }
}

/// Bounds for the listing expansion loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionPolicy {
    /// Counted iterations before the loop stops.
    pub max_scrolls: u32,
    /// Vertical scroll step in pixels.
    pub scroll_offset: i64,
    /// Stop after this many counted iterations without new tiles (0 = never).
    pub stable_rounds: u32,
    /// Hard cap on load-more clicks.
    pub max_load_more_clicks: u32,
}

impl Default for ExpansionPolicy {
    fn default() -> Self {
        Self {
            max_scrolls: 100,
            scroll_offset: 5000,
            stable_rounds: 5,
            max_load_more_clicks: 500,
        }
    }
}

/// Everything needed to harvest one catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// Category page to harvest.
    pub category_url: String,
    /// Prefix joined with relative product links.
    pub domain_prefix: String,
    /// Listing output file (input of the detail fetcher).
    pub listing_output: String,
    pub detail_output: String,
    /// Text of the consent overlay's accept button.
    pub consent_label: String,
    /// Elements searched for the consent label.
    pub consent_selector: String,
    pub listing: ListingSelectors,
    pub detail: DetailSelectors,
    pub expansion: ExpansionPolicy,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            category_url: String::new(),
            domain_prefix: DEFAULT_DOMAIN_PREFIX.to_string(),
            listing_output: String::new(),
            detail_output: String::new(),
            consent_label: "Accept All".to_string(),
            consent_selector: "button".to_string(),
            listing: ListingSelectors::default(),
            detail: DetailSelectors::default(),
            expansion: ExpansionPolicy::default(),
        }
    }
}

impl SiteProfile {
    fn builtin(category: &str) -> Self {
        Self {
            category_url: format!("{}/women/{}/", DEFAULT_DOMAIN_PREFIX, category),
            listing_output: format!("{}.json", category),
            detail_output: format!("{}_detailed.json", category),
            ..Default::default()
        }
    }

    /// Fill blank URL and output fields from another profile.
    pub fn inherit_from(&mut self, base: &SiteProfile) {
        if self.category_url.is_empty() {
            self.category_url = base.category_url.clone();
        }
        if self.listing_output.is_empty() {
            self.listing_output = base.listing_output.clone();
        }
        if self.detail_output.is_empty() {
            self.detail_output = base.detail_output.clone();
        }
    }

    /// Listing output name, derived from the profile name when unset.
    pub fn listing_output_or(&self, name: &str) -> String {
        if self.listing_output.is_empty() {
            format!("{}.json", name)
        } else {
            self.listing_output.clone()
        }
    }

    /// Detail output name, derived from the profile name when unset.
    pub fn detail_output_or(&self, name: &str) -> String {
        if self.detail_output.is_empty() {
            format!("{}_detailed.json", name)
        } else {
            self.detail_output.clone()
        }
    }
}

/// Profiles available without any config file.
pub fn builtin_sites() -> BTreeMap<String, SiteProfile> {
    ["handbags", "jewelry"]
        .into_iter()
        .map(|category| (category.to_string(), SiteProfile::builtin(category)))
        .collect()
}
