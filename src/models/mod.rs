//! Records produced by the harvesting pipelines.

use serde::{Deserialize, Serialize};

/// A record type with a fixed column layout for tabular output.
pub trait Record {
    /// Column names, in serialization order.
    const COLUMNS: &'static [&'static str];
}

/// One product tile from a category listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    /// Absolute product URL, empty when the tile had no product link.
    #[serde(default)]
    pub product_url: String,
}

impl Record for ListingItem {
    const COLUMNS: &'static [&'static str] = &["name", "price", "product_url"];
}

impl ListingItem {
    pub fn has_url(&self) -> bool {
        !self.product_url.trim().is_empty()
    }
}

/// Product details scraped from a single product page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub product_url: String,
}

impl Record for DetailItem {
    const COLUMNS: &'static [&'static str] =
        &["name", "price", "image_url", "description", "product_url"];
}
