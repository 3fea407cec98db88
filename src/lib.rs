//! Catalog Harvest - browser-driven product catalog scraping.
//!
//! Expands an infinite-scroll or "load more" category listing, extracts its
//! product tiles, then visits each product page for details.

pub mod automation;
pub mod browser;
pub mod cli;
pub mod config;
pub mod consent;
pub mod details;
pub mod harvest;
pub mod models;
pub mod output;
