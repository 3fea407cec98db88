//! Listing harvest command.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::automation::SnapshotPage;
use crate::browser::BrowserSession;
use crate::cli::status::Mark;
use crate::cli::progress::spinner;
use crate::config::{Config, Pacing, Settings};
use crate::harvest::{Harvest, ListingHarvester};

use super::resolve_site;

/// Harvest a category listing and save it.
pub async fn cmd_listing(
    settings: &Settings,
    config: &Config,
    site_name: &str,
    url: Option<&str>,
    output: Option<&Path>,
    snapshot: Option<&Path>,
) -> anyhow::Result<()> {
    let site = resolve_site(config, site_name)?;
    let url = url.unwrap_or(&site.category_url).trim().to_string();
    if url.is_empty() {
        anyhow::bail!("Site '{}' has no category_url; pass --url", site_name);
    }
    url::Url::parse(&url).with_context(|| format!("Invalid category URL: {}", url))?;
    let output: PathBuf = match output {
        Some(path) => path.to_path_buf(),
        None => settings.output_path(&site.listing_output_or(site_name)),
    };

    let harvest = match snapshot {
        Some(path) => {
            let page = SnapshotPage::from_file(&url, path).await?;
            // A saved page never grows, so there is nothing to wait for
            let pacing = Pacing::instant();
            ListingHarvester::new(&site, &pacing)
                .harvest_to_file(&page, &url, &output)
                .await?
        }
        None => {
            let session = BrowserSession::start(&config.browser).await?;
            let pb = spinner(format!("Harvesting {}", url));
            let result = ListingHarvester::new(&site, &config.pacing)
                .harvest_to_file(session.page(), &url, &output)
                .await;
            session.close().await;
            pb.finish_and_clear();
            result?
        }
    };

    print_summary(&harvest, &output);
    Ok(())
}

fn print_summary(harvest: &Harvest, output: &Path) {
    let Harvest { items, expansion } = harvest;
    println!(
        "{} Saved {} items to {}",
        Mark::Saved,
        items.len(),
        output.display()
    );
    println!(
        "  {} {} scrolls, {} load-more clicks ({})",
        Mark::Detail,
        expansion.scrolls,
        expansion.load_more_clicks,
        expansion.stop_reason
    );

    let without_url = items.iter().filter(|item| !item.has_url()).count();
    if without_url > 0 {
        println!(
            "  {} {} items have no product URL and will be skipped by details",
            Mark::Attention,
            without_url
        );
    }
}
