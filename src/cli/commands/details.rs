//! Detail fetch command.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;

use crate::browser::BrowserSession;
use crate::cli::status::{dropped_line, Mark};
use crate::cli::progress::DetailProgress;
use crate::config::{Config, Settings};
use crate::details::{DetailFetcher, DetailSummary};

use super::resolve_site;

/// Fetch details for every item of a listing file and save them.
pub async fn cmd_details(
    settings: &Settings,
    config: &Config,
    site_name: &str,
    input: Option<&Path>,
    output: Option<&Path>,
    no_screenshots: bool,
) -> anyhow::Result<()> {
    let site = resolve_site(config, site_name)?;
    let input: PathBuf = match input {
        Some(path) => path.to_path_buf(),
        None => settings.output_path(&site.listing_output_or(site_name)),
    };
    let output: PathBuf = match output {
        Some(path) => path.to_path_buf(),
        None => settings.output_path(&site.detail_output_or(site_name)),
    };

    let (tx, rx) = mpsc::channel(64);
    let mut fetcher = DetailFetcher::new(&site, &config.pacing).with_events(tx);
    if settings.screenshots && !no_screenshots {
        fetcher = fetcher.with_screenshots(&settings.screenshot_dir);
    }

    let session = BrowserSession::start(&config.browser).await?;
    let renderer = DetailProgress::spawn(rx);
    let result = fetcher.run(session.page(), &input, &output).await;
    session.close().await;

    // Dropping the fetcher closes the event channel
    drop(fetcher);
    let _ = renderer.await;

    print_summary(&result?, &output);
    Ok(())
}

fn print_summary(summary: &DetailSummary, output: &Path) {
    println!(
        "{} Saved {} detailed items to {}",
        Mark::Saved,
        summary.records.len(),
        output.display()
    );
    if !summary.skipped.is_empty() {
        println!(
            "  {} {} items skipped (no product URL)",
            Mark::Detail,
            summary.skipped.len()
        );
    }
    for failed in &summary.failed {
        println!("  {}", dropped_line(failed.index, &failed.url, &failed.error));
    }
}
