//! Site profile listing.

use console::style;

use crate::cli::status::Mark;
use crate::config::Config;

/// List the built-in and configured site profiles.
pub fn cmd_sites(config: &Config) -> anyhow::Result<()> {
    let sites = config.all_sites();
    if sites.is_empty() {
        println!("No site profiles configured.");
        return Ok(());
    }

    for (name, site) in &sites {
        let origin = if config.sites.contains_key(name) {
            "config"
        } else {
            "built-in"
        };
        println!("{} {}", style(name).bold(), style(format!("({})", origin)).dim());
        println!("  {} {}", Mark::Detail, site.category_url);
        println!(
            "  {} {} → {}",
            Mark::Detail,
            site.listing_output_or(name),
            site.detail_output_or(name)
        );
    }
    Ok(())
}
