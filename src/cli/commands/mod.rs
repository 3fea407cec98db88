//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod config_cmd;
mod details;
mod listing;
mod sites;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, Config, LoadOptions, SiteProfile};

#[derive(Parser)]
#[command(name = "harvest")]
#[command(about = "Harvest product catalogs from infinite-scroll storefronts")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Show the browser window instead of running headless
    #[arg(long, global = true)]
    headed: bool,

    /// Connect to a running browser's DevTools endpoint instead of launching one
    #[arg(long, global = true, env = "BROWSER_URL")]
    browser_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest a category listing into the site's listing file
    Listing {
        /// Site profile name (see `harvest sites`)
        site: String,
        /// Category URL (overrides the profile)
        #[arg(long)]
        url: Option<String>,
        /// Output file (.json or .csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Extract from a saved HTML page instead of a live browser
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Fetch product details for every item in a listing file
    Details {
        /// Site profile name (see `harvest sites`)
        site: String,
        /// Listing file to read (defaults to the profile's listing output)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output file (.json or .csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip per-product debug screenshots
        #[arg(long)]
        no_screenshots: bool,
    },

    /// Harvest the listing, then fetch details for it
    Run {
        /// Site profile name (see `harvest sites`)
        site: String,
    },

    /// List available site profiles
    Sites,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show {
        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

/// Look up a site profile by name.
fn resolve_site(config: &Config, name: &str) -> anyhow::Result<SiteProfile> {
    config.site(name).ok_or_else(|| {
        let known: Vec<String> = config.all_sites().into_keys().collect();
        anyhow::anyhow!(
            "Unknown site '{}'. Available sites: {}",
            name,
            known.join(", ")
        )
    })
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let (settings, mut config) = load_settings_with_options(options).await?;

    // CLI flags win over config and environment
    if cli.headed {
        config.browser.headless = false;
    }
    if let Some(url) = cli.browser_url.filter(|u| !u.trim().is_empty()) {
        config.browser.remote_url = Some(url);
    }

    match cli.command {
        Commands::Listing {
            site,
            url,
            output,
            snapshot,
        } => {
            listing::cmd_listing(
                &settings,
                &config,
                &site,
                url.as_deref(),
                output.as_deref(),
                snapshot.as_deref(),
            )
            .await
        }
        Commands::Details {
            site,
            input,
            output,
            no_screenshots,
        } => {
            details::cmd_details(
                &settings,
                &config,
                &site,
                input.as_deref(),
                output.as_deref(),
                no_screenshots,
            )
            .await
        }
        Commands::Run { site } => {
            listing::cmd_listing(&settings, &config, &site, None, None, None).await?;
            details::cmd_details(&settings, &config, &site, None, None, false).await
        }
        Commands::Sites => sites::cmd_sites(&config),
        Commands::Config { command } => match command {
            ConfigCommands::Show { json } => config_cmd::cmd_config_show(&settings, &config, json),
        },
    }
}
