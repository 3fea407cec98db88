//! Configuration inspection commands.

use console::style;

use crate::config::{Config, Settings};

/// Print the effective configuration, built-in site profiles included.
pub fn cmd_config_show(settings: &Settings, config: &Config, json: bool) -> anyhow::Result<()> {
    let mut effective = config.clone();
    effective.sites = config.all_sites();
    effective.output_dir = Some(settings.output_dir.display().to_string());
    effective.screenshot_dir = Some(settings.screenshot_dir.display().to_string());
    effective.screenshots = Some(settings.screenshots);

    let source = config
        .source_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults (no config file found)".to_string());
    eprintln!("{} Source: {}", style("→").dim(), source);

    let rendered = if json {
        serde_json::to_string_pretty(&effective)?
    } else {
        toml::to_string_pretty(&effective)?
    };
    println!("{}", rendered);
    Ok(())
}
