//! Configuration management using the prefer crate for file discovery.

mod pacing;
mod site;

pub use pacing::Pacing;
pub use site::{
    builtin_sites, DetailSelectors, ExpansionPolicy, ListingSelectors, SiteProfile,
    DEFAULT_DOMAIN_PREFIX,
};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::browser::BrowserEngineConfig;

/// Name used for config file discovery.
pub const CONFIG_NAME: &str = "catalog-harvest";

/// Default directory for diagnostic screenshots, relative to the output dir.
pub const DEFAULT_SCREENSHOT_SUBDIR: &str = "screenshots";

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory output files are written to (default: current directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// Directory for per-product debug screenshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_dir: Option<String>,
    /// Capture a screenshot of every product page (default: true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<bool>,
    #[serde(default)]
    pub browser: BrowserEngineConfig,
    #[serde(default)]
    pub pacing: Pacing,
    /// Site profiles, layered over the built-in ones.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sites: BTreeMap<String, SiteProfile>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration, discovering the file with prefer.
    /// Falls back to defaults when no file is found or it cannot be parsed.
    pub async fn load() -> Self {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring config {}: {:#}", path.display(), e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// The format follows the extension: TOML, YAML, or JSON (default).
    pub async fn load_from_path(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let config = match ext {
            "toml" => toml::from_str(contents).context("Failed to parse TOML config")?,
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).context("Failed to parse YAML config")?
            }
            _ => serde_json::from_str(contents).context("Failed to parse JSON config")?,
        };
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Built-in profiles overlaid with the ones from the config file.
    pub fn all_sites(&self) -> BTreeMap<String, SiteProfile> {
        let mut sites = builtin_sites();
        for (name, profile) in &self.sites {
            let mut profile = profile.clone();
            if let Some(base) = sites.get(name) {
                profile.inherit_from(base);
            }
            sites.insert(name.clone(), profile);
        }
        sites
    }

    pub fn site(&self, name: &str) -> Option<SiteProfile> {
        self.all_sites().remove(name)
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub screenshot_dir: PathBuf,
    pub screenshots: bool,
}

impl Settings {
    /// Resolve a file name against the output directory.
    pub fn output_path(&self, file: &str) -> PathBuf {
        let expanded = shellexpand::tilde(file);
        let path = Path::new(expanded.as_ref());
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.output_dir.join(path)
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        let output_dir = PathBuf::from(".");
        Self {
            screenshot_dir: output_dir.join(DEFAULT_SCREENSHOT_SUBDIR),
            output_dir,
            screenshots: true,
        }
    }
}

/// Load config and resolve settings.
///
/// An explicit `--config` path must load; a discovered file that fails to
/// parse is ignored with a warning.
pub async fn load_settings_with_options(options: LoadOptions) -> Result<(Settings, Config)> {
    let mut config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };
    config.browser = config.browser.clone().with_env_overrides();

    if let Ok(dir) = std::env::var("HARVEST_OUTPUT_DIR") {
        if !dir.trim().is_empty() {
            tracing::debug!("Using HARVEST_OUTPUT_DIR from environment: {}", dir);
            config.output_dir = Some(dir);
        }
    }

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    if let Some(ref dir) = config.output_dir {
        settings.output_dir = config.resolve_path(dir, &base_dir);
    }
    settings.screenshot_dir = match config.screenshot_dir {
        Some(ref dir) => config.resolve_path(dir, &base_dir),
        None => settings.output_dir.join(DEFAULT_SCREENSHOT_SUBDIR),
    };
    settings.screenshots = config.screenshots.unwrap_or(true);

    Ok((settings, config))
}
