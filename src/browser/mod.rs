//! Chromium browser sessions driven over CDP with chromiumoxide.
//!
//! A [`BrowserSession`] owns the browser, its protocol handler task and the
//! single working tab the pipelines use. Dropping the session tears all of
//! that down, so the browser is released on every exit path; [`close`]
//! additionally waits for a graceful shutdown.
//!
//! [`close`]: BrowserSession::close

mod config;
#[cfg(feature = "browser")]
mod page;

pub use config::BrowserEngineConfig;
#[cfg(feature = "browser")]
pub use page::ChromiumPage;

#[cfg(feature = "browser")]
use std::path::PathBuf;
#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use anyhow::Context;
use anyhow::Result;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Handler};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;

/// A running browser with one working page.
#[cfg(feature = "browser")]
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: ChromiumPage,
    remote: bool,
}

#[cfg(feature = "browser")]
impl BrowserSession {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Launch a local browser, or connect to `remote_url` when configured,
    /// and open the working page.
    pub async fn start(config: &BrowserEngineConfig) -> Result<Self> {
        let remote = config.remote_url.is_some();
        let (browser, handler) = match config.remote_url {
            Some(ref url) => Self::connect_remote(url, config).await?,
            None => Self::launch(config).await?,
        };
        let handler = Self::spawn_handler(handler);

        let cdp_page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(anyhow::anyhow!("Failed to open browser page: {}", e));
            }
        };

        let mut session = Self {
            browser,
            handler,
            page: ChromiumPage::new(cdp_page),
            remote,
        };

        // Set user agent before any navigation
        let overrides = SetUserAgentOverrideParams::builder()
            .user_agent(config.user_agent.clone())
            .accept_language(config.accept_language.clone())
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid user agent override: {}", e))?;
        if let Err(e) = session.page.inner().execute(overrides).await {
            session.shutdown().await;
            return Err(anyhow::anyhow!("Failed to set user agent: {}", e));
        }

        Ok(session)
    }

    /// The page all pipeline operations run against.
    pub fn page(&self) -> &ChromiumPage {
        &self.page
    }

    /// Close the page and browser and wait for the handler to stop.
    pub async fn close(mut self) {
        self.shutdown().await;
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.page.inner().clone().close().await {
            debug!("Failed to close page: {}", e);
        }
        if self.remote {
            // Leave shared remote browsers running
            info!("Disconnecting from remote browser");
        } else if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        } else if let Err(e) = self.browser.wait().await {
            debug!("Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();
    }

    fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        })
    }

    /// Find Chrome executable.
    fn find_chrome(config: &BrowserEngineConfig) -> Result<PathBuf> {
        if let Some(ref path) = config.executable {
            if path.exists() {
                return Ok(path.clone());
            }
            return Err(anyhow::anyhow!(
                "Configured browser executable not found: {}",
                path.display()
            ));
        }

        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in [
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(path) = which::which(cmd) {
                info!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(anyhow::anyhow!(
            "Chrome/Chromium not found. Please install it:\n\
             - Arch/Manjaro: sudo pacman -S chromium\n\
             - Ubuntu/Debian: sudo apt install chromium-browser\n\
             - Fedora: sudo dnf install chromium\n\
             - Or set browser.executable in the config file"
        ))
    }

    async fn launch(config: &BrowserEngineConfig) -> Result<(Browser, Handler)> {
        info!("Launching browser (headless={})", config.headless);

        let chrome_path = Self::find_chrome(config)?;
        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .request_timeout(Duration::from_secs(config.timeout));

        // with_head means NOT headless
        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref proxy) = config.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }

        builder = builder
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox") // Often needed for headless in containers
            .arg("--disable-gpu");

        for arg in &config.chrome_args {
            builder = builder.arg(arg);
        }

        let browser_config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        Browser::launch(browser_config)
            .await
            .context("Failed to launch browser")
    }

    /// Connect to a remote Chrome instance.
    async fn connect_remote(url: &str, config: &BrowserEngineConfig) -> Result<(Browser, Handler)> {
        info!(
            "Connecting to remote browser at {} (timeout: {}s)",
            url, config.timeout
        );

        // Get WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .timeout(Duration::from_secs(config.timeout))
            .send()
            .await
            .context("Failed to connect to remote browser")?
            .json()
            .await
            .context("Failed to parse browser version info")?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("No webSocketDebuggerUrl in response"))?;

        info!("Connecting to WebSocket: {}", ws_url);

        let handler_config = chromiumoxide::handler::HandlerConfig {
            request_timeout: Duration::from_secs(config.timeout),
            ..Default::default()
        };

        Browser::connect_with_config(ws_url, handler_config)
            .await
            .context("Failed to connect to remote browser")
    }
}

#[cfg(feature = "browser")]
impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Browser's own Drop kills a launched child process
        self.handler.abort();
    }
}

// Stub for when browser feature is disabled; start() always fails, so no
// session is ever constructed.
#[cfg(not(feature = "browser"))]
pub struct BrowserSession {
    page: crate::automation::SnapshotPage,
}

#[cfg(not(feature = "browser"))]
impl BrowserSession {
    pub async fn start(_config: &BrowserEngineConfig) -> Result<Self> {
        Err(anyhow::anyhow!(
            "Browser support not compiled. Rebuild with: cargo build --features browser"
        ))
    }

    pub fn page(&self) -> &crate::automation::SnapshotPage {
        &self.page
    }

    pub async fn close(self) {}
}
