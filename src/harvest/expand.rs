//! Bounded expansion of an infinite-scroll / load-more listing.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tracing::{debug, info};

use crate::automation::{wait_until, PageAutomation};
use crate::config::{Pacing, SiteProfile};

/// Why the expansion loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The counted scroll limit was reached.
    ScrollCap,
    /// Several counted iterations in a row added no tiles.
    ContentStable,
    /// The load-more control was clicked the maximum number of times.
    ClickCap,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScrollCap => write!(f, "scroll limit reached"),
            Self::ContentStable => write!(f, "no new content"),
            Self::ClickCap => write!(f, "load-more click limit reached"),
        }
    }
}

/// Outcome of one expansion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionReport {
    /// Counted iterations: scroll steps plus load-more clicks that added nothing.
    pub scrolls: u32,
    pub load_more_clicks: u32,
    /// Tile count when the loop ended.
    pub tiles: usize,
    pub stop_reason: StopReason,
}

/// Wait for the tile count to exceed `before`.
///
/// Returns the new count, or `None` when the page did not grow in time or the
/// count could not be read.
async fn wait_for_growth<P>(
    page: &P,
    selector: &str,
    before: usize,
    timeout: Duration,
    poll: Duration,
) -> Option<usize>
where
    P: PageAutomation + ?Sized,
{
    let grown = wait_until("listing growth", timeout, poll, move || async move {
        let now = page.count(selector).await?;
        Ok((now > before).then_some(now))
    })
    .await;

    match grown {
        Ok(now) => Some(now),
        Err(e) if e.is_timeout() => None,
        Err(e) => {
            debug!("Tile count unavailable: {}", e);
            None
        }
    }
}

/// The load-more control, if present and not disabled.
///
/// A control that cannot be inspected, e.g. one detached by a re-render, is
/// treated as absent.
async fn enabled_load_more<P>(page: &P, selector: &str) -> Option<P::Element>
where
    P: PageAutomation + ?Sized,
{
    let control = match page.query(selector).await {
        Ok(control) => control?,
        Err(e) => {
            debug!("Load-more lookup failed: {}", e);
            return None;
        }
    };
    match page.attribute(&control, "disabled").await {
        Ok(None) => Some(control),
        Ok(Some(_)) => None,
        Err(e) => {
            debug!("Load-more control unreadable: {}", e);
            None
        }
    }
}

/// Click load-more while it is enabled, otherwise scroll, until a stop
/// condition is met.
///
/// Every scroll step counts toward `max_scrolls`. A load-more click counts
/// only when the page does not grow afterwards, so a broken control cannot
/// keep the loop alive. Element and script errors are logged and the loop
/// carries on with the last known tile count.
pub async fn expand<P>(page: &P, site: &SiteProfile, pacing: &Pacing) -> ExpansionReport
where
    P: PageAutomation + ?Sized,
{
    let policy = &site.expansion;
    let tile = site.listing.tile.as_str();
    let scroll_script = format!("window.scrollBy(0, {})", policy.scroll_offset);

    let mut scrolls = 0u32;
    let mut clicks = 0u32;
    let mut unchanged = 0u32;
    let mut tiles = page.count(tile).await.unwrap_or_else(|e| {
        debug!("Initial tile count unavailable: {}", e);
        0
    });

    let stop_reason = loop {
        if scrolls >= policy.max_scrolls {
            break StopReason::ScrollCap;
        }

        let grown = match enabled_load_more(page, &site.listing.load_more).await {
            Some(_) if clicks >= policy.max_load_more_clicks => break StopReason::ClickCap,
            Some(control) => {
                clicks += 1;
                debug!("Clicking load-more ({})", clicks);
                let grown = match page.click(&control).await {
                    Ok(()) => {
                        let (timeout, poll) = (pacing.load_more_wait(), pacing.poll_interval());
                        wait_for_growth(page, tile, tiles, timeout, poll).await
                    }
                    Err(e) => {
                        debug!("Load-more click failed: {}", e);
                        None
                    }
                };
                if grown.is_none() {
                    scrolls += 1;
                }
                grown
            }
            None => {
                if let Err(e) = page.evaluate(&scroll_script).await {
                    debug!("Scroll failed: {}", e);
                }
                scrolls += 1;
                let (timeout, poll) = (pacing.scroll_wait(), pacing.poll_interval());
                wait_for_growth(page, tile, tiles, timeout, poll).await
            }
        };

        match grown {
            Some(now) => {
                tiles = now;
                unchanged = 0;
            }
            None => {
                unchanged += 1;
                if policy.stable_rounds > 0 && unchanged >= policy.stable_rounds {
                    break StopReason::ContentStable;
                }
            }
        }
    };

    info!(
        "Expansion finished ({}): {} tiles after {} scrolls and {} load-more clicks",
        stop_reason, tiles, scrolls, clicks
    );

    ExpansionReport {
        scrolls,
        load_more_clicks: clicks,
        tiles,
        stop_reason,
    }
}

/// Wait for late tiles to finish rendering.
///
/// Polls the tile count until two consecutive polls agree or the settle
/// budget runs out, and returns the last count seen.
pub async fn settle<P>(page: &P, site: &SiteProfile, pacing: &Pacing) -> usize
where
    P: PageAutomation + ?Sized,
{
    let selector = site.listing.tile.as_str();
    let last = &AtomicUsize::new(usize::MAX);
    let poll = pacing.scroll_wait().max(pacing.poll_interval());

    let settled = wait_until("listing to settle", pacing.settle_timeout(), poll, move || async move {
        let now = page.count(selector).await?;
        let previous = last.swap(now, Ordering::SeqCst);
        Ok((previous == now).then_some(now))
    })
    .await;

    match settled {
        Ok(count) => count,
        Err(e) => {
            if e.is_timeout() {
                debug!("Listing still changing when settle budget ran out");
            } else {
                debug!("Settle polling failed: {}", e);
            }
            match page.count(selector).await {
                Ok(count) => count,
                Err(e) => {
                    debug!("Final tile count unavailable: {}", e);
                    match last.load(Ordering::SeqCst) {
                        usize::MAX => 0,
                        seen => seen,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::SnapshotPage;

    const STATIC_LISTING: &str = r#"<html><body>
        <div class="col-6 col-md-3 product-tile-wrapper"></div>
        <div class="col-6 col-md-3 product-tile-wrapper"></div>
    </body></html>"#;

    async fn static_page() -> SnapshotPage {
        let page = SnapshotPage::new().with_page("https://shop.test/", STATIC_LISTING);
        page.navigate("https://shop.test/", Duration::ZERO).await.unwrap();
        page
    }

    #[tokio::test]
    async fn static_page_stops_when_stable() {
        let page = static_page().await;
        let report = expand(&page, &SiteProfile::default(), &Pacing::instant()).await;

        assert_eq!(report.stop_reason, StopReason::ContentStable);
        assert_eq!(report.scrolls, 5);
        assert_eq!(report.tiles, 2);
        assert_eq!(report.load_more_clicks, 0);
    }

    #[tokio::test]
    async fn disabling_early_stop_runs_to_the_scroll_cap() {
        let page = static_page().await;
        let mut site = SiteProfile::default();
        site.expansion.stable_rounds = 0;
        site.expansion.max_scrolls = 12;

        let report = expand(&page, &site, &Pacing::instant()).await;
        assert_eq!(report.stop_reason, StopReason::ScrollCap);
        assert_eq!(report.scrolls, 12);
    }

    #[tokio::test]
    async fn settle_reports_stable_count() {
        let page = static_page().await;
        let count = settle(&page, &SiteProfile::default(), &Pacing::instant()).await;
        assert_eq!(count, 2);
    }

    #[test]
    fn stop_reasons_read_well_in_logs() {
        assert_eq!(StopReason::ContentStable.to_string(), "no new content");
    }
}
