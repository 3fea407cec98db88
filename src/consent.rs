//! Best-effort dismissal of cookie and privacy consent overlays.

use tracing::{debug, info};

use crate::automation::{wait_until, AutomationResult, PageAutomation};
use crate::config::{Pacing, SiteProfile};

/// Does the rendered text of a control contain the consent button label?
///
/// Matching ignores case and collapses runs of whitespace.
pub fn matches_label(text: &str, label: &str) -> bool {
    let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let label = normalize(label);
    !label.is_empty() && normalize(text).contains(&label)
}

async fn find_consent_control<P>(page: &P, site: &SiteProfile) -> AutomationResult<Option<P::Element>>
where
    P: PageAutomation + ?Sized,
{
    for candidate in page.query_all(&site.consent_selector).await? {
        let text = page.inner_text(&candidate).await?;
        if matches_label(&text, &site.consent_label) {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

/// Click the consent overlay's accept control if one appears.
///
/// Returns whether an overlay was dismissed. Failures are logged at debug
/// level and never propagated.
pub async fn dismiss_consent<P>(page: &P, site: &SiteProfile, pacing: &Pacing) -> bool
where
    P: PageAutomation + ?Sized,
{
    let control = wait_until(
        "consent overlay",
        pacing.consent_timeout(),
        pacing.poll_interval(),
        || find_consent_control(page, site),
    )
    .await;

    let control = match control {
        Ok(control) => control,
        Err(e) => {
            debug!("No consent overlay dismissed: {}", e);
            return false;
        }
    };

    if let Err(e) = page.click(&control).await {
        debug!("Consent control could not be clicked: {}", e);
        return false;
    }

    info!("Dismissed consent overlay");
    tokio::time::sleep(pacing.consent_pause()).await;
    true
}
