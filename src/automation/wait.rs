//! Condition polling with a timeout budget.
//!
//! Every readiness check in the pipelines goes through [`wait_until`]
//! instead of sleeping for a fixed duration.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use super::error::{AutomationError, AutomationResult};
use super::PageAutomation;

/// Smallest delay between probes when a non-zero budget is in play.
const MIN_POLL: Duration = Duration::from_millis(1);

/// Poll `probe` until it yields `Some`, or fail with a timeout error.
///
/// The probe always runs at least once, even with a zero budget, so a
/// condition that already holds is reported without waiting. Transient probe
/// errors are retried; selector and capability errors are returned at once.
pub async fn wait_until<T, F, Fut>(
    what: &str,
    timeout: Duration,
    poll: Duration,
    mut probe: F,
) -> AutomationResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AutomationResult<Option<T>>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match tokio::time::timeout(remaining, probe()).await {
            Ok(Ok(Some(value))) => return Ok(value),
            Ok(Ok(None)) => {}
            Ok(Err(e @ AutomationError::InvalidSelector { .. }))
            | Ok(Err(e @ AutomationError::Unsupported(_))) => return Err(e),
            Ok(Err(e)) => debug!("Probe for {} failed, retrying: {}", what, e),
            Err(_) => break,
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        tokio::time::sleep(poll.max(MIN_POLL).min(remaining)).await;
    }

    Err(AutomationError::timeout(what, timeout))
}

/// Wait until an element matching `selector` is present and return it.
pub async fn wait_for_selector<P>(
    page: &P,
    selector: &str,
    timeout: Duration,
    poll: Duration,
) -> AutomationResult<P::Element>
where
    P: PageAutomation + ?Sized,
{
    let what = format!("selector '{}'", selector);
    wait_until(&what, timeout, poll, move || page.query(selector)).await
}
