//! Screen stability detection
//!
//! A screen is considered settled once two consecutive captures produce the same
//! signature. Timing out is not an error: the last capture is returned as the best
//! available picture of the screen.

use crate::device::PlatformAdapter;
use crate::error::Result;
use crate::observe::poll::{PollConfig, PollOutcome, poll_until};
use crate::ui::UiElement;
use std::time::Duration;

/// Elements above this line and shorter than it are treated as status bar noise
pub const STATUS_BAR_BAND: i32 = 60;

/// Result of waiting for the screen to settle
#[derive(Debug, Clone, PartialEq)]
pub struct StableTree {
    /// The most recent capture
    pub elements: Vec<UiElement>,
    /// Whether two consecutive captures matched before the deadline
    pub stable: bool,
    pub captures: usize,
}

fn is_status_bar_noise(element: &UiElement) -> bool {
    element.bounds.y < STATUS_BAR_BAND && element.bounds.height < STATUS_BAR_BAND
}

/// Order preserving fingerprint of a tree, ignoring status bar elements (clock, battery)
pub fn stability_signature(elements: &[UiElement]) -> String {
    elements
        .iter()
        .filter(|e| !is_status_bar_noise(e))
        .map(|e| {
            format!(
                "{}|{}|{}|{}|{}|{}|{}",
                e.element_type,
                e.text,
                e.bounds.x,
                e.bounds.y,
                e.bounds.width,
                e.bounds.height,
                e.clickable
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Poll the UI tree until two consecutive captures match or `timeout` elapses
pub async fn wait_for_stable_tree(
    adapter: &dyn PlatformAdapter,
    device_id: &str,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<StableTree> {
    let mut previous: Option<String> = None;
    let config = PollConfig::new(poll_interval, timeout).min_attempts(2);

    let outcome = poll_until(
        config,
        || adapter.get_ui_tree(device_id),
        |tree| {
            let signature = stability_signature(tree);
            let settled = !signature.is_empty() && previous.as_deref() == Some(signature.as_str());
            previous = Some(signature);
            settled
        },
    )
    .await?;

    let stable = outcome.is_matched();
    let captures = outcome.attempts();
    if stable {
        log::debug!("screen on {} settled after {} captures", device_id, captures);
    } else {
        log::debug!(
            "screen on {} still changing after {:?} ({} captures), using last capture",
            device_id,
            timeout,
            captures
        );
    }

    Ok(StableTree {
        elements: outcome.into_value(),
        stable,
        captures,
    })
}
