//! Post-action observation
//!
//! After an action the caller usually wants to see the result: the UI tree, a screenshot,
//! or both. [`observe`] picks how long to wait (stabilize, fixed delay, or nothing) and then
//! captures what was asked for, concurrently when both are wanted.

pub mod poll;
pub mod stability;
pub mod wait;

pub use poll::{PollConfig, PollOutcome, poll_until};
pub use stability::{StableTree, stability_signature, wait_for_stable_tree};
pub use wait::{ElementQuery, find_elements, tap_element, wait_for_element};

use crate::device::{Platform, PlatformAdapter, resolve_device};
use crate::error::Result;
use crate::screenshot::{Screenshot, ScreenshotCompressor};
use crate::ui::{UiElement, filter_elements};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_DELAY_MS: u64 = 500;
pub const DEFAULT_STABILIZE_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_STABILIZE_POLL_MS: u64 = 500;

/// What to capture after an action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ObserveMode {
    #[default]
    None,
    UiTree,
    Screenshot,
    Both,
}

impl ObserveMode {
    pub fn wants_tree(self) -> bool {
        matches!(self, ObserveMode::UiTree | ObserveMode::Both)
    }

    pub fn wants_screenshot(self) -> bool {
        matches!(self, ObserveMode::Screenshot | ObserveMode::Both)
    }
}

/// Options for a single observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserveOptions {
    pub mode: ObserveMode,
    pub platform: Platform,
    pub device_id: Option<String>,
    /// Fixed wait before capture; ignored when `stabilize` is set
    pub delay_ms: u64,
    pub stabilize: bool,
    pub stabilize_timeout_ms: u64,
    pub stabilize_poll_ms: u64,
    /// Drop non-interactive, textless elements from the tree
    pub filter_ui: bool,
}

impl ObserveOptions {
    pub fn new(mode: ObserveMode, platform: Platform) -> Self {
        Self {
            mode,
            platform,
            device_id: None,
            delay_ms: DEFAULT_DELAY_MS,
            stabilize: false,
            stabilize_timeout_ms: DEFAULT_STABILIZE_TIMEOUT_MS,
            stabilize_poll_ms: DEFAULT_STABILIZE_POLL_MS,
            filter_ui: true,
        }
    }

    /// Builder method: target a specific device
    pub fn device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// Builder method: set the fixed pre-capture delay
    pub fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Builder method: wait for the screen to settle instead of a fixed delay
    pub fn stabilize(mut self, timeout_ms: u64, poll_ms: u64) -> Self {
        self.stabilize = true;
        self.stabilize_timeout_ms = timeout_ms;
        self.stabilize_poll_ms = poll_ms;
        self
    }

    /// Builder method: keep every element in the tree
    pub fn unfiltered(mut self) -> Self {
        self.filter_ui = false;
        self
    }
}

/// What an observation captured; absent parts were not requested
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationResult {
    #[serde(rename = "uiTree", skip_serializing_if = "Option::is_none")]
    pub ui_tree: Option<Vec<UiElement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<Screenshot>,
}

/// Wait as configured, then capture the requested parts
///
/// Returns `None` without touching the device when the mode is [`ObserveMode::None`].
/// When stabilizing with a tree mode the final stabilized capture is used as the tree.
pub async fn observe(
    adapter: &dyn PlatformAdapter,
    compressor: &dyn ScreenshotCompressor,
    options: &ObserveOptions,
) -> Result<Option<ObservationResult>> {
    if options.mode == ObserveMode::None {
        return Ok(None);
    }

    let device_id = resolve_device(adapter, options.device_id.as_deref()).await?;
    let include_all = !options.filter_ui;

    let settled_tree = if options.stabilize {
        let stable = wait_for_stable_tree(
            adapter,
            &device_id,
            Duration::from_millis(options.stabilize_poll_ms),
            Duration::from_millis(options.stabilize_timeout_ms),
        )
        .await?;
        Some(stable.elements)
    } else {
        if options.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(options.delay_ms)).await;
        }
        None
    };

    let tree = async {
        if !options.mode.wants_tree() {
            return Ok(None);
        }
        let elements = match settled_tree {
            Some(elements) => elements,
            None => adapter.get_ui_tree(&device_id).await?,
        };
        Ok::<_, crate::error::MobileError>(Some(filter_elements(elements, include_all)))
    };

    let screenshot = async {
        if !options.mode.wants_screenshot() {
            return Ok(None);
        }
        let raw = adapter.screenshot(&device_id).await?;
        Ok::<_, crate::error::MobileError>(Some(compressor.compress(&raw)?))
    };

    let (ui_tree, screenshot) = tokio::try_join!(tree, screenshot)?;

    log::debug!(
        "observed {} on {}: tree={} screenshot={}",
        options.platform,
        device_id,
        ui_tree.as_ref().map_or(0, Vec::len),
        screenshot.is_some()
    );

    Ok(Some(ObservationResult { ui_tree, screenshot }))
}
