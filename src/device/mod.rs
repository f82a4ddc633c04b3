//! Device bridges
//!
//! Both platforms implement [`PlatformAdapter`]. The variants share no implementation:
//! enumeration, capture and input all work differently on each bridge. Callers pick the
//! variant with [`Platform`] at the call boundary.

pub mod android;
pub mod ios;

pub use android::AndroidAdapter;
pub use ios::IosAdapter;

use crate::error::{MobileError, Result};
use crate::ui::UiElement;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Android => write!(f, "android"),
            Platform::Ios => write!(f, "ios"),
        }
    }
}

impl FromStr for Platform {
    type Err = MobileError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            other => Err(MobileError::InvalidArgument(format!(
                "Unknown platform '{}', expected 'android' or 'ios'",
                other
            ))),
        }
    }
}

/// A device or simulator reported by a bridge
///
/// `status` is whatever the bridge reports ("device", "booted", "unauthorized", ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub platform: Platform,
    pub status: String,
}

impl Device {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        platform: Platform,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            platform,
            status: status.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Screen dimensions and density
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScreenInfo {
    pub width: u32,
    pub height: u32,
    pub density: f64,
    pub orientation: Orientation,
}

impl ScreenInfo {
    /// Orientation is derived: wider than tall means landscape
    pub fn new(width: u32, height: u32, density: f64) -> Self {
        let orientation = if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        };
        Self {
            width,
            height,
            density,
            orientation,
        }
    }
}

/// Capability set shared by every platform bridge
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Enumerate devices; never cached
    async fn list_devices(&self) -> Result<Vec<Device>>;

    /// First device in a usable state, in enumeration order
    async fn get_first_device_id(&self) -> Result<String>;

    /// Raw screenshot bytes (PNG) at native resolution
    async fn screenshot(&self, device_id: &str) -> Result<Vec<u8>>;

    async fn get_screen_info(&self, device_id: &str) -> Result<ScreenInfo>;

    /// Flattened UI tree in traversal order
    async fn get_ui_tree(&self, device_id: &str) -> Result<Vec<UiElement>>;

    async fn tap(&self, device_id: &str, x: i32, y: i32) -> Result<()>;

    async fn double_tap(&self, device_id: &str, x: i32, y: i32) -> Result<()>;

    async fn long_press(&self, device_id: &str, x: i32, y: i32, duration_ms: u64) -> Result<()>;

    async fn swipe(
        &self,
        device_id: &str,
        from: (i32, i32),
        to: (i32, i32),
        duration_ms: u64,
    ) -> Result<()>;

    async fn type_text(&self, device_id: &str, text: &str) -> Result<()>;

    /// Press a symbolic key ("home", "back", "enter", ...)
    async fn press_key(&self, device_id: &str, key: &str) -> Result<()>;

    /// Launch an app by package name or bundle identifier
    async fn launch_app(&self, device_id: &str, app_id: &str) -> Result<()>;

    async fn open_url(&self, device_id: &str, url: &str) -> Result<()>;
}

/// Use the given device id, or fall back to the first usable device
///
/// Holds no state, so concurrent calls for different platforms are independent.
pub async fn resolve_device(adapter: &dyn PlatformAdapter, device_id: Option<&str>) -> Result<String> {
    match device_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => Ok(id.to_string()),
        None => adapter.get_first_device_id().await,
    }
}

/// First device whose status matches the earliest entry of `preferred`
///
/// Statuses are tried in preference order; within one status enumeration order wins.
pub fn first_usable<'a>(devices: &'a [Device], preferred: &[&str]) -> Option<&'a Device> {
    preferred.iter().find_map(|status| {
        devices
            .iter()
            .find(|device| device.status.eq_ignore_ascii_case(status))
    })
}

/// Sorted, comma separated key names for error messages
pub(crate) fn supported_keys<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let mut names: Vec<&str> = names.collect();
    names.sort_unstable();
    names.join(", ")
}
