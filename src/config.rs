use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timeout for capture and diagnostic commands
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 15_000;

/// Default timeout for bulk transfers (screenshots, file pulls)
pub const DEFAULT_TRANSFER_TIMEOUT_MS: u64 = 60_000;

/// Default bound on captured standard output
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 16 * 1024 * 1024;

/// Configuration for the device bridges and screenshot handling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    /// Android debugging bridge executable
    pub adb_path: String,

    /// Xcode command line driver (used for `simctl`)
    pub xcrun_path: String,

    /// iOS inspection bridge executable
    pub idb_path: String,

    /// Locations probed for the inspection bridge when `idb_path` is not runnable
    #[serde(default)]
    pub idb_fallback_paths: Vec<String>,

    /// Timeout for capture and diagnostic commands in milliseconds
    pub command_timeout_ms: u64,

    /// Timeout for bulk transfers in milliseconds
    pub transfer_timeout_ms: u64,

    /// Maximum bytes of standard output accepted from a command
    pub max_output_bytes: usize,

    /// Screenshots wider than this are scaled down before encoding
    pub screenshot_max_width: u32,

    /// JPEG quality for encoded screenshots (1-100)
    pub screenshot_quality: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            adb_path: "adb".to_string(),
            xcrun_path: "xcrun".to_string(),
            idb_path: "idb".to_string(),
            idb_fallback_paths: default_idb_fallbacks(),
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            transfer_timeout_ms: DEFAULT_TRANSFER_TIMEOUT_MS,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            screenshot_max_width: 800,
            screenshot_quality: 75,
        }
    }
}

fn default_idb_fallbacks() -> Vec<String> {
    let mut paths = Vec::new();
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(format!("{}/.local/bin/idb", home.to_string_lossy()));
    }
    paths.push("/opt/homebrew/bin/idb".to_string());
    paths.push("/usr/local/bin/idb".to_string());
    paths
}

impl DeviceConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `MOBILE_USE_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("MOBILE_USE_ADB") {
            config.adb_path = path;
        }
        if let Ok(path) = std::env::var("MOBILE_USE_XCRUN") {
            config.xcrun_path = path;
        }
        if let Ok(path) = std::env::var("MOBILE_USE_IDB") {
            config.idb_path = path;
        }
        if let Some(ms) = env_number("MOBILE_USE_COMMAND_TIMEOUT_MS") {
            config.command_timeout_ms = ms;
        }
        if let Some(ms) = env_number("MOBILE_USE_TRANSFER_TIMEOUT_MS") {
            config.transfer_timeout_ms = ms;
        }

        config
    }

    /// Builder method: set the debugging bridge executable
    pub fn adb_path(mut self, path: impl Into<String>) -> Self {
        self.adb_path = path.into();
        self
    }

    /// Builder method: set the xcrun executable
    pub fn xcrun_path(mut self, path: impl Into<String>) -> Self {
        self.xcrun_path = path.into();
        self
    }

    /// Builder method: set the inspection bridge executable
    pub fn idb_path(mut self, path: impl Into<String>) -> Self {
        self.idb_path = path.into();
        self
    }

    /// Builder method: set the command timeout in milliseconds
    pub fn command_timeout(mut self, ms: u64) -> Self {
        self.command_timeout_ms = ms;
        self
    }

    /// Builder method: set the transfer timeout in milliseconds
    pub fn transfer_timeout(mut self, ms: u64) -> Self {
        self.transfer_timeout_ms = ms;
        self
    }

    /// Builder method: set screenshot scaling and quality
    pub fn screenshot(mut self, max_width: u32, quality: u8) -> Self {
        self.screenshot_max_width = max_width;
        self.screenshot_quality = quality.clamp(1, 100);
        self
    }

    pub fn command_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn transfer_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.transfer_timeout_ms)
    }
}

fn env_number(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
