use crate::device::Platform;
use thiserror::Error;

/// Errors produced by device automation
#[derive(Debug, Error)]
pub enum MobileError {
    /// An external process exited non-zero, could not be spawned, or overflowed its output bound
    #[error("Command failed: {command}: {stderr}")]
    Execution { command: String, stderr: String },

    /// An external process exceeded its timeout and was killed
    #[error("Command timed out after {timeout_ms}ms: {command}")]
    Timeout { command: String, timeout_ms: u64 },

    /// Every UI hierarchy retrieval strategy was exhausted without a usable tree
    #[error("Failed to parse UI tree: {0}. The screen may be transitioning; retry after a short delay (~500ms)")]
    TreeParse(String),

    /// A required auxiliary bridge is not installed
    #[error("{bridge} is required but not available. {remedy}")]
    DependencyMissing { bridge: String, remedy: String },

    /// No usable device was found for the platform
    #[error("No {platform} device found. {remedy}")]
    NoDevice { platform: Platform, remedy: String },

    /// The symbolic key name has no mapping on the platform
    #[error("Unknown key '{key}'. Supported keys: {supported}")]
    UnknownKey { key: String, supported: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Image processing failed: {0}")]
    Image(String),

    #[error("Tool '{0}' not found")]
    ToolNotFound(String),

    #[error("Tool '{tool}' failed: {reason}")]
    ToolExecutionFailed { tool: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<image::ImageError> for MobileError {
    fn from(err: image::ImageError) -> Self {
        MobileError::Image(err.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, MobileError>;
