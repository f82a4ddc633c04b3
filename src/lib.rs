//! # mobile-use
//!
//! A Rust library for Android and iOS device automation, designed for AI agent integration.
//!
//! ## Features
//!
//! - **MCP Server**: Model Context Protocol server for AI-driven device automation
//! - **Platform Bridges**: Android over `adb`, iOS simulators over `xcrun simctl`, UI inspection over `idb`
//! - **UI Trees**: One flattened element model (type, text, bounds, center, clickable) for both platforms
//! - **Observation**: Capture the UI tree and a compressed screenshot after an action, optionally
//!   waiting for the screen to stop changing first
//!
//! ## MCP Server
//!
//! ```bash
//! # stdio transport
//! cargo run --bin mcp-server --features mcp-server
//!
//! # streamable HTTP on port 3000
//! cargo run --bin mcp-server --features mcp-server -- --transport http
//! ```
//!
//! ## Library Usage
//!
//! ### Reading the screen
//!
//! ```rust,no_run
//! use mobile_use::{DeviceConfig, MobileSession, Platform};
//!
//! # async fn run() -> mobile_use::Result<()> {
//! let session = MobileSession::new(DeviceConfig::from_env());
//! let device = session.resolve_device(Platform::Android, None).await?;
//!
//! let elements = session.adapter(Platform::Android).get_ui_tree(&device).await?;
//! for element in mobile_use::filter_elements(elements, false) {
//!     println!("{} '{}' at ({}, {})", element.element_type, element.text, element.center_x, element.center_y);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Acting and observing
//!
//! ```rust,no_run
//! use mobile_use::{DeviceConfig, MobileSession};
//! use serde_json::json;
//!
//! # async fn run() -> mobile_use::Result<()> {
//! let session = MobileSession::new(DeviceConfig::default());
//!
//! // tap, then wait for the screen to settle and return the new tree with a screenshot
//! let result = session
//!     .execute_tool(
//!         "mobile_tap",
//!         json!({ "platform": "ios", "x": 200, "y": 400, "observe": "both", "stabilize": true }),
//!     )
//!     .await?;
//! println!("{}", result.data);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`device`]: Platform bridges behind the [`PlatformAdapter`] trait
//! - [`exec`]: Bounded external command execution
//! - [`ui`]: Element model, hierarchy parsing and filtering
//! - [`observe`]: Polling, stability detection, element waits and the observation orchestrator
//! - [`screenshot`]: Screenshot recompression
//! - [`tools`]: Named tools with JSON parameters
//! - [`mcp`]: **Model Context Protocol server** (requires `mcp-handler` feature)

pub mod config;
pub mod device;
pub mod error;
pub mod exec;
pub mod observe;
pub mod screenshot;
pub mod session;
pub mod tools;
pub mod ui;

#[cfg(feature = "mcp-handler")]
pub mod mcp;

pub use config::DeviceConfig;
pub use device::{AndroidAdapter, Device, IosAdapter, Platform, PlatformAdapter, ScreenInfo, resolve_device};
pub use error::{MobileError, Result};
pub use exec::{CommandRunner, ExecOptions, SystemRunner};
pub use observe::{ObservationResult, ObserveMode, ObserveOptions, observe};
pub use screenshot::{JpegCompressor, Screenshot, ScreenshotCompressor};
pub use session::MobileSession;
pub use tools::{Tool, ToolContext, ToolRegistry, ToolResult};
pub use ui::{Bounds, UiElement, filter_elements};

#[cfg(feature = "mcp-handler")]
pub use mcp::MobileServer;
#[cfg(feature = "mcp-handler")]
pub use rmcp::ServiceExt;
