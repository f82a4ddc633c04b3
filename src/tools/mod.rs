//! Tool system
//!
//! Every automation operation is a [`Tool`]: typed parameters, a name and a description.
//! The [`ToolRegistry`] erases the parameter type so tools can be invoked by name with JSON,
//! which is how the MCP server and the CLI call them.

pub mod app;
pub mod capture;
pub mod devices;
pub mod gesture;
pub mod input;
pub mod utils;
pub mod wait;

use crate::device::{Platform, PlatformAdapter};
use crate::error::{MobileError, Result};
use crate::observe::{
    DEFAULT_DELAY_MS, DEFAULT_STABILIZE_POLL_MS, DEFAULT_STABILIZE_TIMEOUT_MS, ObservationResult, ObserveMode,
    ObserveOptions,
};
use crate::session::MobileSession;
use async_trait::async_trait;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shared state handed to every tool invocation
pub struct ToolContext<'a> {
    pub session: &'a MobileSession,
}

impl<'a> ToolContext<'a> {
    pub fn new(session: &'a MobileSession) -> Self {
        Self { session }
    }

    pub fn adapter(&self, platform: Platform) -> &'a dyn PlatformAdapter {
        self.session.adapter(platform)
    }

    /// Bridge and concrete device id for a tool call
    pub async fn target(&self, device: &DeviceParams) -> Result<(&'a dyn PlatformAdapter, String)> {
        let id = self
            .session
            .resolve_device(device.platform, device.device_id.as_deref())
            .await?;
        Ok((self.adapter(device.platform), id))
    }

    /// Observe the already resolved device after an action
    pub async fn observe_after(
        &self,
        device: &DeviceParams,
        device_id: &str,
        observe: &ObserveParams,
    ) -> Result<Option<ObservationResult>> {
        let options = observe.to_options(device.platform, device_id);
        self.session.observe(&options).await
    }
}

/// Outcome of a successful tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<ObservationResult>,
}

impl ToolResult {
    pub fn success() -> Self {
        Self::success_with(serde_json::json!({ "ok": true }))
    }

    pub fn success_with(data: Value) -> Self {
        Self {
            data,
            observation: None,
        }
    }

    /// Builder method: attach an observation
    pub fn with_observation(mut self, observation: Option<ObservationResult>) -> Self {
        self.observation = observation;
        self
    }
}

/// Which device a tool targets
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceParams {
    /// "android" or "ios"
    pub platform: Platform,

    /// Device serial or UDID; the first usable device when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

/// Timing and filtering for a capture
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaptureTiming {
    /// Fixed wait before capturing, in milliseconds (default: 500)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Wait for the screen to stop changing instead of a fixed delay (default: false)
    #[serde(default)]
    pub stabilize: bool,

    /// Upper bound on the stabilize wait, in milliseconds (default: 10000)
    #[serde(default = "default_stabilize_timeout_ms")]
    pub stabilize_timeout_ms: u64,

    /// Interval between stabilize captures, in milliseconds (default: 500)
    #[serde(default = "default_stabilize_poll_ms")]
    pub stabilize_poll_ms: u64,

    /// Only keep interactive or labelled elements (default: true)
    #[serde(default = "default_true")]
    pub filter_ui: bool,
}

impl Default for CaptureTiming {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            stabilize: false,
            stabilize_timeout_ms: DEFAULT_STABILIZE_TIMEOUT_MS,
            stabilize_poll_ms: DEFAULT_STABILIZE_POLL_MS,
            filter_ui: true,
        }
    }
}

/// Optional observation attached to an action
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObserveParams {
    /// What to capture after the action: none, ui_tree, screenshot or both (default: none)
    #[serde(default)]
    pub observe: ObserveMode,

    #[serde(flatten)]
    pub timing: CaptureTiming,
}

impl ObserveParams {
    pub fn to_options(&self, platform: Platform, device_id: &str) -> ObserveOptions {
        self.timing.to_options(self.observe, platform, device_id)
    }
}

impl CaptureTiming {
    pub fn to_options(&self, mode: ObserveMode, platform: Platform, device_id: &str) -> ObserveOptions {
        ObserveOptions {
            mode,
            platform,
            device_id: Some(device_id.to_string()),
            delay_ms: self.delay_ms,
            stabilize: self.stabilize,
            stabilize_timeout_ms: self.stabilize_timeout_ms,
            stabilize_poll_ms: self.stabilize_poll_ms,
            filter_ui: self.filter_ui,
        }
    }
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_stabilize_timeout_ms() -> u64 {
    DEFAULT_STABILIZE_TIMEOUT_MS
}

fn default_stabilize_poll_ms() -> u64 {
    DEFAULT_STABILIZE_POLL_MS
}

pub(crate) fn default_true() -> bool {
    true
}

/// A typed automation operation
#[async_trait]
pub trait Tool: Send + Sync {
    type Params: DeserializeOwned + JsonSchema + Send;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the parameters
    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or(Value::Null)
    }

    async fn execute_typed(&self, params: Self::Params, context: &ToolContext<'_>) -> Result<ToolResult>;
}

/// Object safe view of a [`Tool`], taking JSON parameters
#[async_trait]
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters_schema(&self) -> Value;

    async fn execute(&self, params: Value, context: &ToolContext<'_>) -> Result<ToolResult>;
}

#[async_trait]
impl<T: Tool> DynTool for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn description(&self) -> &str {
        Tool::description(self)
    }

    fn parameters_schema(&self) -> Value {
        Tool::parameters_schema(self)
    }

    async fn execute(&self, params: Value, context: &ToolContext<'_>) -> Result<ToolResult> {
        let typed: T::Params = serde_json::from_value(params).map_err(|e| {
            MobileError::InvalidArgument(format!("Invalid parameters for '{}': {}", Tool::name(self), e))
        })?;
        self.execute_typed(typed, context).await
    }
}

/// Tools addressable by name, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Box<dyn DynTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in tool
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(devices::ListDevicesTool);
        registry.register(devices::ScreenInfoTool);
        registry.register(capture::ScreenshotTool);
        registry.register(capture::UiTreeTool);
        registry.register(capture::FindElementsTool);
        registry.register(gesture::TapTool);
        registry.register(gesture::DoubleTapTool);
        registry.register(gesture::LongPressTool);
        registry.register(gesture::SwipeTool);
        registry.register(input::TypeTextTool);
        registry.register(input::PressKeyTool);
        registry.register(app::LaunchAppTool);
        registry.register(app::OpenUrlTool);
        registry.register(wait::WaitForElementTool);
        registry.register(wait::TapElementTool);
        registry.register(capture::ObserveTool);
        registry
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(Tool::name(&tool).to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynTool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name with JSON parameters
    pub async fn execute(&self, name: &str, params: Value, context: &ToolContext<'_>) -> Result<ToolResult> {
        let tool = self
            .get(name)
            .ok_or_else(|| MobileError::ToolNotFound(name.to_string()))?;
        log::debug!("tool {} params={}", name, params);
        tool.execute(params, context).await
    }
}
