use crate::error::Result;
use crate::observe::{ElementQuery, ObservationResult, ObserveMode, find_elements};
use crate::tools::{CaptureTiming, DeviceParams, Tool, ToolContext, ToolResult};
use crate::ui::filter_elements;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tool for capturing a compressed screenshot
#[derive(Default)]
pub struct ScreenshotTool;

#[async_trait::async_trait]
impl Tool for ScreenshotTool {
    type Params = DeviceParams;

    fn name(&self) -> &str {
        "mobile_screenshot"
    }

    fn description(&self) -> &str {
        "Capture the device screen as a downscaled JPEG"
    }

    async fn execute_typed(&self, params: DeviceParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let (adapter, device_id) = context.target(&params).await?;
        let raw = adapter.screenshot(&device_id).await?;
        let compressor = context.session.compressor();
        let screenshot = compressor.compress(&raw)?;

        Ok(ToolResult::success_with(serde_json::json!({
            "deviceId": device_id,
            "width": screenshot.width,
            "height": screenshot.height,
            "mimeType": compressor.mime_type(),
        }))
        .with_observation(Some(ObservationResult {
            ui_tree: None,
            screenshot: Some(screenshot),
        })))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UiTreeParams {
    #[serde(flatten)]
    pub device: DeviceParams,

    /// Keep decorative elements without text that are not clickable (default: false)
    #[serde(default)]
    pub include_all: bool,
}

/// Tool for reading the flattened UI tree
#[derive(Default)]
pub struct UiTreeTool;

#[async_trait::async_trait]
impl Tool for UiTreeTool {
    type Params = UiTreeParams;

    fn name(&self) -> &str {
        "mobile_ui_tree"
    }

    fn description(&self) -> &str {
        "Get the on-screen UI elements with type, text, bounds, center and clickability"
    }

    async fn execute_typed(&self, params: UiTreeParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let (adapter, device_id) = context.target(&params.device).await?;
        let elements = filter_elements(adapter.get_ui_tree(&device_id).await?, params.include_all);

        Ok(ToolResult::success_with(serde_json::json!({
            "deviceId": device_id,
            "count": elements.len(),
            "elements": elements,
        })))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindElementsParams {
    #[serde(flatten)]
    pub device: DeviceParams,

    #[serde(flatten)]
    pub query: ElementQuery,
}

/// Tool for searching the current UI tree
#[derive(Default)]
pub struct FindElementsTool;

#[async_trait::async_trait]
impl Tool for FindElementsTool {
    type Params = FindElementsParams;

    fn name(&self) -> &str {
        "mobile_find_elements"
    }

    fn description(&self) -> &str {
        "Find elements on the current screen by text, text fragment, resource id or type"
    }

    async fn execute_typed(&self, params: FindElementsParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        params.query.validate()?;
        let (adapter, device_id) = context.target(&params.device).await?;
        let elements = adapter.get_ui_tree(&device_id).await?;
        let found = find_elements(&elements, &params.query);

        Ok(ToolResult::success_with(serde_json::json!({
            "deviceId": device_id,
            "query": params.query.describe(),
            "count": found.len(),
            "elements": found,
        })))
    }
}

fn default_mode() -> ObserveMode {
    ObserveMode::Both
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObserveToolParams {
    #[serde(flatten)]
    pub device: DeviceParams,

    /// What to capture: ui_tree, screenshot or both (default: both)
    #[serde(default = "default_mode")]
    pub mode: ObserveMode,

    #[serde(flatten)]
    pub timing: CaptureTiming,
}

/// Tool for a standalone observation
#[derive(Default)]
pub struct ObserveTool;

#[async_trait::async_trait]
impl Tool for ObserveTool {
    type Params = ObserveToolParams;

    fn name(&self) -> &str {
        "mobile_observe"
    }

    fn description(&self) -> &str {
        "Capture the UI tree and/or a screenshot, optionally waiting for the screen to settle first"
    }

    async fn execute_typed(&self, params: ObserveToolParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let (_, device_id) = context.target(&params.device).await?;
        let options = params
            .timing
            .to_options(params.mode, params.device.platform, &device_id);
        let observation = context.session.observe(&options).await?;

        Ok(ToolResult::success_with(serde_json::json!({
            "deviceId": device_id,
            "mode": params.mode,
        }))
        .with_observation(observation))
    }
}
