//! MCP (Model Context Protocol) server for device automation
//!
//! Each MCP tool forwards to the tool of the same name in the session's registry.
//! Screenshots captured along the way are returned as image content next to the JSON result.

pub mod handler;
pub use handler::MobileServer;

use crate::error::MobileError;
use crate::tools::ToolResult as InternalToolResult;
use crate::tools::{
    DeviceParams,
    app::{LaunchAppParams, OpenUrlParams},
    capture::{FindElementsParams, ObserveToolParams, UiTreeParams},
    devices::ListDevicesParams,
    gesture::{LongPressParams, SwipeParams, TapParams},
    input::{PressKeyParams, TypeTextParams},
    wait::{TapElementParams, WaitForElementParams},
};
use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    tool, tool_router,
};
use serde::Serialize;

/// Map a library error to an MCP error; bad input is reported as invalid params
fn convert_error(err: MobileError) -> McpError {
    match err {
        MobileError::InvalidArgument(_)
        | MobileError::UnknownKey { .. }
        | MobileError::ToolNotFound(_)
        | MobileError::Json(_) => McpError::invalid_params(err.to_string(), None),
        other => McpError::internal_error(other.to_string(), None),
    }
}

/// Convert internal ToolResult to MCP CallToolResult
fn convert_result(result: InternalToolResult, mime_type: &str) -> Result<CallToolResult, McpError> {
    let mut body = result.data;
    let mut images = Vec::new();

    if let Some(observation) = result.observation {
        if let Some(tree) = observation.ui_tree {
            body["uiTree"] = serde_json::to_value(tree).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        }
        if let Some(screenshot) = observation.screenshot {
            body["screenshot"] = serde_json::json!({
                "width": screenshot.width,
                "height": screenshot.height,
                "mimeType": mime_type,
            });
            images.push(Content::image(screenshot.base64, mime_type.to_string()));
        }
    }

    let text = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
    let mut content = vec![Content::text(text)];
    content.extend(images);
    Ok(CallToolResult::success(content))
}

impl MobileServer {
    async fn call(&self, name: &str, params: impl Serialize) -> Result<CallToolResult, McpError> {
        let session = self.session();
        let params = serde_json::to_value(params).map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        let result = session.execute_tool(name, params).await.map_err(|e| {
            log::warn!("{} failed: {}", name, e);
            convert_error(e)
        })?;

        convert_result(result, session.compressor().mime_type())
    }
}

#[tool_router]
impl MobileServer {
    #[tool(description = "List connected Android devices/emulators and iOS simulators/devices")]
    async fn mobile_list_devices(&self, params: Parameters<ListDevicesParams>) -> Result<CallToolResult, McpError> {
        self.call("mobile_list_devices", params.0).await
    }

    #[tool(description = "Get screen width, height, density and orientation")]
    async fn mobile_screen_info(&self, params: Parameters<DeviceParams>) -> Result<CallToolResult, McpError> {
        self.call("mobile_screen_info", params.0).await
    }

    #[tool(description = "Capture the screen as a downscaled JPEG image")]
    async fn mobile_screenshot(&self, params: Parameters<DeviceParams>) -> Result<CallToolResult, McpError> {
        self.call("mobile_screenshot", params.0).await
    }

    #[tool(description = "List on-screen UI elements with type, text, bounds, center coordinates and clickability")]
    async fn mobile_ui_tree(&self, params: Parameters<UiTreeParams>) -> Result<CallToolResult, McpError> {
        self.call("mobile_ui_tree", params.0).await
    }

    #[tool(description = "Find elements on the current screen by text, text fragment, resource id or type")]
    async fn mobile_find_elements(&self, params: Parameters<FindElementsParams>) -> Result<CallToolResult, McpError> {
        self.call("mobile_find_elements", params.0).await
    }

    #[tool(description = "Tap at screen coordinates")]
    async fn mobile_tap(&self, params: Parameters<TapParams>) -> Result<CallToolResult, McpError> {
        self.call("mobile_tap", params.0).await
    }

    #[tool(description = "Double tap at screen coordinates")]
    async fn mobile_double_tap(&self, params: Parameters<TapParams>) -> Result<CallToolResult, McpError> {
        self.call("mobile_double_tap", params.0).await
    }

    #[tool(description = "Press and hold at screen coordinates")]
    async fn mobile_long_press(&self, params: Parameters<LongPressParams>) -> Result<CallToolResult, McpError> {
        self.call("mobile_long_press", params.0).await
    }

    #[tool(description = "Swipe between two points or in a direction (up, down, left, right)")]
    async fn mobile_swipe(&self, params: Parameters<SwipeParams>) -> Result<CallToolResult, McpError> {
        self.call("mobile_swipe", params.0).await
    }

    #[tool(description = "Type text into the focused input field")]
    async fn mobile_type_text(&self, params: Parameters<TypeTextParams>) -> Result<CallToolResult, McpError> {
        self.call("mobile_type_text", params.0).await
    }

    #[tool(description = "Press a named key such as home, back, enter or delete")]
    async fn mobile_press_key(&self, params: Parameters<PressKeyParams>) -> Result<CallToolResult, McpError> {
        self.call("mobile_press_key", params.0).await
    }

    #[tool(description = "Launch an installed app by package name or bundle id")]
    async fn mobile_launch_app(&self, params: Parameters<LaunchAppParams>) -> Result<CallToolResult, McpError> {
        self.call("mobile_launch_app", params.0).await
    }

    #[tool(description = "Open a URL or deep link")]
    async fn mobile_open_url(&self, params: Parameters<OpenUrlParams>) -> Result<CallToolResult, McpError> {
        self.call("mobile_open_url", params.0).await
    }

    #[tool(description = "Wait until an element matching the query appears on screen")]
    async fn mobile_wait_for_element(
        &self,
        params: Parameters<WaitForElementParams>,
    ) -> Result<CallToolResult, McpError> {
        self.call("mobile_wait_for_element", params.0).await
    }

    #[tool(description = "Wait for an element matching the query and tap its center")]
    async fn mobile_tap_element(&self, params: Parameters<TapElementParams>) -> Result<CallToolResult, McpError> {
        self.call("mobile_tap_element", params.0).await
    }

    #[tool(description = "Capture the UI tree and/or a screenshot, optionally after the screen settles")]
    async fn mobile_observe(&self, params: Parameters<ObserveToolParams>) -> Result<CallToolResult, McpError> {
        self.call("mobile_observe", params.0).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::ObservationResult;
    use crate::screenshot::Screenshot;

    #[test]
    fn test_input_errors_are_invalid_params() {
        let err = convert_error(MobileError::UnknownKey {
            key: "warp".to_string(),
            supported: "home".to_string(),
        });
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);

        let err = convert_error(MobileError::TreeParse("empty".to_string()));
        assert_eq!(err.code, rmcp::model::ErrorCode::INTERNAL_ERROR);
    }

    #[test]
    fn test_screenshot_becomes_image_content() {
        let result = InternalToolResult::success_with(serde_json::json!({ "deviceId": "emulator-5554" }))
            .with_observation(Some(ObservationResult {
                ui_tree: Some(Vec::new()),
                screenshot: Some(Screenshot {
                    base64: "AAAA".to_string(),
                    width: 10,
                    height: 20,
                }),
            }));

        let converted = convert_result(result, "image/jpeg").unwrap();
        assert_eq!(converted.content.len(), 2);

        let text = converted.content[0].as_text().unwrap().text.clone();
        let body: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["screenshot"]["width"], 10);
        assert!(body["uiTree"].as_array().unwrap().is_empty());
        assert!(!text.contains("AAAA"));
    }
}
