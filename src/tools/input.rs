use crate::error::Result;
use crate::tools::{DeviceParams, ObserveParams, Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypeTextParams {
    #[serde(flatten)]
    pub device: DeviceParams,

    /// Text to type into the focused field
    pub text: String,

    #[serde(flatten)]
    pub observe: ObserveParams,
}

/// Tool for typing into the focused field
#[derive(Default)]
pub struct TypeTextTool;

#[async_trait::async_trait]
impl Tool for TypeTextTool {
    type Params = TypeTextParams;

    fn name(&self) -> &str {
        "mobile_type_text"
    }

    fn description(&self) -> &str {
        "Type text into the currently focused input field"
    }

    async fn execute_typed(&self, params: TypeTextParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let (adapter, device_id) = context.target(&params.device).await?;
        adapter.type_text(&device_id, &params.text).await?;
        let observation = context
            .observe_after(&params.device, &device_id, &params.observe)
            .await?;

        Ok(ToolResult::success_with(serde_json::json!({
            "deviceId": device_id,
            "textLength": params.text.chars().count(),
        }))
        .with_observation(observation))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PressKeyParams {
    #[serde(flatten)]
    pub device: DeviceParams,

    /// Key name such as home, back, enter, delete, volume_up
    pub key: String,

    #[serde(flatten)]
    pub observe: ObserveParams,
}

/// Tool for hardware and navigation keys
#[derive(Default)]
pub struct PressKeyTool;

#[async_trait::async_trait]
impl Tool for PressKeyTool {
    type Params = PressKeyParams;

    fn name(&self) -> &str {
        "mobile_press_key"
    }

    fn description(&self) -> &str {
        "Press a named key (home, back, enter, delete, volume_up, ...)"
    }

    async fn execute_typed(&self, params: PressKeyParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let (adapter, device_id) = context.target(&params.device).await?;
        adapter.press_key(&device_id, &params.key).await?;
        let observation = context
            .observe_after(&params.device, &device_id, &params.observe)
            .await?;

        Ok(ToolResult::success_with(serde_json::json!({
            "deviceId": device_id,
            "key": params.key,
        }))
        .with_observation(observation))
    }
}
