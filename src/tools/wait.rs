use crate::error::Result;
use crate::observe::{ElementQuery, PollConfig, tap_element, wait_for_element};
use crate::tools::{DeviceParams, ObserveParams, Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_poll_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WaitForElementParams {
    #[serde(flatten)]
    pub device: DeviceParams,

    #[serde(flatten)]
    pub query: ElementQuery,

    /// Give up after this many milliseconds (default: 10000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Interval between UI tree captures in milliseconds (default: 500)
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

impl WaitForElementParams {
    fn poll_config(&self) -> PollConfig {
        PollConfig::from_millis(self.poll_ms, self.timeout_ms)
    }
}

/// Tool for waiting until an element appears
#[derive(Default)]
pub struct WaitForElementTool;

#[async_trait::async_trait]
impl Tool for WaitForElementTool {
    type Params = WaitForElementParams;

    fn name(&self) -> &str {
        "mobile_wait_for_element"
    }

    fn description(&self) -> &str {
        "Wait until an element matching text, text fragment, resource id or type is on screen"
    }

    async fn execute_typed(&self, params: WaitForElementParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let (adapter, device_id) = context.target(&params.device).await?;
        let element = wait_for_element(adapter, &device_id, &params.query, params.poll_config()).await?;

        Ok(ToolResult::success_with(serde_json::json!({
            "deviceId": device_id,
            "element": element,
        })))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TapElementParams {
    #[serde(flatten)]
    pub wait: WaitForElementParams,

    #[serde(flatten)]
    pub observe: ObserveParams,
}

/// Tool for tapping an element found by query
#[derive(Default)]
pub struct TapElementTool;

#[async_trait::async_trait]
impl Tool for TapElementTool {
    type Params = TapElementParams;

    fn name(&self) -> &str {
        "mobile_tap_element"
    }

    fn description(&self) -> &str {
        "Wait for an element matching the query and tap its center"
    }

    async fn execute_typed(&self, params: TapElementParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let wait = &params.wait;
        let (adapter, device_id) = context.target(&wait.device).await?;
        let element = tap_element(adapter, &device_id, &wait.query, wait.poll_config()).await?;
        let observation = context
            .observe_after(&wait.device, &device_id, &params.observe)
            .await?;

        Ok(ToolResult::success_with(serde_json::json!({
            "deviceId": device_id,
            "tapped": element,
        }))
        .with_observation(observation))
    }
}
