use crate::error::Result;
use crate::tools::utils::normalize_url;
use crate::tools::{DeviceParams, ObserveParams, Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LaunchAppParams {
    #[serde(flatten)]
    pub device: DeviceParams,

    /// Android package name or iOS bundle identifier
    pub app_id: String,

    #[serde(flatten)]
    pub observe: ObserveParams,
}

/// Tool for starting an installed app
#[derive(Default)]
pub struct LaunchAppTool;

#[async_trait::async_trait]
impl Tool for LaunchAppTool {
    type Params = LaunchAppParams;

    fn name(&self) -> &str {
        "mobile_launch_app"
    }

    fn description(&self) -> &str {
        "Launch an installed app by package name (Android) or bundle id (iOS)"
    }

    async fn execute_typed(&self, params: LaunchAppParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let (adapter, device_id) = context.target(&params.device).await?;
        adapter.launch_app(&device_id, params.app_id.trim()).await?;
        let observation = context
            .observe_after(&params.device, &device_id, &params.observe)
            .await?;

        Ok(ToolResult::success_with(serde_json::json!({
            "deviceId": device_id,
            "appId": params.app_id.trim(),
        }))
        .with_observation(observation))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenUrlParams {
    #[serde(flatten)]
    pub device: DeviceParams,

    /// Web address or app deep link
    pub url: String,

    #[serde(flatten)]
    pub observe: ObserveParams,
}

/// Tool for opening web addresses and deep links
#[derive(Default)]
pub struct OpenUrlTool;

#[async_trait::async_trait]
impl Tool for OpenUrlTool {
    type Params = OpenUrlParams;

    fn name(&self) -> &str {
        "mobile_open_url"
    }

    fn description(&self) -> &str {
        "Open a URL or deep link in the default handler"
    }

    async fn execute_typed(&self, params: OpenUrlParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let url = normalize_url(&params.url)?;
        let (adapter, device_id) = context.target(&params.device).await?;
        adapter.open_url(&device_id, &url).await?;
        let observation = context
            .observe_after(&params.device, &device_id, &params.observe)
            .await?;

        Ok(ToolResult::success_with(serde_json::json!({
            "deviceId": device_id,
            "url": url,
        }))
        .with_observation(observation))
    }
}
