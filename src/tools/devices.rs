use crate::device::{Device, Platform};
use crate::error::Result;
use crate::tools::{DeviceParams, Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListDevicesParams {
    /// Only list this platform; both when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

/// Tool for enumerating devices and simulators
#[derive(Default)]
pub struct ListDevicesTool;

#[async_trait::async_trait]
impl Tool for ListDevicesTool {
    type Params = ListDevicesParams;

    fn name(&self) -> &str {
        "mobile_list_devices"
    }

    fn description(&self) -> &str {
        "List connected Android devices and iOS simulators/devices with their status"
    }

    async fn execute_typed(&self, params: ListDevicesParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let platforms = match params.platform {
            Some(platform) => vec![platform],
            None => vec![Platform::Android, Platform::Ios],
        };

        let mut devices: Vec<Device> = Vec::new();
        let mut errors = Vec::new();
        for platform in platforms {
            match context.adapter(platform).list_devices().await {
                Ok(found) => devices.extend(found),
                // one missing toolchain should not hide the other platform
                Err(e) if params.platform.is_none() => {
                    log::debug!("listing {} devices failed: {}", platform, e);
                    errors.push(format!("{}: {}", platform, e));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(ToolResult::success_with(serde_json::json!({
            "devices": devices,
            "count": devices.len(),
            "errors": errors,
        })))
    }
}

/// Tool for reading screen size, density and orientation
#[derive(Default)]
pub struct ScreenInfoTool;

#[async_trait::async_trait]
impl Tool for ScreenInfoTool {
    type Params = DeviceParams;

    fn name(&self) -> &str {
        "mobile_screen_info"
    }

    fn description(&self) -> &str {
        "Get screen width, height, density and orientation of a device"
    }

    async fn execute_typed(&self, params: DeviceParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let (adapter, device_id) = context.target(&params).await?;
        let info = adapter.get_screen_info(&device_id).await?;
        Ok(ToolResult::success_with(serde_json::json!({
            "deviceId": device_id,
            "width": info.width,
            "height": info.height,
            "density": info.density,
            "orientation": info.orientation,
        })))
    }
}
