use crate::device::{Platform, ScreenInfo};
use crate::error::{MobileError, Result};
use crate::tools::{DeviceParams, ObserveParams, Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TapParams {
    #[serde(flatten)]
    pub device: DeviceParams,

    /// X coordinate in device pixels (points on iOS)
    pub x: i32,

    /// Y coordinate in device pixels (points on iOS)
    pub y: i32,

    #[serde(flatten)]
    pub observe: ObserveParams,
}

/// Tool for a single tap
#[derive(Default)]
pub struct TapTool;

#[async_trait::async_trait]
impl Tool for TapTool {
    type Params = TapParams;

    fn name(&self) -> &str {
        "mobile_tap"
    }

    fn description(&self) -> &str {
        "Tap at screen coordinates, optionally observing the screen afterwards"
    }

    async fn execute_typed(&self, params: TapParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let (adapter, device_id) = context.target(&params.device).await?;
        adapter.tap(&device_id, params.x, params.y).await?;
        let observation = context
            .observe_after(&params.device, &device_id, &params.observe)
            .await?;

        Ok(ToolResult::success_with(serde_json::json!({
            "deviceId": device_id,
            "x": params.x,
            "y": params.y,
        }))
        .with_observation(observation))
    }
}

/// Tool for a double tap
#[derive(Default)]
pub struct DoubleTapTool;

#[async_trait::async_trait]
impl Tool for DoubleTapTool {
    type Params = TapParams;

    fn name(&self) -> &str {
        "mobile_double_tap"
    }

    fn description(&self) -> &str {
        "Double tap at screen coordinates"
    }

    async fn execute_typed(&self, params: TapParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let (adapter, device_id) = context.target(&params.device).await?;
        adapter.double_tap(&device_id, params.x, params.y).await?;
        let observation = context
            .observe_after(&params.device, &device_id, &params.observe)
            .await?;

        Ok(ToolResult::success_with(serde_json::json!({
            "deviceId": device_id,
            "x": params.x,
            "y": params.y,
        }))
        .with_observation(observation))
    }
}

fn default_long_press_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LongPressParams {
    #[serde(flatten)]
    pub device: DeviceParams,

    pub x: i32,

    pub y: i32,

    /// Hold duration in milliseconds (default: 1000)
    #[serde(default = "default_long_press_ms")]
    pub duration_ms: u64,

    #[serde(flatten)]
    pub observe: ObserveParams,
}

/// Tool for press and hold
#[derive(Default)]
pub struct LongPressTool;

#[async_trait::async_trait]
impl Tool for LongPressTool {
    type Params = LongPressParams;

    fn name(&self) -> &str {
        "mobile_long_press"
    }

    fn description(&self) -> &str {
        "Press and hold at screen coordinates"
    }

    async fn execute_typed(&self, params: LongPressParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let (adapter, device_id) = context.target(&params.device).await?;
        adapter
            .long_press(&device_id, params.x, params.y, params.duration_ms)
            .await?;
        let observation = context
            .observe_after(&params.device, &device_id, &params.observe)
            .await?;

        Ok(ToolResult::success_with(serde_json::json!({
            "deviceId": device_id,
            "x": params.x,
            "y": params.y,
            "durationMs": params.duration_ms,
        }))
        .with_observation(observation))
    }
}

fn default_swipe_ms() -> u64 {
    300
}

/// Direction of a swipe gesture, as the finger moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwipeParams {
    #[serde(flatten)]
    pub device: DeviceParams,

    /// Swipe across the middle of the screen in this direction instead of explicit coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SwipeDirection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_x: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_y: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_x: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_y: Option<i32>,

    /// Gesture duration in milliseconds (default: 300)
    #[serde(default = "default_swipe_ms")]
    pub duration_ms: u64,

    #[serde(flatten)]
    pub observe: ObserveParams,
}

/// Endpoints of a directional swipe covering the central 60% of the screen
pub fn direction_endpoints(direction: SwipeDirection, width: u32, height: u32) -> ((i32, i32), (i32, i32)) {
    let (w, h) = (width as i32, height as i32);
    let (cx, cy) = (w / 2, h / 2);
    let (near_x, far_x) = (w * 2 / 10, w * 8 / 10);
    let (near_y, far_y) = (h * 2 / 10, h * 8 / 10);
    match direction {
        SwipeDirection::Up => ((cx, far_y), (cx, near_y)),
        SwipeDirection::Down => ((cx, near_y), (cx, far_y)),
        SwipeDirection::Left => ((far_x, cy), (near_x, cy)),
        SwipeDirection::Right => ((near_x, cy), (far_x, cy)),
    }
}

/// Screen size in the units input commands take: pixels on Android, points on iOS
pub fn input_extent(platform: Platform, screen: &ScreenInfo) -> (u32, u32) {
    match platform {
        Platform::Ios if screen.density > 0.0 => (
            (screen.width as f64 / screen.density).round() as u32,
            (screen.height as f64 / screen.density).round() as u32,
        ),
        _ => (screen.width, screen.height),
    }
}

/// Tool for swipes and scrolls
#[derive(Default)]
pub struct SwipeTool;

#[async_trait::async_trait]
impl Tool for SwipeTool {
    type Params = SwipeParams;

    fn name(&self) -> &str {
        "mobile_swipe"
    }

    fn description(&self) -> &str {
        "Swipe between two points, or in a direction (up, down, left, right) across the screen"
    }

    async fn execute_typed(&self, params: SwipeParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let (adapter, device_id) = context.target(&params.device).await?;

        let (from, to) = match (params.direction, params.start_x, params.start_y, params.end_x, params.end_y) {
            (_, Some(x1), Some(y1), Some(x2), Some(y2)) => ((x1, y1), (x2, y2)),
            (Some(direction), ..) => {
                let screen = adapter.get_screen_info(&device_id).await?;
                if screen.width == 0 || screen.height == 0 {
                    return Err(MobileError::ToolExecutionFailed {
                        tool: "mobile_swipe".to_string(),
                        reason: "screen size unknown, pass explicit coordinates".to_string(),
                    });
                }
                let (width, height) = input_extent(adapter.platform(), &screen);
                direction_endpoints(direction, width, height)
            }
            _ => {
                return Err(MobileError::InvalidArgument(
                    "Either direction or all of startX, startY, endX, endY must be provided".to_string(),
                ));
            }
        };

        adapter.swipe(&device_id, from, to, params.duration_ms).await?;
        let observation = context
            .observe_after(&params.device, &device_id, &params.observe)
            .await?;

        Ok(ToolResult::success_with(serde_json::json!({
            "deviceId": device_id,
            "from": [from.0, from.1],
            "to": [to.0, to.1],
            "durationMs": params.duration_ms,
        }))
        .with_observation(observation))
    }
}
