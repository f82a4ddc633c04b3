use crate::config::DeviceConfig;
use crate::device::{Device, Platform, PlatformAdapter, ScreenInfo, first_usable, supported_keys};
use crate::error::{MobileError, Result};
use crate::exec::{CommandRunner, ExecOptions, shell_quote};
use crate::ui::{Bounds, UiElement};
use async_trait::async_trait;
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::io::Cursor;
use std::sync::{Arc, OnceLock};

/// Simulated displays are assumed to render at 3x
pub const SIMULATOR_SCALE: f64 = 3.0;

const IDB_REMEDY: &str = "Install it with `brew install facebook/fb/idb-companion` and `pip3 install fb-idb`, or set MOBILE_USE_IDB to its path";

/// Element types reported by the inspection bridge that respond to taps
const TAPPABLE_TYPES: &[&str] = &[
    "Button",
    "Link",
    "Cell",
    "Switch",
    "Slider",
    "Tab",
    "TabBarButton",
    "MenuItem",
    "TextField",
    "SecureTextField",
    "SearchField",
    "TextView",
    "Stepper",
    "SegmentedControl",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IosKey {
    /// Hardware button (`idb ui button`)
    Button(&'static str),
    /// HID usage code (`idb ui key`)
    Hid(u32),
}

/// Symbolic key name -> hardware button or HID usage code
const KEYS: &[(&str, IosKey)] = &[
    ("home", IosKey::Button("HOME")),
    ("lock", IosKey::Button("LOCK")),
    ("power", IosKey::Button("LOCK")),
    ("side_button", IosKey::Button("SIDE_BUTTON")),
    ("siri", IosKey::Button("SIRI")),
    ("apple_pay", IosKey::Button("APPLE_PAY")),
    ("enter", IosKey::Hid(40)),
    ("return", IosKey::Hid(40)),
    ("escape", IosKey::Hid(41)),
    ("backspace", IosKey::Hid(42)),
    ("delete", IosKey::Hid(42)),
    ("tab", IosKey::Hid(43)),
    ("space", IosKey::Hid(44)),
    ("dpad_right", IosKey::Hid(79)),
    ("dpad_left", IosKey::Hid(80)),
    ("dpad_down", IosKey::Hid(81)),
    ("dpad_up", IosKey::Hid(82)),
    ("volume_up", IosKey::Hid(128)),
    ("volume_down", IosKey::Hid(129)),
];

fn lookup_key(key: &str) -> Result<IosKey> {
    let normalized = key.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    KEYS.iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, mapped)| *mapped)
        .ok_or_else(|| MobileError::UnknownKey {
            key: key.to_string(),
            supported: supported_keys(KEYS.iter().map(|(name, _)| *name)),
        })
}

#[derive(Debug, Deserialize)]
struct SimctlList {
    devices: IndexMap<String, Vec<SimctlDevice>>,
}

#[derive(Debug, Deserialize)]
struct SimctlDevice {
    udid: String,
    name: String,
    state: String,
    #[serde(rename = "isAvailable", default = "default_true")]
    is_available: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct IdbTarget {
    udid: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    target_type: String,
}

#[derive(Debug, Deserialize)]
struct Frame {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// One record of `idb ui describe-all --json`
#[derive(Debug, Deserialize)]
struct AccessibilityRecord {
    #[serde(rename = "type", default)]
    element_type: Option<String>,
    #[serde(rename = "AXLabel", default)]
    label: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "AXValue", default)]
    value: Option<Value>,
    #[serde(rename = "AXUniqueId", default)]
    unique_id: Option<String>,
    #[serde(default)]
    frame: Option<Frame>,
    #[serde(rename = "AXFrame", default)]
    ax_frame: Option<String>,
    #[serde(default)]
    enabled: Option<bool>,
}

fn ax_frame_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*(-?[\d.]+)\s*,\s*(-?[\d.]+)\s*\}\s*,\s*\{\s*(-?[\d.]+)\s*,\s*(-?[\d.]+)\s*\}\}")
            .expect("valid frame pattern")
    })
}

fn parse_ax_frame(value: &str) -> Option<Frame> {
    let caps = ax_frame_regex().captures(value)?;
    let n = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<f64>().ok());
    Some(Frame {
        x: n(1)?,
        y: n(2)?,
        width: n(3)?,
        height: n(4)?,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl AccessibilityRecord {
    fn into_element(self, index: usize) -> Option<UiElement> {
        let frame = self
            .frame
            .or_else(|| self.ax_frame.as_deref().and_then(parse_ax_frame))?;
        let bounds = Bounds::new(
            frame.x.round() as i32,
            frame.y.round() as i32,
            frame.width.round() as i32,
            frame.height.round() as i32,
        );

        let value = match &self.value {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        let text = non_empty(self.label.as_deref())
            .or_else(|| non_empty(self.title.as_deref()))
            .or_else(|| non_empty(value.as_deref()))
            .unwrap_or_default()
            .to_string();

        let element_type = self.element_type.unwrap_or_else(|| "Other".to_string());
        let clickable = TAPPABLE_TYPES.contains(&element_type.as_str());

        let mut element = UiElement::new(index, element_type, bounds)
            .with_text(text)
            .with_clickable(clickable);
        if let Some(id) = self.unique_id.filter(|id| !id.is_empty()) {
            element = element.with_resource_id(id);
        }
        element.enabled = self.enabled;
        Some(element)
    }
}

/// Parse inspection bridge output: one JSON record (or array of records) per line
pub fn parse_accessibility_records(output: &str) -> Vec<UiElement> {
    let mut elements = Vec::new();

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let records: Vec<AccessibilityRecord> = match serde_json::from_str::<Value>(line) {
            Ok(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            Ok(item @ Value::Object(_)) => serde_json::from_value(item).ok().into_iter().collect(),
            _ => {
                log::debug!("skipping non-JSON inspection line: {}", line);
                continue;
            }
        };

        for record in records {
            if let Some(element) = record.into_element(elements.len()) {
                elements.push(element);
            }
        }
    }

    elements
}

/// Parse `xcrun simctl list devices --json`, keeping available simulators in listing order
pub fn parse_simctl_devices(output: &str) -> Result<Vec<Device>> {
    let list: SimctlList = serde_json::from_str(output)?;
    Ok(list
        .devices
        .into_values()
        .flatten()
        .filter(|device| device.is_available)
        .map(|device| {
            Device::new(
                device.udid,
                device.name,
                Platform::Ios,
                device.state.to_ascii_lowercase(),
            )
        })
        .collect())
}

/// Parse `idb list-targets --json`, keeping physical devices only
pub fn parse_idb_targets(output: &str) -> Vec<Device> {
    output
        .lines()
        .filter_map(|line| serde_json::from_str::<IdbTarget>(line.trim()).ok())
        .filter(|target| target.target_type == "device")
        .map(|target| {
            let name = if target.name.is_empty() {
                target.udid.clone()
            } else {
                target.name
            };
            Device::new(target.udid, name, Platform::Ios, "connected")
        })
        .collect()
}

/// Read `screen_dimensions` from `idb describe --json`; missing fields are zero
pub fn parse_describe_screen(output: &str) -> ScreenInfo {
    let json: Value = serde_json::from_str(output.trim()).unwrap_or(Value::Null);
    let dims = &json["screen_dimensions"];
    ScreenInfo::new(
        dims["width"].as_u64().unwrap_or(0) as u32,
        dims["height"].as_u64().unwrap_or(0) as u32,
        dims["density"].as_f64().unwrap_or(0.0),
    )
}

fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let reader = image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| MobileError::Image(e.to_string()))?;
    Ok(reader.into_dimensions()?)
}

fn is_missing_executable(err: &MobileError) -> bool {
    match err {
        MobileError::Execution { stderr, .. } => {
            stderr.contains("not found")
                || stderr.contains("No such file")
                || stderr.contains("exit status: 127")
        }
        _ => false,
    }
}

/// iOS adapter driving the simulator control tool and the inspection bridge
pub struct IosAdapter {
    runner: Arc<dyn CommandRunner>,
    config: DeviceConfig,
}

impl IosAdapter {
    pub fn new(runner: Arc<dyn CommandRunner>, config: DeviceConfig) -> Self {
        Self { runner, config }
    }

    fn simctl(&self, args: &str) -> String {
        format!("{} simctl {}", shell_quote(&self.config.xcrun_path), args)
    }

    /// Run an inspection bridge command, trying the fallback install locations when missing
    async fn idb(&self, args: &str, options: ExecOptions) -> Result<Vec<u8>> {
        let primary = format!("{} {}", shell_quote(&self.config.idb_path), args);
        let err = match self.runner.run_bytes(&primary, options).await {
            Ok(out) => return Ok(out),
            Err(e) if is_missing_executable(&e) => e,
            Err(e) => return Err(e),
        };

        log::warn!("{} unavailable ({}), trying fallback locations", self.config.idb_path, err);
        for path in &self.config.idb_fallback_paths {
            let command = format!("{} {}", shell_quote(path), args);
            match self.runner.run_bytes(&command, options).await {
                Ok(out) => return Ok(out),
                Err(e) if is_missing_executable(&e) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(MobileError::DependencyMissing {
            bridge: "idb (iOS inspection bridge)".to_string(),
            remedy: IDB_REMEDY.to_string(),
        })
    }

    async fn idb_text(&self, args: &str) -> Result<String> {
        let out = self.idb(args, ExecOptions::command(&self.config)).await?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    async fn list_simulators(&self) -> Result<Vec<Device>> {
        let output = self
            .runner
            .run_text(&self.simctl("list devices --json"), ExecOptions::command(&self.config))
            .await?;
        parse_simctl_devices(&output)
    }

    async fn list_physical(&self) -> Result<Vec<Device>> {
        let output = self.idb_text("list-targets --json").await?;
        Ok(parse_idb_targets(&output))
    }

    async fn is_simulator(&self, device_id: &str) -> bool {
        match self.list_simulators().await {
            Ok(sims) => sims.iter().any(|d| d.id == device_id),
            Err(e) => {
                log::debug!("simulator lookup failed, assuming physical device: {}", e);
                false
            }
        }
    }

    fn udid(device_id: &str) -> String {
        format!("--udid {}", shell_quote(device_id))
    }

    async fn capture(&self, device_id: &str, simulator: bool) -> Result<Vec<u8>> {
        let options = ExecOptions::transfer(&self.config);
        if simulator {
            let command = self.simctl(&format!(
                "io {} screenshot --type=png -",
                shell_quote(device_id)
            ));
            self.runner.run_bytes(&command, options).await
        } else {
            self.idb(&format!("screenshot {} /dev/stdout", Self::udid(device_id)), options)
                .await
        }
    }

    async fn tap_command(&self, device_id: &str, x: i32, y: i32) -> Result<()> {
        self.idb_text(&format!("ui tap {} {} {}", Self::udid(device_id), x, y))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PlatformAdapter for IosAdapter {
    fn platform(&self) -> Platform {
        Platform::Ios
    }

    async fn list_devices(&self) -> Result<Vec<Device>> {
        let (simulators, physical) = tokio::join!(self.list_simulators(), self.list_physical());

        match (simulators, physical) {
            (Err(e), Err(_)) => Err(e),
            (simulators, physical) => {
                let mut devices = simulators.unwrap_or_else(|e| {
                    log::warn!("simulator enumeration failed: {}", e);
                    Vec::new()
                });
                devices.extend(physical.unwrap_or_else(|e| {
                    log::debug!("physical device enumeration failed: {}", e);
                    Vec::new()
                }));
                Ok(devices)
            }
        }
    }

    async fn get_first_device_id(&self) -> Result<String> {
        let devices = self.list_devices().await?;
        first_usable(&devices, &["booted", "connected"])
            .map(|device| device.id.clone())
            .ok_or_else(|| MobileError::NoDevice {
                platform: Platform::Ios,
                remedy: "Boot a simulator (`xcrun simctl boot <udid>` or open Simulator.app) or connect a device".to_string(),
            })
    }

    async fn screenshot(&self, device_id: &str) -> Result<Vec<u8>> {
        let simulator = self.is_simulator(device_id).await;
        self.capture(device_id, simulator).await
    }

    async fn get_screen_info(&self, device_id: &str) -> Result<ScreenInfo> {
        if self.is_simulator(device_id).await {
            // simctl has no size query, so read the dimensions off a screenshot
            let png = self.capture(device_id, true).await?;
            let (width, height) = image_dimensions(&png)?;
            return Ok(ScreenInfo::new(width, height, SIMULATOR_SCALE));
        }

        let output = self
            .idb_text(&format!("describe {} --json", Self::udid(device_id)))
            .await?;
        Ok(parse_describe_screen(&output))
    }

    async fn get_ui_tree(&self, device_id: &str) -> Result<Vec<UiElement>> {
        let output = self
            .idb_text(&format!("ui describe-all {} --json", Self::udid(device_id)))
            .await?;
        let elements = parse_accessibility_records(&output);
        if elements.is_empty() {
            return Err(MobileError::TreeParse(
                "inspection bridge reported no elements".to_string(),
            ));
        }
        Ok(elements)
    }

    async fn tap(&self, device_id: &str, x: i32, y: i32) -> Result<()> {
        self.tap_command(device_id, x, y).await
    }

    async fn double_tap(&self, device_id: &str, x: i32, y: i32) -> Result<()> {
        self.tap_command(device_id, x, y).await?;
        self.tap_command(device_id, x, y).await
    }

    async fn long_press(&self, device_id: &str, x: i32, y: i32, duration_ms: u64) -> Result<()> {
        let seconds = duration_ms as f64 / 1000.0;
        self.idb_text(&format!(
            "ui tap {} {} {} --duration {}",
            Self::udid(device_id),
            x,
            y,
            seconds
        ))
        .await?;
        Ok(())
    }

    async fn swipe(
        &self,
        device_id: &str,
        from: (i32, i32),
        to: (i32, i32),
        duration_ms: u64,
    ) -> Result<()> {
        let seconds = duration_ms as f64 / 1000.0;
        self.idb_text(&format!(
            "ui swipe {} {} {} {} {} --duration {}",
            Self::udid(device_id),
            from.0,
            from.1,
            to.0,
            to.1,
            seconds
        ))
        .await?;
        Ok(())
    }

    async fn type_text(&self, device_id: &str, text: &str) -> Result<()> {
        if text.is_empty() {
            return Err(MobileError::InvalidArgument("text must not be empty".to_string()));
        }
        self.idb_text(&format!("ui text {} {}", Self::udid(device_id), shell_quote(text)))
            .await?;
        Ok(())
    }

    async fn press_key(&self, device_id: &str, key: &str) -> Result<()> {
        let args = match lookup_key(key)? {
            IosKey::Button(button) => format!("ui button {} {}", Self::udid(device_id), button),
            IosKey::Hid(code) => format!("ui key {} {}", Self::udid(device_id), code),
        };
        self.idb_text(&args).await?;
        Ok(())
    }

    async fn launch_app(&self, device_id: &str, app_id: &str) -> Result<()> {
        if self.is_simulator(device_id).await {
            let command = self.simctl(&format!(
                "launch {} {}",
                shell_quote(device_id),
                shell_quote(app_id)
            ));
            self.runner
                .run_text(&command, ExecOptions::command(&self.config))
                .await?;
        } else {
            self.idb_text(&format!("launch {} {}", Self::udid(device_id), shell_quote(app_id)))
                .await?;
        }
        Ok(())
    }

    async fn open_url(&self, device_id: &str, url: &str) -> Result<()> {
        if self.is_simulator(device_id).await {
            let command = self.simctl(&format!(
                "openurl {} {}",
                shell_quote(device_id),
                shell_quote(url)
            ));
            self.runner
                .run_text(&command, ExecOptions::command(&self.config))
                .await?;
        } else {
            self.idb_text(&format!("open {} {}", Self::udid(device_id), shell_quote(url)))
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::scripted::ScriptedRunner;

    const SIM_UDID: &str = "8A1C1D2E-0000-4000-8000-123456789ABC";

    fn simctl_json() -> String {
        serde_json::json!({
            "devices": {
                "com.apple.CoreSimulator.SimRuntime.iOS-17-2": [
                    { "udid": "AAAA", "name": "iPhone 14", "state": "Shutdown", "isAvailable": true },
                    { "udid": "BBBB", "name": "iPhone 12", "state": "Booted", "isAvailable": false },
                    { "udid": SIM_UDID, "name": "iPhone 15", "state": "Booted", "isAvailable": true }
                ]
            }
        })
        .to_string()
    }

    fn config() -> DeviceConfig {
        let mut config = DeviceConfig::default();
        config.idb_fallback_paths = vec!["/opt/idb/bin/idb".to_string()];
        config
    }

    fn adapter(runner: ScriptedRunner) -> (IosAdapter, Arc<ScriptedRunner>) {
        let runner = Arc::new(runner);
        (IosAdapter::new(runner.clone(), config()), runner)
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::new_rgb8(width, height);
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, image::ImageOutputFormat::Png).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_parse_simctl_devices() {
        let devices = parse_simctl_devices(&simctl_json()).unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].status, "shutdown");
        assert_eq!(devices[1].id, SIM_UDID);
        assert_eq!(devices[1].status, "booted");
    }

    #[test]
    fn test_parse_accessibility_records() {
        let output = concat!(
            r#"{"type":"Button","AXLabel":"Continue","AXUniqueId":"continue_btn","frame":{"x":16.0,"y":700.5,"width":343.0,"height":50.0},"enabled":true}"#,
            "\n",
            r#"{"type":"StaticText","AXLabel":"","AXValue":"Welcome","frame":{"x":0,"y":100,"width":375,"height":20}}"#,
            "\n",
            r#"[{"type":"Image","AXLabel":null,"AXFrame":"{{10, 20}, {30, 40}}"},{"type":"Other","AXLabel":"no frame"}]"#,
            "\n",
            "warning: companion is slow\n"
        );
        let elements = parse_accessibility_records(output);

        assert_eq!(elements.len(), 3);

        let button = &elements[0];
        assert_eq!(button.element_type, "Button");
        assert_eq!(button.text, "Continue");
        assert!(button.clickable);
        assert_eq!(button.resource_id.as_deref(), Some("continue_btn"));
        assert_eq!(button.bounds, Bounds::new(16, 701, 343, 50));
        assert_eq!(button.enabled, Some(true));

        assert_eq!(elements[1].text, "Welcome");
        assert!(!elements[1].clickable);

        assert_eq!(elements[2].bounds, Bounds::new(10, 20, 30, 40));
        assert_eq!(elements[2].text, "");
        assert_eq!(elements[2].index, 2);
    }

    #[test]
    fn test_parse_idb_targets_keeps_physical() {
        let output = concat!(
            r#"{"name":"iPhone 15","udid":"SIM","state":"Booted","type":"simulator"}"#,
            "\n",
            r#"{"name":"Anna's iPhone","udid":"00008110-000A","state":"Booted","type":"device"}"#,
            "\n"
        );
        let devices = parse_idb_targets(output);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].status, "connected");
    }

    #[test]
    fn test_parse_describe_screen_degrades() {
        let info = parse_describe_screen(r#"{"screen_dimensions":{"width":1170,"height":2532,"density":3.0}}"#);
        assert_eq!((info.width, info.height, info.density), (1170, 2532, 3.0));

        let info = parse_describe_screen("not json");
        assert_eq!((info.width, info.height, info.density), (0, 0, 0.0));
    }

    #[test]
    fn test_key_lookup() {
        assert_eq!(lookup_key("home").unwrap(), IosKey::Button("HOME"));
        assert_eq!(lookup_key("Enter").unwrap(), IosKey::Hid(40));
        assert!(matches!(lookup_key("menu"), Err(MobileError::UnknownKey { .. })));
    }

    #[tokio::test]
    async fn test_first_device_prefers_booted_simulator() {
        let targets = r#"{"name":"Phone","udid":"00008110-000A","state":"Booted","type":"device"}"#;
        let (adapter, _) = adapter(
            ScriptedRunner::new()
                .ok("simctl list devices", simctl_json())
                .ok("list-targets", targets),
        );
        assert_eq!(adapter.get_first_device_id().await.unwrap(), SIM_UDID);
    }

    #[tokio::test]
    async fn test_first_device_falls_back_to_connected() {
        let targets = r#"{"name":"Phone","udid":"00008110-000A","state":"Booted","type":"device"}"#;
        let none_booted = r#"{"devices":{"rt":[{"udid":"AAAA","name":"iPhone","state":"Shutdown"}]}}"#;
        let (adapter, _) = adapter(
            ScriptedRunner::new()
                .ok("simctl list devices", none_booted)
                .ok("list-targets", targets),
        );
        assert_eq!(adapter.get_first_device_id().await.unwrap(), "00008110-000A");
    }

    #[tokio::test]
    async fn test_no_device_error() {
        let none_booted = r#"{"devices":{"rt":[{"udid":"AAAA","name":"iPhone","state":"Shutdown"}]}}"#;
        let (adapter, _) = adapter(ScriptedRunner::new().ok("simctl list devices", none_booted));
        let err = adapter.get_first_device_id().await.unwrap_err();
        assert!(matches!(err, MobileError::NoDevice { platform: Platform::Ios, .. }));
    }

    #[tokio::test]
    async fn test_ui_tree_uses_fallback_bridge_location() {
        let record = r#"{"type":"Button","AXLabel":"OK","frame":{"x":0,"y":0,"width":10,"height":10}}"#;
        let (adapter, runner) = adapter(
            ScriptedRunner::new()
                .ok("/opt/idb/bin/idb ui describe-all", record)
                .fail("idb ui describe-all", "sh: 1: idb: not found"),
        );

        let tree = adapter.get_ui_tree(SIM_UDID).await.unwrap();
        assert_eq!(tree[0].text, "OK");
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_ui_tree_dependency_missing() {
        let (adapter, _) = adapter(ScriptedRunner::new());
        let err = adapter.get_ui_tree(SIM_UDID).await.unwrap_err();
        match err {
            MobileError::DependencyMissing { bridge, remedy } => {
                assert!(bridge.contains("idb"));
                assert!(remedy.contains("pip3 install fb-idb"));
            }
            other => panic!("Expected missing dependency, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ui_tree_propagates_bridge_failure() {
        let (adapter, runner) = adapter(
            ScriptedRunner::new().fail("describe-all", "Target not connected"),
        );
        let err = adapter.get_ui_tree(SIM_UDID).await.unwrap_err();
        assert!(matches!(err, MobileError::Execution { .. }));
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_simulator_screen_info_from_screenshot() {
        let (adapter, runner) = adapter(
            ScriptedRunner::new()
                .ok("simctl list devices", simctl_json())
                .ok("screenshot --type=png", png(30, 60)),
        );

        let info = adapter.get_screen_info(SIM_UDID).await.unwrap();
        assert_eq!((info.width, info.height), (30, 60));
        assert_eq!(info.density, SIMULATOR_SCALE);
        assert_eq!(runner.count("simctl list devices"), 1);
        assert_eq!(runner.count("screenshot --type=png"), 1);
    }

    #[tokio::test]
    async fn test_physical_screen_info_from_bridge() {
        let (adapter, _) = adapter(
            ScriptedRunner::new()
                .ok("simctl list devices", simctl_json())
                .ok(
                    "describe --udid",
                    r#"{"screen_dimensions":{"width":2532,"height":1170,"density":3.0}}"#,
                ),
        );

        let info = adapter.get_screen_info("00008110-000A").await.unwrap();
        assert_eq!(info.width, 2532);
        assert_eq!(info.orientation, crate::device::Orientation::Landscape);
    }

    #[tokio::test]
    async fn test_press_key_commands() {
        let (adapter, runner) = adapter(ScriptedRunner::new().ok("idb ui", ""));
        adapter.press_key("X", "home").await.unwrap();
        adapter.press_key("X", "enter").await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0], "idb ui button --udid X HOME");
        assert_eq!(calls[1], "idb ui key --udid X 40");
    }
}
