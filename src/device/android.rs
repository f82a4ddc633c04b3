use crate::config::DeviceConfig;
use crate::device::{Device, Platform, PlatformAdapter, ScreenInfo, first_usable, supported_keys};
use crate::error::{MobileError, Result};
use crate::exec::{CommandRunner, ExecOptions, shell_quote};
use crate::ui::UiElement;
use crate::ui::hierarchy::{extract_hierarchy, parse_hierarchy};
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Pause before the retry strategies, letting an in-flight transition finish
pub const HIERARCHY_SETTLE_DELAY: Duration = Duration::from_millis(800);

const DUMP_FILE: &str = "/sdcard/window_dump.xml";

/// Symbolic key name -> Android key code
const KEY_CODES: &[(&str, u32)] = &[
    ("home", 3),
    ("back", 4),
    ("call", 5),
    ("endcall", 6),
    ("dpad_up", 19),
    ("dpad_down", 20),
    ("dpad_left", 21),
    ("dpad_right", 22),
    ("dpad_center", 23),
    ("volume_up", 24),
    ("volume_down", 25),
    ("power", 26),
    ("camera", 27),
    ("tab", 61),
    ("space", 62),
    ("enter", 66),
    ("delete", 67),
    ("backspace", 67),
    ("menu", 82),
    ("search", 84),
    ("media_play_pause", 85),
    ("page_up", 92),
    ("page_down", 93),
    ("escape", 111),
    ("forward_delete", 112),
    ("move_home", 122),
    ("move_end", 123),
    ("sleep", 223),
    ("wakeup", 224),
    ("app_switch", 187),
];

/// Resolve a symbolic key name to its key code
pub fn key_code(key: &str) -> Result<u32> {
    let normalized = key.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    KEY_CODES
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, code)| *code)
        .ok_or_else(|| MobileError::UnknownKey {
            key: key.to_string(),
            supported: supported_keys(KEY_CODES.iter().map(|(name, _)| *name)),
        })
}

/// How the hierarchy dump reaches us
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DumpChannel {
    /// Streamed straight back over `exec-out`
    Direct,
    /// Written to a file on the device, then read back
    ViaFile,
}

#[derive(Debug, Clone, Copy)]
struct DumpAttempt {
    channel: DumpChannel,
    settle_first: bool,
}

/// Retrieval attempts, tried in order until one yields at least one element
const DUMP_PLAN: [DumpAttempt; 4] = [
    DumpAttempt { channel: DumpChannel::Direct, settle_first: false },
    DumpAttempt { channel: DumpChannel::ViaFile, settle_first: false },
    DumpAttempt { channel: DumpChannel::Direct, settle_first: true },
    DumpAttempt { channel: DumpChannel::ViaFile, settle_first: true },
];

/// Android adapter driving the debugging bridge
pub struct AndroidAdapter {
    runner: Arc<dyn CommandRunner>,
    config: DeviceConfig,
}

impl AndroidAdapter {
    pub fn new(runner: Arc<dyn CommandRunner>, config: DeviceConfig) -> Self {
        Self { runner, config }
    }

    fn bridge(&self) -> String {
        shell_quote(&self.config.adb_path)
    }

    fn device_prefix(&self, device_id: &str) -> String {
        format!("{} -s {}", self.bridge(), shell_quote(device_id))
    }

    async fn shell(&self, device_id: &str, device_command: &str) -> Result<String> {
        let command = format!("{} shell {}", self.device_prefix(device_id), device_command);
        self.runner
            .run_text(&command, ExecOptions::command(&self.config))
            .await
    }

    async fn dump_hierarchy(&self, device_id: &str, channel: DumpChannel) -> Result<String> {
        let prefix = self.device_prefix(device_id);
        let options = ExecOptions::command(&self.config);

        let raw = match channel {
            DumpChannel::Direct => {
                let command = format!("{} exec-out uiautomator dump /dev/tty", prefix);
                self.runner.run_text(&command, options).await?
            }
            DumpChannel::ViaFile => {
                // a failed dump leaves the previous file behind
                let clear = format!("{} shell rm -f {}", prefix, DUMP_FILE);
                if let Err(e) = self.runner.run_text(&clear, options).await {
                    log::debug!("could not clear {}: {}", DUMP_FILE, e);
                }

                let dump = format!("{} shell uiautomator dump {}", prefix, DUMP_FILE);
                let report = self.runner.run_text(&dump, options).await?;
                // uiautomator exits 0 even when the dump fails
                if report.contains("ERROR") {
                    return Err(MobileError::TreeParse(format!("dump failed: {}", report.trim())));
                }

                let read = format!("{} exec-out cat {}", prefix, DUMP_FILE);
                self.runner.run_text(&read, options).await?
            }
        };

        extract_hierarchy(&raw)
            .map(str::to_string)
            .ok_or_else(|| MobileError::TreeParse(format!("no hierarchy in output: {}", raw.trim())))
    }
}

/// Parse `adb devices -l` output
pub fn parse_device_list(output: &str) -> Vec<Device> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("List of devices") && !line.starts_with('*'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let id = parts.next()?;
            let status = parts.next()?;
            let name = parts
                .find_map(|p| p.strip_prefix("model:"))
                .map(|model| model.replace('_', " "))
                .unwrap_or_else(|| id.to_string());
            Some(Device::new(id, name, Platform::Android, status))
        })
        .collect()
}

fn dimension_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*x\s*(\d+)").expect("valid size pattern"))
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)").expect("valid number pattern"))
}

/// Parse `wm size` output; an override size wins over the physical one, missing values are zero
pub fn parse_screen_size(output: &str) -> (u32, u32) {
    let line = output
        .lines()
        .find(|l| l.contains("Override size"))
        .or_else(|| output.lines().find(|l| dimension_regex().is_match(l)))
        .unwrap_or("");
    dimension_regex()
        .captures(line)
        .map(|caps| {
            let n = |i: usize| caps.get(i).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
            (n(1), n(2))
        })
        .unwrap_or((0, 0))
}

/// Parse `wm density` output; an override density wins, missing value is zero
pub fn parse_density(output: &str) -> u32 {
    let line = output
        .lines()
        .find(|l| l.contains("Override density"))
        .unwrap_or(output);
    number_regex()
        .captures(line)
        .and_then(|caps| caps.get(1)?.as_str().parse().ok())
        .unwrap_or(0)
}

/// Quote a value for the device-side shell, then for the local one
fn device_arg(value: &str) -> String {
    let device_quoted = format!("'{}'", value.replace('\'', r"'\''"));
    shell_quote(&device_quoted)
}

/// Escape text for `input text`, which reads `%s` as a space
pub fn encode_input_text(text: &str) -> String {
    device_arg(&text.replace(' ', "%s"))
}

#[async_trait]
impl PlatformAdapter for AndroidAdapter {
    fn platform(&self) -> Platform {
        Platform::Android
    }

    async fn list_devices(&self) -> Result<Vec<Device>> {
        let command = format!("{} devices -l", self.bridge());
        let output = self
            .runner
            .run_text(&command, ExecOptions::command(&self.config))
            .await?;
        Ok(parse_device_list(&output))
    }

    async fn get_first_device_id(&self) -> Result<String> {
        let devices = self.list_devices().await?;
        first_usable(&devices, &["device"])
            .map(|device| device.id.clone())
            .ok_or_else(|| MobileError::NoDevice {
                platform: Platform::Android,
                remedy: "Start an emulator or connect a device with USB debugging enabled, then check `adb devices`".to_string(),
            })
    }

    async fn screenshot(&self, device_id: &str) -> Result<Vec<u8>> {
        let command = format!("{} exec-out screencap -p", self.device_prefix(device_id));
        let bytes = self
            .runner
            .run_bytes(&command, ExecOptions::transfer(&self.config))
            .await?;
        if bytes.is_empty() {
            return Err(MobileError::Execution {
                command,
                stderr: "screencap returned no data".to_string(),
            });
        }
        Ok(bytes)
    }

    async fn get_screen_info(&self, device_id: &str) -> Result<ScreenInfo> {
        let (size, density) = tokio::try_join!(
            self.shell(device_id, "wm size"),
            self.shell(device_id, "wm density")
        )?;
        let (width, height) = parse_screen_size(&size);
        Ok(ScreenInfo::new(width, height, parse_density(&density) as f64))
    }

    async fn get_ui_tree(&self, device_id: &str) -> Result<Vec<UiElement>> {
        let mut last_failure = String::from("no strategy attempted");

        for (attempt_no, attempt) in DUMP_PLAN.iter().enumerate() {
            if attempt.settle_first {
                tokio::time::sleep(HIERARCHY_SETTLE_DELAY).await;
            }

            match self.dump_hierarchy(device_id, attempt.channel).await {
                Ok(xml) => {
                    let elements = parse_hierarchy(&xml);
                    if !elements.is_empty() {
                        return Ok(elements);
                    }
                    last_failure = "hierarchy contained no parsable elements".to_string();
                }
                Err(e) => last_failure = e.to_string(),
            }

            log::debug!(
                "hierarchy attempt {} ({:?}) on {} failed: {}",
                attempt_no + 1,
                attempt.channel,
                device_id,
                last_failure
            );
        }

        Err(MobileError::TreeParse(format!(
            "all {} retrieval attempts failed, last: {}",
            DUMP_PLAN.len(),
            last_failure
        )))
    }

    async fn tap(&self, device_id: &str, x: i32, y: i32) -> Result<()> {
        self.shell(device_id, &format!("input tap {} {}", x, y)).await?;
        Ok(())
    }

    async fn double_tap(&self, device_id: &str, x: i32, y: i32) -> Result<()> {
        let taps = format!("input tap {x} {y} && input tap {x} {y}");
        self.shell(device_id, &shell_quote(&taps)).await?;
        Ok(())
    }

    async fn long_press(&self, device_id: &str, x: i32, y: i32, duration_ms: u64) -> Result<()> {
        let command = format!("input swipe {x} {y} {x} {y} {duration_ms}");
        self.shell(device_id, &command).await?;
        Ok(())
    }

    async fn swipe(
        &self,
        device_id: &str,
        from: (i32, i32),
        to: (i32, i32),
        duration_ms: u64,
    ) -> Result<()> {
        let command = format!(
            "input swipe {} {} {} {} {}",
            from.0, from.1, to.0, to.1, duration_ms
        );
        self.shell(device_id, &command).await?;
        Ok(())
    }

    async fn type_text(&self, device_id: &str, text: &str) -> Result<()> {
        if text.is_empty() {
            return Err(MobileError::InvalidArgument("text must not be empty".to_string()));
        }
        self.shell(device_id, &format!("input text {}", encode_input_text(text)))
            .await?;
        Ok(())
    }

    async fn press_key(&self, device_id: &str, key: &str) -> Result<()> {
        let code = key_code(key)?;
        self.shell(device_id, &format!("input keyevent {}", code)).await?;
        Ok(())
    }

    async fn launch_app(&self, device_id: &str, app_id: &str) -> Result<()> {
        let command = format!(
            "monkey -p {} -c android.intent.category.LAUNCHER 1",
            device_arg(app_id)
        );
        let output = self.shell(device_id, &command).await?;
        if output.contains("No activities found") || output.contains("monkey aborted") {
            return Err(MobileError::Execution {
                command,
                stderr: format!("No launchable activity for package '{}'", app_id),
            });
        }
        Ok(())
    }

    async fn open_url(&self, device_id: &str, url: &str) -> Result<()> {
        let command = format!("am start -a android.intent.action.VIEW -d {}", device_arg(url));
        self.shell(device_id, &command).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::scripted::ScriptedRunner;

    const DUMP: &str = r#"<?xml version='1.0' encoding='UTF-8' standalone='yes' ?><hierarchy rotation="0"><node index="0" text="OK" resource-id="com.app:id/ok" class="android.widget.Button" content-desc="" clickable="true" bounds="[0,100][540,150]" /></hierarchy>"#;

    fn adapter(runner: ScriptedRunner) -> (AndroidAdapter, Arc<ScriptedRunner>) {
        let runner = Arc::new(runner);
        let adapter = AndroidAdapter::new(runner.clone(), DeviceConfig::default());
        (adapter, runner)
    }

    #[test]
    fn test_parse_device_list() {
        let output = "* daemon started successfully\nList of devices attached\nemulator-5554          device product:sdk_gphone64 model:sdk_gphone64_x86_64 device:emu64xa transport_id:1\nR58M123ABC             unauthorized usb:1-1 transport_id:2\n\n";
        let devices = parse_device_list(output);

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id, "emulator-5554");
        assert_eq!(devices[0].name, "sdk gphone64 x86 64");
        assert_eq!(devices[0].status, "device");
        assert_eq!(devices[1].name, "R58M123ABC");
        assert_eq!(devices[1].status, "unauthorized");
    }

    #[test]
    fn test_parse_screen_size_and_density() {
        assert_eq!(parse_screen_size("Physical size: 1080x2400\n"), (1080, 2400));
        assert_eq!(
            parse_screen_size("Physical size: 1080x2400\nOverride size: 720x1600\n"),
            (720, 1600)
        );
        assert_eq!(parse_screen_size("error: closed"), (0, 0));
        assert_eq!(parse_density("Physical density: 420\n"), 420);
        assert_eq!(parse_density("Physical density: 420\nOverride density: 320\n"), 320);
        assert_eq!(parse_density(""), 0);
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(key_code("home").unwrap(), 3);
        assert_eq!(key_code("Volume-Up").unwrap(), 24);
        let err = key_code("warp_drive").unwrap_err();
        match err {
            MobileError::UnknownKey { key, supported } => {
                assert_eq!(key, "warp_drive");
                assert!(supported.starts_with("app_switch, back"));
            }
            other => panic!("Expected unknown key error, got {other:?}"),
        }
    }

    #[test]
    fn test_encode_input_text() {
        assert_eq!(encode_input_text("hello"), r#"''\''hello'\'''"#);
        assert!(encode_input_text("a b").contains("a%sb"));
    }

    #[tokio::test]
    async fn test_first_device_requires_connected_status() {
        let (adapter, _) = adapter(ScriptedRunner::new().ok(
            "devices -l",
            "List of devices attached\nR58 unauthorized\nemulator-5556 offline\nemulator-5554 device\n",
        ));
        assert_eq!(adapter.get_first_device_id().await.unwrap(), "emulator-5554");
    }

    #[tokio::test]
    async fn test_no_device_error() {
        let (adapter, _) = adapter(ScriptedRunner::new().ok("devices -l", "List of devices attached\n\n"));
        let err = adapter.get_first_device_id().await.unwrap_err();
        assert!(matches!(err, MobileError::NoDevice { platform: Platform::Android, .. }));
    }

    #[tokio::test]
    async fn test_ui_tree_direct_dump() {
        let raw = format!("{}UI hierchary dumped to: /dev/tty", DUMP);
        let (adapter, runner) = adapter(ScriptedRunner::new().ok("dump /dev/tty", raw));

        let tree = adapter.get_ui_tree("emulator-5554").await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].resource_id.as_deref(), Some("ok"));
        assert_eq!(runner.calls().len(), 1);
        assert_eq!(runner.calls()[0], "adb -s emulator-5554 exec-out uiautomator dump /dev/tty");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ui_tree_falls_back_to_file_dump() {
        let (adapter, runner) = adapter(
            ScriptedRunner::new()
                .fail("dump /dev/tty", "ERROR: could not get idle state")
                .ok("shell uiautomator dump", "UI hierchary dumped to: /sdcard/window_dump.xml")
                .ok("cat /sdcard/window_dump.xml", DUMP),
        );

        let tree = adapter.get_ui_tree("emulator-5554").await.unwrap();
        assert_eq!(tree[0].text, "OK");
        assert_eq!(runner.count("dump /dev/tty"), 1);
        assert_eq!(runner.count("cat /sdcard/window_dump.xml"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ui_tree_ignores_stale_dump_file() {
        let stale = DUMP.replace("OK", "Previous screen");
        let (adapter, runner) = adapter(
            ScriptedRunner::new()
                .fail("dump /dev/tty", "ERROR: could not get idle state")
                .ok(
                    "shell uiautomator dump",
                    "ERROR: null root node returned by UiTestAutomationBridge.",
                )
                .ok("cat /sdcard/window_dump.xml", stale),
        );

        let err = adapter.get_ui_tree("emulator-5554").await.unwrap_err();
        assert!(matches!(err, MobileError::TreeParse(_)));
        assert_eq!(runner.count("shell uiautomator dump"), 2);
        assert_eq!(runner.count("shell rm -f /sdcard/window_dump.xml"), 2);
        assert_eq!(runner.count("cat /sdcard/window_dump.xml"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ui_tree_retries_after_settle_delay() {
        let empty = r#"<?xml version='1.0' ?><hierarchy rotation="0"></hierarchy>"#;
        let (adapter, runner) = adapter(
            ScriptedRunner::new()
                .ok("dump /dev/tty", empty)
                .ok("dump /dev/tty", DUMP)
                .ok("shell uiautomator dump", "")
                .ok("cat /sdcard/window_dump.xml", empty),
        );

        let started = tokio::time::Instant::now();
        let tree = adapter.get_ui_tree("emulator-5554").await.unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(runner.count("dump /dev/tty"), 2);
        assert!(started.elapsed() >= HIERARCHY_SETTLE_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ui_tree_exhausts_all_strategies() {
        let (adapter, runner) = adapter(
            ScriptedRunner::new()
                .fail("dump /dev/tty", "null root node")
                .fail("shell uiautomator dump", "null root node"),
        );

        let err = adapter.get_ui_tree("emulator-5554").await.unwrap_err();
        assert!(matches!(err, MobileError::TreeParse(_)));
        assert_eq!(runner.count("dump /dev/tty"), 2);
        assert_eq!(runner.count("shell uiautomator dump"), 2);
    }

    #[tokio::test]
    async fn test_screen_info_degrades_to_zero() {
        let (adapter, _) = adapter(
            ScriptedRunner::new()
                .ok("wm size", "Physical size: 1080x2400")
                .ok("wm density", "unexpected"),
        );
        let info = adapter.get_screen_info("emulator-5554").await.unwrap();
        assert_eq!((info.width, info.height), (1080, 2400));
        assert_eq!(info.density, 0.0);
    }

    #[tokio::test]
    async fn test_action_commands() {
        let (adapter, runner) = adapter(ScriptedRunner::new().ok("shell", "Events injected: 1"));

        adapter.tap("emulator-5554", 10, 20).await.unwrap();
        adapter.swipe("emulator-5554", (1, 2), (3, 4), 300).await.unwrap();
        adapter.long_press("emulator-5554", 5, 6, 1000).await.unwrap();
        adapter.press_key("emulator-5554", "back").await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0], "adb -s emulator-5554 shell input tap 10 20");
        assert_eq!(calls[1], "adb -s emulator-5554 shell input swipe 1 2 3 4 300");
        assert_eq!(calls[2], "adb -s emulator-5554 shell input swipe 5 6 5 6 1000");
        assert_eq!(calls[3], "adb -s emulator-5554 shell input keyevent 4");
    }

    #[tokio::test]
    async fn test_unknown_key_issues_no_command() {
        let (adapter, runner) = adapter(ScriptedRunner::new().ok("shell", ""));
        assert!(adapter.press_key("emulator-5554", "hyperspace").await.is_err());
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_launch_app_detects_missing_activity() {
        let (adapter, _) = adapter(
            ScriptedRunner::new().ok("monkey", "** No activities found to run, monkey aborted."),
        );
        assert!(adapter.launch_app("emulator-5554", "com.missing").await.is_err());
    }
}
