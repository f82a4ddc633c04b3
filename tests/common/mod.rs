#![allow(dead_code)]

use async_trait::async_trait;
use mobile_use::{Bounds, Device, MobileError, Platform, PlatformAdapter, Result, ScreenInfo, UiElement};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory device: trees are served in order and the last one repeats
pub struct FakeAdapter {
    platform: Platform,
    devices: Vec<Device>,
    trees: Mutex<VecDeque<Vec<UiElement>>>,
    png: Vec<u8>,
    latency: Duration,
    pub tree_calls: AtomicUsize,
    pub screenshot_calls: AtomicUsize,
    pub enumerate_calls: AtomicUsize,
    pub actions: Mutex<Vec<String>>,
}

impl FakeAdapter {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            devices: vec![Device::new("fake-1", "Fake Phone", platform, "device")],
            trees: Mutex::new(VecDeque::from([Vec::new()])),
            png: png(1080, 2400),
            latency: Duration::ZERO,
            tree_calls: AtomicUsize::new(0),
            screenshot_calls: AtomicUsize::new(0),
            enumerate_calls: AtomicUsize::new(0),
            actions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_trees(self, trees: Vec<Vec<UiElement>>) -> Self {
        *self.trees.lock().unwrap() = trees.into();
        self
    }

    /// Each tree and screenshot capture takes this long
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn without_devices(mut self) -> Self {
        self.devices.clear();
        self
    }

    pub fn tree_calls(&self) -> usize {
        self.tree_calls.load(Ordering::SeqCst)
    }

    pub fn screenshot_calls(&self) -> usize {
        self.screenshot_calls.load(Ordering::SeqCst)
    }

    pub fn enumerate_calls(&self) -> usize {
        self.enumerate_calls.load(Ordering::SeqCst)
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    fn record(&self, action: String) {
        self.actions.lock().unwrap().push(action);
    }
}

#[async_trait]
impl PlatformAdapter for FakeAdapter {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn list_devices(&self) -> Result<Vec<Device>> {
        self.enumerate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.devices.clone())
    }

    async fn get_first_device_id(&self) -> Result<String> {
        let devices = self.list_devices().await?;
        devices
            .first()
            .map(|d| d.id.clone())
            .ok_or_else(|| MobileError::NoDevice {
                platform: self.platform,
                remedy: "Start a fake device".to_string(),
            })
    }

    async fn screenshot(&self, _device_id: &str) -> Result<Vec<u8>> {
        self.screenshot_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        Ok(self.png.clone())
    }

    async fn get_screen_info(&self, _device_id: &str) -> Result<ScreenInfo> {
        Ok(ScreenInfo::new(1080, 2400, 420.0))
    }

    async fn get_ui_tree(&self, _device_id: &str) -> Result<Vec<UiElement>> {
        self.tree_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        let mut trees = self.trees.lock().unwrap();
        let tree = if trees.len() > 1 {
            trees.pop_front()
        } else {
            trees.front().cloned()
        };
        Ok(tree.unwrap_or_default())
    }

    async fn tap(&self, device_id: &str, x: i32, y: i32) -> Result<()> {
        self.record(format!("tap {} {} {}", device_id, x, y));
        Ok(())
    }

    async fn double_tap(&self, device_id: &str, x: i32, y: i32) -> Result<()> {
        self.record(format!("double_tap {} {} {}", device_id, x, y));
        Ok(())
    }

    async fn long_press(&self, device_id: &str, x: i32, y: i32, duration_ms: u64) -> Result<()> {
        self.record(format!("long_press {} {} {} {}", device_id, x, y, duration_ms));
        Ok(())
    }

    async fn swipe(&self, device_id: &str, from: (i32, i32), to: (i32, i32), duration_ms: u64) -> Result<()> {
        self.record(format!(
            "swipe {} {},{} {},{} {}",
            device_id, from.0, from.1, to.0, to.1, duration_ms
        ));
        Ok(())
    }

    async fn type_text(&self, device_id: &str, text: &str) -> Result<()> {
        self.record(format!("type {} {}", device_id, text));
        Ok(())
    }

    async fn press_key(&self, device_id: &str, key: &str) -> Result<()> {
        if key == "warp" {
            return Err(MobileError::UnknownKey {
                key: key.to_string(),
                supported: "back, home".to_string(),
            });
        }
        self.record(format!("key {} {}", device_id, key));
        Ok(())
    }

    async fn launch_app(&self, device_id: &str, app_id: &str) -> Result<()> {
        self.record(format!("launch {} {}", device_id, app_id));
        Ok(())
    }

    async fn open_url(&self, device_id: &str, url: &str) -> Result<()> {
        self.record(format!("open {} {}", device_id, url));
        Ok(())
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::new_rgb8(width, height);
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, image::ImageOutputFormat::Png).unwrap();
    cursor.into_inner()
}

pub fn element(index: usize, text: &str, y: i32, clickable: bool) -> UiElement {
    UiElement::new(index, "TextView", Bounds::new(0, y, 1080, 100))
        .with_text(text)
        .with_clickable(clickable)
}

/// Status bar clock: inside the volatile band
pub fn clock(time: &str) -> UiElement {
    UiElement::new(0, "TextView", Bounds::new(20, 10, 120, 40)).with_text(time)
}
