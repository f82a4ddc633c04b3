use crate::{config::DeviceConfig,
            device::{AndroidAdapter, IosAdapter, Platform, PlatformAdapter, resolve_device},
            error::Result,
            exec::{CommandRunner, SystemRunner},
            observe::{ObservationResult, ObserveOptions, observe},
            screenshot::{JpegCompressor, ScreenshotCompressor},
            tools::{ToolContext, ToolRegistry, ToolResult}};
use std::sync::Arc;

/// Entry point for device automation: both platform bridges plus the tool registry
pub struct MobileSession {
    config: DeviceConfig,
    android: Arc<dyn PlatformAdapter>,
    ios: Arc<dyn PlatformAdapter>,
    compressor: Arc<dyn ScreenshotCompressor>,

    /// Tool registry for executing automation tools
    tool_registry: ToolRegistry,
}

impl MobileSession {
    /// Create a session that drives real bridge executables
    pub fn new(config: DeviceConfig) -> Self {
        Self::with_runner(config, Arc::new(SystemRunner))
    }

    /// Create a session whose bridges run commands through `runner`
    pub fn with_runner(config: DeviceConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let android = Arc::new(AndroidAdapter::new(runner.clone(), config.clone()));
        let ios = Arc::new(IosAdapter::new(runner, config.clone()));
        let compressor = Arc::new(JpegCompressor::from_config(&config));
        Self::from_parts(config, android, ios, compressor)
    }

    /// Assemble a session from explicit parts
    pub fn from_parts(
        config: DeviceConfig,
        android: Arc<dyn PlatformAdapter>,
        ios: Arc<dyn PlatformAdapter>,
        compressor: Arc<dyn ScreenshotCompressor>,
    ) -> Self {
        Self {
            config,
            android,
            ios,
            compressor,
            tool_registry: ToolRegistry::with_defaults(),
        }
    }

    /// Bridge for the given platform
    pub fn adapter(&self, platform: Platform) -> &dyn PlatformAdapter {
        match platform {
            Platform::Android => self.android.as_ref(),
            Platform::Ios => self.ios.as_ref(),
        }
    }

    /// Use the given device id or the platform's first usable device
    pub async fn resolve_device(&self, platform: Platform, device_id: Option<&str>) -> Result<String> {
        resolve_device(self.adapter(platform), device_id).await
    }

    pub async fn observe(&self, options: &ObserveOptions) -> Result<Option<ObservationResult>> {
        observe(self.adapter(options.platform), self.compressor.as_ref(), options).await
    }

    pub fn compressor(&self) -> &dyn ScreenshotCompressor {
        self.compressor.as_ref()
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Get the tool registry
    pub fn tool_registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    /// Get mutable tool registry
    pub fn tool_registry_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tool_registry
    }

    /// Execute a tool by name
    pub async fn execute_tool(&self, name: &str, params: serde_json::Value) -> Result<ToolResult> {
        let context = ToolContext::new(self);
        self.tool_registry.execute(name, params, &context).await
    }
}

impl Default for MobileSession {
    fn default() -> Self {
        Self::new(DeviceConfig::from_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_matches_platform() {
        let session = MobileSession::new(DeviceConfig::default());
        assert_eq!(session.adapter(Platform::Android).platform(), Platform::Android);
        assert_eq!(session.adapter(Platform::Ios).platform(), Platform::Ios);
    }

    #[tokio::test]
    async fn test_explicit_device_id_skips_enumeration() {
        let session = MobileSession::new(DeviceConfig::default());
        let id = session
            .resolve_device(Platform::Android, Some("emulator-5554"))
            .await
            .unwrap();
        assert_eq!(id, "emulator-5554");
    }

    #[test]
    fn test_registry_is_populated() {
        let session = MobileSession::new(DeviceConfig::default());
        assert!(session.tool_registry().has("mobile_observe"));
        assert_eq!(session.compressor().mime_type(), "image/jpeg");
    }
}
