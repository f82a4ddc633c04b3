use crate::config::DeviceConfig;
use crate::session::MobileSession;
use rmcp::{
    ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool_handler,
};
use std::sync::Arc;

/// MCP server exposing the device automation tools
#[derive(Clone)]
pub struct MobileServer {
    session: Arc<MobileSession>,
    tool_router: ToolRouter<Self>,
}

impl MobileServer {
    /// Create a server driving real bridges with the given configuration
    pub fn new(config: DeviceConfig) -> Self {
        Self::with_session(Arc::new(MobileSession::new(config)))
    }

    /// Create a server around an existing session; clones share it
    pub fn with_session(session: Arc<MobileSession>) -> Self {
        Self {
            session,
            tool_router: Self::tool_router(),
        }
    }

    pub fn session(&self) -> Arc<MobileSession> {
        self.session.clone()
    }
}

#[tool_handler]
impl ServerHandler for MobileServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Automates Android devices/emulators and iOS simulators/devices. \
                 Every tool takes 'platform' (android or ios) and an optional 'deviceId'; \
                 the first usable device is used when it is omitted. \
                 Start with 'mobile_list_devices', read the screen with 'mobile_ui_tree' or \
                 'mobile_screenshot', then act with taps, swipes and text input. \
                 Action tools accept 'observe' (none, ui_tree, screenshot, both) to capture the \
                 result in the same call; set 'stabilize' to wait for animations to finish."
                    .to_string(),
            ),
        }
    }
}
