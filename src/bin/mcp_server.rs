//! Mobile-use MCP Server
//!
//! This binary provides a Model Context Protocol (MCP) server for Android and iOS device automation.
//! Logs go to stderr so the stdio transport stays clean; set `RUST_LOG=debug` to see bridge commands.

use clap::{Parser, ValueEnum};
use mobile_use::{DeviceConfig, MobileServer, MobileSession};
use rmcp::{
    ServiceExt,
    transport::{
        sse_server::{SseServer, SseServerConfig},
        stdio,
        streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager},
    },
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Standard input/output transport (default)
    Stdio,
    /// Server-Sent Events transport
    Sse,
    /// HTTP streamable transport
    Http,
}

#[derive(Parser)]
#[command(name = "mobile-use-mcp")]
#[command(version)]
#[command(about = "Mobile device automation MCP server", long_about = None)]
struct Cli {
    /// Path to the adb executable
    #[arg(long, value_name = "PATH")]
    adb_path: Option<String>,

    /// Path to the idb executable
    #[arg(long, value_name = "PATH")]
    idb_path: Option<String>,

    /// Timeout for device commands in milliseconds
    #[arg(long, value_name = "MS")]
    command_timeout_ms: Option<u64>,

    /// Transport type to use
    #[arg(long, short = 't', value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for SSE or HTTP transport (default: 3000)
    #[arg(long, short = 'p', default_value = "3000")]
    port: u16,

    /// SSE endpoint path (default: /sse)
    #[arg(long, default_value = "/sse")]
    sse_path: String,

    /// SSE POST path for messages (default: /message)
    #[arg(long, default_value = "/message")]
    sse_post_path: String,

    /// HTTP streamable endpoint path (default: /mcp)
    #[arg(long, default_value = "/mcp")]
    http_path: String,
}

impl Cli {
    /// Environment configuration with command line overrides
    fn device_config(&self) -> DeviceConfig {
        let mut config = DeviceConfig::from_env();
        if let Some(path) = &self.adb_path {
            config = config.adb_path(path);
        }
        if let Some(path) = &self.idb_path {
            config = config.idb_path(path);
        }
        if let Some(ms) = self.command_timeout_ms {
            config = config.command_timeout(ms);
        }
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.device_config();

    log::info!("Mobile-use MCP Server v{}", env!("CARGO_PKG_VERSION"));
    log::info!("adb: {}, idb: {}", config.adb_path, config.idb_path);

    // one session shared by every connection
    let session = Arc::new(MobileSession::new(config));

    match cli.transport {
        Transport::Stdio => {
            log::info!("Transport: stdio");
            let server = MobileServer::with_session(session).serve(stdio()).await?;
            let quit_reason = server.waiting().await?;
            log::info!("Server quit with reason: {:?}", quit_reason);
        }
        Transport::Sse => {
            let bind_addr = format!("127.0.0.1:{}", cli.port);

            let config = SseServerConfig {
                bind: bind_addr.parse()?,
                sse_path: cli.sse_path.clone(),
                post_path: cli.sse_post_path.clone(),
                ct: CancellationToken::new(),
                sse_keep_alive: None,
            };

            let (sse_server, router) = SseServer::new(config);

            log::info!("Ready to accept MCP connections at http://{}{}", bind_addr, cli.sse_path);

            let _cancellation_token = sse_server.with_service(move || MobileServer::with_session(session.clone()));

            let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
            axum::serve(listener, router.into_make_service()).await?;
        }
        Transport::Http => {
            let bind_addr = format!("127.0.0.1:{}", cli.port);

            let service_factory = move || Ok::<_, std::io::Error>(MobileServer::with_session(session.clone()));

            let http_service = StreamableHttpService::new(
                service_factory,
                LocalSessionManager::default().into(),
                Default::default(),
            );

            let router = axum::Router::new().nest_service(&cli.http_path, http_service);

            log::info!("Ready to accept MCP connections at http://{}{}", bind_addr, cli.http_path);

            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}
