//! Mobile-use command line
//!
//! Runs single automation steps against a device without an MCP client. Results are
//! printed to stdout as JSON.

use anyhow::{Context, Result};
use base64::Engine as _;
use clap::{Parser, Subcommand};
use mobile_use::observe::{ObserveMode, ObserveOptions};
use mobile_use::{DeviceConfig, MobileSession, Platform};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mobile-use")]
#[command(version)]
#[command(about = "Drive Android and iOS devices from the command line", long_about = None)]
struct Cli {
    /// Target platform
    #[arg(long, short = 'P', global = true, default_value = "android")]
    platform: Platform,

    /// Device serial or UDID (default: first usable device)
    #[arg(long, short = 'd', global = true)]
    device: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List devices for the platform
    Devices,
    /// Print screen size, density and orientation
    ScreenInfo,
    /// Print the UI tree
    Tree {
        /// Keep elements without text that are not clickable
        #[arg(long)]
        all: bool,
    },
    /// Save a compressed screenshot
    Screenshot {
        /// Output file
        #[arg(long, short = 'o', default_value = "screenshot.jpg")]
        out: PathBuf,
    },
    /// Wait for the screen to settle, then print the UI tree
    Observe {
        /// Upper bound on the wait in milliseconds
        #[arg(long, default_value = "10000")]
        timeout_ms: u64,

        /// Keep elements without text that are not clickable
        #[arg(long)]
        all: bool,
    },
    /// Run any registered tool with JSON parameters
    Tool {
        /// Tool name, e.g. mobile_tap
        name: String,

        /// JSON parameters; platform and deviceId are filled in from the global flags
        #[arg(default_value = "{}")]
        params: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let session = MobileSession::new(DeviceConfig::from_env());
    let device = cli.device.as_deref();

    let output = match cli.command {
        Command::Devices => {
            let devices = session.adapter(cli.platform).list_devices().await?;
            serde_json::to_value(devices)?
        }
        Command::ScreenInfo => {
            let id = session.resolve_device(cli.platform, device).await?;
            let info = session.adapter(cli.platform).get_screen_info(&id).await?;
            serde_json::to_value(info)?
        }
        Command::Tree { all } => {
            let params = serde_json::json!({
                "platform": cli.platform,
                "deviceId": device,
                "includeAll": all,
            });
            session.execute_tool("mobile_ui_tree", params).await?.data
        }
        Command::Screenshot { out } => {
            let id = session.resolve_device(cli.platform, device).await?;
            let raw = session.adapter(cli.platform).screenshot(&id).await?;
            let shot = session.compressor().compress(&raw)?;
            let bytes = base64::engine::general_purpose::STANDARD.decode(&shot.base64)?;
            tokio::fs::write(&out, bytes)
                .await
                .with_context(|| format!("writing {}", out.display()))?;
            serde_json::json!({
                "deviceId": id,
                "path": out,
                "width": shot.width,
                "height": shot.height,
            })
        }
        Command::Observe { timeout_ms, all } => {
            let mut options = ObserveOptions::new(ObserveMode::UiTree, cli.platform).stabilize(timeout_ms, 500);
            if let Some(id) = device {
                options = options.device_id(id);
            }
            if all {
                options = options.unfiltered();
            }
            let observation = session.observe(&options).await?;
            serde_json::to_value(observation)?
        }
        Command::Tool { name, params } => {
            let mut params: serde_json::Value =
                serde_json::from_str(&params).context("tool parameters must be a JSON object")?;
            let object = params
                .as_object_mut()
                .context("tool parameters must be a JSON object")?;
            object
                .entry("platform")
                .or_insert_with(|| serde_json::json!(cli.platform));
            if let Some(id) = device {
                object.entry("deviceId").or_insert_with(|| serde_json::json!(id));
            }
            let result = session.execute_tool(&name, params).await?;
            serde_json::to_value(result)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
