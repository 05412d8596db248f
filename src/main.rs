// ABOUTME: Entry point for the vibe-assistant binary.
// ABOUTME: Loads .env, parses CLI overrides, initializes tracing, and serves the HTTP API.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use vibe_server::{AppState, ServerConfig, create_router};

/// Prompt builder backend for GitHub context and Bedrock-backed enhancement.
#[derive(Debug, Parser)]
#[command(name = "vibe-assistant", version, about)]
struct Cli {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Path of the user configuration document (overrides CONFIG_FILE_PATH)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(path) = cli.config {
        config.config_path = path;
    }

    let default_filter = if config.debug {
        "vibe_assistant=debug,vibe_server=debug,vibe_agent=debug,vibe_github=debug,tower_http=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    tracing::info!("vibe-assistant starting up");
    tracing::info!(path = %config.config_path.display(), "user configuration");

    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(config)?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
