//! SkyTwin Web - serves a live airspace simulation.

use anyhow::{Context, Result};
use clap::Parser;
use skytwin_runtime::config::AirspaceConfig;
use skytwin_web::{routes, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "skytwin-web")]
#[command(about = "SkyTwin Web - live airspace negotiation over HTTP and WebSocket")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Number of drones
    #[arg(short, long)]
    agents: Option<usize>,

    /// Reduced fleet for small displays
    #[arg(long)]
    compact: bool,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Start paused
    #[arg(long)]
    paused: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = if cli.compact {
        AirspaceConfig::compact()
    } else {
        AirspaceConfig::default()
    };
    if let Some(agents) = cli.agents {
        config.agent_count = agents;
    }
    config.seed = cli.seed;

    let state = AppState::new(config, cli.paused).context("invalid simulation config")?;
    let app = routes::create_router(state);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
