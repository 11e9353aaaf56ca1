//! openbidder: a fixed-price RTB bidding agent.
//!
//! Loads a set of agents from a JSON file, registers them with the ACS,
//! paces their balances against the Banker, and answers OpenRTB auction
//! requests until the process is signalled to stop.

use clap::Parser;
use openbidder_agents::{AgentManager, AgentRegistry, BidProcessor};
use openbidder_api::ApiServer;
use openbidder_control::{AcsClient, BankerClient};
use openbidder_core::config::{self, AppConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "openbidder")]
#[command(about = "Fixed-price RTB bidding agent")]
#[command(version)]
struct Cli {
    /// Agents configuration file: a JSON array of agent definitions.
    #[arg(long, env = "OPENBIDDER__CONFIG")]
    config: PathBuf,

    /// Bid listener port (overrides config)
    #[arg(long)]
    bid_port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "openbidder=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut app_config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config from environment, using defaults");
        AppConfig::default()
    });
    if let Some(port) = cli.bid_port {
        app_config.api.bid_port = port;
    }

    // The agents file is required; a missing or malformed file is fatal.
    let specs = config::load_agents(&cli.config)?;
    info!(
        agents = specs.len(),
        file = %cli.config.display(),
        "Agents loaded"
    );

    let registry = Arc::new(AgentRegistry::from_specs(specs));
    let processor = Arc::new(BidProcessor::new(registry.clone()));

    let acs = Arc::new(AcsClient::new(app_config.acs.base_url.clone()));
    let banker = Arc::new(BankerClient::new(app_config.banker.base_url.clone()));
    let manager = AgentManager::new(registry, acs, banker);

    manager.bootstrap().await?;

    let api_server = ApiServer::new(app_config, processor);

    if let Err(e) = api_server.start_metrics() {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("openbidder is ready to serve traffic");

    // Serves until SIGINT/SIGTERM, then unwinds the agents.
    api_server.start_http(shutdown_signal()).await?;

    info!("Shutting down, unregistering agents");
    manager.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
