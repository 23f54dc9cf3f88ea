//! relayd - real-time group chat relay.
//!
//! Clients join named groups over WebSocket; every frame a member sends is
//! fanned out to every live session in that group.

mod config;
mod error;
mod handlers;
mod http;
mod metrics;
mod network;
mod state;
mod telemetry;

use crate::config::{Config, LogConfig, LogFormat};
use crate::network::{AppState, Gateway, SessionSettings};
use crate::state::Directory;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match log.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config_found = Path::new(&config_path).exists();
    let config = if config_found {
        Config::load(&config_path)?
    } else {
        Config::default()
    };

    init_tracing(&config.log);
    if !config_found {
        warn!(path = %config_path, "Config file not found, using defaults");
    }

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(path = %config_path, error = %e, "Invalid configuration");
        }
        anyhow::bail!("configuration has {} error(s)", errors.len());
    }

    info!(
        server = %config.server.name,
        address = %config.listen.address,
        require_membership = config.session.require_membership,
        "Starting relayd"
    );

    // metrics_port = 0 disables the endpoint (used by tests).
    match config.server.metrics_port {
        Some(port) if port != 0 => {
            metrics::init();
            let addr = SocketAddr::new(config.listen.address.ip(), port);
            tokio::spawn(http::run_metrics_server(addr));
        }
        _ => info!("Metrics disabled"),
    }

    let directory = Arc::new(Directory::new(config.session.group_queue));
    let state = AppState::new(Arc::clone(&directory), SessionSettings::from(&config));

    let gateway = Gateway::bind(config.listen.address, state).await?;
    gateway.run().await?;

    directory.reset().await;
    info!("relayd stopped");
    Ok(())
}
