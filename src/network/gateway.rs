//! Gateway - HTTP listener for the directory API and WebSocket upgrades.
//!
//! The Gateway binds the listen socket, builds the router and serves until a
//! shutdown signal arrives. Each upgraded connection runs in its own task
//! (see [`Connection`](super::Connection)).

use crate::config::{Config, KeepaliveConfig};
use crate::handlers;
use crate::state::Directory;
use axum::Router;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Settings every session supervisor needs.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub send_queue: usize,
    pub require_membership: bool,
    pub keepalive: KeepaliveConfig,
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            send_queue: config.session.send_queue,
            require_membership: config.session.require_membership,
            keepalive: config.keepalive.clone(),
        }
    }
}

/// Application state shared across routes.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<Directory>,
    pub settings: Arc<SessionSettings>,
}

impl AppState {
    pub fn new(directory: Arc<Directory>, settings: SessionSettings) -> Self {
        Self {
            directory,
            settings: Arc::new(settings),
        }
    }
}

/// Build the relay router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/groups", post(handlers::create_group))
        .route("/groups/:group_id", get(handlers::get_group))
        .route("/groups/:group_id/users/:user_id", post(handlers::add_member))
        .route("/groups/:group_id/ws", get(super::connection::ws_handler))
        .route("/users", post(handlers::register_user))
        .route("/users/:user_id", get(handlers::get_user))
        .with_state(state)
}

/// The Gateway accepts HTTP connections and hands upgrades to sessions.
pub struct Gateway {
    listener: TcpListener,
    state: AppState,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(addr: SocketAddr, state: AppState) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(address = %listener.local_addr()?, "Listener bound");
        Ok(Self { listener, state })
    }

    /// Serve until Ctrl-C (or SIGTERM on Unix).
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        let app = router(self.state);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Gateway stopped accepting connections");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
