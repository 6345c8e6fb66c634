//! API Server
//!
//! Wires configuration, the session manager and the HTTP stack together.

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware},
    routes::create_router,
};
use crate::config::{GameHallConfig, ServerConfig};
use crate::games::catalog::GameCatalog;
use crate::games::jackpot::JackpotAccumulator;
use crate::games::manager::SessionManager;
use crate::games::rng::EntropyProvider;
use crate::games::settlement::InMemoryWallet;
use crate::metrics::GameMetrics;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tokio::task::JoinHandle;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Build the shared state from configuration, with the in-memory wallet
pub fn build_state(config: &GameHallConfig) -> prometheus::Result<Arc<AppState>> {
    let metrics = Arc::new(GameMetrics::new()?);
    let manager = SessionManager::new(
        GameCatalog::standard(),
        Arc::new(JackpotAccumulator::new(&config.jackpot)),
        Arc::new(InMemoryWallet::new(config.wallet.opening_balance)),
        Arc::new(EntropyProvider),
        config.sessions.history_limit,
    )
    .with_metrics(metrics.clone());

    Ok(Arc::new(AppState {
        manager: Arc::new(manager),
        metrics,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Router with the full middleware stack
pub fn build_app(state: Arc<AppState>, server: &ServerConfig) -> axum::Router {
    create_router(state)
        // Request ID middleware (first for tracing)
        .layer(axum::middleware::from_fn(request_id_middleware))
        // CORS layer (before timeout to handle preflight)
        .layer(create_cors_layer(server.allowed_origins.clone()))
        .layer(TimeoutLayer::new(server.request_timeout()))
        // Tracing layer (last for complete request tracing)
        .layer(TraceLayer::new_for_http())
}

/// Periodically expire abandoned sessions
pub fn spawn_reaper(
    manager: Arc<SessionManager>,
    ttl: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            manager.reap_abandoned(ttl).await;
        }
    })
}

pub struct ApiServer {
    config: GameHallConfig,
}

impl ApiServer {
    pub fn new(config: GameHallConfig) -> Self {
        Self { config }
    }

    /// Start the API server
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "gamehall=info,tower_http=info".into()),
            )
            .init();

        let state = build_state(&self.config)?;
        let reaper = self.config.abandoned_ttl().map(|ttl| {
            info!(
                ttl_secs = ttl.as_secs(),
                interval_secs = self.config.sessions.reap_interval_secs,
                "abandoned-session reaper enabled"
            );
            spawn_reaper(state.manager.clone(), ttl, self.config.reap_interval())
        });

        let app = build_app(state, &self.config.server);
        let addr = self.socket_addr()?;
        self.log_server_info(&addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        if let Some(reaper) = reaper {
            reaper.abort();
        }
        info!("server stopped");
        Ok(())
    }

    fn socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        Ok(SocketAddr::from((
            self.config.server.host.parse::<std::net::IpAddr>()?,
            self.config.server.port,
        )))
    }

    fn log_server_info(&self, addr: &SocketAddr) {
        info!("gamehall API listening on http://{}", addr);
        info!("   CORS: {:?}", self.config.server.allowed_origins);
        info!("   Request timeout: {}s", self.config.server.request_timeout_secs);
        info!(
            "   Jackpot floor: {}, contribution: {}%",
            self.config.jackpot.floor, self.config.jackpot.contribution_percent
        );
        info!("   GET  /games                     - Game catalog");
        info!("   GET  /games/jackpots            - Jackpot pools");
        info!("   POST /games/:type/start         - Open a session");
        info!("   POST /games/:type/action        - Play");
        info!("   POST /games/:type/cashout       - Bank accrued winnings");
        info!("   GET  /games/:type/history       - Completed sessions");
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
