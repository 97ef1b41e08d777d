use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use service::storage::KvStore;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::errors::StartupError;
use crate::observability::init_metrics;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        return;
    }
    info!("received Ctrl+C, shutting down");
}

/// Public entry: open the store, build the app and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    init_metrics();

    let addr = bind_addr(&cfg)?;
    let store = service::storage::open(&cfg.store).await.map_err(StartupError::Store)?;
    info!(backend = ?cfg.store.backend, "store opened");
    run_on(addr, store).await
}

/// Serve on `addr`; the store is closed whether serving ends cleanly or not.
async fn run_on(addr: SocketAddr, store: Arc<dyn KvStore>) -> anyhow::Result<()> {
    let app: Router = routes::build_router(ServerState::new(store.clone()), build_cors());

    let served = serve(addr, app).await;
    if let Err(e) = &served {
        error!(error = %e, "server stopped with error");
    }

    store.close().await?;
    info!("store connection closed");
    served
}

async fn serve(addr: SocketAddr, app: Router) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "customer manager listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
