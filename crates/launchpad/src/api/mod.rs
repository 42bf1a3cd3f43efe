//! HTTP interface for launchpad.
//!
//! Routes:
//! - `GET /launches?skip=N&limit=M`
//! - `POST /launches`
//! - `DELETE /launches/:flight_number`
//! - `GET /planets`
//! - `GET /health`

mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{delete, get};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::error::Result;
use crate::manager::LaunchManager;

pub use error::ApiError;

/// State shared by all handlers.
#[derive(Debug)]
pub struct AppState {
    /// Launch business rules.
    pub manager: LaunchManager,
    /// Pagination settings.
    pub api: ApiConfig,
}

impl AppState {
    /// Create handler state.
    #[must_use]
    pub fn new(manager: LaunchManager, api: ApiConfig) -> Self {
        Self { manager, api }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/launches",
            get(handlers::list_launches).post(handlers::schedule_launch),
        )
        .route("/launches/:flight_number", delete(handlers::abort_launch))
        .route("/planets", get(handlers::list_planets))
        .with_state(state)
}

/// Serve the API on `addr` until Ctrl-C is received.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("launchpad listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("launchpad stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
