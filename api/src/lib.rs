//! Webhook ingress: verifies signed deliveries and appends report ids to the
//! feed file tailed by the watcher.

pub mod core;
pub mod error_handler;
mod routes;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::{info, warn};

pub use crate::core::app_state::{AppState, api_address};
pub use crate::core::signature::{sign, verify};
pub use crate::error_handler::AppError;
use crate::routes::{health_route::health, webhook::webhook_route::webhook};

/// Routes without a listener, for embedding and in-process tests.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .route("/health", get(health))
        .with_state(state)
}

/// Serves the webhook on `addr` until Ctrl+C.
pub async fn start(state: AppState, addr: &str) -> Result<(), AppError> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    info!(%addr, "webhook server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("webhook server stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
