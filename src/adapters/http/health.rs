//! Liveness endpoint for hosting platforms that probe an HTTP port.

use crate::domain::DomainError;
use axum::{Router, routing::get};
use std::future::Future;
use std::net::SocketAddr;
use tracing::info;

pub const HEALTH_BODY: &str = "OK";
pub const BANNER_BODY: &str = "tg-digest is running";

async fn health() -> &'static str {
    HEALTH_BODY
}

async fn banner() -> &'static str {
    BANNER_BODY
}

pub fn create_router() -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
}

/// Serve the health router on `0.0.0.0:port` until `shutdown` resolves.
pub async fn serve(
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), DomainError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| DomainError::Config(format!("bind health server on {}: {}", addr, e)))?;
    info!(%addr, "health server listening");
    axum::serve(listener, create_router())
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| DomainError::Transport(format!("health server: {}", e)))
}
