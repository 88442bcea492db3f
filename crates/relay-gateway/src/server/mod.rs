//! Gateway server setup
//!
//! Provides the WebSocket server configuration and routes.

mod handler;
mod state;

pub use handler::chat_handler;
pub use state::GatewayState;

use crate::connection::ConnectionRegistry;
use crate::liveness;
use crate::transcode::ImageTranscoder;
use axum::{routing::get, Router};
use relay_common::{AppConfig, AppError};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/chat", get(chat_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize dependencies and create `GatewayState`
#[must_use]
pub fn create_gateway_state(config: AppConfig) -> GatewayState {
    GatewayState::new(
        ConnectionRegistry::new_shared(),
        Arc::new(ImageTranscoder),
        config,
    )
}

/// Run the gateway server on an address
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    tracing::info!("Starting gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::transport(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/chat", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::transport(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.gateway.address();
    let heartbeat_period = Duration::from_secs(config.heartbeat.interval_secs);

    let state = create_gateway_state(config);

    // the one task that proactively severs connections
    liveness::spawn_monitor(state.registry().clone(), heartbeat_period);

    let app = create_app(state);
    run_server(app, &addr).await
}
