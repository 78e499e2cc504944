//! chat-relay server entry point.
//!
//! Starts the Axum HTTP server with the health and WebSocket endpoints.

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use chat_relay::app_state::AppState;
use chat_relay::config::ChatConfig;
use chat_relay::domain::ConnectionRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ChatConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting chat-relay");

    // Build application state
    let registry = Arc::new(ConnectionRegistry::new(config.outbox_capacity));
    let app_state = AppState { registry };

    // Build router
    let app = chat_relay::build_app()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
