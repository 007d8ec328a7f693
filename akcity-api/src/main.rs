//! # AkCity API Server
//!
//! This is the main API server for AkCity, exposing the construction
//! management core over HTTP.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Registration and login with JWT access/refresh tokens
//! - Session endpoints (profile, logout, token refresh)
//! - Role permission lookups
//! - Rate limiting, CORS, and security headers
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p akcity-api
//! ```

use std::net::SocketAddr;

use akcity_api::{
    app::{build_router, AppState},
    config::Config,
};
use akcity_core::postgres::{migrations::run_migrations, pool::create_pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "akcity_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "AkCity API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::from_env()?;
    let bind_address = config.bind_address();

    // Initialize database pool and apply pending migrations
    let pool = create_pool(config.database_config()).await?;
    run_migrations(&pool).await?;

    // Build Axum application
    let state = AppState::new(pool, config);
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves when the process receives Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }

    tracing::info!("Shutdown signal received, draining connections");
}
