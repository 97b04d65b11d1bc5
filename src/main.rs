//! CineDesk API - Cinema booking administration backend
//!
//! An operator-facing console backend over the cinema booking schema
//! (Movies, Theaters, Showtimes, Bookings): view a table, add a row, edit a
//! row, or delete a row with an explicit transactional cascade so no
//! orphaned showtimes or bookings are ever left behind.

mod config;
mod db;
mod error;
mod gateway;
mod models;
mod routes;
mod schema;
mod state;

use crate::config::Settings;
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("Starting CineDesk - cinema booking administration backend...");

    // Load configuration
    let settings = Settings::load()?;
    info!("Configuration loaded successfully");

    // Initialize database pool and bootstrap the cinema schema
    let pool = db::create_pool(&settings.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize database pool: {}", e))?;
    db::ensure_schema(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize schema: {}", e))?;

    let state = Arc::new(AppState::new(pool));

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("Server listening on http://{}", addr);
    info!("API Endpoints:");
    info!("   GET    /health                    - Health check");
    info!("   GET    /api/tables                - List administrable tables");
    info!("   GET    /api/records/{{table}}       - View all rows");
    info!("   POST   /api/records/{{table}}       - Add a record");
    info!("   GET    /api/records/{{table}}/{{id}}  - Load a record for editing");
    info!("   PUT    /api/records/{{table}}/{{id}}  - Update a record");
    info!("   DELETE /api/records/{{table}}/{{id}}  - Delete a record (with cascade)");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cinedesk_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        },
    }
}
