//! # Till Server
//!
//! HTTP entry point for the Till point-of-sale backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Till Server                                    │
//! │                                                                         │
//! │  ┌──────────────┐     ┌──────────────┐     ┌──────────────────────────┐ │
//! │  │  HTTP/JSON   │     │  Routes      │     │  till-store              │ │
//! │  │  (axum)      │────►│  /products   │────►│  CatalogRepository       │ │
//! │  │              │     │  /transactions│    │  TransactionRepository   │ │
//! │  │  Port: 8080  │     │  /health     │     │  SQLite (WAL)            │ │
//! │  └──────────────┘     └──────────────┘     └──────────────────────────┘ │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                         till-core                                       │
//! │                  (validation, pricing, money)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Startup order: tracing, configuration, store connect (runs migrations),
//! router, listener. Shutdown is graceful on SIGINT/SIGTERM: in-flight
//! requests complete before the process exits.

mod config;
mod error;
mod routes;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use till_store::{Store, StoreConfig};

use crate::config::ServerConfig;
use crate::routes::build_router;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,till_server=debug,sqlx=warn")),
        )
        .init();

    info!("Starting Till server...");

    // Load configuration
    let config = ServerConfig::load()?;
    info!(
        addr = %config.addr,
        database = %config.database_path.display(),
        "Configuration loaded"
    );

    // Connect to storage (creates the database and runs migrations)
    let store = Store::connect(
        StoreConfig::new(&config.database_path).max_connections(config.max_connections),
    )
    .await?;
    info!("Database ready");

    let app = build_router(AppState { store });

    let listener = TcpListener::bind(config.addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Completes when the process receives SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
