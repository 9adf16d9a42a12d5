//! Stockledger API Server
//!
//! Main entry point for the stock and ledger posting service.

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockledger_api::{AppState, create_router};
use stockledger_core::ledger::AccountCache;
use stockledger_db::{DbHandle, connect};
use stockledger_shared::{AppConfig, AppError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect(&config.database)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!(
        max_connections = config.database.max_connections,
        statement_timeout_ms = config.database.statement_timeout_ms,
        "Connected to database"
    );

    info!(
        allow_negative_stock = config.posting.allow_negative_stock,
        supplier_fallback = config.posting.supplier_fallback,
        strict_linkage = config.posting.strict_linkage,
        default_currency = %config.posting.default_currency,
        "Posting policies loaded"
    );

    let account_cache = AccountCache::with_config(
        config.cache.account_capacity,
        config.cache.account_ttl_secs,
    );
    let state = AppState::new(
        DbHandle::new(db, config.database.statement_timeout_ms),
        config.posting.clone(),
        account_cache,
    );

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
