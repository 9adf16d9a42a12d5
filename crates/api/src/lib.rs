//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST routes for stock movements, journal entries, payment vouchers and accounts
//! - Mapping of posting errors to HTTP responses
//! - Request and response types

pub mod error;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use stockledger_core::ledger::AccountCache;
use stockledger_db::DbHandle;
use stockledger_shared::PostingConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database pool plus transaction settings.
    pub db: DbHandle,
    /// Posting policies.
    pub posting: Arc<PostingConfig>,
    /// Cached account lists, invalidated after every balance-changing write.
    pub account_cache: AccountCache,
}

impl AppState {
    /// Creates the state shared by all handlers.
    #[must_use]
    pub fn new(db: DbHandle, posting: PostingConfig, account_cache: AccountCache) -> Self {
        Self {
            db,
            posting: Arc::new(posting),
            account_cache,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
