//! Health check endpoints.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Database reachability: `up` or `down`.
    pub database: &'static str,
}

/// Health check handler.
///
/// Always answers 200; a failed database ping only shows in `database`.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.db.conn().ping().await {
        Ok(()) => "up",
        Err(e) => {
            warn!(error = %e, "Database ping failed");
            "down"
        }
    };

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
