//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod accounts;
pub mod health;
pub mod journal_entries;
pub mod payment_vouchers;
pub mod stock_movements;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(journal_entries::routes())
        .merge(payment_vouchers::routes())
        .merge(stock_movements::routes())
}
