//! Chart-of-accounts read routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;
use stockledger_core::ledger::AccountSummary;
use stockledger_db::AccountRepository;
use stockledger_db::repositories::account::account_summary;
use stockledger_db::StoreError;
use stockledger_shared::types::{AccountId, EntityId};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiResult;

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/entities/{entity_id}/accounts", get(list_accounts))
        .route("/accounts/{id}", get(get_account))
}

/// Response for listing accounts.
#[derive(Debug, Serialize)]
pub struct AccountListResponse {
    /// Accounts ordered by code.
    pub accounts: Vec<AccountSummary>,
}

/// GET `/entities/{entity_id}/accounts` - List an entity's accounts with balances.
async fn list_accounts(
    State(state): State<AppState>,
    Path(entity_id): Path<Uuid>,
) -> ApiResult<Json<AccountListResponse>> {
    let repo = AccountRepository::new(state.db.clone());
    let accounts = repo
        .list_for_entity(EntityId::from(entity_id), &state.account_cache)
        .await?;

    Ok(Json(AccountListResponse {
        accounts: accounts.as_ref().clone(),
    }))
}

/// GET `/accounts/{id}` - Get one account.
async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AccountSummary>> {
    let repo = AccountRepository::new(state.db.clone());
    let account = repo
        .find_account(AccountId::from(id))
        .await?
        .ok_or_else(|| StoreError::not_found("account", id))?;

    Ok(Json(account_summary(&account)))
}
