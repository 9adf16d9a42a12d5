//! Journal entry routes: manual postings and the entry lifecycle.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockledger_core::ledger::{
    EntryKind, EntrySide, EntryStatus, JournalLineInput, PostEntryInput,
};
use stockledger_db::JournalRepository;
use stockledger_db::entities::{journal_entries, journal_entry_lines};
use stockledger_db::repositories::JournalEntryWithLines;
use stockledger_shared::types::{AccountId, EntityId, JournalEntryId};
use uuid::Uuid;

use crate::AppState;
use crate::error::{ApiError, ApiResult};

/// Creates the journal entry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journal-entries", post(create_entry))
        .route("/journal-entries/{id}", get(get_entry))
        .route("/journal-entries/{id}/post", post(post_entry))
        .route("/journal-entries/{id}/cancel", post(cancel_entry))
        .route("/journal-entries/{id}/reverse", post(reverse_entry))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a manual journal entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    /// Owning entity.
    pub entity_id: EntityId,
    /// Accounting date.
    pub date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// External reference.
    pub reference: Option<String>,
    /// Entry kind; manual when absent.
    pub kind: Option<EntryKind>,
    /// Keep the entry as a draft instead of posting it.
    #[serde(default)]
    pub draft: bool,
    /// Entry lines.
    pub lines: Vec<LineRequest>,
}

/// One line of a manual entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    /// Account to post to.
    pub account_id: AccountId,
    /// Debit or credit.
    pub side: EntrySide,
    /// Positive amount.
    pub amount: Decimal,
    /// Currency; the configured default when absent.
    pub currency: Option<String>,
    /// Line description.
    pub description: Option<String>,
}

/// Request body for reversing an entry.
#[derive(Debug, Deserialize)]
pub struct ReverseRequest {
    /// Why the entry is reversed.
    pub reason: String,
}

/// Response for a journal entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryResponse {
    /// Entry ID.
    pub id: Uuid,
    /// Owning entity.
    pub entity_id: Uuid,
    /// Accounting date.
    pub date: NaiveDate,
    /// Description.
    pub description: String,
    /// External reference.
    pub reference: Option<String>,
    /// Entry kind.
    pub kind: EntryKind,
    /// Lifecycle status.
    pub status: EntryStatus,
    /// Entry this one reverses.
    pub reversal_of: Option<Uuid>,
    /// Entry that reversed this one.
    pub reversed_by: Option<Uuid>,
    /// When the entry was posted.
    pub posted_at: Option<String>,
    /// Total debits.
    pub total_debit: Decimal,
    /// Total credits.
    pub total_credit: Decimal,
    /// Lines in order.
    pub lines: Vec<JournalLineResponse>,
}

/// Response for a journal line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalLineResponse {
    /// Line ID.
    pub id: Uuid,
    /// One-based position.
    pub line_no: i32,
    /// Account posted to.
    pub account_id: Uuid,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Currency.
    pub currency: String,
    /// Description.
    pub description: Option<String>,
    /// Account version after this line (posted entries only).
    pub account_version: Option<i64>,
    /// Account balance before this line.
    pub previous_balance: Option<Decimal>,
    /// Account balance after this line.
    pub current_balance: Option<Decimal>,
}

impl JournalEntryResponse {
    /// Builds the response from a stored entry and its lines.
    #[must_use]
    pub fn new(entry: &journal_entries::Model, lines: &[journal_entry_lines::Model]) -> Self {
        Self {
            id: entry.id,
            entity_id: entry.entity_id,
            date: entry.entry_date,
            description: entry.description.clone(),
            reference: entry.reference.clone(),
            kind: entry.kind.into(),
            status: entry.status.into(),
            reversal_of: entry.reversal_of,
            reversed_by: entry.reversed_by,
            posted_at: entry.posted_at.map(|at| at.to_rfc3339()),
            total_debit: lines.iter().map(|l| l.debit).sum(),
            total_credit: lines.iter().map(|l| l.credit).sum(),
            lines: lines.iter().map(JournalLineResponse::from).collect(),
        }
    }
}

impl From<&JournalEntryWithLines> for JournalEntryResponse {
    fn from(entry: &JournalEntryWithLines) -> Self {
        Self::new(&entry.entry, &entry.lines)
    }
}

impl From<&journal_entry_lines::Model> for JournalLineResponse {
    fn from(line: &journal_entry_lines::Model) -> Self {
        Self {
            id: line.id,
            line_no: line.line_no,
            account_id: line.account_id,
            debit: line.debit,
            credit: line.credit,
            currency: line.currency.clone(),
            description: line.description.clone(),
            account_version: line.account_version,
            previous_balance: line.previous_balance,
            current_balance: line.current_balance,
        }
    }
}

/// Response for a reversal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReversalResponse {
    /// The reversed entry, now cancelled.
    pub original: JournalEntryResponse,
    /// The posted reversing entry.
    pub reversal: JournalEntryResponse,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/journal-entries` - Post a manual entry, or store it as a draft.
async fn create_entry(
    State(state): State<AppState>,
    payload: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let input = entry_input(payload.header(), payload.lines, &state.posting.default_currency);

    let repo = JournalRepository::new(state.db.clone());
    let entry = repo.post_entry(input, payload.draft).await?;
    state.account_cache.invalidate(entry.entry.entity_id.into());

    Ok((StatusCode::CREATED, Json(JournalEntryResponse::from(&entry))))
}

/// GET `/journal-entries/{id}` - Get an entry with its lines.
async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<JournalEntryResponse>> {
    let repo = JournalRepository::new(state.db.clone());
    let entry = repo.get(JournalEntryId::from(id)).await?;
    Ok(Json(JournalEntryResponse::from(&entry)))
}

/// POST `/journal-entries/{id}/post` - Post a draft.
async fn post_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<JournalEntryResponse>> {
    let repo = JournalRepository::new(state.db.clone());
    let entry = repo.post_draft(JournalEntryId::from(id)).await?;
    state.account_cache.invalidate(entry.entry.entity_id.into());
    Ok(Json(JournalEntryResponse::from(&entry)))
}

/// POST `/journal-entries/{id}/cancel` - Cancel a draft.
async fn cancel_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<JournalEntryResponse>> {
    let id = JournalEntryId::from(id);
    let repo = JournalRepository::new(state.db.clone());
    repo.cancel_entry(id).await?;
    let entry = repo.get(id).await?;
    Ok(Json(JournalEntryResponse::from(&entry)))
}

/// POST `/journal-entries/{id}/reverse` - Reverse a posted entry.
async fn reverse_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ReverseRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    if payload.reason.trim().is_empty() {
        return Err(ApiError::validation("A reversal reason is required"));
    }

    let id = JournalEntryId::from(id);
    let repo = JournalRepository::new(state.db.clone());
    let reversed = repo.reverse_entry(id, payload.reason.trim()).await?;
    state
        .account_cache
        .invalidate(reversed.original.entity_id.into());

    let original = repo.get(id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReversalResponse {
            original: JournalEntryResponse::from(&original),
            reversal: JournalEntryResponse::from(&reversed.reversal),
        }),
    ))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Header fields of a manual entry.
struct EntryHeader {
    entity_id: EntityId,
    date: NaiveDate,
    description: String,
    reference: Option<String>,
    kind: EntryKind,
}

impl CreateEntryRequest {
    fn header(&self) -> EntryHeader {
        EntryHeader {
            entity_id: self.entity_id,
            date: self.date,
            description: self.description.clone(),
            reference: self.reference.clone(),
            kind: self.kind.unwrap_or(EntryKind::Manual),
        }
    }
}

fn entry_input(header: EntryHeader, lines: Vec<LineRequest>, default_currency: &str) -> PostEntryInput {
    PostEntryInput {
        entity_id: header.entity_id,
        date: header.date,
        description: header.description,
        reference: header.reference,
        kind: header.kind,
        lines: lines
            .into_iter()
            .map(|line| {
                JournalLineInput::on_side(
                    line.side,
                    line.account_id,
                    line.amount,
                    line.currency
                        .unwrap_or_else(|| default_currency.to_string())
                        .to_uppercase(),
                    line.description,
                )
            })
            .collect(),
    }
}
