//! Payment voucher routes.

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
use stockledger_core::ledger::{AccountSubtype, AccountType};
use stockledger_core::payment::{
    FundingAccount, IssueVoucherInput, VoucherOperationInput, VoucherType,
};
use stockledger_core::posting::PostingError;
use stockledger_db::PaymentVoucherRepository;
use stockledger_db::entities::{payment_voucher_operations, payment_vouchers};
use stockledger_db::repositories::VoucherWithOperations;
use stockledger_shared::types::{
    AccountId, BankWalletId, CashBoxId, EntityId, PaymentVoucherId,
};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiResult;

/// Creates the payment voucher routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payment-vouchers", post(issue_voucher))
        .route(
            "/payment-vouchers/{id}",
            get(get_voucher).delete(delete_voucher),
        )
}

/// Request body for issuing a voucher.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueVoucherRequest {
    /// Owning entity.
    pub entity_id: EntityId,
    /// `in` or `out`.
    #[serde(rename = "type")]
    pub voucher_type: VoucherType,
    /// Cash box funding the voucher.
    pub cash_box_id: Option<CashBoxId>,
    /// Bank/wallet account funding the voucher.
    pub bank_wallet_id: Option<BankWalletId>,
    /// Voucher date.
    pub date: NaiveDate,
    /// Currency code.
    pub currency: String,
    /// Recorded exchange rate; 1 when absent.
    pub exchange_rate: Option<Decimal>,
    /// Voucher total.
    pub total_amount: Decimal,
    /// External reference.
    pub reference: Option<String>,
    /// Allocation lines.
    pub operations: Vec<OperationRequest>,
}

/// One allocation line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    /// Chart account.
    pub chart_account_id: AccountId,
    /// Optional sub-allocation account.
    pub analytical_account_id: Option<AccountId>,
    /// Amount.
    pub amount: Decimal,
    /// Line description.
    pub description: Option<String>,
}

/// Response for a voucher.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVoucherResponse {
    /// Voucher ID.
    pub id: Uuid,
    /// Owning entity.
    pub entity_id: Uuid,
    /// Direction.
    #[serde(rename = "type")]
    pub voucher_type: VoucherType,
    /// Funding cash box.
    pub cash_box_id: Option<Uuid>,
    /// Funding bank/wallet account.
    pub bank_wallet_id: Option<Uuid>,
    /// Voucher date.
    pub date: NaiveDate,
    /// Currency.
    pub currency: String,
    /// Exchange rate.
    pub exchange_rate: Decimal,
    /// Total.
    pub total_amount: Decimal,
    /// Reference.
    pub reference: Option<String>,
    /// Creation time.
    pub created_at: String,
    /// Allocation lines with their resolved account classification.
    pub operations: Vec<OperationResponse>,
}

/// Response for an allocation line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    /// One-based position.
    pub line_no: i32,
    /// Chart account.
    pub chart_account_id: Uuid,
    /// Sub-allocation account.
    pub analytical_account_id: Option<Uuid>,
    /// Type of the chart account.
    pub account_type: AccountType,
    /// Subtype of the chart account.
    pub account_subtype: Option<AccountSubtype>,
    /// Amount.
    pub amount: Decimal,
    /// Description.
    pub description: Option<String>,
}

impl PaymentVoucherResponse {
    /// Builds the response from a stored voucher and its operations.
    #[must_use]
    pub fn new(
        voucher: &payment_vouchers::Model,
        operations: &[payment_voucher_operations::Model],
    ) -> Self {
        Self {
            id: voucher.id,
            entity_id: voucher.entity_id,
            voucher_type: voucher.voucher_type.into(),
            cash_box_id: voucher.cash_box_id,
            bank_wallet_id: voucher.bank_wallet_id,
            date: voucher.voucher_date,
            currency: voucher.currency.clone(),
            exchange_rate: voucher.exchange_rate,
            total_amount: voucher.total_amount,
            reference: voucher.reference.clone(),
            created_at: voucher.created_at.to_rfc3339(),
            operations: operations
                .iter()
                .map(|op| OperationResponse {
                    line_no: op.line_no,
                    chart_account_id: op.chart_account_id,
                    analytical_account_id: op.analytical_account_id,
                    account_type: op.account_type.into(),
                    account_subtype: op.account_subtype.map(Into::into),
                    amount: op.amount,
                    description: op.description.clone(),
                })
                .collect(),
        }
    }
}

impl From<&VoucherWithOperations> for PaymentVoucherResponse {
    fn from(voucher: &VoucherWithOperations) -> Self {
        Self::new(&voucher.voucher, &voucher.operations)
    }
}

impl IssueVoucherRequest {
    /// Converts the request into the voucher to issue.
    pub fn into_input(self) -> Result<IssueVoucherInput, PostingError> {
        let funding = FundingAccount::from_parts(self.cash_box_id, self.bank_wallet_id)?;
        Ok(IssueVoucherInput {
            entity_id: self.entity_id,
            voucher_type: self.voucher_type,
            funding,
            date: self.date,
            currency: self.currency.to_uppercase(),
            exchange_rate: self.exchange_rate.unwrap_or(Decimal::ONE),
            total_amount: self.total_amount,
            reference: self.reference,
            operations: self
                .operations
                .into_iter()
                .map(|op| VoucherOperationInput {
                    chart_account_id: op.chart_account_id,
                    analytical_account_id: op.analytical_account_id,
                    amount: op.amount,
                    description: op.description,
                })
                .collect(),
        })
    }
}

/// POST `/payment-vouchers` - Issue a voucher.
async fn issue_voucher(
    State(state): State<AppState>,
    payload: Result<Json<IssueVoucherRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let input = payload.into_input()?;

    let repo = PaymentVoucherRepository::new(state.db.clone());
    let voucher = repo.issue(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentVoucherResponse::from(&voucher)),
    ))
}

/// GET `/payment-vouchers/{id}` - Get a voucher with its operations.
async fn get_voucher(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PaymentVoucherResponse>> {
    let repo = PaymentVoucherRepository::new(state.db.clone());
    let voucher = repo.get(PaymentVoucherId::from(id)).await?;
    Ok(Json(PaymentVoucherResponse::from(&voucher)))
}

/// DELETE `/payment-vouchers/{id}` - Delete a voucher, restoring the funding balance.
async fn delete_voucher(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let repo = PaymentVoucherRepository::new(state.db.clone());
    repo.delete(PaymentVoucherId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use stockledger_core::posting::ErrorKind;

    fn request(funding: serde_json::Value) -> IssueVoucherRequest {
        let mut body = json!({
            "entityId": Uuid::now_v7(),
            "type": "out",
            "date": "2026-03-15",
            "currency": "usd",
            "totalAmount": "25000",
            "operations": [
                { "chartAccountId": Uuid::now_v7(), "amount": 25000 }
            ]
        });
        if let (Some(body), Some(funding)) = (body.as_object_mut(), funding.as_object()) {
            body.extend(funding.clone());
        }
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_request_into_input() {
        let wallet = Uuid::now_v7();
        let input = request(json!({ "bankWalletId": wallet }))
            .into_input()
            .unwrap();

        assert_eq!(input.funding, FundingAccount::BankWallet(wallet.into()));
        assert_eq!(input.currency, "USD");
        assert_eq!(input.exchange_rate, Decimal::ONE);
        assert_eq!(input.total_amount, dec!(25000));
        assert_eq!(input.operations[0].amount, dec!(25000));
    }

    #[test]
    fn test_request_needs_exactly_one_funding_account() {
        let err = request(json!({})).into_input().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = request(json!({
            "cashBoxId": Uuid::now_v7(),
            "bankWalletId": Uuid::now_v7()
        }))
        .into_input()
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
