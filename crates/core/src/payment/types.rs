//! Payment voucher types.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockledger_shared::types::{AccountId, BankWalletId, CashBoxId, EntityId};

use super::error::PaymentError;
use crate::ledger::{AccountSubtype, AccountType};

/// Direction of a voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherType {
    /// Receipt into the funding account.
    In,
    /// Disbursement out of the funding account.
    Out,
}

impl VoucherType {
    /// Signed change applied to the funding balance for `amount`.
    #[must_use]
    pub fn funding_delta(self, amount: Decimal) -> Decimal {
        match self {
            Self::In => amount,
            Self::Out => -amount,
        }
    }
}

/// The single cash box or bank/wallet account a voucher moves money through.
///
/// Serialized as `{"cashBoxId": ...}` or `{"bankWalletId": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundingAccount {
    /// A cash box.
    #[serde(rename = "cashBoxId")]
    CashBox(CashBoxId),
    /// A bank, wallet or exchange account.
    #[serde(rename = "bankWalletId")]
    BankWallet(BankWalletId),
}

impl FundingAccount {
    /// Builds the funding account from two optional columns, exactly one of
    /// which must be set.
    pub fn from_parts(
        cash_box_id: Option<CashBoxId>,
        bank_wallet_id: Option<BankWalletId>,
    ) -> Result<Self, PaymentError> {
        match (cash_box_id, bank_wallet_id) {
            (Some(id), None) => Ok(Self::CashBox(id)),
            (None, Some(id)) => Ok(Self::BankWallet(id)),
            (Some(_), Some(_)) => Err(PaymentError::AmbiguousFunding),
            (None, None) => Err(PaymentError::MissingFunding),
        }
    }

    /// Cash box ID, if funded by a cash box.
    #[must_use]
    pub const fn cash_box_id(self) -> Option<CashBoxId> {
        match self {
            Self::CashBox(id) => Some(id),
            Self::BankWallet(_) => None,
        }
    }

    /// Bank/wallet ID, if funded by a bank or wallet.
    #[must_use]
    pub const fn bank_wallet_id(self) -> Option<BankWalletId> {
        match self {
            Self::BankWallet(id) => Some(id),
            Self::CashBox(_) => None,
        }
    }
}

impl fmt::Display for FundingAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CashBox(id) => write!(f, "cash box {id}"),
            Self::BankWallet(id) => write!(f, "bank/wallet {id}"),
        }
    }
}

/// One allocation line of a voucher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherOperationInput {
    /// Chart account the amount is allocated to.
    pub chart_account_id: AccountId,
    /// Optional sub-allocation account.
    pub analytical_account_id: Option<AccountId>,
    /// Allocated amount.
    pub amount: Decimal,
    /// Line description.
    pub description: Option<String>,
}

/// A request to issue a voucher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueVoucherInput {
    /// Owning entity.
    pub entity_id: EntityId,
    /// Receipt or disbursement.
    pub voucher_type: VoucherType,
    /// Funding account.
    pub funding: FundingAccount,
    /// Voucher date.
    pub date: NaiveDate,
    /// Currency of all amounts.
    pub currency: String,
    /// Rate recorded for reference; amounts are never converted.
    pub exchange_rate: Decimal,
    /// Voucher total.
    pub total_amount: Decimal,
    /// External reference.
    pub reference: Option<String>,
    /// Allocation lines.
    pub operations: Vec<VoucherOperationInput>,
}

/// Funding account data needed to validate a voucher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingInfo {
    /// The funding account.
    pub account: FundingAccount,
    /// Owning entity.
    pub entity_id: EntityId,
    /// Allowed currency codes; empty means any.
    pub currencies: Vec<String>,
}

impl FundingInfo {
    /// Returns true if the funding account holds `currency`.
    #[must_use]
    pub fn allows_currency(&self, currency: &str) -> bool {
        self.currencies.is_empty()
            || self
                .currencies
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(currency))
    }
}

/// An operation with its chart account classification resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOperation {
    /// Chart account.
    pub chart_account_id: AccountId,
    /// Sub-allocation account.
    pub analytical_account_id: Option<AccountId>,
    /// Type of the chart account.
    pub account_type: AccountType,
    /// Subtype of the chart account.
    pub account_subtype: Option<AccountSubtype>,
    /// Allocated amount.
    pub amount: Decimal,
    /// Line description.
    pub description: Option<String>,
}
