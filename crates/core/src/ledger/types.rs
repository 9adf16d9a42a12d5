//! Ledger domain types for journal entry creation and validation.
//!
//! This module defines the chart-of-accounts classification and the
//! inputs and resolved forms of journal entries posted by the engine.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockledger_shared::types::{AccountId, EntityId, amounts_match};

use super::balance::NormalBalance;

/// Top-level account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset account (debit-normal).
    Asset,
    /// Liability account (credit-normal).
    Liability,
    /// Equity account (credit-normal).
    Equity,
    /// Income account (credit-normal).
    Income,
    /// Expense account (debit-normal).
    Expense,
}

impl AccountType {
    /// Returns the side on which this account type's balance grows.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Income => NormalBalance::Credit,
        }
    }
}

/// Account subtype used to locate accounts by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountSubtype {
    /// Cash on hand.
    Cash,
    /// Bank account.
    Bank,
    /// Electronic wallet.
    Wallet,
    /// Money exchange house account.
    Exchange,
    /// Supplier payable.
    Supplier,
    /// Customer receivable.
    Customer,
    /// Employee account.
    Employee,
    /// Inventory held in a warehouse.
    Warehouse,
    /// Anything else.
    General,
    /// Balance owed between entities of the same group.
    Intercompany,
}

/// Journal entry lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Entry is being prepared; no balance effect yet.
    Draft,
    /// Entry has been posted against account balances (immutable).
    Posted,
    /// Entry is void: either a cancelled draft or a reversed posting.
    Cancelled,
}

impl EntryStatus {
    /// Returns true if the entry still affects nothing and may be edited.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the entry's lines are counted in account balances.
    #[must_use]
    pub fn affects_balances(&self) -> bool {
        matches!(self, Self::Posted)
    }
}

/// What produced a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Entered by a user.
    Manual,
    /// Generated by a business event (purchase, issue, ...).
    Auto,
    /// Opening balance.
    Opening,
    /// Valuation or correcting adjustment.
    Adjustment,
    /// Offsetting entry for a previously posted one.
    Reversal,
}

/// Side of a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Debit line.
    Debit,
    /// Credit line.
    Credit,
}

/// Account data needed to validate a posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    /// The account ID.
    pub id: AccountId,
    /// Owning entity.
    pub entity_id: EntityId,
    /// Account classification.
    pub account_type: AccountType,
    /// Account role, when classified.
    pub subtype: Option<AccountSubtype>,
    /// Group accounts only aggregate children and never receive postings.
    pub is_group: bool,
    /// Allowed currency codes; empty means any.
    pub currencies: Vec<String>,
}

impl AccountInfo {
    /// Returns true if the account accepts lines in `currency`.
    #[must_use]
    pub fn allows_currency(&self, currency: &str) -> bool {
        self.currencies.is_empty()
            || self
                .currencies
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(currency))
    }
}

/// Chart-of-accounts row as listed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    /// The account ID.
    pub id: AccountId,
    /// Owning entity.
    pub entity_id: EntityId,
    /// Parent account in the chart tree.
    pub parent_id: Option<AccountId>,
    /// Chart code, e.g. `1300`.
    pub code: Option<String>,
    /// Display name.
    pub name: String,
    /// Account classification.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Account role.
    pub subtype: Option<AccountSubtype>,
    /// Whether the account only groups children.
    pub is_group: bool,
    /// Allowed currency codes.
    pub currencies: Vec<String>,
    /// Balance of posted lines, signed by the account's normal side.
    pub balance: Decimal,
}

/// Input for a single journal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalLineInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit amount (zero on credit lines).
    pub debit: Decimal,
    /// Credit amount (zero on debit lines).
    pub credit: Decimal,
    /// Currency code of the amounts.
    pub currency: String,
    /// Optional line description.
    pub description: Option<String>,
}

impl JournalLineInput {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(
        account_id: AccountId,
        amount: Decimal,
        currency: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            currency: currency.into(),
            description,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(
        account_id: AccountId,
        amount: Decimal,
        currency: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            currency: currency.into(),
            description,
        }
    }

    /// Creates a line from a side and an amount.
    #[must_use]
    pub fn on_side(
        side: EntrySide,
        account_id: AccountId,
        amount: Decimal,
        currency: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        match side {
            EntrySide::Debit => Self::debit(account_id, amount, currency, description),
            EntrySide::Credit => Self::credit(account_id, amount, currency, description),
        }
    }
}

/// Input for posting a journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostEntryInput {
    /// Entity the entry belongs to.
    pub entity_id: EntityId,
    /// Accounting date.
    pub date: NaiveDate,
    /// Header description.
    pub description: String,
    /// External reference (invoice number, movement reference, ...).
    pub reference: Option<String>,
    /// What produced the entry.
    pub kind: EntryKind,
    /// Ordered lines.
    pub lines: Vec<JournalLineInput>,
}

/// A journal line after account resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine {
    /// The account to post to.
    pub account_id: AccountId,
    /// Account classification, which drives the balance sign.
    pub account_type: AccountType,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Currency code.
    pub currency: String,
    /// Optional line description.
    pub description: Option<String>,
    /// Signed change this line applies to the account balance.
    pub balance_change: Decimal,
}

/// Entry totals for validation and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryTotals {
    /// Sum of debit amounts.
    pub debit: Decimal,
    /// Sum of credit amounts.
    pub credit: Decimal,
    /// Whether debits and credits agree within the ledger tolerance.
    pub is_balanced: bool,
}

impl EntryTotals {
    /// Creates totals from debit and credit sums.
    #[must_use]
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self {
            debit,
            credit,
            is_balanced: amounts_match(debit, credit),
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_entry_status_editable() {
        assert!(EntryStatus::Draft.is_editable());
        assert!(!EntryStatus::Posted.is_editable());
        assert!(!EntryStatus::Cancelled.is_editable());
    }

    #[test]
    fn test_only_posted_affects_balances() {
        assert!(!EntryStatus::Draft.affects_balances());
        assert!(EntryStatus::Posted.affects_balances());
        assert!(!EntryStatus::Cancelled.affects_balances());
    }

    #[test]
    fn test_normal_balance_by_type() {
        assert_eq!(AccountType::Asset.normal_balance(), NormalBalance::Debit);
        assert_eq!(AccountType::Expense.normal_balance(), NormalBalance::Debit);
        assert_eq!(AccountType::Liability.normal_balance(), NormalBalance::Credit);
        assert_eq!(AccountType::Equity.normal_balance(), NormalBalance::Credit);
        assert_eq!(AccountType::Income.normal_balance(), NormalBalance::Credit);
    }

    #[test]
    fn test_allows_currency() {
        let mut account = AccountInfo {
            id: AccountId::new(),
            entity_id: EntityId::new(),
            account_type: AccountType::Asset,
            subtype: Some(AccountSubtype::Cash),
            is_group: false,
            currencies: vec![],
        };
        assert!(account.allows_currency("IQD"));

        account.currencies = vec!["USD".to_string()];
        assert!(account.allows_currency("usd"));
        assert!(!account.allows_currency("IQD"));
    }

    #[test]
    fn test_line_constructors() {
        let account = AccountId::new();
        let debit = JournalLineInput::debit(account, dec!(10), "USD", None);
        assert_eq!(debit.debit, dec!(10));
        assert_eq!(debit.credit, Decimal::ZERO);

        let credit = JournalLineInput::on_side(EntrySide::Credit, account, dec!(5), "USD", None);
        assert_eq!(credit.debit, Decimal::ZERO);
        assert_eq!(credit.credit, dec!(5));
    }

    #[test]
    fn test_entry_totals_within_tolerance() {
        let totals = EntryTotals::new(dec!(100.00), dec!(100.01));
        assert!(totals.is_balanced);
        assert_eq!(totals.difference(), dec!(-0.01));
    }

    #[test]
    fn test_entry_totals_unbalanced() {
        let totals = EntryTotals::new(dec!(100), dec!(50));
        assert!(!totals.is_balanced);
        assert_eq!(totals.difference(), dec!(50));
    }
}
