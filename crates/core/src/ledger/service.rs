//! Ledger service for journal entry validation and resolution.
//!
//! This module provides the business rules applied before a journal entry is
//! persisted. It has no database dependencies: accounts are supplied through
//! a lookup closure, so callers can resolve them however they like.

use stockledger_shared::types::{AccountId, JournalEntryId};

use super::error::LedgerError;
use super::types::{AccountInfo, EntryStatus, EntryTotals, PostEntryInput, ResolvedLine};
use super::validation::validate_lines;

/// Ledger service for journal entry validation and resolution.
pub struct LedgerService;

impl LedgerService {
    /// Validate and resolve a journal entry before persisting.
    ///
    /// Steps:
    /// 1. Validates line structure and balance (see [`validate_lines`])
    /// 2. Resolves every account; any missing account fails the whole entry
    /// 3. Rejects group accounts, foreign-entity accounts and disallowed currencies
    /// 4. Computes each line's signed balance change from the account type
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if validation fails. Nothing is partially resolved.
    pub fn validate_and_resolve<A>(
        input: &PostEntryInput,
        account_lookup: A,
    ) -> Result<(Vec<ResolvedLine>, EntryTotals), LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
    {
        let totals = validate_lines(&input.lines)?;

        let resolved = input
            .lines
            .iter()
            .map(|line| {
                let account = account_lookup(line.account_id)
                    .ok_or(LedgerError::AccountNotFound(line.account_id))?;
                Self::check_account(&account, input, &line.currency)?;

                Ok(ResolvedLine {
                    account_id: line.account_id,
                    account_type: account.account_type,
                    debit: line.debit,
                    credit: line.credit,
                    currency: line.currency.clone(),
                    description: line.description.clone(),
                    balance_change: account
                        .account_type
                        .normal_balance()
                        .balance_change(line.debit, line.credit),
                })
            })
            .collect::<Result<Vec<_>, LedgerError>>()?;

        Ok((resolved, totals))
    }

    fn check_account(
        account: &AccountInfo,
        input: &PostEntryInput,
        currency: &str,
    ) -> Result<(), LedgerError> {
        if account.is_group {
            return Err(LedgerError::GroupAccount(account.id));
        }
        if account.entity_id != input.entity_id {
            return Err(LedgerError::EntityMismatch {
                account_id: account.id,
                entity_id: input.entity_id,
            });
        }
        if !account.allows_currency(currency) {
            return Err(LedgerError::CurrencyNotAllowed {
                account_id: account.id,
                currency: currency.to_string(),
            });
        }
        Ok(())
    }

    /// Distinct account IDs referenced by an entry, in ascending order.
    ///
    /// Rows are locked in this order so concurrent postings cannot deadlock.
    #[must_use]
    pub fn lock_order(input: &PostEntryInput) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = input.lines.iter().map(|l| l.account_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Validate that a draft entry can be posted.
    ///
    /// # Errors
    ///
    /// Returns error unless the entry is a draft.
    pub fn validate_can_post(id: JournalEntryId, status: EntryStatus) -> Result<(), LedgerError> {
        match status {
            EntryStatus::Draft => Ok(()),
            _ => Err(LedgerError::InvalidTransition {
                id,
                status,
                action: "post",
            }),
        }
    }

    /// Validate that an entry can be cancelled without reversal.
    ///
    /// Only entries that never affected balances (drafts) can be cancelled.
    ///
    /// # Errors
    ///
    /// Returns error if the entry is posted or already cancelled.
    pub fn validate_can_cancel(
        id: JournalEntryId,
        status: EntryStatus,
    ) -> Result<(), LedgerError> {
        match status {
            EntryStatus::Draft => Ok(()),
            EntryStatus::Posted => Err(LedgerError::CannotCancelPosted(id)),
            EntryStatus::Cancelled => Err(LedgerError::InvalidTransition {
                id,
                status,
                action: "cancel",
            }),
        }
    }

    /// Validate that an entry can be reversed with an offsetting entry.
    ///
    /// # Errors
    ///
    /// Returns error unless the entry is posted.
    pub fn validate_can_reverse(
        id: JournalEntryId,
        status: EntryStatus,
    ) -> Result<(), LedgerError> {
        match status {
            EntryStatus::Posted => Ok(()),
            _ => Err(LedgerError::InvalidTransition {
                id,
                status,
                action: "reverse",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{AccountType, EntryKind, JournalLineInput};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use stockledger_shared::types::EntityId;

    fn make_account(id: AccountId, entity_id: EntityId, account_type: AccountType) -> AccountInfo {
        AccountInfo {
            id,
            entity_id,
            account_type,
            subtype: None,
            is_group: false,
            currencies: vec![],
        }
    }

    fn make_input(entity_id: EntityId, lines: Vec<JournalLineInput>) -> PostEntryInput {
        PostEntryInput {
            entity_id,
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            description: "Test entry".to_string(),
            reference: None,
            kind: EntryKind::Manual,
            lines,
        }
    }

    #[test]
    fn test_resolves_balance_changes_by_account_type() {
        let entity = EntityId::new();
        let stock = AccountId::new();
        let supplier = AccountId::new();
        let input = make_input(
            entity,
            vec![
                JournalLineInput::debit(stock, dec!(25000), "USD", None),
                JournalLineInput::credit(supplier, dec!(25000), "USD", None),
            ],
        );

        let lookup = |id: AccountId| {
            if id == stock {
                Some(make_account(id, entity, AccountType::Asset))
            } else {
                Some(make_account(id, entity, AccountType::Liability))
            }
        };

        let (resolved, totals) = LedgerService::validate_and_resolve(&input, lookup).unwrap();
        assert!(totals.is_balanced);
        assert_eq!(resolved[0].balance_change, dec!(25000));
        assert_eq!(resolved[1].balance_change, dec!(25000));
    }

    #[test]
    fn test_missing_account_fails_whole_entry() {
        let entity = EntityId::new();
        let known = AccountId::new();
        let missing = AccountId::new();
        let input = make_input(
            entity,
            vec![
                JournalLineInput::debit(known, dec!(10), "USD", None),
                JournalLineInput::credit(missing, dec!(10), "USD", None),
            ],
        );

        let result = LedgerService::validate_and_resolve(&input, |id| {
            (id == known).then(|| make_account(id, entity, AccountType::Asset))
        });
        assert!(matches!(result, Err(LedgerError::AccountNotFound(id)) if id == missing));
    }

    #[test]
    fn test_group_account_rejected() {
        let entity = EntityId::new();
        let input = make_input(
            entity,
            vec![
                JournalLineInput::debit(AccountId::new(), dec!(10), "USD", None),
                JournalLineInput::credit(AccountId::new(), dec!(10), "USD", None),
            ],
        );

        let result = LedgerService::validate_and_resolve(&input, |id| {
            let mut account = make_account(id, entity, AccountType::Asset);
            account.is_group = true;
            Some(account)
        });
        assert!(matches!(result, Err(LedgerError::GroupAccount(_))));
    }

    #[test]
    fn test_foreign_entity_account_rejected() {
        let entity = EntityId::new();
        let input = make_input(
            entity,
            vec![
                JournalLineInput::debit(AccountId::new(), dec!(10), "USD", None),
                JournalLineInput::credit(AccountId::new(), dec!(10), "USD", None),
            ],
        );

        let result = LedgerService::validate_and_resolve(&input, |id| {
            Some(make_account(id, EntityId::new(), AccountType::Asset))
        });
        assert!(matches!(result, Err(LedgerError::EntityMismatch { .. })));
    }

    #[test]
    fn test_currency_not_allowed() {
        let entity = EntityId::new();
        let input = make_input(
            entity,
            vec![
                JournalLineInput::debit(AccountId::new(), dec!(10), "IQD", None),
                JournalLineInput::credit(AccountId::new(), dec!(10), "IQD", None),
            ],
        );

        let result = LedgerService::validate_and_resolve(&input, |id| {
            let mut account = make_account(id, entity, AccountType::Asset);
            account.currencies = vec!["USD".to_string()];
            Some(account)
        });
        assert!(matches!(result, Err(LedgerError::CurrencyNotAllowed { .. })));
    }

    #[test]
    fn test_structure_checked_before_accounts() {
        let entity = EntityId::new();
        let input = make_input(
            entity,
            vec![JournalLineInput::debit(AccountId::new(), dec!(10), "USD", None)],
        );

        // Lookup would fail, but the unbalanced entry is reported first.
        let result = LedgerService::validate_and_resolve(&input, |_| None);
        assert!(matches!(result, Err(LedgerError::Unbalanced { .. })));
    }

    #[test]
    fn test_lock_order_sorted_and_distinct() {
        let a = AccountId::from_uuid(uuid::Uuid::from_u128(3));
        let b = AccountId::from_uuid(uuid::Uuid::from_u128(1));
        let input = make_input(
            EntityId::new(),
            vec![
                JournalLineInput::debit(a, dec!(5), "USD", None),
                JournalLineInput::debit(a, dec!(5), "USD", None),
                JournalLineInput::credit(b, dec!(10), "USD", None),
            ],
        );
        assert_eq!(LedgerService::lock_order(&input), vec![b, a]);
    }

    #[test]
    fn test_status_transitions() {
        let id = JournalEntryId::new();
        assert!(LedgerService::validate_can_post(id, EntryStatus::Draft).is_ok());
        assert!(LedgerService::validate_can_post(id, EntryStatus::Posted).is_err());

        assert!(LedgerService::validate_can_cancel(id, EntryStatus::Draft).is_ok());
        assert!(matches!(
            LedgerService::validate_can_cancel(id, EntryStatus::Posted),
            Err(LedgerError::CannotCancelPosted(_))
        ));
        assert!(LedgerService::validate_can_cancel(id, EntryStatus::Cancelled).is_err());

        assert!(LedgerService::validate_can_reverse(id, EntryStatus::Posted).is_ok());
        assert!(LedgerService::validate_can_reverse(id, EntryStatus::Draft).is_err());
        assert!(LedgerService::validate_can_reverse(id, EntryStatus::Cancelled).is_err());
    }

    #[test]
    fn test_zero_change_for_balanced_pair_on_same_account() {
        let entity = EntityId::new();
        let account = AccountId::new();
        let input = make_input(
            entity,
            vec![
                JournalLineInput::debit(account, dec!(10), "USD", None),
                JournalLineInput::credit(account, dec!(10), "USD", None),
            ],
        );
        let (resolved, _) = LedgerService::validate_and_resolve(&input, |id| {
            Some(make_account(id, entity, AccountType::Asset))
        })
        .unwrap();
        let net: Decimal = resolved.iter().map(|l| l.balance_change).sum();
        assert_eq!(net, Decimal::ZERO);
    }
}
