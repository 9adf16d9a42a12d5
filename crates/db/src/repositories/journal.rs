//! Journal engine: persists double-entry postings.
//!
//! Posting locks the referenced accounts in ascending id order, validates
//! and resolves the lines in core, inserts the header and lines, stamps each
//! line with its account's next version and running balance, and refreshes
//! the cached `accounts.balance`. Drafts are stored without versions or
//! balances and pick them up when posted.
//!
//! Posted entries are never edited: voiding one posts a reversing entry and
//! marks the original `cancelled` with `reversed_by` set.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use stockledger_core::ledger::{
    EntryStatus, JournalLineInput, LedgerError, LedgerService, PostEntryInput, ResolvedLine,
    ReversalInput, ReversalService, RunningBalance,
};
use stockledger_shared::types::{AccountId, JournalEntryId};
use tracing::info;
use uuid::Uuid;

use super::account::{AccountRepository, account_info};
use crate::entities::{
    accounts, journal_entries, journal_entry_lines, sea_orm_active_enums as db_enums,
};
use crate::error::StoreResult;
use crate::unit_of_work::DbHandle;

/// A journal entry with its lines in line order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalEntryWithLines {
    /// Entry header.
    pub entry: journal_entries::Model,
    /// Entry lines.
    pub lines: Vec<journal_entry_lines::Model>,
}

impl JournalEntryWithLines {
    /// Typed ID of the entry.
    #[must_use]
    pub fn id(&self) -> JournalEntryId {
        self.entry.id.into()
    }
}

/// Outcome of reversing a posted entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReversedEntry {
    /// The original entry, now cancelled.
    pub original: journal_entries::Model,
    /// The posted reversing entry.
    pub reversal: JournalEntryWithLines,
}

/// Journal repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DbHandle,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DbHandle) -> Self {
        Self { db }
    }

    /// Posts an entry in its own unit of work, or stores it as a draft.
    ///
    /// # Errors
    ///
    /// Returns a validation error for unbalanced or malformed entries and
    /// unknown or ineligible accounts; nothing is written in that case.
    pub async fn post_entry(
        &self,
        input: PostEntryInput,
        as_draft: bool,
    ) -> StoreResult<JournalEntryWithLines> {
        let status = if as_draft {
            EntryStatus::Draft
        } else {
            EntryStatus::Posted
        };

        let uow = self.db.begin().await?;
        let entry = Self::post_in(uow.transaction(), &input, status, None).await?;
        uow.commit().await?;

        info!(
            entry_id = %entry.entry.id,
            entity_id = %input.entity_id,
            lines = entry.lines.len(),
            ?status,
            "Journal entry recorded"
        );
        Ok(entry)
    }

    /// Posts a draft entry.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown entries and a validation error unless
    /// the entry is a draft whose lines still resolve.
    pub async fn post_draft(&self, id: JournalEntryId) -> StoreResult<JournalEntryWithLines> {
        let uow = self.db.begin().await?;
        let entry = Self::post_draft_in(uow.transaction(), id).await?;
        uow.commit().await?;

        info!(entry_id = %id, "Draft journal entry posted");
        Ok(entry)
    }

    /// Cancels a draft entry.
    ///
    /// # Errors
    ///
    /// Returns `CannotCancelPosted` for posted entries; those are reversed.
    pub async fn cancel_entry(&self, id: JournalEntryId) -> StoreResult<journal_entries::Model> {
        let uow = self.db.begin().await?;
        let entry = Self::cancel_in(uow.transaction(), id).await?;
        uow.commit().await?;

        info!(entry_id = %id, "Journal entry cancelled");
        Ok(entry)
    }

    /// Reverses a posted entry, dated today.
    ///
    /// # Errors
    ///
    /// Returns a validation error unless the entry is posted.
    pub async fn reverse_entry(
        &self,
        id: JournalEntryId,
        reason: &str,
    ) -> StoreResult<ReversedEntry> {
        let uow = self.db.begin().await?;
        let reversed =
            Self::reverse_in(uow.transaction(), id, Utc::now().date_naive(), reason).await?;
        uow.commit().await?;

        info!(
            entry_id = %id,
            reversal_id = %reversed.reversal.entry.id,
            reason,
            "Journal entry reversed"
        );
        Ok(reversed)
    }

    /// Gets an entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry does not exist.
    pub async fn get(&self, id: JournalEntryId) -> StoreResult<JournalEntryWithLines> {
        let conn = self.db.conn();
        let entry = journal_entries::Entity::find_by_id(id.into_inner())
            .one(conn)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;
        let lines = Self::lines_of(conn, id).await?;
        Ok(JournalEntryWithLines { entry, lines })
    }

    /// Records an entry on the caller's transaction.
    ///
    /// With `EntryStatus::Posted` the accounts are locked and balances
    /// updated; with `EntryStatus::Draft` only the rows are inserted.
    pub async fn post_in<C: ConnectionTrait>(
        conn: &C,
        input: &PostEntryInput,
        status: EntryStatus,
        reversal_of: Option<JournalEntryId>,
    ) -> StoreResult<JournalEntryWithLines> {
        let posted = status.affects_balances();
        let ids = LedgerService::lock_order(input);
        let accounts = if posted {
            AccountRepository::lock_accounts(conn, &ids).await?
        } else {
            AccountRepository::load_accounts(conn, &ids).await?
        };

        let (resolved, _totals) = LedgerService::validate_and_resolve(input, |id| {
            accounts.get(&id).map(account_info)
        })?;

        let now = Utc::now().into();
        let entry = journal_entries::ActiveModel {
            id: Set(Uuid::now_v7()),
            entity_id: Set(input.entity_id.into_inner()),
            entry_date: Set(input.date),
            description: Set(input.description.clone()),
            reference: Set(input.reference.clone()),
            kind: Set(input.kind.into()),
            status: Set(status.into()),
            reversal_of: Set(reversal_of.map(JournalEntryId::into_inner)),
            reversed_by: Set(None),
            posted_at: Set(posted.then_some(now)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await?;

        let balances: Vec<Option<RunningBalance>> = if posted {
            Self::apply_balances(conn, &resolved, &accounts)
                .await?
                .into_iter()
                .map(Some)
                .collect()
        } else {
            vec![None; resolved.len()]
        };

        let mut lines = Vec::with_capacity(resolved.len());
        for (index, (line, balance)) in resolved.iter().zip(balances).enumerate() {
            let row = journal_entry_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                entry_id: Set(entry.id),
                line_no: Set(line_no(index)),
                account_id: Set(line.account_id.into_inner()),
                debit: Set(line.debit),
                credit: Set(line.credit),
                currency: Set(line.currency.clone()),
                description: Set(line.description.clone()),
                account_version: Set(balance.map(|b| b.account_version)),
                previous_balance: Set(balance.map(|b| b.previous_balance)),
                current_balance: Set(balance.map(|b| b.current_balance)),
                created_at: Set(now),
            }
            .insert(conn)
            .await?;
            lines.push(row);
        }

        Ok(JournalEntryWithLines { entry, lines })
    }

    /// Posts a draft on the caller's transaction.
    pub async fn post_draft_in<C: ConnectionTrait>(
        conn: &C,
        id: JournalEntryId,
    ) -> StoreResult<JournalEntryWithLines> {
        let entry = Self::lock_entry(conn, id).await?;
        LedgerService::validate_can_post(id, entry.status.into())?;

        let stored = Self::lines_of(conn, id).await?;
        let input = PostEntryInput {
            entity_id: entry.entity_id.into(),
            date: entry.entry_date,
            description: entry.description.clone(),
            reference: entry.reference.clone(),
            kind: entry.kind.into(),
            lines: stored.iter().map(line_input).collect(),
        };

        let ids = LedgerService::lock_order(&input);
        let accounts = AccountRepository::lock_accounts(conn, &ids).await?;
        let (resolved, _totals) = LedgerService::validate_and_resolve(&input, |id| {
            accounts.get(&id).map(account_info)
        })?;
        let balances = Self::apply_balances(conn, &resolved, &accounts).await?;

        let mut lines = Vec::with_capacity(stored.len());
        for (row, balance) in stored.into_iter().zip(balances) {
            let mut active: journal_entry_lines::ActiveModel = row.into();
            active.account_version = Set(Some(balance.account_version));
            active.previous_balance = Set(Some(balance.previous_balance));
            active.current_balance = Set(Some(balance.current_balance));
            lines.push(active.update(conn).await?);
        }

        let now = Utc::now().into();
        let mut active: journal_entries::ActiveModel = entry.into();
        active.status = Set(db_enums::EntryStatus::Posted);
        active.posted_at = Set(Some(now));
        active.updated_at = Set(now);
        let entry = active.update(conn).await?;

        Ok(JournalEntryWithLines { entry, lines })
    }

    /// Cancels a draft on the caller's transaction.
    pub async fn cancel_in<C: ConnectionTrait>(
        conn: &C,
        id: JournalEntryId,
    ) -> StoreResult<journal_entries::Model> {
        let entry = Self::lock_entry(conn, id).await?;
        LedgerService::validate_can_cancel(id, entry.status.into())?;

        let mut active: journal_entries::ActiveModel = entry.into();
        active.status = Set(db_enums::EntryStatus::Cancelled);
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(conn).await?)
    }

    /// Reverses a posted entry on the caller's transaction.
    pub async fn reverse_in<C: ConnectionTrait>(
        conn: &C,
        id: JournalEntryId,
        date: NaiveDate,
        reason: &str,
    ) -> StoreResult<ReversedEntry> {
        let entry = Self::lock_entry(conn, id).await?;
        LedgerService::validate_can_reverse(id, entry.status.into())?;

        let original_lines = Self::lines_of(conn, id).await?;
        let reversal_input = ReversalService::reversing_entry(&ReversalInput {
            original_id: id,
            entity_id: entry.entity_id.into(),
            reference: entry.reference.clone(),
            original_lines: original_lines.iter().map(line_input).collect(),
            date,
            reason: reason.to_string(),
        });

        let reversal = Self::post_in(conn, &reversal_input, EntryStatus::Posted, Some(id)).await?;

        let mut active: journal_entries::ActiveModel = entry.into();
        active.status = Set(db_enums::EntryStatus::Cancelled);
        active.reversed_by = Set(Some(reversal.entry.id));
        active.updated_at = Set(Utc::now().into());
        let original = active.update(conn).await?;

        Ok(ReversedEntry { original, reversal })
    }

    /// Latest `(version, balance)` of an account; `(0, 0)` if it has no
    /// posted lines yet.
    pub async fn latest_balance<C: ConnectionTrait>(
        conn: &C,
        account_id: AccountId,
    ) -> StoreResult<(i64, Decimal)> {
        let latest = journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::AccountId.eq(account_id.into_inner()))
            .filter(journal_entry_lines::Column::AccountVersion.is_not_null())
            .order_by_desc(journal_entry_lines::Column::AccountVersion)
            .limit(1)
            .one(conn)
            .await?;

        Ok(latest
            .and_then(|line| Some((line.account_version?, line.current_balance?)))
            .unwrap_or((0, Decimal::ZERO)))
    }

    /// Computes the running balance of every line and refreshes the cached
    /// balances of the (already locked) accounts.
    async fn apply_balances<C: ConnectionTrait>(
        conn: &C,
        resolved: &[ResolvedLine],
        accounts: &HashMap<AccountId, accounts::Model>,
    ) -> StoreResult<Vec<RunningBalance>> {
        let mut latest: HashMap<AccountId, (i64, Decimal)> = HashMap::new();
        let mut balances = Vec::with_capacity(resolved.len());

        for line in resolved {
            let (version, balance) = match latest.get(&line.account_id) {
                Some(&known) => known,
                None => Self::latest_balance(conn, line.account_id).await?,
            };
            let running = RunningBalance::after(version, balance, line.balance_change);
            latest.insert(
                line.account_id,
                (running.account_version, running.current_balance),
            );
            balances.push(running);
        }

        let now = Utc::now().into();
        for (account_id, (_, balance)) in latest {
            if let Some(model) = accounts.get(&account_id) {
                let mut active: accounts::ActiveModel = model.clone().into();
                active.balance = Set(balance);
                active.updated_at = Set(now);
                active.update(conn).await?;
            }
        }

        Ok(balances)
    }

    async fn lock_entry<C: ConnectionTrait>(
        conn: &C,
        id: JournalEntryId,
    ) -> StoreResult<journal_entries::Model> {
        Ok(journal_entries::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(conn)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?)
    }

    async fn lines_of<C: ConnectionTrait>(
        conn: &C,
        id: JournalEntryId,
    ) -> StoreResult<Vec<journal_entry_lines::Model>> {
        Ok(journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::EntryId.eq(id.into_inner()))
            .order_by_asc(journal_entry_lines::Column::LineNo)
            .all(conn)
            .await?)
    }
}

fn line_no(index: usize) -> i32 {
    i32::try_from(index + 1).unwrap_or(i32::MAX)
}

/// Rebuilds the input form of a stored line.
#[must_use]
pub fn line_input(line: &journal_entry_lines::Model) -> JournalLineInput {
    JournalLineInput {
        account_id: line.account_id.into(),
        debit: line.debit,
        credit: line.credit,
        currency: line.currency.clone(),
        description: line.description.clone(),
    }
}
