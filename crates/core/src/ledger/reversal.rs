//! Reversing entries for posted journal entries.
//!
//! A posted entry is never edited or deleted. Voiding it posts an offsetting
//! entry with every line's debit and credit swapped, so both the original and
//! its reversal remain in the audit trail.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use stockledger_shared::types::{EntityId, JournalEntryId};

use super::types::{EntryKind, JournalLineInput, PostEntryInput};

/// The posted entry being reversed.
#[derive(Debug, Clone)]
pub struct ReversalInput {
    /// The entry being reversed.
    pub original_id: JournalEntryId,
    /// Entity of the original entry.
    pub entity_id: EntityId,
    /// Reference of the original entry.
    pub reference: Option<String>,
    /// The original lines.
    pub original_lines: Vec<JournalLineInput>,
    /// Accounting date of the reversal.
    pub date: NaiveDate,
    /// Why the entry is being reversed.
    pub reason: String,
}

/// Stateless service for creating reversing entries.
pub struct ReversalService;

impl ReversalService {
    /// Swaps the debit and credit of every line, keeping accounts and amounts.
    #[must_use]
    pub fn reversing_lines(lines: &[JournalLineInput]) -> Vec<JournalLineInput> {
        lines
            .iter()
            .map(|line| JournalLineInput {
                account_id: line.account_id,
                debit: line.credit,
                credit: line.debit,
                currency: line.currency.clone(),
                description: Some(format!(
                    "Reversal: {}",
                    line.description.clone().unwrap_or_default()
                )),
            })
            .collect()
    }

    /// Builds the reversing entry for a posted entry.
    #[must_use]
    pub fn reversing_entry(input: &ReversalInput) -> PostEntryInput {
        PostEntryInput {
            entity_id: input.entity_id,
            date: input.date,
            description: format!(
                "Reversal of journal entry {}. Reason: {}",
                input.original_id, input.reason
            ),
            reference: input.reference.clone(),
            kind: EntryKind::Reversal,
            lines: Self::reversing_lines(&input.original_lines),
        }
    }

    /// Returns true if the original lines balance exactly.
    ///
    /// This always holds for entries that went through the posting path.
    #[must_use]
    pub fn validate_reversal(original_lines: &[JournalLineInput]) -> bool {
        let debit: Decimal = original_lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = original_lines.iter().map(|l| l.credit).sum();
        debit == credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use stockledger_shared::types::AccountId;

    fn balanced_lines() -> Vec<JournalLineInput> {
        vec![
            JournalLineInput::debit(
                AccountId::new(),
                dec!(100.00),
                "USD",
                Some("Stock received".to_string()),
            ),
            JournalLineInput::credit(AccountId::new(), dec!(100.00), "USD", None),
        ]
    }

    fn make_input(lines: Vec<JournalLineInput>) -> ReversalInput {
        ReversalInput {
            original_id: JournalEntryId::new(),
            entity_id: EntityId::new(),
            reference: Some("PO-1".to_string()),
            original_lines: lines,
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            reason: "Movement deleted".to_string(),
        }
    }

    #[test]
    fn test_reversing_entry_swaps_sides() {
        let input = make_input(balanced_lines());
        let entry = ReversalService::reversing_entry(&input);

        assert_eq!(entry.kind, EntryKind::Reversal);
        assert_eq!(entry.lines.len(), 2);
        assert_eq!(entry.lines[0].credit, dec!(100.00));
        assert_eq!(entry.lines[0].debit, Decimal::ZERO);
        assert_eq!(entry.lines[1].debit, dec!(100.00));
        assert_eq!(
            entry.lines[0].description.as_deref(),
            Some("Reversal: Stock received")
        );
        assert_eq!(entry.reference.as_deref(), Some("PO-1"));
        assert!(entry.description.contains("Movement deleted"));
    }

    #[test]
    fn test_reversing_preserves_accounts() {
        let lines = balanced_lines();
        let reversed = ReversalService::reversing_lines(&lines);
        for (original, reversal) in lines.iter().zip(&reversed) {
            assert_eq!(original.account_id, reversal.account_id);
            assert_eq!(original.currency, reversal.currency);
        }
    }

    #[test]
    fn test_validate_reversal() {
        assert!(ReversalService::validate_reversal(&balanced_lines()));
        let mut lines = balanced_lines();
        lines[0].debit = dec!(99);
        assert!(!ReversalService::validate_reversal(&lines));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// An entry and its reversal net every account to zero.
        #[test]
        fn prop_reversal_nets_to_zero(amounts in prop::collection::vec(1i64..10_000_000i64, 1..8)) {
            let account = AccountId::new();
            let lines: Vec<JournalLineInput> = amounts
                .iter()
                .map(|cents| JournalLineInput::debit(account, Decimal::new(*cents, 2), "USD", None))
                .collect();

            let reversed = ReversalService::reversing_lines(&lines);
            let net: Decimal = lines
                .iter()
                .chain(reversed.iter())
                .map(|l| l.debit - l.credit)
                .sum();
            prop_assert_eq!(net, Decimal::ZERO);
        }
    }
}
