//! Property-based tests for journal line validation rules.

use proptest::prelude::*;
use rust_decimal::Decimal;
use stockledger_shared::types::AccountId;

use super::error::LedgerError;
use super::types::{EntrySide, JournalLineInput};
use super::validation::validate_lines;

/// Strategy to generate a valid positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn side_strategy() -> impl Strategy<Value = EntrySide> {
    prop_oneof![Just(EntrySide::Debit), Just(EntrySide::Credit)]
}

fn line(side: EntrySide, amount: Decimal) -> JournalLineInput {
    JournalLineInput::on_side(side, AccountId::new(), amount, "USD", None)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Splitting one debit across several credits always balances.
    #[test]
    fn prop_split_credits_balance(parts in prop::collection::vec(positive_amount(), 1..10)) {
        let total: Decimal = parts.iter().copied().sum();
        let mut lines = vec![line(EntrySide::Debit, total)];
        lines.extend(parts.iter().map(|p| line(EntrySide::Credit, *p)));

        let totals = validate_lines(&lines);
        prop_assert!(totals.is_ok(), "split entry should balance: {:?}", totals);
        let totals = totals.unwrap();
        prop_assert_eq!(totals.debit, totals.credit);
    }

    /// Any accepted entry has debit and credit totals within 0.01.
    #[test]
    fn prop_accepted_entries_are_balanced(
        sides in prop::collection::vec(side_strategy(), 1..10),
        amounts in prop::collection::vec(positive_amount(), 10),
    ) {
        let lines: Vec<JournalLineInput> = sides
            .iter()
            .zip(amounts.iter())
            .map(|(side, amount)| line(*side, *amount))
            .collect();

        if let Ok(totals) = validate_lines(&lines) {
            prop_assert!((totals.debit - totals.credit).abs() <= Decimal::new(1, 2));
        }
    }

    /// An entry off by more than the tolerance is rejected as unbalanced.
    #[test]
    fn prop_offset_beyond_tolerance_rejected(
        amount in positive_amount(),
        offset in 2i64..100_000i64,
    ) {
        let lines = vec![
            line(EntrySide::Debit, amount + Decimal::new(offset, 2)),
            line(EntrySide::Credit, amount),
        ];
        prop_assert!(
            matches!(validate_lines(&lines), Err(LedgerError::Unbalanced { .. })),
            "offset {} should be rejected",
            offset
        );
    }

    /// A zero line is rejected wherever it appears.
    #[test]
    fn prop_zero_line_rejected(
        amount in positive_amount(),
        position in 0usize..3,
        side in side_strategy(),
    ) {
        let mut lines = vec![
            line(EntrySide::Debit, amount),
            line(EntrySide::Credit, amount),
        ];
        lines.insert(position, line(side, Decimal::ZERO));

        let rejected_at = match validate_lines(&lines) {
            Err(LedgerError::ZeroAmount { index }) => Some(index),
            _ => None,
        };
        prop_assert_eq!(rejected_at, Some(position));
    }

    /// Amounts finer than the stored precision are rejected, never rounded.
    #[test]
    fn prop_sub_precision_amount_rejected(
        amount in positive_amount(),
        fraction in 1i64..10i64,
    ) {
        let fine = amount + Decimal::new(fraction, 5);
        let lines = vec![line(EntrySide::Debit, fine), line(EntrySide::Credit, fine)];
        prop_assert!(
            matches!(validate_lines(&lines), Err(LedgerError::AmountOutOfRange { index: 0 })),
            "{} should be rejected",
            fine
        );
    }
}
