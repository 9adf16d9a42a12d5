//! Account balance rules.
//!
//! Sign convention used by every posting:
//! - Asset/Expense: balance += debit - credit (debit-normal)
//! - Liability/Equity/Income: balance += credit - debit (credit-normal)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The side on which an account's balance grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense).
    Debit,
    /// Credit-normal accounts (Liability, Equity, Income).
    Credit,
}

impl NormalBalance {
    /// Calculates the balance change a line applies to an account.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// Running balance information stored on each posted journal line.
///
/// - `account_version`: monotonically increasing per account
/// - `previous_balance`: balance before this line
/// - `current_balance`: balance after this line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Account version (monotonically increasing).
    pub account_version: i64,
    /// Balance before this line.
    pub previous_balance: Decimal,
    /// Balance after this line.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// Creates the running balance for the first line on an account.
    #[must_use]
    pub fn first_entry(balance_change: Decimal) -> Self {
        Self {
            account_version: 1,
            previous_balance: Decimal::ZERO,
            current_balance: balance_change,
        }
    }

    /// Creates the running balance following `previous`.
    #[must_use]
    pub fn next_entry(previous: &Self, balance_change: Decimal) -> Self {
        Self::after(previous.account_version, previous.current_balance, balance_change)
    }

    /// Creates the running balance following a stored `(version, balance)` pair.
    ///
    /// A version of zero means the account has no lines yet.
    #[must_use]
    pub fn after(version: i64, balance: Decimal, balance_change: Decimal) -> Self {
        Self {
            account_version: version + 1,
            previous_balance: balance,
            current_balance: balance + balance_change,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn balance_change_strategy() -> impl Strategy<Value = Decimal> {
        (-100_000i64..100_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn balance_changes_strategy(max_len: usize) -> impl Strategy<Value = Vec<Decimal>> {
        prop::collection::vec(balance_change_strategy(), 1..=max_len)
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Debit-normal accounts grow with debits and shrink with credits.
        #[test]
        fn prop_debit_normal_direction(amount in amount_strategy()) {
            prop_assert_eq!(NormalBalance::Debit.balance_change(amount, Decimal::ZERO), amount);
            prop_assert_eq!(NormalBalance::Debit.balance_change(Decimal::ZERO, amount), -amount);
        }

        /// Credit-normal accounts grow with credits and shrink with debits.
        #[test]
        fn prop_credit_normal_direction(amount in amount_strategy()) {
            prop_assert_eq!(NormalBalance::Credit.balance_change(Decimal::ZERO, amount), amount);
            prop_assert_eq!(NormalBalance::Credit.balance_change(amount, Decimal::ZERO), -amount);
        }

        /// The final balance of a chain equals the sum of its changes.
        #[test]
        fn prop_final_balance_equals_sum_of_changes(
            changes in balance_changes_strategy(20),
        ) {
            let mut current = RunningBalance::first_entry(changes[0]);
            for change in changes.iter().skip(1) {
                current = RunningBalance::next_entry(&current, *change);
            }

            let expected: Decimal = changes.iter().copied().sum();
            prop_assert_eq!(current.current_balance, expected);
            prop_assert_eq!(current.account_version as usize, changes.len());
        }

        /// Each link starts where the previous one ended.
        #[test]
        fn prop_previous_equals_prior_current(
            change1 in balance_change_strategy(),
            change2 in balance_change_strategy(),
        ) {
            let rb1 = RunningBalance::first_entry(change1);
            let rb2 = RunningBalance::next_entry(&rb1, change2);

            prop_assert_eq!(rb2.previous_balance, rb1.current_balance);
            prop_assert_eq!(rb2.current_balance, rb2.previous_balance + change2);
        }
    }

    #[test]
    fn test_after_empty_account_matches_first_entry() {
        assert_eq!(
            RunningBalance::after(0, Decimal::ZERO, dec!(25)),
            RunningBalance::first_entry(dec!(25))
        );
    }

    #[test]
    fn test_asset_balance_change() {
        let normal = NormalBalance::Debit;
        assert_eq!(normal.balance_change(dec!(100), dec!(0)), dec!(100));
        assert_eq!(normal.balance_change(dec!(0), dec!(50)), dec!(-50));
        assert_eq!(normal.balance_change(dec!(100), dec!(30)), dec!(70));
    }

    #[test]
    fn test_liability_balance_change() {
        let normal = NormalBalance::Credit;
        assert_eq!(normal.balance_change(dec!(0), dec!(100)), dec!(100));
        assert_eq!(normal.balance_change(dec!(50), dec!(0)), dec!(-50));
        assert_eq!(normal.balance_change(dec!(30), dec!(100)), dec!(70));
    }
}
