//! Decimal helpers shared by the ledger, stock and voucher logic.
//!
//! CRITICAL: Never use floating-point for money or quantities.
//! All arithmetic goes through `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Maximum absolute difference at which two ledger totals are considered equal.
///
/// Matches the 0.01 tolerance used by the balance repair tooling.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Number of decimal places kept on unit and average costs.
pub const COST_DECIMAL_PLACES: u32 = 4;

/// Exclusive bound on stored amounts and quantities (`NUMERIC(20,4)`).
pub const AMOUNT_LIMIT: Decimal = Decimal::from_parts(0x6FC1_0000, 0x0023_86F2, 0, false, 0);

/// Decimal places stored for amounts and quantities.
pub const AMOUNT_DECIMAL_PLACES: u32 = 4;

/// Exclusive bound on stored exchange rates (`NUMERIC(20,8)`).
pub const RATE_LIMIT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Decimal places stored for exchange rates.
pub const RATE_DECIMAL_PLACES: u32 = 8;

/// Returns true when `value` can be stored in an amount column without
/// rounding or overflow. Trailing zeros do not count against the scale.
#[must_use]
pub fn fits_amount(value: Decimal) -> bool {
    value.abs() < AMOUNT_LIMIT && value.normalize().scale() <= AMOUNT_DECIMAL_PLACES
}

/// Returns true when `value` can be stored in an exchange rate column.
#[must_use]
pub fn fits_rate(value: Decimal) -> bool {
    value.abs() < RATE_LIMIT && value.normalize().scale() <= RATE_DECIMAL_PLACES
}

/// Returns true when `left` and `right` differ by no more than [`BALANCE_TOLERANCE`].
#[must_use]
pub fn amounts_match(left: Decimal, right: Decimal) -> bool {
    (left - right).abs() <= BALANCE_TOLERANCE
}

/// Rounds a cost figure with Banker's Rounding to [`COST_DECIMAL_PLACES`].
#[must_use]
pub fn round_cost(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(COST_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tolerance_value() {
        assert_eq!(BALANCE_TOLERANCE, dec!(0.01));
    }

    #[rstest]
    #[case(dec!(100), dec!(100), true)]
    #[case(dec!(100), dec!(100.01), true)]
    #[case(dec!(100.01), dec!(100), true)]
    #[case(dec!(100), dec!(100.02), false)]
    #[case(dec!(0), dec!(-0.011), false)]
    fn test_amounts_match(#[case] left: Decimal, #[case] right: Decimal, #[case] expected: bool) {
        assert_eq!(amounts_match(left, right), expected);
    }

    #[test]
    fn test_limits() {
        assert_eq!(AMOUNT_LIMIT, dec!(10000000000000000));
        assert_eq!(RATE_LIMIT, dec!(1000000000000));
    }

    #[rstest]
    #[case(dec!(9999999999999999.9999), true)]
    #[case(dec!(-9999999999999999.9999), true)]
    #[case(dec!(10000000000000000), false)]
    #[case(dec!(0.0001), true)]
    #[case(dec!(0.00004), false)]
    #[case(dec!(1.23456), false)]
    #[case(dec!(1.50000000), true)]
    #[case(dec!(0), true)]
    fn test_fits_amount(#[case] value: Decimal, #[case] expected: bool) {
        assert_eq!(fits_amount(value), expected);
    }

    #[test]
    fn test_fits_rate() {
        assert!(fits_rate(dec!(1.08123456)));
        assert!(!fits_rate(dec!(1.081234567)));
        assert!(!fits_rate(dec!(1000000000000)));
    }

    #[test]
    fn test_round_cost_uses_bankers_rounding() {
        assert_eq!(round_cost(dec!(1.00005)), dec!(1.0000));
        assert_eq!(round_cost(dec!(1.00015)), dec!(1.0002));
        assert_eq!(round_cost(dec!(500)), dec!(500));
    }
}
