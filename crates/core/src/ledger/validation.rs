//! Structural validation of journal lines.

use rust_decimal::Decimal;
use stockledger_shared::types::fits_amount;

use super::error::LedgerError;
use super::types::{EntryTotals, JournalLineInput};

/// Validates that a set of journal lines can be posted.
///
/// Rules:
/// - at least one line
/// - per line, exactly one of debit/credit is nonzero and it is positive
/// - every amount fits the stored precision (16 integer digits, 4 decimals)
/// - total debits equal total credits within the ledger tolerance
///
/// # Errors
///
/// Returns the first rule violation found, in line order.
pub fn validate_lines(lines: &[JournalLineInput]) -> Result<EntryTotals, LedgerError> {
    if lines.is_empty() {
        return Err(LedgerError::EmptyEntry);
    }

    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;

    for (index, line) in lines.iter().enumerate() {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { index });
        }
        match (line.debit.is_zero(), line.credit.is_zero()) {
            (true, true) => return Err(LedgerError::ZeroAmount { index }),
            (false, false) => return Err(LedgerError::BothSides { index }),
            _ => {}
        }

        if !fits_amount(line.debit) || !fits_amount(line.credit) {
            return Err(LedgerError::AmountOutOfRange { index });
        }

        total_debit = total_debit
            .checked_add(line.debit)
            .ok_or(LedgerError::AmountOutOfRange { index })?;
        total_credit = total_credit
            .checked_add(line.credit)
            .ok_or(LedgerError::AmountOutOfRange { index })?;
    }

    let totals = EntryTotals::new(total_debit, total_credit);
    if !totals.is_balanced {
        return Err(LedgerError::Unbalanced {
            debit: total_debit,
            credit: total_credit,
        });
    }

    Ok(totals)
}
