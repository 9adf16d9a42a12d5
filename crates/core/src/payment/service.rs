//! Voucher validation.
//!
//! Every precondition is checked here before anything is written, so a
//! rejected voucher never touches a funding balance.

use rust_decimal::Decimal;
use stockledger_shared::types::{AccountId, amounts_match, fits_amount, fits_rate};

use super::error::PaymentError;
use super::types::{FundingInfo, IssueVoucherInput, ResolvedOperation};
use crate::ledger::AccountInfo;

/// Stateless voucher validation.
pub struct VoucherService;

impl VoucherService {
    /// Validates a voucher and resolves each operation's chart account.
    ///
    /// # Arguments
    ///
    /// * `input` - The voucher to issue
    /// * `funding` - The funding account, already located
    /// * `account_lookup` - Resolves chart accounts by ID
    pub fn validate<A>(
        input: &IssueVoucherInput,
        funding: &FundingInfo,
        account_lookup: A,
    ) -> Result<Vec<ResolvedOperation>, PaymentError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
    {
        if input.operations.is_empty() {
            return Err(PaymentError::EmptyOperations);
        }
        if input.total_amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidTotal(input.total_amount));
        }
        if input.exchange_rate <= Decimal::ZERO {
            return Err(PaymentError::InvalidExchangeRate(input.exchange_rate));
        }
        if !fits_amount(input.total_amount) {
            return Err(PaymentError::AmountOutOfRange {
                field: "totalAmount",
                value: input.total_amount,
            });
        }
        if !fits_rate(input.exchange_rate) {
            return Err(PaymentError::AmountOutOfRange {
                field: "exchangeRate",
                value: input.exchange_rate,
            });
        }

        let mut operations_total = Decimal::ZERO;
        for (index, operation) in input.operations.iter().enumerate() {
            if operation.amount <= Decimal::ZERO {
                return Err(PaymentError::InvalidOperationAmount { index });
            }
            let out_of_range = PaymentError::AmountOutOfRange {
                field: "amount",
                value: operation.amount,
            };
            if !fits_amount(operation.amount) {
                return Err(out_of_range);
            }
            operations_total = operations_total
                .checked_add(operation.amount)
                .ok_or(out_of_range)?;
        }
        if !amounts_match(operations_total, input.total_amount) {
            return Err(PaymentError::AmountMismatch {
                total_amount: input.total_amount,
                operations_total,
            });
        }

        if funding.entity_id != input.entity_id {
            return Err(PaymentError::FundingEntityMismatch(funding.account));
        }
        if !funding.allows_currency(&input.currency) {
            return Err(PaymentError::CurrencyNotAllowed {
                funding: funding.account,
                currency: input.currency.clone(),
            });
        }

        let check = |id: AccountId| -> Result<AccountInfo, PaymentError> {
            let account = account_lookup(id).ok_or(PaymentError::AccountNotFound(id))?;
            if account.is_group || account.entity_id != input.entity_id {
                return Err(PaymentError::InvalidAccount(id));
            }
            Ok(account)
        };

        input
            .operations
            .iter()
            .map(|operation| {
                let account = check(operation.chart_account_id)?;
                if let Some(analytical) = operation.analytical_account_id {
                    check(analytical)?;
                }
                Ok(ResolvedOperation {
                    chart_account_id: account.id,
                    analytical_account_id: operation.analytical_account_id,
                    account_type: account.account_type,
                    account_subtype: account.subtype,
                    amount: operation.amount,
                    description: operation.description.clone(),
                })
            })
            .collect()
    }
}
