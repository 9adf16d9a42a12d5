//! Stock movement planning.
//!
//! A movement is turned into a [`MovementPlan`] before anything is written:
//! the stock deltas to apply, the valuation entry to post (if any), the cash
//! payment to issue (if any) and the warnings for every side effect that
//! had to be skipped. Persisting the plan is the caller's job and happens in
//! one transaction.
//!
//! Dispatch by movement type:
//!
//! | type         | stock                          | journal                                  |
//! |--------------|--------------------------------|------------------------------------------|
//! | `in`/`return`| `+q` at warehouse              | purchase: Dr stock / Cr supplier         |
//! | `out`        | `-q` at warehouse              | with COGS account: Dr COGS / Cr stock    |
//! | `transfer`   | `-q` source, `+q` destination  | none                                     |
//! | `adjustment` | `±q` at warehouse              | with adjustment account: valuation entry |

use chrono::NaiveDate;
use rust_decimal::Decimal;
use stockledger_shared::PostingConfig;
use stockledger_shared::types::{AccountId, EntityId, WarehouseId, fits_amount, round_cost};

use super::error::InventoryError;
use super::stock::{CostEffect, PriceMark, StockDelta, StockLevel};
use super::types::{
    ItemInfo, MovementType, PaymentMethod, ReferenceType, StockMovementInput, WarehouseInfo,
};
use crate::ledger::{AccountInfo, AccountSubtype, EntryKind, JournalLineInput, PostEntryInput};
use crate::payment::{FundingAccount, IssueVoucherInput, VoucherOperationInput, VoucherType};
use crate::posting::{PostingWarning, WarningCode};

/// Collaborator records a movement is planned against.
#[derive(Debug, Clone, Copy)]
pub struct PlanContext<'a> {
    /// The item moved.
    pub item: &'a ItemInfo,
    /// The (source) warehouse.
    pub warehouse: &'a WarehouseInfo,
    /// The destination warehouse of a transfer.
    pub to_warehouse: Option<&'a WarehouseInfo>,
    /// Current stock at the (source) warehouse.
    pub source_stock: &'a StockLevel,
    /// The supplier account named by the request, if it exists.
    pub supplier: Option<&'a AccountInfo>,
    /// First supplier account of the entity, used when none is given.
    pub fallback_supplier: Option<AccountId>,
}

/// The recorded stock effect of a movement.
///
/// Everything needed to replay or mirror the movement is captured here,
/// including the unit cost actually used, so deletion never recomputes
/// costs from the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockEffect {
    /// Movement kind.
    pub movement_type: MovementType,
    /// Business event.
    pub reference_type: ReferenceType,
    /// Quantity as requested (signed for adjustments).
    pub quantity: Decimal,
    /// Warehouse affected (source for transfers).
    pub warehouse_id: WarehouseId,
    /// Destination of a transfer.
    pub to_warehouse_id: Option<WarehouseId>,
    /// Unit cost applied.
    pub unit_cost: Decimal,
}

impl StockEffect {
    /// The deltas this movement applies, in application order.
    #[must_use]
    pub fn deltas(&self) -> Vec<StockDelta> {
        let quantity = self.quantity.abs();
        let cost = self.unit_cost;
        let at = |warehouse_id, quantity, cost, price| StockDelta {
            warehouse_id,
            quantity,
            cost,
            price,
        };

        match self.movement_type {
            MovementType::In => {
                let price = (self.reference_type == ReferenceType::Purchase)
                    .then_some(PriceMark::Purchase(cost));
                vec![at(self.warehouse_id, quantity, CostEffect::Blend(cost), price)]
            }
            MovementType::Return => {
                vec![at(self.warehouse_id, quantity, CostEffect::Blend(cost), None)]
            }
            MovementType::Out => {
                let price =
                    (self.reference_type == ReferenceType::Sale).then_some(PriceMark::Sale(cost));
                vec![at(self.warehouse_id, -quantity, CostEffect::Keep, price)]
            }
            MovementType::Transfer => {
                let mut deltas = vec![at(self.warehouse_id, -quantity, CostEffect::Keep, None)];
                if let Some(destination) = self.to_warehouse_id {
                    deltas.push(at(destination, quantity, CostEffect::Blend(cost), None));
                }
                deltas
            }
            MovementType::Adjustment if self.quantity > Decimal::ZERO => {
                vec![at(self.warehouse_id, quantity, CostEffect::Blend(cost), None)]
            }
            MovementType::Adjustment => {
                vec![at(self.warehouse_id, self.quantity, CostEffect::Keep, None)]
            }
        }
    }

    /// The deltas that undo this movement.
    ///
    /// Each forward delta is mirrored and the order is reversed, so a
    /// transfer first takes goods back out of the destination.
    #[must_use]
    pub fn reversal_deltas(&self) -> Vec<StockDelta> {
        self.deltas().iter().rev().map(StockDelta::mirrored).collect()
    }
}

/// An immediate payment to the supplier of a cash purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentPlan {
    /// Cash box or bank/wallet paying.
    pub funding: FundingAccount,
    /// Supplier account the payment is allocated to.
    pub supplier_account_id: AccountId,
    /// Amount paid.
    pub amount: Decimal,
    /// Currency of the payment.
    pub currency: String,
}

impl PaymentPlan {
    /// Builds the outgoing voucher for this payment.
    #[must_use]
    pub fn voucher(
        &self,
        entity_id: EntityId,
        date: NaiveDate,
        reference: Option<String>,
    ) -> IssueVoucherInput {
        IssueVoucherInput {
            entity_id,
            voucher_type: VoucherType::Out,
            funding: self.funding,
            date,
            currency: self.currency.clone(),
            exchange_rate: Decimal::ONE,
            total_amount: self.amount,
            reference,
            operations: vec![VoucherOperationInput {
                chart_account_id: self.supplier_account_id,
                analytical_account_id: None,
                amount: self.amount,
                description: Some("Cash purchase payment".to_string()),
            }],
        }
    }
}

/// Everything a movement will do, computed before any write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementPlan {
    /// Stock effect to apply and record.
    pub effect: StockEffect,
    /// Value of the movement (total cost, or quantity times unit cost).
    pub total_value: Decimal,
    /// Currency of `total_value`.
    pub currency: String,
    /// Valuation entry to post.
    pub journal: Option<PostEntryInput>,
    /// Cash payment to issue after the entry is posted.
    pub payment: Option<PaymentPlan>,
    /// Side effects that were skipped.
    pub warnings: Vec<PostingWarning>,
}

/// Stateless planner for stock movements.
pub struct StockMovementProcessor;

impl StockMovementProcessor {
    /// Validates the request shape and the collaborator records.
    pub fn validate(
        input: &StockMovementInput,
        ctx: &PlanContext<'_>,
    ) -> Result<(), InventoryError> {
        let quantity_ok = if input.movement_type.is_signed() {
            !input.quantity.is_zero()
        } else {
            input.quantity > Decimal::ZERO
        };
        if !quantity_ok {
            return Err(InventoryError::InvalidQuantity {
                movement_type: input.movement_type,
                quantity: input.quantity,
            });
        }

        for cost in [input.unit_cost, input.total_cost].into_iter().flatten() {
            if cost < Decimal::ZERO {
                return Err(InventoryError::NegativeCost(cost));
            }
        }

        let amounts = [
            ("quantity", Some(input.quantity)),
            ("unitCost", input.unit_cost),
            ("totalCost", input.total_cost),
        ];
        for (field, value) in amounts {
            if let Some(value) = value.filter(|v| !fits_amount(*v)) {
                return Err(InventoryError::AmountOutOfRange { field, value });
            }
        }

        if input.movement_type == MovementType::Transfer {
            let destination = input.to_warehouse_id.ok_or(InventoryError::MissingDestination)?;
            if destination == input.warehouse_id {
                return Err(InventoryError::SameWarehouse);
            }
            let to_warehouse = ctx.to_warehouse.ok_or(InventoryError::MissingDestination)?;
            Self::check_entity("warehouse", to_warehouse.entity_id, to_warehouse.id, input)?;
        }

        Self::check_entity("item", ctx.item.entity_id, ctx.item.id, input)?;
        Self::check_entity("warehouse", ctx.warehouse.entity_id, ctx.warehouse.id, input)?;

        if let Some(supplier) = input.supplier_account_id {
            let usable = ctx.supplier.is_some_and(|account| {
                account.id == supplier
                    && account.entity_id == input.entity_id
                    && !account.is_group
                    && account.subtype == Some(AccountSubtype::Supplier)
            });
            if !usable {
                return Err(InventoryError::InvalidSupplierAccount(supplier));
            }
        }
        Ok(())
    }

    fn check_entity(
        resource: &'static str,
        entity_id: EntityId,
        id: impl ToString,
        input: &StockMovementInput,
    ) -> Result<(), InventoryError> {
        if entity_id == input.entity_id {
            Ok(())
        } else {
            Err(InventoryError::EntityMismatch {
                resource,
                id: id.to_string(),
            })
        }
    }

    /// Unit cost used for the movement.
    ///
    /// The explicit unit cost wins, then total cost divided by quantity, then
    /// the current average cost at the (source) warehouse.
    #[must_use]
    pub fn effective_unit_cost(input: &StockMovementInput, source_stock: &StockLevel) -> Decimal {
        let quantity = input.quantity.abs();
        let cost = input
            .unit_cost
            .or_else(|| {
                input
                    .total_cost
                    .filter(|_| !quantity.is_zero())
                    .and_then(|total| total.checked_div(quantity))
            })
            .unwrap_or(source_stock.avg_cost);
        round_cost(cost)
    }

    /// Plans a movement.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError` for invalid requests, and
    /// `InventoryError::LinkageRequired` when strict linkage is on and a
    /// journal entry or payment would have to be skipped.
    pub fn plan(
        input: &StockMovementInput,
        ctx: &PlanContext<'_>,
        config: &PostingConfig,
    ) -> Result<MovementPlan, InventoryError> {
        Self::validate(input, ctx)?;

        let unit_cost = Self::effective_unit_cost(input, ctx.source_stock);
        let total_value = match input.total_cost {
            Some(total) => total,
            None => {
                let value = input
                    .quantity
                    .abs()
                    .checked_mul(unit_cost)
                    .map_or(Decimal::MAX, round_cost);
                if !fits_amount(value) {
                    return Err(InventoryError::AmountOutOfRange {
                        field: "totalValue",
                        value,
                    });
                }
                value
            }
        };
        if !fits_amount(unit_cost) {
            return Err(InventoryError::AmountOutOfRange {
                field: "unitCost",
                value: unit_cost,
            });
        }
        let currency = input
            .currency
            .clone()
            .unwrap_or_else(|| config.default_currency.clone());

        let effect = StockEffect {
            movement_type: input.movement_type,
            reference_type: input.reference_type,
            quantity: input.quantity,
            warehouse_id: input.warehouse_id,
            to_warehouse_id: input
                .to_warehouse_id
                .filter(|_| input.movement_type == MovementType::Transfer),
            unit_cost,
        };

        let mut planner = Planner {
            input,
            ctx,
            config,
            total_value,
            currency: &currency,
            warnings: Vec::new(),
        };
        let journal = planner.journal()?;
        let payment = planner.payment(journal.as_ref())?;
        let warnings = planner.warnings;

        Ok(MovementPlan {
            effect,
            total_value,
            currency,
            journal,
            payment,
            warnings,
        })
    }
}

/// Journal and payment derivation for one movement.
struct Planner<'a> {
    input: &'a StockMovementInput,
    ctx: &'a PlanContext<'a>,
    config: &'a PostingConfig,
    total_value: Decimal,
    currency: &'a str,
    warnings: Vec<PostingWarning>,
}

impl Planner<'_> {
    /// Records a skipped side effect, or fails under strict linkage.
    fn skip(&mut self, code: WarningCode, message: String) -> Result<(), InventoryError> {
        if self.config.strict_linkage {
            return Err(InventoryError::LinkageRequired(message));
        }
        self.warnings.push(PostingWarning::new(code, message));
        Ok(())
    }

    fn journal(&mut self) -> Result<Option<PostEntryInput>, InventoryError> {
        match self.input.movement_type {
            MovementType::In | MovementType::Return
                if self.input.reference_type == ReferenceType::Purchase =>
            {
                self.purchase_entry()
            }
            MovementType::Out => match self.input.to_account_id {
                Some(cogs) => self.valuation_entry(cogs, false, "Issue"),
                None => Ok(None),
            },
            MovementType::Adjustment => match self.input.to_account_id {
                Some(adjustment) => {
                    let increase = self.input.quantity > Decimal::ZERO;
                    self.valuation_entry(adjustment, increase, "Stock adjustment")
                }
                None => Ok(None),
            },
            MovementType::In | MovementType::Return | MovementType::Transfer => Ok(None),
        }
    }

    fn stock_account(&mut self) -> Result<Option<AccountId>, InventoryError> {
        if let Some(account) = self.ctx.item.stock_account_id {
            return Ok(Some(account));
        }
        self.skip(
            WarningCode::MissingStockAccount,
            format!(
                "Item {} has no stock account; journal entry not posted",
                self.ctx.item.id
            ),
        )?;
        Ok(None)
    }

    fn has_value(&mut self) -> bool {
        if self.total_value > Decimal::ZERO {
            return true;
        }
        self.warnings.push(PostingWarning::new(
            WarningCode::ZeroValue,
            "Movement has no value; journal entry not posted",
        ));
        false
    }

    fn supplier_account(&mut self) -> Result<Option<AccountId>, InventoryError> {
        if let Some(account) = self.input.supplier_account_id {
            return Ok(Some(account));
        }
        if self.config.supplier_fallback {
            if let Some(account) = self.ctx.fallback_supplier {
                self.warnings.push(PostingWarning::new(
                    WarningCode::SupplierFallback,
                    format!("No supplier account given; using entity supplier account {account}"),
                ));
                return Ok(Some(account));
            }
        }
        self.skip(
            WarningCode::MissingSupplierAccount,
            "No supplier account could be resolved; purchase entry not posted".to_string(),
        )?;
        Ok(None)
    }

    fn purchase_entry(&mut self) -> Result<Option<PostEntryInput>, InventoryError> {
        let Some(stock) = self.stock_account()? else {
            return Ok(None);
        };
        let Some(supplier) = self.supplier_account()? else {
            return Ok(None);
        };
        if !self.has_value() {
            return Ok(None);
        }

        Ok(Some(self.entry(
            EntryKind::Auto,
            format!("Purchase of {}", self.ctx.item.name),
            stock,
            supplier,
        )))
    }

    /// Entry between the stock account and `counter`.
    ///
    /// `into_stock` debits stock (goods gained); otherwise the counter account
    /// is debited (goods consumed or written off).
    fn valuation_entry(
        &mut self,
        counter: AccountId,
        into_stock: bool,
        label: &str,
    ) -> Result<Option<PostEntryInput>, InventoryError> {
        let Some(stock) = self.stock_account()? else {
            return Ok(None);
        };
        if !self.has_value() {
            return Ok(None);
        }

        let kind = if self.input.movement_type == MovementType::Adjustment {
            EntryKind::Adjustment
        } else {
            EntryKind::Auto
        };
        let description = format!("{label} of {}", self.ctx.item.name);
        let (debit, credit) = if into_stock {
            (stock, counter)
        } else {
            (counter, stock)
        };
        Ok(Some(self.entry(kind, description, debit, credit)))
    }

    fn entry(
        &self,
        kind: EntryKind,
        description: String,
        debit_account: AccountId,
        credit_account: AccountId,
    ) -> PostEntryInput {
        let line_note = Some(format!("{} x {}", self.input.quantity.abs(), self.ctx.item.name));
        PostEntryInput {
            entity_id: self.input.entity_id,
            date: self.input.date,
            description,
            reference: self.input.reference.clone(),
            kind,
            lines: vec![
                JournalLineInput::debit(
                    debit_account,
                    self.total_value,
                    self.currency,
                    line_note.clone(),
                ),
                JournalLineInput::credit(credit_account, self.total_value, self.currency, line_note),
            ],
        }
    }

    fn payment(
        &mut self,
        journal: Option<&PostEntryInput>,
    ) -> Result<Option<PaymentPlan>, InventoryError> {
        let is_cash_purchase = self.input.movement_type == MovementType::In
            && self.input.reference_type == ReferenceType::Purchase
            && self.input.payment_method == PaymentMethod::Cash;
        if !is_cash_purchase {
            return Ok(None);
        }

        let Some(entry) = journal else {
            self.skip(
                WarningCode::PaymentSkipped,
                "Purchase entry was not posted; cash payment not issued".to_string(),
            )?;
            return Ok(None);
        };
        let Some(funding) = self.input.payment_account else {
            self.skip(
                WarningCode::PaymentSkipped,
                "Cash purchase has no payment account; cash payment not issued".to_string(),
            )?;
            return Ok(None);
        };

        // The supplier is the credit line of the purchase entry.
        let supplier_account_id = entry
            .lines
            .iter()
            .find(|line| line.credit > Decimal::ZERO)
            .map(|line| line.account_id);
        let Some(supplier_account_id) = supplier_account_id else {
            return Ok(None);
        };

        Ok(Some(PaymentPlan {
            funding,
            supplier_account_id,
            amount: self.total_value,
            currency: self.currency.to_string(),
        }))
    }
}
