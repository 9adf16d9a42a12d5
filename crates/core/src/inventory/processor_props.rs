//! Property-based tests for stock replay and delete/re-create idempotence.

use proptest::prelude::*;
use rust_decimal::Decimal;
use stockledger_shared::types::{ItemId, WarehouseId};

use super::processor::StockEffect;
use super::stock::StockLevel;
use super::types::{MovementType, ReferenceType};

fn warehouse(n: u128) -> WarehouseId {
    WarehouseId::from_uuid(uuid::Uuid::from_u128(n))
}

/// A movement between warehouses 1 and 2.
fn effect_strategy() -> impl Strategy<Value = StockEffect> {
    (
        0u8..5,
        1i64..100_000i64,
        0i64..1_000_000i64,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(kind, qty_hundredths, cost_cents, negate, swap)| {
            let movement_type = match kind {
                0 => MovementType::In,
                1 => MovementType::Out,
                2 => MovementType::Transfer,
                3 => MovementType::Adjustment,
                _ => MovementType::Return,
            };
            let mut quantity = Decimal::new(qty_hundredths, 2);
            if movement_type == MovementType::Adjustment && negate {
                quantity = -quantity;
            }
            let (from, to) = if swap { (2, 1) } else { (1, 2) };
            StockEffect {
                movement_type,
                reference_type: ReferenceType::Manual,
                quantity,
                warehouse_id: warehouse(from),
                to_warehouse_id: (movement_type == MovementType::Transfer).then(|| warehouse(to)),
                unit_cost: Decimal::new(cost_cents, 2),
            }
        })
}

/// Signed quantity a movement contributes to one warehouse.
fn signed_quantity(effect: &StockEffect, at: WarehouseId) -> Decimal {
    let q = effect.quantity;
    match effect.movement_type {
        MovementType::In | MovementType::Return if effect.warehouse_id == at => q,
        MovementType::Out if effect.warehouse_id == at => -q,
        MovementType::Adjustment if effect.warehouse_id == at => q,
        MovementType::Transfer if effect.warehouse_id == at => -q,
        MovementType::Transfer if effect.to_warehouse_id == Some(at) => q,
        _ => Decimal::ZERO,
    }
}

/// Replays movements with negative stock allowed, returning both levels.
fn replay(effects: &[StockEffect]) -> (StockLevel, StockLevel) {
    let item = ItemId::from_uuid(uuid::Uuid::from_u128(9));
    let mut one = StockLevel::default();
    let mut two = StockLevel::default();
    for delta in effects.iter().flat_map(StockEffect::deltas) {
        let level = if delta.warehouse_id == warehouse(1) {
            &mut one
        } else {
            &mut two
        };
        *level = StockLevel::apply_checked(Some(level), &delta, item, true)
            .expect("negative stock allowed");
    }
    (one, two)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The quantity after replay equals the plain sum of signed quantities.
    #[test]
    fn prop_replay_equals_signed_sum(effects in prop::collection::vec(effect_strategy(), 0..30)) {
        let (one, two) = replay(&effects);

        let expected_one: Decimal = effects.iter().map(|e| signed_quantity(e, warehouse(1))).sum();
        let expected_two: Decimal = effects.iter().map(|e| signed_quantity(e, warehouse(2))).sum();

        prop_assert_eq!(one.quantity, expected_one);
        prop_assert_eq!(two.quantity, expected_two);
    }

    /// Deleting the latest movement and re-creating it yields the same state
    /// as never deleting it.
    #[test]
    fn prop_delete_then_recreate_is_identity(
        history in prop::collection::vec(effect_strategy(), 0..20),
        last in effect_strategy(),
    ) {
        let mut with_last = history.clone();
        with_last.push(last.clone());
        let (expected_one, expected_two) = replay(&with_last);

        let item = ItemId::from_uuid(uuid::Uuid::from_u128(9));
        let (mut one, mut two) = replay(&with_last);
        let replayed = last
            .reversal_deltas()
            .into_iter()
            .chain(last.deltas());
        for delta in replayed {
            let level = if delta.warehouse_id == warehouse(1) { &mut one } else { &mut two };
            *level = StockLevel::apply_checked(Some(level), &delta, item, true).unwrap();
        }

        prop_assert_eq!(one.quantity, expected_one.quantity);
        prop_assert_eq!(two.quantity, expected_two.quantity);
        prop_assert_eq!(one.avg_cost, expected_one.avg_cost);
        prop_assert_eq!(two.avg_cost, expected_two.avg_cost);
    }

    /// Deleting any movement restores every quantity to the replay without it.
    #[test]
    fn prop_delete_anywhere_restores_quantity(
        effects in prop::collection::vec(effect_strategy(), 1..20),
        index in any::<prop::sample::Index>(),
    ) {
        let removed = index.index(effects.len());
        let mut without = effects.clone();
        let target = without.remove(removed);
        let (expected_one, expected_two) = replay(&without);

        let item = ItemId::from_uuid(uuid::Uuid::from_u128(9));
        let (mut one, mut two) = replay(&effects);
        for delta in target.reversal_deltas() {
            let level = if delta.warehouse_id == warehouse(1) { &mut one } else { &mut two };
            *level = StockLevel::apply_checked(Some(level), &delta, item, true).unwrap();
        }

        prop_assert_eq!(one.quantity, expected_one.quantity);
        prop_assert_eq!(two.quantity, expected_two.quantity);
    }
}
