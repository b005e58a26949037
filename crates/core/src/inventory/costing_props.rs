//! Property-based tests for balance arithmetic and weighted-average costing.

use proptest::prelude::*;
use rust_decimal::Decimal;
use stockledger_shared::types::{ItemId, TenantId, WarehouseId};

use super::costing::{BalanceState, weighted_average_cost};
use super::error::InventoryError;
use super::types::{BalanceKey, Pricing};

/// Strategy for positive quantities (0.0001 to 100,000.0000).
fn positive_quantity() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|units| Decimal::new(units, 4))
}

/// Strategy for unit costs (0.00 to 10,000.00).
fn unit_cost() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for signed, non-zero deltas.
fn signed_delta() -> impl Strategy<Value = Decimal> {
    (positive_quantity(), any::<bool>()).prop_map(|(q, negative)| if negative { -q } else { q })
}

fn key() -> BalanceKey {
    BalanceKey::new(TenantId::new(), ItemId::new(), WarehouseId::new())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The average after an inflow lies between the old average and the
    /// inflow cost.
    #[test]
    fn prop_average_is_bounded(
        quantity in positive_quantity(),
        average in unit_cost(),
        inflow in positive_quantity(),
        cost in unit_cost(),
    ) {
        let next = weighted_average_cost(quantity, average, inflow, cost).unwrap();
        let tolerance = Decimal::new(1, 6);
        prop_assert!(next >= average.min(cost) - tolerance);
        prop_assert!(next <= average.max(cost) + tolerance);
    }

    /// The average never goes negative, even when blending into a short position.
    #[test]
    fn prop_average_never_negative(
        quantity in positive_quantity(),
        short in any::<bool>(),
        average in unit_cost(),
        inflow in positive_quantity(),
        cost in unit_cost(),
    ) {
        let current = if short { -quantity } else { quantity };
        let next = weighted_average_cost(current, average, inflow, cost).unwrap();
        prop_assert!(next >= Decimal::ZERO);
    }

    /// Quantity after any sequence of accepted deltas equals their sum.
    #[test]
    fn prop_quantity_is_sum_of_deltas(
        deltas in prop::collection::vec(signed_delta(), 1..20),
        allow_negative in any::<bool>(),
    ) {
        let key = key();
        let mut state = BalanceState::seeded(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        let mut expected = Decimal::ZERO;

        for delta in deltas {
            match state.apply(&key, delta, allow_negative, &Pricing::default()) {
                Ok(next) => {
                    expected += delta;
                    state = next;
                }
                Err(InventoryError::NegativeStockNotAllowed { on_hand, .. }) => {
                    prop_assert!(!allow_negative);
                    prop_assert_eq!(on_hand, state.quantity);
                }
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
            prop_assert_eq!(state.quantity, expected);
            if !allow_negative {
                prop_assert!(state.quantity >= Decimal::ZERO);
            }
        }
    }

    /// Outflows never touch cost fields.
    #[test]
    fn prop_outflow_keeps_costs(
        on_hand in positive_quantity(),
        average in unit_cost(),
        last in unit_cost(),
        cost in unit_cost(),
    ) {
        let state = BalanceState {
            quantity: on_hand,
            ..BalanceState::seeded(average, last, Decimal::ZERO)
        };
        let pricing = Pricing { unit_cost: Some(cost), selling_price: None };
        let next = state.apply(&key(), -on_hand, false, &pricing).unwrap();
        prop_assert_eq!(next.quantity, Decimal::ZERO);
        prop_assert_eq!(next.average_cost, average);
        prop_assert_eq!(next.last_cost, last);
    }
}
