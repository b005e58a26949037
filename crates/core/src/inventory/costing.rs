//! Balance arithmetic: signed deltas, negative-stock policy and
//! weighted-average costing.
//!
//! Cost only moves on inflows. Outflows leave average cost and last cost
//! untouched, which is standard weighted-average costing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::InventoryError;
use super::types::{BalanceKey, Pricing};
use super::validation::{COST_LIMIT, QUANTITY_LIMIT};

/// Decimal places kept for costs and prices.
pub const COST_SCALE: u32 = 6;

/// Quantity and cost fields of one balance row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceState {
    /// Quantity on hand.
    pub quantity: Decimal,
    /// Weighted-average unit cost.
    pub average_cost: Decimal,
    /// Unit cost of the most recent priced inflow.
    pub last_cost: Decimal,
    /// Current selling price.
    pub selling_price: Decimal,
}

impl BalanceState {
    /// An empty balance seeded with item default costs.
    #[must_use]
    pub const fn seeded(average_cost: Decimal, last_cost: Decimal, selling_price: Decimal) -> Self {
        Self {
            quantity: Decimal::ZERO,
            average_cost,
            last_cost,
            selling_price,
        }
    }

    /// Applies a signed delta and returns the next state.
    ///
    /// # Errors
    ///
    /// Returns `NegativeStockNotAllowed` when the result would be below zero
    /// and `allow_negative` is false, and `BalanceOutOfRange` when the
    /// quantity or average cost would not fit the balance row. No state
    /// changes in either case.
    pub fn apply(
        &self,
        key: &BalanceKey,
        delta: Decimal,
        allow_negative: bool,
        pricing: &Pricing,
    ) -> Result<Self, InventoryError> {
        let out_of_range = || InventoryError::BalanceOutOfRange {
            item_id: key.item_id,
            warehouse_id: key.warehouse_id,
        };
        let next_quantity = self
            .quantity
            .checked_add(delta)
            .filter(|q| q.abs() < QUANTITY_LIMIT)
            .ok_or_else(out_of_range)?;

        if next_quantity < Decimal::ZERO && !allow_negative {
            return Err(InventoryError::NegativeStockNotAllowed {
                item_id: key.item_id,
                warehouse_id: key.warehouse_id,
                on_hand: self.quantity,
                delta,
            });
        }

        let mut next = Self {
            quantity: next_quantity,
            ..*self
        };

        if delta > Decimal::ZERO {
            if let Some(unit_cost) = pricing.unit_cost {
                next.average_cost =
                    weighted_average_cost(self.quantity, self.average_cost, delta, unit_cost)
                        .filter(|avg| *avg < COST_LIMIT)
                        .ok_or_else(out_of_range)?;
                next.last_cost = unit_cost;
            }
        }

        if let Some(price) = pricing.selling_price {
            next.selling_price = price;
        }

        Ok(next)
    }
}

/// Blends an inflow into the running average cost.
///
/// `(qty * avg + delta * unit) / (qty + delta)`, rounded to [`COST_SCALE`].
/// A short position blends like any other. When the inflow leaves the
/// position at or below zero the inflow's unit cost becomes the average.
/// A negative blend is clamped to zero.
///
/// Returns `None` if the arithmetic overflows.
#[must_use]
pub fn weighted_average_cost(
    current_quantity: Decimal,
    current_average: Decimal,
    inflow_quantity: Decimal,
    unit_cost: Decimal,
) -> Option<Decimal> {
    let next_quantity = current_quantity.checked_add(inflow_quantity)?;
    if next_quantity <= Decimal::ZERO {
        return Some(unit_cost);
    }

    let total_value = current_quantity
        .checked_mul(current_average)?
        .checked_add(inflow_quantity.checked_mul(unit_cost)?)?;
    let average = total_value.checked_div(next_quantity)?.round_dp(COST_SCALE);
    Some(average.max(Decimal::ZERO))
}
