//! Stock service: turns validated operation payloads into planned balance
//! mutations.
//!
//! The planner is pure. It validates input, resolves reference numbers and
//! timestamps, picks the balance keys and signed deltas, and fixes the lock
//! order for multi-key operations. The persistence layer executes the plan
//! inside one transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use stockledger_shared::types::TenantId;

use super::costing::BalanceState;
use super::error::InventoryError;
use super::reference::resolve_reference;
use super::types::{
    AdjustmentInput, BalanceKey, IssueInput, MovementMeta, MovementType, Pricing, ReceiptInput,
    ReturnDirection, ReturnInput, StockTarget, TransferInput,
};
use super::validation::{
    validate_adjustment_delta, validate_positive_quantity, validate_price,
};

/// One balance mutation and the movement that records it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMovement {
    /// Balance key the delta lands on.
    pub key: BalanceKey,
    /// Movement type to record.
    pub movement_type: MovementType,
    /// Signed quantity delta.
    pub qty_delta: Decimal,
    /// Pricing applied to the balance row.
    pub pricing: Pricing,
    /// Unit cost supplied by the caller, recorded on the movement.
    pub unit_cost: Option<Decimal>,
    /// Unit price recorded on the movement.
    pub unit_price: Option<Decimal>,
    /// Effective timestamp of the movement.
    pub occurred_at: DateTime<Utc>,
    /// Reference number, supplied or generated.
    pub reference_no: String,
    /// Remaining provenance and audit fields.
    pub meta: MovementMeta,
}

impl PlannedMovement {
    /// Returns true if this movement takes stock out.
    #[must_use]
    pub fn is_outflow(&self) -> bool {
        self.qty_delta < Decimal::ZERO
    }

    /// Unit cost to store on the movement row.
    ///
    /// Outflows without an explicit cost are valued at the balance's average
    /// cost before the movement.
    #[must_use]
    pub fn recorded_unit_cost(&self, before: &BalanceState) -> Option<Decimal> {
        if self.is_outflow() {
            Some(self.unit_cost.unwrap_or(before.average_cost))
        } else {
            self.unit_cost
        }
    }
}

/// Plan for a two-leg transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    /// `transfer_out` at the source key. Applied first.
    pub outbound: PlannedMovement,
    /// `transfer_in` at the destination key.
    pub inbound: PlannedMovement,
    /// Keys in the order they must be locked.
    pub lock_order: Vec<BalanceKey>,
}

impl TransferPlan {
    /// Prices the inbound leg at the source average cost unless the caller
    /// supplied a unit cost.
    pub fn price_inbound(&mut self, source_before: &BalanceState) {
        if self.inbound.pricing.unit_cost.is_none() {
            self.inbound.pricing.unit_cost = Some(source_before.average_cost);
            self.inbound.unit_cost = Some(source_before.average_cost);
        }
    }
}

/// The stored state of an adjustment that is about to be edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingAdjustment {
    /// Key the adjustment was booked against.
    pub key: BalanceKey,
    /// Stored signed delta.
    pub qty_delta: Decimal,
    /// Stored timestamp.
    pub occurred_at: DateTime<Utc>,
    /// Stored reference number.
    pub reference_no: Option<String>,
}

impl ExistingAdjustment {
    /// Delta that undoes this adjustment.
    #[must_use]
    pub fn reversal_delta(&self) -> Decimal {
        -self.qty_delta
    }
}

/// Plan for editing an adjustment in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentEditPlan {
    /// Key whose balance gets the old delta reversed.
    pub reverse_key: BalanceKey,
    /// Delta reversing the stored adjustment.
    pub reverse_delta: Decimal,
    /// The replacement adjustment.
    pub replacement: PlannedMovement,
    /// Keys in the order they must be locked.
    pub lock_order: Vec<BalanceKey>,
}

/// Stock service for planning inventory operations.
///
/// Contains pure business logic with no database dependencies.
pub struct StockService;

impl StockService {
    /// Plans a new adjustment.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a zero or over-precise delta or a
    /// negative cost or price.
    pub fn plan_adjustment(
        tenant_id: TenantId,
        input: &AdjustmentInput,
        now: DateTime<Utc>,
    ) -> Result<PlannedMovement, InventoryError> {
        Self::adjustment_movement(tenant_id, input, None, now)
    }

    /// Plans an edit that reverses the stored adjustment and applies the
    /// replacement, possibly on a different key.
    ///
    /// Timestamp and reference number carry over when the payload leaves them
    /// empty.
    ///
    /// # Errors
    ///
    /// Same validation as [`Self::plan_adjustment`].
    pub fn plan_adjustment_edit(
        tenant_id: TenantId,
        existing: &ExistingAdjustment,
        input: &AdjustmentInput,
        now: DateTime<Utc>,
    ) -> Result<AdjustmentEditPlan, InventoryError> {
        let replacement = Self::adjustment_movement(tenant_id, input, Some(existing), now)?;
        let lock_order = lock_order(&[existing.key, replacement.key]);

        Ok(AdjustmentEditPlan {
            reverse_key: existing.key,
            reverse_delta: existing.reversal_delta(),
            replacement,
            lock_order,
        })
    }

    /// Plans a goods receipt.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive quantity or a negative
    /// cost or price.
    pub fn plan_receipt(
        tenant_id: TenantId,
        input: &ReceiptInput,
        now: DateTime<Utc>,
    ) -> Result<PlannedMovement, InventoryError> {
        let quantity = validate_positive_quantity(input.quantity)?;
        let unit_cost = validate_price("unit_cost", input.unit_cost)?;
        let unit_price = validate_price("unit_price", input.unit_price)?;

        Ok(Self::movement(
            tenant_id,
            &input.target,
            MovementType::Receipt,
            quantity,
            Pricing {
                unit_cost,
                selling_price: unit_price,
            },
            unit_price,
            &input.meta,
            now,
        ))
    }

    /// Plans a goods issue.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive quantity or a negative
    /// price.
    pub fn plan_issue(
        tenant_id: TenantId,
        input: &IssueInput,
        now: DateTime<Utc>,
    ) -> Result<PlannedMovement, InventoryError> {
        let quantity = validate_positive_quantity(input.quantity)?;
        let unit_price = validate_price("unit_price", input.unit_price)?;

        Ok(Self::movement(
            tenant_id,
            &input.target,
            MovementType::Issue,
            -quantity,
            Pricing::default(),
            unit_price,
            &input.meta,
            now,
        ))
    }

    /// Plans a return. `in` adds stock, `out` removes it.
    ///
    /// Inbound returns blend their unit cost into the average but never
    /// change the selling price.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive quantity or a negative
    /// cost or price.
    pub fn plan_return(
        tenant_id: TenantId,
        input: &ReturnInput,
        now: DateTime<Utc>,
    ) -> Result<PlannedMovement, InventoryError> {
        let quantity = validate_positive_quantity(input.quantity)?;
        let unit_cost = validate_price("unit_cost", input.unit_cost)?;
        let unit_price = validate_price("unit_price", input.unit_price)?;

        let pricing = match input.direction {
            ReturnDirection::In => Pricing {
                unit_cost,
                selling_price: None,
            },
            ReturnDirection::Out => Pricing::default(),
        };

        let mut planned = Self::movement(
            tenant_id,
            &input.target,
            input.direction.movement_type(),
            input.direction.signed(quantity),
            pricing,
            unit_price,
            &input.meta,
            now,
        );
        planned.unit_cost = unit_cost;
        Ok(planned)
    }

    /// Plans a transfer between two warehouses.
    ///
    /// Both legs share one reference number and timestamp.
    ///
    /// # Errors
    ///
    /// Returns `SameWarehouse` when source and destination match, or a
    /// validation error for the quantity or cost.
    pub fn plan_transfer(
        tenant_id: TenantId,
        input: &TransferInput,
        now: DateTime<Utc>,
    ) -> Result<TransferPlan, InventoryError> {
        if input.from_warehouse_id == input.to_warehouse_id {
            return Err(InventoryError::SameWarehouse);
        }
        let quantity = validate_positive_quantity(input.quantity)?;
        let unit_cost = validate_price("unit_cost", input.unit_cost)?;

        let source = StockTarget {
            item_id: input.item_id,
            warehouse_id: input.from_warehouse_id,
            variant_id: input.variant_id,
            location_id: input.from_location_id,
        };
        let destination = StockTarget {
            item_id: input.item_id,
            warehouse_id: input.to_warehouse_id,
            variant_id: input.variant_id,
            location_id: input.to_location_id,
        };

        let outbound = Self::movement(
            tenant_id,
            &source,
            MovementType::TransferOut,
            -quantity,
            Pricing::default(),
            None,
            &input.meta,
            now,
        );

        let mut inbound = Self::movement(
            tenant_id,
            &destination,
            MovementType::TransferIn,
            quantity,
            Pricing {
                unit_cost,
                selling_price: None,
            },
            None,
            &input.meta,
            now,
        );
        inbound.occurred_at = outbound.occurred_at;
        inbound.reference_no.clone_from(&outbound.reference_no);

        let lock_order = lock_order(&[outbound.key, inbound.key]);

        Ok(TransferPlan {
            outbound,
            inbound,
            lock_order,
        })
    }

    fn adjustment_movement(
        tenant_id: TenantId,
        input: &AdjustmentInput,
        existing: Option<&ExistingAdjustment>,
        now: DateTime<Utc>,
    ) -> Result<PlannedMovement, InventoryError> {
        let delta = validate_adjustment_delta(input.qty_delta)?;
        let unit_cost = validate_price("unit_cost", input.unit_cost)?;
        let unit_price = validate_price("unit_price", input.unit_price)?;

        let pricing = if delta > Decimal::ZERO {
            Pricing {
                unit_cost,
                selling_price: unit_price,
            }
        } else {
            Pricing::default()
        };

        let mut meta = input.meta.clone();
        if let Some(existing) = existing {
            meta.occurred_at = meta.occurred_at.or(Some(existing.occurred_at));
            if meta.reference_no.as_deref().is_none_or(|s| s.trim().is_empty()) {
                meta.reference_no.clone_from(&existing.reference_no);
            }
        }

        let mut planned = Self::movement(
            tenant_id,
            &input.target,
            MovementType::Adjustment,
            delta,
            pricing,
            unit_price,
            &meta,
            now,
        );
        planned.unit_cost = unit_cost;
        Ok(planned)
    }

    #[allow(clippy::too_many_arguments)]
    fn movement(
        tenant_id: TenantId,
        target: &StockTarget,
        movement_type: MovementType,
        qty_delta: Decimal,
        pricing: Pricing,
        unit_price: Option<Decimal>,
        meta: &MovementMeta,
        now: DateTime<Utc>,
    ) -> PlannedMovement {
        PlannedMovement {
            key: BalanceKey::for_target(tenant_id, target),
            movement_type,
            qty_delta,
            unit_cost: pricing.unit_cost,
            pricing,
            unit_price,
            occurred_at: meta.occurred_at.unwrap_or(now),
            reference_no: resolve_reference(meta.reference_no.as_deref(), movement_type, now),
            meta: meta.clone(),
        }
    }
}

/// Sorts and deduplicates keys into the canonical lock order.
///
/// Every multi-key operation locks rows in this order, so two operations
/// touching the same keys can never wait on each other in a cycle.
#[must_use]
pub fn lock_order(keys: &[BalanceKey]) -> Vec<BalanceKey> {
    let mut ordered = keys.to_vec();
    ordered.sort_unstable();
    ordered.dedup();
    ordered
}
