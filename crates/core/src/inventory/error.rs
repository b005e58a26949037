//! Inventory error types.
//!
//! Every error carries a stable machine-readable code and belongs to one of
//! four classes: input validation, referential, policy, or a missing
//! mutation target.

use rust_decimal::Decimal;
use stockledger_shared::AppError;
use stockledger_shared::types::{ItemId, MovementId, WarehouseId};
use thiserror::Error;

/// Class of an inventory error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Rejected before any transaction opens.
    Validation,
    /// A referenced item or warehouse does not exist for the tenant.
    Referential,
    /// A policy check failed after lookups but before any write.
    Policy,
    /// The record an edit or delete targets does not exist.
    TargetNotFound,
}

/// Errors that can occur during inventory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    // ========== Validation Errors ==========
    /// A required quantity was not supplied.
    #[error("Quantity is required")]
    MissingQuantity,

    /// A quantity could not be parsed as a finite decimal.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Receipts, issues, returns and transfers need a quantity above zero.
    #[error("Quantity must be greater than zero, got {0}")]
    NonPositiveQuantity(Decimal),

    /// An adjustment must change the balance.
    #[error("Adjustment quantity cannot be zero")]
    ZeroAdjustment,

    /// Quantities are stored with four decimal places.
    #[error("Quantity {0} has more than 4 decimal places")]
    QuantityPrecision(Decimal),

    /// Costs and prices cannot be negative.
    #[error("{field} cannot be negative, got {value}")]
    NegativePrice {
        /// Which field was negative.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    /// A quantity, cost or price is too large for its column.
    #[error("{field} {value} is out of range")]
    OutOfRange {
        /// Which field was out of range.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    /// A transfer must move stock between two different warehouses.
    #[error("Source and destination warehouses must differ")]
    SameWarehouse,

    // ========== Referential Errors ==========
    /// Warehouse missing, soft-deleted, or owned by another tenant.
    #[error("Warehouse not found: {0}")]
    WarehouseNotFound(WarehouseId),

    /// Item missing, soft-deleted, or owned by another tenant.
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    // ========== Policy Errors ==========
    /// The item does not track inventory.
    #[error("Item {0} does not track inventory")]
    ItemNotTracking(ItemId),

    /// The movement would take the balance below zero.
    #[error(
        "Insufficient stock for item {item_id} in warehouse {warehouse_id}: on hand {on_hand}, change {delta}"
    )]
    NegativeStockNotAllowed {
        /// The item.
        item_id: ItemId,
        /// The warehouse.
        warehouse_id: WarehouseId,
        /// Quantity on hand before the movement.
        on_hand: Decimal,
        /// The rejected signed delta.
        delta: Decimal,
    },

    /// The movement would push the balance quantity or average cost past
    /// what the balance row can hold.
    #[error("Balance out of range for item {item_id} in warehouse {warehouse_id}")]
    BalanceOutOfRange {
        /// The item.
        item_id: ItemId,
        /// The warehouse.
        warehouse_id: WarehouseId,
    },

    // ========== Mutation Target Errors ==========
    /// The adjustment is missing, already deleted, or not an adjustment.
    #[error("Adjustment not found: {0}")]
    AdjustmentNotFound(MovementId),
}

impl InventoryError {
    /// Returns the stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingQuantity
            | Self::InvalidQuantity(_)
            | Self::NonPositiveQuantity(_)
            | Self::ZeroAdjustment
            | Self::QuantityPrecision(_)
            | Self::NegativePrice { .. }
            | Self::OutOfRange { .. }
            | Self::SameWarehouse => "VALIDATION_ERROR",
            Self::WarehouseNotFound(_) => "WAREHOUSE_NOT_FOUND",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::ItemNotTracking(_) => "ITEM_NOT_TRACKING",
            Self::NegativeStockNotAllowed { .. } => "NEGATIVE_STOCK_NOT_ALLOWED",
            Self::BalanceOutOfRange { .. } => "BALANCE_OUT_OF_RANGE",
            Self::AdjustmentNotFound(_) => "ADJUSTMENT_NOT_FOUND",
        }
    }

    /// Returns the error class.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::WarehouseNotFound(_) | Self::ItemNotFound(_) => ErrorClass::Referential,
            Self::ItemNotTracking(_)
            | Self::NegativeStockNotAllowed { .. }
            | Self::BalanceOutOfRange { .. } => ErrorClass::Policy,
            Self::AdjustmentNotFound(_) => ErrorClass::TargetNotFound,
            _ => ErrorClass::Validation,
        }
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        let code = err.code();
        match err.class() {
            ErrorClass::Validation => Self::Validation(err.to_string()),
            ErrorClass::Referential | ErrorClass::TargetNotFound => Self::NotFound {
                code,
                message: err.to_string(),
            },
            ErrorClass::Policy => Self::BusinessRule {
                code,
                message: err.to_string(),
            },
        }
    }
}
