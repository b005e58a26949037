//! Inventory movement ledger and balance logic.
//!
//! This module implements the pure half of the engine:
//! - Movement types and balance keys
//! - Input validation and quantity parsing
//! - Weighted-average costing and the negative-stock gate
//! - Reference number generation
//! - Stock status classification
//! - Operation planning and canonical lock ordering

pub mod clock;
pub mod costing;
pub mod error;
pub mod reference;
pub mod service;
pub mod status;
pub mod types;
pub mod validation;

#[cfg(test)]
mod costing_props;
#[cfg(test)]
mod service_props;

pub use clock::{Clock, FixedClock, SystemClock};
pub use costing::{BalanceState, COST_SCALE, weighted_average_cost};
pub use error::{ErrorClass, InventoryError};
pub use reference::{generate_reference, resolve_reference};
pub use service::{
    AdjustmentEditPlan, ExistingAdjustment, PlannedMovement, StockService, TransferPlan,
    lock_order,
};
pub use status::StockStatus;
pub use types::{
    AdjustmentInput, BalanceKey, DeleteAdjustmentInput, IssueInput, MovementMeta, MovementType,
    Pricing, ReceiptInput, ReturnDirection, ReturnInput, StockTarget, TransferInput,
    TransferOutcome, UpdateAdjustmentInput,
};
pub use validation::{
    COST_LIMIT, QUANTITY_LIMIT, QUANTITY_SCALE, parse_quantity, validate_adjustment_delta,
    validate_positive_quantity, validate_price,
};
