//! Input validation for inventory payloads.
//!
//! Everything here runs before a database transaction is opened.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::error::InventoryError;

/// Decimal places kept for quantities.
pub const QUANTITY_SCALE: u32 = 4;

/// Exclusive magnitude bound for quantities, `NUMERIC(19, 4)` (10^15).
pub const QUANTITY_LIMIT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Exclusive magnitude bound for costs and prices, `NUMERIC(19, 6)` (10^13).
pub const COST_LIMIT: Decimal = Decimal::from_parts(0x4E72_A000, 0x0000_0918, 0, false, 0);

/// Parses a quantity supplied as text.
///
/// # Errors
///
/// `MissingQuantity` for absent or blank input, `InvalidQuantity` for
/// anything that is not a finite decimal.
pub fn parse_quantity(raw: Option<&str>) -> Result<Decimal, InventoryError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let Some(raw) = raw else {
        return Err(InventoryError::MissingQuantity);
    };

    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| InventoryError::InvalidQuantity(raw.to_string()))
}

/// Validates a quantity that must be strictly positive.
///
/// # Errors
///
/// Returns an error for zero, negative, over-precise, or out-of-range
/// quantities.
pub fn validate_positive_quantity(quantity: Decimal) -> Result<Decimal, InventoryError> {
    if quantity <= Decimal::ZERO {
        return Err(InventoryError::NonPositiveQuantity(quantity));
    }
    validate_quantity("quantity", quantity)
}

/// Validates an adjustment delta: signed, never zero.
///
/// # Errors
///
/// Returns an error for zero, over-precise, or out-of-range deltas.
pub fn validate_adjustment_delta(delta: Decimal) -> Result<Decimal, InventoryError> {
    if delta.is_zero() {
        return Err(InventoryError::ZeroAdjustment);
    }
    validate_quantity("qty_delta", delta)
}

/// Validates an optional cost or price.
///
/// # Errors
///
/// Returns `NegativePrice` when the value is below zero and `OutOfRange`
/// when it does not fit a cost column.
pub fn validate_price(
    field: &'static str,
    value: Option<Decimal>,
) -> Result<Option<Decimal>, InventoryError> {
    match value {
        Some(v) if v < Decimal::ZERO => Err(InventoryError::NegativePrice { field, value: v }),
        Some(v) if v >= COST_LIMIT => Err(InventoryError::OutOfRange { field, value: v }),
        other => Ok(other),
    }
}

fn validate_quantity(field: &'static str, quantity: Decimal) -> Result<Decimal, InventoryError> {
    if quantity.abs() >= QUANTITY_LIMIT {
        return Err(InventoryError::OutOfRange {
            field,
            value: quantity,
        });
    }
    let normalized = quantity.normalize();
    if normalized.scale() > QUANTITY_SCALE {
        return Err(InventoryError::QuantityPrecision(quantity));
    }
    Ok(normalized)
}
