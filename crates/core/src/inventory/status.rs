//! Stock status derived for the snapshot view.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock level classification of one balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// Nothing (or less than nothing) on hand.
    OutOfStock,
    /// At or below the item's positive minimum.
    LowStock,
    /// Everything else.
    InStock,
}

impl StockStatus {
    /// Classifies a quantity against an optional minimum.
    #[must_use]
    pub fn classify(quantity: Decimal, min_stock: Option<Decimal>) -> Self {
        if quantity <= Decimal::ZERO {
            return Self::OutOfStock;
        }
        match min_stock {
            Some(min) if min > Decimal::ZERO && quantity <= min => Self::LowStock,
            _ => Self::InStock,
        }
    }

    /// Returns the serialized name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OutOfStock => "out_of_stock",
            Self::LowStock => "low_stock",
            Self::InStock => "in_stock",
        }
    }
}
