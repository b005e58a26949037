//! Error type shared by the inventory repositories.

use sea_orm::DbErr;
use stockledger_core::inventory::InventoryError;
use stockledger_shared::AppError;

use crate::retry::Retryable;

/// Error types for inventory persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StockError {
    /// Domain error: validation, referential, policy, or missing target.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StockError {
    /// Returns the stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Inventory(err) => err.code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the domain error, if this is one.
    #[must_use]
    pub const fn as_inventory(&self) -> Option<&InventoryError> {
        match self {
            Self::Inventory(err) => Some(err),
            Self::Database(_) => None,
        }
    }
}

impl Retryable for StockError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Inventory(_) => false,
            Self::Database(err) => err.is_retryable(),
        }
    }
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::Inventory(err) => err.into(),
            StockError::Database(err) => Self::Database(err.to_string()),
        }
    }
}
