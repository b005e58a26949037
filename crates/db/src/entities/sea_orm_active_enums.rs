//! Database-backed enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use stockledger_core::inventory::MovementType as DomainMovementType;

/// Movement type as stored in `stock_movements.movement_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Manual correction.
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    /// Goods receipt.
    #[sea_orm(string_value = "receipt")]
    Receipt,
    /// Goods issue.
    #[sea_orm(string_value = "issue")]
    Issue,
    /// Inbound return.
    #[sea_orm(string_value = "return_in")]
    ReturnIn,
    /// Outbound return.
    #[sea_orm(string_value = "return_out")]
    ReturnOut,
    /// Inbound transfer leg.
    #[sea_orm(string_value = "transfer_in")]
    TransferIn,
    /// Outbound transfer leg.
    #[sea_orm(string_value = "transfer_out")]
    TransferOut,
}

impl From<DomainMovementType> for MovementType {
    fn from(value: DomainMovementType) -> Self {
        match value {
            DomainMovementType::Adjustment => Self::Adjustment,
            DomainMovementType::Receipt => Self::Receipt,
            DomainMovementType::Issue => Self::Issue,
            DomainMovementType::ReturnIn => Self::ReturnIn,
            DomainMovementType::ReturnOut => Self::ReturnOut,
            DomainMovementType::TransferIn => Self::TransferIn,
            DomainMovementType::TransferOut => Self::TransferOut,
        }
    }
}

impl From<MovementType> for DomainMovementType {
    fn from(value: MovementType) -> Self {
        match value {
            MovementType::Adjustment => Self::Adjustment,
            MovementType::Receipt => Self::Receipt,
            MovementType::Issue => Self::Issue,
            MovementType::ReturnIn => Self::ReturnIn,
            MovementType::ReturnOut => Self::ReturnOut,
            MovementType::TransferIn => Self::TransferIn,
            MovementType::TransferOut => Self::TransferOut,
        }
    }
}
