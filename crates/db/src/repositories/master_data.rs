//! Read-only lookups of item and warehouse master data.
//!
//! Master data is owned elsewhere; the engine only needs existence, tenant
//! ownership, and the inventory flags and cost defaults of an item.

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use stockledger_core::inventory::{BalanceState, InventoryError};
use stockledger_shared::types::{CostCenterId, ItemId, TenantId, WarehouseId};

use super::error::StockError;
use crate::entities::{items, warehouses};

/// What the engine needs to know about an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPolicy {
    /// The item.
    pub id: ItemId,
    /// Whether the item tracks inventory.
    pub track_inventory: bool,
    /// Whether balances may go below zero.
    pub allow_negative_stock: bool,
    /// Default average cost for a new balance row.
    pub average_cost: Decimal,
    /// Default last cost for a new balance row.
    pub last_purchase_cost: Decimal,
    /// Default selling price for a new balance row.
    pub base_selling_price: Decimal,
}

impl ItemPolicy {
    /// Starting state for a lazily created balance row.
    #[must_use]
    pub const fn seed(&self) -> BalanceState {
        BalanceState::seeded(
            self.average_cost,
            self.last_purchase_cost,
            self.base_selling_price,
        )
    }

    /// Fails with `ItemNotTracking` unless the item tracks inventory.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotTracking` for non-stock items.
    pub const fn ensure_tracking(&self) -> Result<(), InventoryError> {
        if self.track_inventory {
            Ok(())
        } else {
            Err(InventoryError::ItemNotTracking(self.id))
        }
    }
}

impl From<items::Model> for ItemPolicy {
    fn from(model: items::Model) -> Self {
        Self {
            id: ItemId::from_uuid(model.id),
            track_inventory: model.track_inventory,
            allow_negative_stock: model.allow_negative_stock,
            average_cost: model.average_cost,
            last_purchase_cost: model.last_purchase_cost,
            base_selling_price: model.base_selling_price,
        }
    }
}

/// What the engine needs to know about a warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarehouseInfo {
    /// The warehouse.
    pub id: WarehouseId,
    /// Cost center movements default to.
    pub cost_center_id: Option<CostCenterId>,
}

/// Loads a live warehouse owned by the tenant.
///
/// # Errors
///
/// Returns `WarehouseNotFound` when it is missing, soft-deleted, or owned by
/// another tenant.
pub async fn find_warehouse<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    warehouse_id: WarehouseId,
) -> Result<WarehouseInfo, StockError> {
    let model = warehouses::Entity::find_by_id(warehouse_id.into_inner())
        .filter(warehouses::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(warehouses::Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or(InventoryError::WarehouseNotFound(warehouse_id))?;

    Ok(WarehouseInfo {
        id: warehouse_id,
        cost_center_id: model.cost_center_id.map(CostCenterId::from_uuid),
    })
}

/// Loads a live item owned by the tenant.
///
/// # Errors
///
/// Returns `ItemNotFound` when it is missing, soft-deleted, or owned by
/// another tenant.
pub async fn find_item<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    item_id: ItemId,
) -> Result<ItemPolicy, StockError> {
    let model = items::Entity::find_by_id(item_id.into_inner())
        .filter(items::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(items::Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or(InventoryError::ItemNotFound(item_id))?;

    Ok(model.into())
}

/// Loads an item owned by the tenant even if it was soft-deleted since.
///
/// Reversing an existing movement must still honour the item's flags.
///
/// # Errors
///
/// Returns `ItemNotFound` when it is missing or owned by another tenant.
pub async fn find_item_for_reversal<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    item_id: ItemId,
) -> Result<ItemPolicy, StockError> {
    let model = items::Entity::find_by_id(item_id.into_inner())
        .filter(items::Column::TenantId.eq(tenant_id.into_inner()))
        .one(conn)
        .await?
        .ok_or(InventoryError::ItemNotFound(item_id))?;

    Ok(model.into())
}

/// Resolves warehouse, then item, then checks inventory tracking.
///
/// # Errors
///
/// Returns the first referential or policy error encountered.
pub async fn resolve_stock_target<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    warehouse_id: WarehouseId,
    item_id: ItemId,
) -> Result<(WarehouseInfo, ItemPolicy), StockError> {
    let warehouse = find_warehouse(conn, tenant_id, warehouse_id).await?;
    let item = find_item(conn, tenant_id, item_id).await?;
    item.ensure_tracking()?;
    Ok((warehouse, item))
}
