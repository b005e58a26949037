//! Movement recorder: appends ledger rows and carries the narrow
//! adjustment edit and soft-delete paths.
//!
//! The recorder never reads or writes balances.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set,
};
use stockledger_core::inventory::{BalanceKey, ExistingAdjustment, PlannedMovement};
use stockledger_shared::types::{
    CostCenterId, ItemId, LocationId, MovementId, TenantId, UserId, VariantId, WarehouseId,
};
use uuid::Uuid;

use crate::entities::{sea_orm_active_enums::MovementType, stock_movements};

/// Movement recorder over one transaction.
pub struct MovementRecorder<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> MovementRecorder<'a> {
    /// Creates a recorder bound to the caller's transaction.
    #[must_use]
    pub const fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Appends a movement row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn record(
        &self,
        planned: &PlannedMovement,
        unit_cost: Option<Decimal>,
        cost_center_id: Option<CostCenterId>,
        now: DateTime<Utc>,
    ) -> Result<MovementId, DbErr> {
        let id = MovementId::new();
        let now = now.into();
        let user_id = planned.meta.user_id.map(Uuid::from);

        stock_movements::ActiveModel {
            id: Set(id.into_inner()),
            tenant_id: Set(planned.key.tenant_id.into_inner()),
            warehouse_id: Set(planned.key.warehouse_id.into_inner()),
            item_id: Set(planned.key.item_id.into_inner()),
            variant_id: Set(planned.key.variant_id.map(Uuid::from)),
            location_id: Set(planned.key.location_id.map(Uuid::from)),
            cost_center_id: Set(cost_center_id.map(Uuid::from)),
            movement_type: Set(planned.movement_type.into()),
            qty_delta: Set(planned.qty_delta),
            unit_cost: Set(unit_cost),
            unit_price: Set(planned.unit_price),
            reference_type: Set(planned.meta.reference_type.clone()),
            reference_id: Set(planned.meta.reference_id),
            reference_no: Set(Some(planned.reference_no.clone())),
            notes: Set(planned.meta.notes.clone()),
            occurred_at: Set(planned.occurred_at.into()),
            created_by: Set(user_id),
            updated_by: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            deleted_by: Set(None),
        }
        .insert(self.txn)
        .await?;

        Ok(id)
    }

    /// Locks a live adjustment row for edit or delete.
    ///
    /// Returns `None` when the movement is missing, soft-deleted, owned by
    /// another tenant, or not an adjustment.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn lock_live_adjustment(
        &self,
        tenant_id: TenantId,
        movement_id: MovementId,
    ) -> Result<Option<stock_movements::Model>, DbErr> {
        stock_movements::Entity::find_by_id(movement_id.into_inner())
            .filter(stock_movements::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(stock_movements::Column::MovementType.eq(MovementType::Adjustment))
            .filter(stock_movements::Column::DeletedAt.is_null())
            .lock_exclusive()
            .one(self.txn)
            .await
    }

    /// Rewrites an adjustment in place with the replacement values.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn rewrite_adjustment(
        &self,
        existing: stock_movements::Model,
        replacement: &PlannedMovement,
        unit_cost: Option<Decimal>,
        cost_center_id: Option<CostCenterId>,
        now: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let mut active: stock_movements::ActiveModel = existing.into();
        active.warehouse_id = Set(replacement.key.warehouse_id.into_inner());
        active.item_id = Set(replacement.key.item_id.into_inner());
        active.variant_id = Set(replacement.key.variant_id.map(Uuid::from));
        active.location_id = Set(replacement.key.location_id.map(Uuid::from));
        active.cost_center_id = Set(cost_center_id.map(Uuid::from));
        active.qty_delta = Set(replacement.qty_delta);
        active.unit_cost = Set(unit_cost);
        active.unit_price = Set(replacement.unit_price);
        active.reference_type = Set(replacement.meta.reference_type.clone());
        active.reference_id = Set(replacement.meta.reference_id);
        active.reference_no = Set(Some(replacement.reference_no.clone()));
        active.notes = Set(replacement.meta.notes.clone());
        active.occurred_at = Set(replacement.occurred_at.into());
        active.updated_by = Set(replacement.meta.user_id.map(Uuid::from));
        active.updated_at = Set(now.into());

        active.update(self.txn).await?;
        Ok(())
    }

    /// Soft-deletes an adjustment.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn soft_delete(
        &self,
        existing: stock_movements::Model,
        user_id: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let now = now.into();
        let mut active: stock_movements::ActiveModel = existing.into();
        active.deleted_at = Set(Some(now));
        active.deleted_by = Set(user_id.map(Uuid::from));
        active.updated_by = Set(user_id.map(Uuid::from));
        active.updated_at = Set(now);

        active.update(self.txn).await?;
        Ok(())
    }
}

/// Loads a movement by id within a tenant, including soft-deleted rows.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn find_movement<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    movement_id: MovementId,
) -> Result<Option<stock_movements::Model>, DbErr> {
    stock_movements::Entity::find_by_id(movement_id.into_inner())
        .filter(stock_movements::Column::TenantId.eq(tenant_id.into_inner()))
        .one(conn)
        .await
}

/// Balance key a stored movement was booked against.
#[must_use]
pub fn movement_key(model: &stock_movements::Model) -> BalanceKey {
    BalanceKey {
        tenant_id: TenantId::from_uuid(model.tenant_id),
        warehouse_id: WarehouseId::from_uuid(model.warehouse_id),
        item_id: ItemId::from_uuid(model.item_id),
        variant_id: model.variant_id.map(VariantId::from_uuid),
        location_id: model.location_id.map(LocationId::from_uuid),
    }
}

/// Stored state of an adjustment as the planner sees it.
#[must_use]
pub fn existing_adjustment(model: &stock_movements::Model) -> ExistingAdjustment {
    ExistingAdjustment {
        key: movement_key(model),
        qty_delta: model.qty_delta,
        occurred_at: model.occurred_at.with_timezone(&Utc),
        reference_no: model.reference_no.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn model(variant_id: Option<Uuid>) -> stock_movements::Model {
        let at = Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap().into();
        stock_movements::Model {
            id: Uuid::now_v7(),
            tenant_id: Uuid::now_v7(),
            warehouse_id: Uuid::now_v7(),
            item_id: Uuid::now_v7(),
            variant_id,
            location_id: None,
            cost_center_id: None,
            movement_type: MovementType::Adjustment,
            qty_delta: dec!(5),
            unit_cost: None,
            unit_price: None,
            reference_type: None,
            reference_id: None,
            reference_no: Some("ADJ-1".into()),
            notes: None,
            occurred_at: at,
            created_by: None,
            updated_by: None,
            created_at: at,
            updated_at: at,
            deleted_at: None,
            deleted_by: None,
        }
    }

    #[test]
    fn test_movement_key_maps_dimensions() {
        let variant = Uuid::now_v7();
        let stored = model(Some(variant));
        let key = movement_key(&stored);
        assert_eq!(key.item_id.into_inner(), stored.item_id);
        assert_eq!(key.warehouse_id.into_inner(), stored.warehouse_id);
        assert_eq!(key.variant_id, Some(VariantId::from_uuid(variant)));
        assert_eq!(key.location_id, None);
    }

    #[test]
    fn test_existing_adjustment() {
        let stored = model(None);
        let existing = existing_adjustment(&stored);
        assert_eq!(existing.qty_delta, dec!(5));
        assert_eq!(existing.reversal_delta(), dec!(-5));
        assert_eq!(existing.reference_no.as_deref(), Some("ADJ-1"));
        assert_eq!(
            existing.occurred_at,
            Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap()
        );
    }
}
