//! Balance mutator: the only code path that writes `stock_balances`.
//!
//! A balance row is lazily created, locked with `SELECT ... FOR UPDATE`,
//! read, and written back inside the caller's transaction. The lock is held
//! until that transaction commits or rolls back.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbBackend, DbErr,
    EntityTrait, QueryFilter, QuerySelect, Set, Statement,
};
use stockledger_core::inventory::{BalanceKey, BalanceState, Pricing};
use tracing::debug;
use uuid::Uuid;

use super::error::StockError;
use crate::entities::stock_balances;

const INSERT_IF_ABSENT_SQL: &str = r"
INSERT INTO stock_balances (
    id, tenant_id, item_id, warehouse_id, variant_id, location_id,
    quantity_on_hand, average_cost, last_cost, selling_price
)
VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $8, $9)
ON CONFLICT DO NOTHING
";

/// A balance row locked by the current transaction.
#[derive(Debug, Clone)]
pub struct LockedBalance {
    /// Key of the row.
    pub key: BalanceKey,
    /// Row contents as of the last read or write in this transaction.
    pub model: stock_balances::Model,
}

impl LockedBalance {
    /// Quantity and cost fields of the row.
    #[must_use]
    pub const fn state(&self) -> BalanceState {
        BalanceState {
            quantity: self.model.quantity_on_hand,
            average_cost: self.model.average_cost,
            last_cost: self.model.last_cost,
            selling_price: self.model.selling_price,
        }
    }
}

/// Balance mutator over one transaction.
pub struct BalanceMutator<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> BalanceMutator<'a> {
    /// Creates a mutator bound to the caller's transaction.
    #[must_use]
    pub const fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Inserts a zero-quantity row for `key` unless one exists.
    ///
    /// Returns true if this call created the row. Concurrent callers racing
    /// on the same key all succeed; exactly one of them creates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn ensure_row(&self, key: &BalanceKey, seed: &BalanceState) -> Result<bool, DbErr> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            INSERT_IF_ABSENT_SQL,
            vec![
                Uuid::now_v7().into(),
                key.tenant_id.into_inner().into(),
                key.item_id.into_inner().into(),
                key.warehouse_id.into_inner().into(),
                key.variant_id.map(Uuid::from).into(),
                key.location_id.map(Uuid::from).into(),
                seed.average_cost.into(),
                seed.last_cost.into(),
                seed.selling_price.into(),
            ],
        );

        let created = self.txn.execute(stmt).await?.rows_affected() > 0;
        if created {
            debug!(
                tenant_id = %key.tenant_id,
                item_id = %key.item_id,
                warehouse_id = %key.warehouse_id,
                "seeded balance row"
            );
        }
        Ok(created)
    }

    /// Locks the row for `key`, creating it first if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be created or locked.
    pub async fn lock(&self, key: &BalanceKey, seed: &BalanceState) -> Result<LockedBalance, DbErr> {
        self.ensure_row(key, seed).await?;

        let model = Self::key_filter(stock_balances::Entity::find(), key)
            .lock_exclusive()
            .one(self.txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("stock balance for {key:?}")))?;

        debug!(
            balance_id = %model.id,
            quantity = %model.quantity_on_hand,
            "locked balance row"
        );

        Ok(LockedBalance { key: *key, model })
    }

    /// Locks several rows. `keys` must already be in canonical lock order.
    ///
    /// # Errors
    ///
    /// Returns an error if any row cannot be created or locked.
    pub async fn lock_in_order(
        &self,
        keys: &[(BalanceKey, BalanceState)],
    ) -> Result<Vec<LockedBalance>, DbErr> {
        debug_assert!(keys.windows(2).all(|w| w[0].0 < w[1].0));

        let mut locked = Vec::with_capacity(keys.len());
        for (key, seed) in keys {
            locked.push(self.lock(key, seed).await?);
        }
        Ok(locked)
    }

    /// Applies a signed delta to a locked row and returns the state before it.
    ///
    /// Cost fields follow weighted-average costing; `last_movement_at` only
    /// moves forward.
    ///
    /// # Errors
    ///
    /// Returns `NegativeStockNotAllowed` (and writes nothing) when the result
    /// would go below zero without permission, or a database error.
    pub async fn apply_delta(
        &self,
        balance: &mut LockedBalance,
        delta: Decimal,
        allow_negative: bool,
        pricing: &Pricing,
        occurred_at: DateTime<Utc>,
    ) -> Result<BalanceState, StockError> {
        let before = balance.state();
        let next = before.apply(&balance.key, delta, allow_negative, pricing)?;

        let last_movement_at = match balance.model.last_movement_at {
            Some(existing) if existing.with_timezone(&Utc) >= occurred_at => existing,
            _ => occurred_at.into(),
        };

        let mut active: stock_balances::ActiveModel = balance.model.clone().into();
        active.quantity_on_hand = Set(next.quantity);
        active.average_cost = Set(next.average_cost);
        active.last_cost = Set(next.last_cost);
        active.selling_price = Set(next.selling_price);
        active.last_movement_at = Set(Some(last_movement_at));
        active.updated_at = Set(Utc::now().into());

        balance.model = active.update(self.txn).await?;

        debug!(
            balance_id = %balance.model.id,
            delta = %delta,
            quantity = %next.quantity,
            average_cost = %next.average_cost,
            "applied balance delta"
        );

        Ok(before)
    }

    fn key_filter(
        query: sea_orm::Select<stock_balances::Entity>,
        key: &BalanceKey,
    ) -> sea_orm::Select<stock_balances::Entity> {
        let query = query
            .filter(stock_balances::Column::TenantId.eq(key.tenant_id.into_inner()))
            .filter(stock_balances::Column::ItemId.eq(key.item_id.into_inner()))
            .filter(stock_balances::Column::WarehouseId.eq(key.warehouse_id.into_inner()));

        let query = match key.variant_id {
            Some(variant_id) => {
                query.filter(stock_balances::Column::VariantId.eq(variant_id.into_inner()))
            }
            None => query.filter(stock_balances::Column::VariantId.is_null()),
        };

        match key.location_id {
            Some(location_id) => {
                query.filter(stock_balances::Column::LocationId.eq(location_id.into_inner()))
            }
            None => query.filter(stock_balances::Column::LocationId.is_null()),
        }
    }
}

/// Finds the locked row for `key` in a slice returned by
/// [`BalanceMutator::lock_in_order`].
pub(crate) fn position_of(locked: &[LockedBalance], key: &BalanceKey) -> Result<usize, DbErr> {
    locked
        .iter()
        .position(|b| b.key == *key)
        .ok_or_else(|| DbErr::Custom(format!("balance for {key:?} was not locked")))
}
