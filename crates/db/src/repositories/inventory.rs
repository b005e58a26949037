//! Inventory repository: the operation façade.
//!
//! Every write validates its payload, opens one tenant-scoped transaction,
//! resolves master data, locks the balance rows it touches in canonical
//! order, mutates them, records the movement(s), and commits. Any error
//! drops the transaction, which rolls everything back.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use stockledger_core::inventory::{
    AdjustmentInput, Clock, DeleteAdjustmentInput, ErrorClass, InventoryError, IssueInput,
    PlannedMovement, Pricing, ReceiptInput, ReturnInput, StockService, SystemClock, TransferInput,
    TransferOutcome, TransferPlan, UpdateAdjustmentInput,
};
use stockledger_shared::types::{MovementId, TenantId};
use stockledger_shared::AppConfig;
use tracing::{info, warn};

use super::balance::{BalanceMutator, position_of};
use super::error::StockError;
use super::master_data::{find_item, find_item_for_reversal, find_warehouse, resolve_stock_target};
use super::movement::{MovementRecorder, existing_adjustment, find_movement, movement_key};
use crate::entities::stock_movements;
use crate::retry::{RetryPolicy, with_retry};
use crate::tenant::TenantScope;

/// Lock wait bound used when no configuration is supplied.
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

/// Inventory repository for movement recording and balance maintenance.
#[derive(Clone)]
pub struct InventoryRepository {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    lock_timeout_ms: u64,
}

impl std::fmt::Debug for InventoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryRepository")
            .field("retry", &self.retry)
            .field("lock_timeout_ms", &self.lock_timeout_ms)
            .finish_non_exhaustive()
    }
}

impl InventoryRepository {
    /// Creates a repository with the system clock, a single attempt per
    /// operation, and the default lock timeout.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            clock: Arc::new(SystemClock),
            retry: RetryPolicy::none(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    /// Creates a repository configured from application settings.
    #[must_use]
    pub fn from_config(db: DatabaseConnection, config: &AppConfig) -> Self {
        Self::new(db)
            .with_retry(RetryPolicy::from_config(&config.inventory))
            .with_lock_timeout_ms(config.database.lock_timeout_ms)
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the per-transaction lock timeout; zero keeps the server default.
    #[must_use]
    pub const fn with_lock_timeout_ms(mut self, lock_timeout_ms: u64) -> Self {
        self.lock_timeout_ms = lock_timeout_ms;
        self
    }

    // ========================================================================
    // Adjustments
    // ========================================================================

    /// Creates an adjustment with a signed, non-zero delta.
    ///
    /// # Errors
    ///
    /// Validation, referential, policy, or database errors.
    pub async fn create_adjustment(
        &self,
        tenant_id: TenantId,
        input: AdjustmentInput,
    ) -> Result<MovementId, StockError> {
        let planned = StockService::plan_adjustment(tenant_id, &input, self.clock.now())?;
        self.post("create_adjustment", tenant_id, &planned).await
    }

    /// Edits an adjustment: reverses the stored delta at the stored key and
    /// applies the new delta at the (possibly different) new key.
    ///
    /// # Errors
    ///
    /// `AdjustmentNotFound` when the target is missing, deleted, or not an
    /// adjustment; otherwise as [`Self::create_adjustment`].
    pub async fn update_adjustment(
        &self,
        tenant_id: TenantId,
        input: UpdateAdjustmentInput,
    ) -> Result<MovementId, StockError> {
        let now = self.clock.now();
        StockService::plan_adjustment(tenant_id, &input.adjustment, now)?;

        with_retry(&self.retry, "update_adjustment", || {
            self.try_update_adjustment(tenant_id, &input)
        })
        .await
        .inspect_err(|err| log_rejection("update_adjustment", tenant_id, err))
    }

    /// Soft-deletes an adjustment and reverses its delta.
    ///
    /// The reversal is checked against the original item's negative-stock
    /// flag.
    ///
    /// # Errors
    ///
    /// `AdjustmentNotFound`, `NegativeStockNotAllowed`, or database errors.
    pub async fn delete_adjustment(
        &self,
        tenant_id: TenantId,
        input: DeleteAdjustmentInput,
    ) -> Result<MovementId, StockError> {
        with_retry(&self.retry, "delete_adjustment", || {
            self.try_delete_adjustment(tenant_id, input)
        })
        .await
        .inspect_err(|err| log_rejection("delete_adjustment", tenant_id, err))
    }

    // ========================================================================
    // Receipts, issues, returns
    // ========================================================================

    /// Records a goods receipt.
    ///
    /// # Errors
    ///
    /// Validation, referential, policy, or database errors.
    pub async fn create_receipt(
        &self,
        tenant_id: TenantId,
        input: ReceiptInput,
    ) -> Result<MovementId, StockError> {
        let planned = StockService::plan_receipt(tenant_id, &input, self.clock.now())?;
        self.post("create_receipt", tenant_id, &planned).await
    }

    /// Records a goods issue.
    ///
    /// # Errors
    ///
    /// Validation, referential, policy (including `NegativeStockNotAllowed`),
    /// or database errors.
    pub async fn create_issue(
        &self,
        tenant_id: TenantId,
        input: IssueInput,
    ) -> Result<MovementId, StockError> {
        let planned = StockService::plan_issue(tenant_id, &input, self.clock.now())?;
        self.post("create_issue", tenant_id, &planned).await
    }

    /// Records a return in either direction.
    ///
    /// # Errors
    ///
    /// Validation, referential, policy, or database errors.
    pub async fn create_return(
        &self,
        tenant_id: TenantId,
        input: ReturnInput,
    ) -> Result<MovementId, StockError> {
        let planned = StockService::plan_return(tenant_id, &input, self.clock.now())?;
        self.post("create_return", tenant_id, &planned).await
    }

    // ========================================================================
    // Transfers
    // ========================================================================

    /// Moves stock between two warehouses in one transaction.
    ///
    /// The outbound leg is applied and validated before the inbound leg. Both
    /// movements share one reference number.
    ///
    /// # Errors
    ///
    /// `SameWarehouse`, referential, policy, or database errors. On any error
    /// neither leg is persisted.
    pub async fn create_transfer(
        &self,
        tenant_id: TenantId,
        input: TransferInput,
    ) -> Result<TransferOutcome, StockError> {
        let plan = StockService::plan_transfer(tenant_id, &input, self.clock.now())?;

        with_retry(&self.retry, "create_transfer", || {
            self.try_transfer(tenant_id, plan.clone())
        })
        .await
        .inspect_err(|err| log_rejection("create_transfer", tenant_id, err))
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Returns a recorded movement, including soft-deleted ones.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn get_movement(
        &self,
        tenant_id: TenantId,
        movement_id: MovementId,
    ) -> Result<Option<stock_movements::Model>, StockError> {
        let scope = TenantScope::begin(&self.db, tenant_id, self.lock_timeout_ms).await?;
        let movement = find_movement(scope.transaction(), tenant_id, movement_id).await?;
        scope.commit().await?;
        Ok(movement)
    }

    // ========================================================================
    // Transaction bodies
    // ========================================================================

    async fn post(
        &self,
        operation: &'static str,
        tenant_id: TenantId,
        planned: &PlannedMovement,
    ) -> Result<MovementId, StockError> {
        with_retry(&self.retry, operation, || self.try_post(tenant_id, planned))
            .await
            .inspect(|movement_id| {
                info!(
                    operation,
                    tenant_id = %tenant_id,
                    item_id = %planned.key.item_id,
                    warehouse_id = %planned.key.warehouse_id,
                    delta = %planned.qty_delta,
                    movement_id = %movement_id,
                    reference_no = %planned.reference_no,
                    "stock movement committed"
                );
            })
            .inspect_err(|err| log_rejection(operation, tenant_id, err))
    }

    async fn try_post(
        &self,
        tenant_id: TenantId,
        planned: &PlannedMovement,
    ) -> Result<MovementId, StockError> {
        let scope = TenantScope::begin(&self.db, tenant_id, self.lock_timeout_ms).await?;
        let txn = scope.transaction();

        let (warehouse, item) =
            resolve_stock_target(txn, tenant_id, planned.key.warehouse_id, planned.key.item_id)
                .await?;

        let mutator = BalanceMutator::new(txn);
        let mut balance = mutator.lock(&planned.key, &item.seed()).await?;
        let before = mutator
            .apply_delta(
                &mut balance,
                planned.qty_delta,
                item.allow_negative_stock,
                &planned.pricing,
                planned.occurred_at,
            )
            .await?;

        let movement_id = MovementRecorder::new(txn)
            .record(
                planned,
                planned.recorded_unit_cost(&before),
                planned.meta.cost_center_id.or(warehouse.cost_center_id),
                self.clock.now(),
            )
            .await?;

        scope.commit().await?;
        Ok(movement_id)
    }

    async fn try_transfer(
        &self,
        tenant_id: TenantId,
        mut plan: TransferPlan,
    ) -> Result<TransferOutcome, StockError> {
        let scope = TenantScope::begin(&self.db, tenant_id, self.lock_timeout_ms).await?;
        let txn = scope.transaction();

        let source = find_warehouse(txn, tenant_id, plan.outbound.key.warehouse_id).await?;
        let destination = find_warehouse(txn, tenant_id, plan.inbound.key.warehouse_id).await?;
        let item = find_item(txn, tenant_id, plan.outbound.key.item_id).await?;
        item.ensure_tracking()?;

        let seed = item.seed();
        let keys: Vec<_> = plan.lock_order.iter().map(|key| (*key, seed)).collect();
        let mutator = BalanceMutator::new(txn);
        let mut locked = mutator.lock_in_order(&keys).await?;
        let out_idx = position_of(&locked, &plan.outbound.key)?;
        let in_idx = position_of(&locked, &plan.inbound.key)?;

        let recorder = MovementRecorder::new(txn);
        let now = self.clock.now();

        let source_before = mutator
            .apply_delta(
                &mut locked[out_idx],
                plan.outbound.qty_delta,
                item.allow_negative_stock,
                &plan.outbound.pricing,
                plan.outbound.occurred_at,
            )
            .await?;
        let out_id = recorder
            .record(
                &plan.outbound,
                plan.outbound.recorded_unit_cost(&source_before),
                plan.outbound.meta.cost_center_id.or(source.cost_center_id),
                now,
            )
            .await?;

        plan.price_inbound(&source_before);

        let destination_before = mutator
            .apply_delta(
                &mut locked[in_idx],
                plan.inbound.qty_delta,
                item.allow_negative_stock,
                &plan.inbound.pricing,
                plan.inbound.occurred_at,
            )
            .await?;
        let in_id = recorder
            .record(
                &plan.inbound,
                plan.inbound.recorded_unit_cost(&destination_before),
                plan.inbound.meta.cost_center_id.or(destination.cost_center_id),
                now,
            )
            .await?;

        scope.commit().await?;

        info!(
            tenant_id = %tenant_id,
            item_id = %plan.outbound.key.item_id,
            from_warehouse_id = %plan.outbound.key.warehouse_id,
            to_warehouse_id = %plan.inbound.key.warehouse_id,
            quantity = %plan.inbound.qty_delta,
            out_id = %out_id,
            in_id = %in_id,
            reference_no = %plan.outbound.reference_no,
            "stock transfer committed"
        );

        Ok(TransferOutcome {
            out_id,
            in_id,
            reference_no: plan.outbound.reference_no,
        })
    }

    async fn try_update_adjustment(
        &self,
        tenant_id: TenantId,
        input: &UpdateAdjustmentInput,
    ) -> Result<MovementId, StockError> {
        let scope = TenantScope::begin(&self.db, tenant_id, self.lock_timeout_ms).await?;
        let txn = scope.transaction();
        let recorder = MovementRecorder::new(txn);

        let stored = recorder
            .lock_live_adjustment(tenant_id, input.movement_id)
            .await?
            .ok_or(InventoryError::AdjustmentNotFound(input.movement_id))?;
        let existing = existing_adjustment(&stored);

        let now = self.clock.now();
        let plan = StockService::plan_adjustment_edit(tenant_id, &existing, &input.adjustment, now)?;

        let old_item = find_item_for_reversal(txn, tenant_id, existing.key.item_id).await?;
        let (warehouse, new_item) = resolve_stock_target(
            txn,
            tenant_id,
            plan.replacement.key.warehouse_id,
            plan.replacement.key.item_id,
        )
        .await?;

        let keys: Vec<_> = plan
            .lock_order
            .iter()
            .map(|key| {
                let seed = if *key == plan.replacement.key {
                    new_item.seed()
                } else {
                    old_item.seed()
                };
                (*key, seed)
            })
            .collect();

        let mutator = BalanceMutator::new(txn);
        let mut locked = mutator.lock_in_order(&keys).await?;
        let reverse_idx = position_of(&locked, &plan.reverse_key)?;
        let apply_idx = position_of(&locked, &plan.replacement.key)?;

        mutator
            .apply_delta(
                &mut locked[reverse_idx],
                plan.reverse_delta,
                old_item.allow_negative_stock,
                &Pricing::default(),
                now,
            )
            .await?;
        let before = mutator
            .apply_delta(
                &mut locked[apply_idx],
                plan.replacement.qty_delta,
                new_item.allow_negative_stock,
                &plan.replacement.pricing,
                plan.replacement.occurred_at,
            )
            .await?;

        recorder
            .rewrite_adjustment(
                stored,
                &plan.replacement,
                plan.replacement.recorded_unit_cost(&before),
                plan.replacement.meta.cost_center_id.or(warehouse.cost_center_id),
                now,
            )
            .await?;

        scope.commit().await?;

        info!(
            tenant_id = %tenant_id,
            movement_id = %input.movement_id,
            old_delta = %existing.qty_delta,
            new_delta = %plan.replacement.qty_delta,
            item_id = %plan.replacement.key.item_id,
            warehouse_id = %plan.replacement.key.warehouse_id,
            "adjustment updated"
        );

        Ok(input.movement_id)
    }

    async fn try_delete_adjustment(
        &self,
        tenant_id: TenantId,
        input: DeleteAdjustmentInput,
    ) -> Result<MovementId, StockError> {
        let scope = TenantScope::begin(&self.db, tenant_id, self.lock_timeout_ms).await?;
        let txn = scope.transaction();
        let recorder = MovementRecorder::new(txn);

        let stored = recorder
            .lock_live_adjustment(tenant_id, input.movement_id)
            .await?
            .ok_or(InventoryError::AdjustmentNotFound(input.movement_id))?;
        let key = movement_key(&stored);
        let qty_delta = stored.qty_delta;

        let item = find_item_for_reversal(txn, tenant_id, key.item_id).await?;
        let now = self.clock.now();

        let mutator = BalanceMutator::new(txn);
        let mut balance = mutator.lock(&key, &item.seed()).await?;
        mutator
            .apply_delta(
                &mut balance,
                -qty_delta,
                item.allow_negative_stock,
                &Pricing::default(),
                now,
            )
            .await?;

        recorder.soft_delete(stored, input.user_id, now).await?;
        scope.commit().await?;

        info!(
            tenant_id = %tenant_id,
            movement_id = %input.movement_id,
            item_id = %key.item_id,
            warehouse_id = %key.warehouse_id,
            reversed_delta = %qty_delta,
            "adjustment deleted"
        );

        Ok(input.movement_id)
    }
}

/// Warns on policy rejections; other failures are left to the caller.
fn log_rejection(operation: &'static str, tenant_id: TenantId, err: &StockError) {
    if let Some(inventory) = err.as_inventory() {
        if inventory.class() == ErrorClass::Policy {
            warn!(
                operation,
                tenant_id = %tenant_id,
                code = inventory.code(),
                error = %inventory,
                "stock operation rejected"
            );
        }
    }
}
