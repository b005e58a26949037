//! Ledger reporter: read-only snapshot, ledger, and drift views.
//!
//! Reads take no row locks. Running balances are recomputed from the
//! movement ledger with a window function partitioned by balance key and
//! ordered by `(occurred_at, id)`; date filters are applied outside the
//! window so every running balance includes all earlier history.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DbBackend, FromQueryResult, Statement, Value};
use serde::{Deserialize, Serialize};
use stockledger_core::inventory::{MovementType as DomainMovementType, StockStatus};
use stockledger_shared::types::{
    BalanceId, ItemId, LocationId, MovementId, PageRequest, PageResponse, TenantId, UserId,
    VariantId, WarehouseId,
};
use stockledger_shared::InventoryConfig;
use uuid::Uuid;

use super::error::StockError;
use crate::entities::sea_orm_active_enums::MovementType;
use crate::tenant::TenantScope;

const SNAPSHOT_SQL: &str = r"
SELECT
    b.id AS balance_id,
    b.item_id,
    i.sku,
    i.name AS item_name,
    b.warehouse_id,
    w.code AS warehouse_code,
    w.name AS warehouse_name,
    b.variant_id,
    b.location_id,
    b.quantity_on_hand,
    b.average_cost,
    b.last_cost,
    b.selling_price,
    i.min_stock,
    i.max_stock,
    b.last_movement_at
FROM stock_balances b
JOIN items i ON i.id = b.item_id
JOIN warehouses w ON w.id = b.warehouse_id
WHERE b.tenant_id = $1
  AND ($2::UUID IS NULL OR b.warehouse_id = $2)
  AND ($3::UUID IS NULL OR b.item_id = $3)
  AND ($4::TEXT IS NULL OR i.sku ILIKE $4 OR i.name ILIKE $4 OR w.code ILIKE $4)
ORDER BY w.code, i.sku, b.variant_id NULLS FIRST, b.location_id NULLS FIRST
";

const LEDGER_SQL: &str = r"
WITH ledger AS (
    SELECT
        m.*,
        SUM(m.qty_delta) OVER (
            PARTITION BY m.item_id, m.warehouse_id, m.variant_id, m.location_id
            ORDER BY m.occurred_at, m.id
            ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW
        ) AS running_balance
    FROM stock_movements m
    WHERE m.tenant_id = $1
      AND m.deleted_at IS NULL
      AND ($2::UUID IS NULL OR m.warehouse_id = $2)
      AND ($3::UUID IS NULL OR m.item_id = $3)
)
SELECT
    l.id,
    l.movement_type,
    l.item_id,
    i.sku,
    i.name AS item_name,
    l.warehouse_id,
    w.code AS warehouse_code,
    l.variant_id,
    l.location_id,
    l.qty_delta,
    l.unit_cost,
    l.unit_price,
    l.reference_type,
    l.reference_id,
    l.reference_no,
    l.notes,
    l.occurred_at,
    l.created_by,
    l.running_balance
FROM ledger l
JOIN items i ON i.id = l.item_id
JOIN warehouses w ON w.id = l.warehouse_id
WHERE ($4::TIMESTAMPTZ IS NULL OR l.occurred_at >= $4)
  AND ($5::TIMESTAMPTZ IS NULL OR l.occurred_at < $5)
ORDER BY l.occurred_at DESC, l.id DESC
LIMIT $6 OFFSET $7
";

const LEDGER_COUNT_SQL: &str = r"
SELECT COUNT(*) AS total
FROM stock_movements m
WHERE m.tenant_id = $1
  AND m.deleted_at IS NULL
  AND ($2::UUID IS NULL OR m.warehouse_id = $2)
  AND ($3::UUID IS NULL OR m.item_id = $3)
  AND ($4::TIMESTAMPTZ IS NULL OR m.occurred_at >= $4)
  AND ($5::TIMESTAMPTZ IS NULL OR m.occurred_at < $5)
";

const DRIFT_SQL: &str = r"
SELECT
    b.id AS balance_id,
    b.item_id,
    b.warehouse_id,
    b.variant_id,
    b.location_id,
    b.quantity_on_hand,
    COALESCE(SUM(m.qty_delta), 0) AS ledger_quantity
FROM stock_balances b
LEFT JOIN stock_movements m
    ON m.tenant_id = b.tenant_id
   AND m.item_id = b.item_id
   AND m.warehouse_id = b.warehouse_id
   AND m.variant_id IS NOT DISTINCT FROM b.variant_id
   AND m.location_id IS NOT DISTINCT FROM b.location_id
   AND m.deleted_at IS NULL
WHERE b.tenant_id = $1
GROUP BY b.id
HAVING b.quantity_on_hand <> COALESCE(SUM(m.qty_delta), 0)
ORDER BY b.id
";

/// Filter for the snapshot view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFilter {
    /// Only this warehouse.
    pub warehouse_id: Option<WarehouseId>,
    /// Only this item.
    pub item_id: Option<ItemId>,
    /// Case-insensitive substring of item sku, item name, or warehouse code.
    pub search: Option<String>,
}

/// Filter for the ledger view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFilter {
    /// Only this warehouse.
    pub warehouse_id: Option<WarehouseId>,
    /// Only this item.
    pub item_id: Option<ItemId>,
    /// First day to include.
    pub date_from: Option<NaiveDate>,
    /// Last day to include.
    pub date_to: Option<NaiveDate>,
}

/// One balance in the snapshot view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRow {
    /// Balance row id.
    pub balance_id: BalanceId,
    /// Item.
    pub item_id: ItemId,
    /// Item sku.
    pub sku: String,
    /// Item name.
    pub item_name: String,
    /// Warehouse.
    pub warehouse_id: WarehouseId,
    /// Warehouse code.
    pub warehouse_code: String,
    /// Warehouse name.
    pub warehouse_name: String,
    /// Variant dimension.
    pub variant_id: Option<VariantId>,
    /// Location dimension.
    pub location_id: Option<LocationId>,
    /// Quantity on hand.
    pub quantity: Decimal,
    /// Weighted-average cost.
    pub average_cost: Decimal,
    /// Last inflow cost.
    pub last_cost: Decimal,
    /// Selling price.
    pub selling_price: Decimal,
    /// Minimum stock threshold.
    pub min_stock: Option<Decimal>,
    /// Maximum stock threshold.
    pub max_stock: Option<Decimal>,
    /// Derived stock status.
    pub status: StockStatus,
    /// Timestamp of the latest movement.
    pub last_movement_at: Option<DateTime<Utc>>,
}

/// One movement in the ledger view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Movement id.
    pub movement_id: MovementId,
    /// Movement type.
    pub movement_type: DomainMovementType,
    /// Item.
    pub item_id: ItemId,
    /// Item sku.
    pub sku: String,
    /// Item name.
    pub item_name: String,
    /// Warehouse.
    pub warehouse_id: WarehouseId,
    /// Warehouse code.
    pub warehouse_code: String,
    /// Variant dimension.
    pub variant_id: Option<VariantId>,
    /// Location dimension.
    pub location_id: Option<LocationId>,
    /// Signed quantity delta.
    pub qty_delta: Decimal,
    /// Recorded unit cost.
    pub unit_cost: Option<Decimal>,
    /// Recorded unit price.
    pub unit_price: Option<Decimal>,
    /// Source document kind.
    pub reference_type: Option<String>,
    /// Source document id.
    pub reference_id: Option<Uuid>,
    /// Reference number.
    pub reference_no: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Effective timestamp.
    pub occurred_at: DateTime<Utc>,
    /// Creating user.
    pub created_by: Option<UserId>,
    /// Quantity at this key after this movement.
    pub running_balance: Decimal,
}

/// A balance whose quantity disagrees with its ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftRow {
    /// Balance row id.
    pub balance_id: BalanceId,
    /// Item.
    pub item_id: ItemId,
    /// Warehouse.
    pub warehouse_id: WarehouseId,
    /// Variant dimension.
    pub variant_id: Option<VariantId>,
    /// Location dimension.
    pub location_id: Option<LocationId>,
    /// Quantity stored on the balance row.
    pub balance_quantity: Decimal,
    /// Sum of live movement deltas for the key.
    pub ledger_quantity: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct SnapshotRecord {
    balance_id: Uuid,
    item_id: Uuid,
    sku: String,
    item_name: String,
    warehouse_id: Uuid,
    warehouse_code: String,
    warehouse_name: String,
    variant_id: Option<Uuid>,
    location_id: Option<Uuid>,
    quantity_on_hand: Decimal,
    average_cost: Decimal,
    last_cost: Decimal,
    selling_price: Decimal,
    min_stock: Option<Decimal>,
    max_stock: Option<Decimal>,
    last_movement_at: Option<DateTime<FixedOffset>>,
}

impl From<SnapshotRecord> for SnapshotRow {
    fn from(r: SnapshotRecord) -> Self {
        Self {
            balance_id: BalanceId::from_uuid(r.balance_id),
            item_id: ItemId::from_uuid(r.item_id),
            sku: r.sku,
            item_name: r.item_name,
            warehouse_id: WarehouseId::from_uuid(r.warehouse_id),
            warehouse_code: r.warehouse_code,
            warehouse_name: r.warehouse_name,
            variant_id: r.variant_id.map(VariantId::from_uuid),
            location_id: r.location_id.map(LocationId::from_uuid),
            status: StockStatus::classify(r.quantity_on_hand, r.min_stock),
            quantity: r.quantity_on_hand,
            average_cost: r.average_cost,
            last_cost: r.last_cost,
            selling_price: r.selling_price,
            min_stock: r.min_stock,
            max_stock: r.max_stock,
            last_movement_at: r.last_movement_at.map(|at| at.with_timezone(&Utc)),
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct LedgerRecord {
    id: Uuid,
    movement_type: MovementType,
    item_id: Uuid,
    sku: String,
    item_name: String,
    warehouse_id: Uuid,
    warehouse_code: String,
    variant_id: Option<Uuid>,
    location_id: Option<Uuid>,
    qty_delta: Decimal,
    unit_cost: Option<Decimal>,
    unit_price: Option<Decimal>,
    reference_type: Option<String>,
    reference_id: Option<Uuid>,
    reference_no: Option<String>,
    notes: Option<String>,
    occurred_at: DateTime<FixedOffset>,
    created_by: Option<Uuid>,
    running_balance: Decimal,
}

impl From<LedgerRecord> for LedgerRow {
    fn from(r: LedgerRecord) -> Self {
        Self {
            movement_id: MovementId::from_uuid(r.id),
            movement_type: r.movement_type.into(),
            item_id: ItemId::from_uuid(r.item_id),
            sku: r.sku,
            item_name: r.item_name,
            warehouse_id: WarehouseId::from_uuid(r.warehouse_id),
            warehouse_code: r.warehouse_code,
            variant_id: r.variant_id.map(VariantId::from_uuid),
            location_id: r.location_id.map(LocationId::from_uuid),
            qty_delta: r.qty_delta,
            unit_cost: r.unit_cost,
            unit_price: r.unit_price,
            reference_type: r.reference_type,
            reference_id: r.reference_id,
            reference_no: r.reference_no,
            notes: r.notes,
            occurred_at: r.occurred_at.with_timezone(&Utc),
            created_by: r.created_by.map(UserId::from_uuid),
            running_balance: r.running_balance,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRecord {
    total: i64,
}

#[derive(Debug, FromQueryResult)]
struct DriftRecord {
    balance_id: Uuid,
    item_id: Uuid,
    warehouse_id: Uuid,
    variant_id: Option<Uuid>,
    location_id: Option<Uuid>,
    quantity_on_hand: Decimal,
    ledger_quantity: Decimal,
}

impl From<DriftRecord> for DriftRow {
    fn from(r: DriftRecord) -> Self {
        Self {
            balance_id: BalanceId::from_uuid(r.balance_id),
            item_id: ItemId::from_uuid(r.item_id),
            warehouse_id: WarehouseId::from_uuid(r.warehouse_id),
            variant_id: r.variant_id.map(VariantId::from_uuid),
            location_id: r.location_id.map(LocationId::from_uuid),
            balance_quantity: r.quantity_on_hand,
            ledger_quantity: r.ledger_quantity,
        }
    }
}

/// Ledger reporter for snapshot, ledger, and drift queries.
#[derive(Debug, Clone)]
pub struct LedgerReportRepository {
    db: DatabaseConnection,
    config: InventoryConfig,
}

impl LedgerReportRepository {
    /// Creates a reporter with default page sizes.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_config(db, InventoryConfig::default())
    }

    /// Creates a reporter with the given page sizes.
    #[must_use]
    pub const fn with_config(db: DatabaseConnection, config: InventoryConfig) -> Self {
        Self { db, config }
    }

    /// Returns one row per balance key with derived stock status.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn get_snapshot(
        &self,
        tenant_id: TenantId,
        filter: &SnapshotFilter,
    ) -> Result<Vec<SnapshotRow>, StockError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            SNAPSHOT_SQL,
            vec![
                tenant_id.into_inner().into(),
                filter.warehouse_id.map(Uuid::from).into(),
                filter.item_id.map(Uuid::from).into(),
                filter.search.as_deref().and_then(like_pattern).into(),
            ],
        );

        let scope = TenantScope::begin(&self.db, tenant_id, 0).await?;
        let records = SnapshotRecord::find_by_statement(stmt)
            .all(scope.transaction())
            .await?;
        scope.commit().await?;

        Ok(records.into_iter().map(SnapshotRow::from).collect())
    }

    /// Returns movements newest first with their running balances.
    ///
    /// `page.per_page` is clamped to the configured maximum. `date_to` is
    /// inclusive.
    ///
    /// # Errors
    ///
    /// Returns a database error if a query fails.
    pub async fn get_ledger(
        &self,
        tenant_id: TenantId,
        filter: &LedgerFilter,
        page: Option<PageRequest>,
    ) -> Result<PageResponse<LedgerRow>, StockError> {
        let page = page
            .unwrap_or_else(|| PageRequest::new(1, self.config.ledger_page_size))
            .clamped(self.config.ledger_max_page_size);
        let (from, until) = date_bounds(filter.date_from, filter.date_to);

        let filter_values: Vec<Value> = vec![
            tenant_id.into_inner().into(),
            filter.warehouse_id.map(Uuid::from).into(),
            filter.item_id.map(Uuid::from).into(),
            from.into(),
            until.into(),
        ];

        let mut page_values = filter_values.clone();
        page_values.push(i64::try_from(page.limit()).unwrap_or(i64::MAX).into());
        page_values.push(i64::try_from(page.offset()).unwrap_or(i64::MAX).into());

        let scope = TenantScope::begin(&self.db, tenant_id, 0).await?;
        let txn = scope.transaction();

        let total = CountRecord::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            LEDGER_COUNT_SQL,
            filter_values,
        ))
        .one(txn)
        .await?
        .map_or(0, |c| u64::try_from(c.total).unwrap_or(0));

        let records = LedgerRecord::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            LEDGER_SQL,
            page_values,
        ))
        .all(txn)
        .await?;

        scope.commit().await?;

        let rows = records.into_iter().map(LedgerRow::from).collect();
        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }

    /// Returns every balance whose quantity differs from the sum of its live
    /// movement deltas. Empty when the books agree.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn find_drift(&self, tenant_id: TenantId) -> Result<Vec<DriftRow>, StockError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            DRIFT_SQL,
            vec![tenant_id.into_inner().into()],
        );

        let scope = TenantScope::begin(&self.db, tenant_id, 0).await?;
        let records = DriftRecord::find_by_statement(stmt)
            .all(scope.transaction())
            .await?;
        scope.commit().await?;

        Ok(records.into_iter().map(DriftRow::from).collect())
    }
}

/// Builds an `ILIKE` pattern matching `search` as a literal substring.
/// Blank input disables the filter.
fn like_pattern(search: &str) -> Option<String> {
    let trimmed = search.trim();
    if trimmed.is_empty() {
        return None;
    }

    let escaped = trimmed
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{escaped}%"))
}

/// Converts an inclusive day range into `[from, until)` instants in UTC.
fn date_bounds(
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let start_of = |day: NaiveDate| day.and_time(NaiveTime::MIN).and_utc();
    (
        date_from.map(start_of),
        date_to.and_then(|day| day.succ_opt()).map(start_of),
    )
}
