//! Integration tests for the inventory façade and ledger reporter.
//!
//! These tests verify that:
//! - Balances follow weighted-average costing and the negative-stock gate
//! - Transfers are all-or-nothing
//! - Adjustment edits and deletes reverse correctly
//! - The ledger's running balance agrees with the snapshot and no drift appears

#![allow(clippy::too_many_lines)]

mod common;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stockledger_core::inventory::{
    AdjustmentInput, DeleteAdjustmentInput, InventoryError, IssueInput, MovementMeta,
    MovementType, ReceiptInput, ReturnDirection, ReturnInput, StockStatus, StockTarget,
    TransferInput, UpdateAdjustmentInput,
};
use stockledger_db::entities::sea_orm_active_enums::MovementType as DbMovementType;
use stockledger_db::{
    InventoryRepository, LedgerFilter, LedgerReportRepository, SnapshotFilter, StockError,
};
use stockledger_shared::types::{PageRequest, TenantId, WarehouseId};

use common::{Fixture, ItemOptions};

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap()
}

fn meta_at(occurred_at: DateTime<Utc>) -> MovementMeta {
    MovementMeta {
        occurred_at: Some(occurred_at),
        ..MovementMeta::default()
    }
}

fn receipt(fixture: &Fixture, warehouse_id: WarehouseId, qty: Decimal, cost: Decimal) -> ReceiptInput {
    ReceiptInput {
        target: StockTarget::new(fixture.item_id, warehouse_id),
        quantity: qty,
        unit_cost: Some(cost),
        unit_price: None,
        meta: MovementMeta::default(),
    }
}

fn issue(fixture: &Fixture, warehouse_id: WarehouseId, qty: Decimal) -> IssueInput {
    IssueInput {
        target: StockTarget::new(fixture.item_id, warehouse_id),
        quantity: qty,
        unit_price: None,
        meta: MovementMeta::default(),
    }
}

fn adjustment(fixture: &Fixture, warehouse_id: WarehouseId, delta: Decimal) -> AdjustmentInput {
    AdjustmentInput {
        target: StockTarget::new(fixture.item_id, warehouse_id),
        qty_delta: delta,
        unit_cost: None,
        unit_price: None,
        meta: MovementMeta::default(),
    }
}

fn transfer(fixture: &Fixture, qty: Decimal, unit_cost: Option<Decimal>) -> TransferInput {
    TransferInput {
        item_id: fixture.item_id,
        variant_id: None,
        from_warehouse_id: fixture.main_warehouse,
        from_location_id: None,
        to_warehouse_id: fixture.second_warehouse,
        to_location_id: None,
        quantity: qty,
        unit_cost,
        meta: MovementMeta::default(),
    }
}

fn is_negative_stock(err: &StockError) -> bool {
    matches!(
        err,
        StockError::Inventory(InventoryError::NegativeStockNotAllowed { .. })
    )
}

// ============================================================================
// Receipts, issues, returns
// ============================================================================

#[tokio::test]
async fn test_receipts_blend_weighted_average() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = match common::setup(&db).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Skipping test - setup failed: {e}");
            return;
        }
    };
    let repo = InventoryRepository::new(db.clone());
    let main = fixture.main_warehouse;

    repo.create_receipt(fixture.tenant_id, receipt(&fixture, main, dec!(10), dec!(5)))
        .await
        .expect("first receipt");
    repo.create_receipt(fixture.tenant_id, receipt(&fixture, main, dec!(10), dec!(7)))
        .await
        .expect("second receipt");

    let balance = common::balance(&db, &fixture, main).await.unwrap().unwrap();
    assert_eq!(balance.quantity_on_hand, dec!(20));
    assert_eq!(balance.average_cost, dec!(6));
    assert_eq!(balance.last_cost, dec!(7));

    let drift = LedgerReportRepository::new(db.clone())
        .find_drift(fixture.tenant_id)
        .await
        .unwrap();
    assert!(drift.is_empty());

    common::cleanup(&db, fixture.tenant_id).await.unwrap();
}

#[tokio::test]
async fn test_issue_rejected_without_negative_permission() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = match common::setup(&db).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Skipping test - setup failed: {e}");
            return;
        }
    };
    let repo = InventoryRepository::new(db.clone());
    let main = fixture.main_warehouse;

    let err = repo
        .create_issue(fixture.tenant_id, issue(&fixture, main, dec!(5)))
        .await
        .unwrap_err();
    assert!(is_negative_stock(&err), "unexpected error: {err}");
    assert_eq!(err.code(), "NEGATIVE_STOCK_NOT_ALLOWED");

    // Nothing persisted, not even the lazily created balance row.
    assert!(common::balance(&db, &fixture, main).await.unwrap().is_none());
    assert!(common::movements(&db, fixture.tenant_id).await.unwrap().is_empty());

    repo.create_receipt(fixture.tenant_id, receipt(&fixture, main, dec!(3), dec!(2)))
        .await
        .unwrap();
    let err = repo
        .create_issue(fixture.tenant_id, issue(&fixture, main, dec!(3.0001)))
        .await
        .unwrap_err();
    assert!(is_negative_stock(&err));

    repo.create_issue(fixture.tenant_id, issue(&fixture, main, dec!(3)))
        .await
        .expect("issue down to zero");
    assert_eq!(common::quantity(&db, &fixture, main).await.unwrap(), Decimal::ZERO);

    common::cleanup(&db, fixture.tenant_id).await.unwrap();
}

#[tokio::test]
async fn test_issue_allowed_with_negative_permission() {
    let Some(db) = common::connect().await else {
        return;
    };
    let options = ItemOptions {
        allow_negative_stock: true,
        ..ItemOptions::default()
    };
    let fixture = match common::setup_with(&db, options).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Skipping test - setup failed: {e}");
            return;
        }
    };
    let repo = InventoryRepository::new(db.clone());

    repo.create_issue(fixture.tenant_id, issue(&fixture, fixture.main_warehouse, dec!(5)))
        .await
        .expect("negative stock allowed");
    assert_eq!(
        common::quantity(&db, &fixture, fixture.main_warehouse).await.unwrap(),
        dec!(-5)
    );

    common::cleanup(&db, fixture.tenant_id).await.unwrap();
}

#[tokio::test]
async fn test_outflows_record_average_cost_and_keep_it() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = match common::setup(&db).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Skipping test - setup failed: {e}");
            return;
        }
    };
    let repo = InventoryRepository::new(db.clone());
    let main = fixture.main_warehouse;

    repo.create_receipt(fixture.tenant_id, receipt(&fixture, main, dec!(10), dec!(4)))
        .await
        .unwrap();
    let issue_id = repo
        .create_issue(fixture.tenant_id, issue(&fixture, main, dec!(3)))
        .await
        .unwrap();

    let movement = repo
        .get_movement(fixture.tenant_id, issue_id)
        .await
        .unwrap()
        .expect("issue recorded");
    assert_eq!(movement.movement_type, DbMovementType::Issue);
    assert_eq!(movement.qty_delta, dec!(-3));
    assert_eq!(movement.unit_cost, Some(dec!(4)));
    assert!(movement.reference_no.as_deref().unwrap_or_default().starts_with("ISS-"));

    let return_out = ReturnInput {
        target: StockTarget::new(fixture.item_id, main),
        quantity: dec!(2),
        direction: ReturnDirection::Out,
        unit_cost: None,
        unit_price: None,
        meta: MovementMeta::default(),
    };
    repo.create_return(fixture.tenant_id, return_out).await.unwrap();

    let balance = common::balance(&db, &fixture, main).await.unwrap().unwrap();
    assert_eq!(balance.quantity_on_hand, dec!(5));
    assert_eq!(balance.average_cost, dec!(4));

    let return_in = ReturnInput {
        target: StockTarget::new(fixture.item_id, main),
        quantity: dec!(5),
        direction: ReturnDirection::In,
        unit_cost: Some(dec!(6)),
        unit_price: None,
        meta: MovementMeta::default(),
    };
    repo.create_return(fixture.tenant_id, return_in).await.unwrap();

    let balance = common::balance(&db, &fixture, main).await.unwrap().unwrap();
    assert_eq!(balance.quantity_on_hand, dec!(10));
    assert_eq!(balance.average_cost, dec!(5));

    common::cleanup(&db, fixture.tenant_id).await.unwrap();
}

#[tokio::test]
async fn test_item_not_tracking_rejected() {
    let Some(db) = common::connect().await else {
        return;
    };
    let options = ItemOptions {
        untracked: true,
        ..ItemOptions::default()
    };
    let fixture = match common::setup_with(&db, options).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Skipping test - setup failed: {e}");
            return;
        }
    };
    let repo = InventoryRepository::new(db.clone());

    let err = repo
        .create_receipt(
            fixture.tenant_id,
            receipt(&fixture, fixture.main_warehouse, dec!(1), dec!(1)),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StockError::Inventory(InventoryError::ItemNotTracking(id)) if id == fixture.item_id
    ));

    common::cleanup(&db, fixture.tenant_id).await.unwrap();
}

#[tokio::test]
async fn test_master_data_of_other_tenant_is_not_found() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = match common::setup(&db).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Skipping test - setup failed: {e}");
            return;
        }
    };
    let repo = InventoryRepository::new(db.clone());
    let intruder = TenantId::new();

    let err = repo
        .create_receipt(intruder, receipt(&fixture, fixture.main_warehouse, dec!(1), dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StockError::Inventory(InventoryError::WarehouseNotFound(_))
    ));

    let own_warehouse = common::insert_warehouse(&db, intruder, "OWN").await.unwrap();
    let err = repo
        .create_receipt(intruder, receipt(&fixture, own_warehouse, dec!(1), dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StockError::Inventory(InventoryError::ItemNotFound(_))
    ));

    common::cleanup(&db, intruder).await.unwrap();
    common::cleanup(&db, fixture.tenant_id).await.unwrap();
}

// ============================================================================
// Transfers
// ============================================================================

#[tokio::test]
async fn test_transfer_moves_stock_at_source_cost() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = match common::setup(&db).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Skipping test - setup failed: {e}");
            return;
        }
    };
    let repo = InventoryRepository::new(db.clone());

    repo.create_receipt(
        fixture.tenant_id,
        receipt(&fixture, fixture.main_warehouse, dec!(20), dec!(5)),
    )
    .await
    .unwrap();

    let outcome = repo
        .create_transfer(fixture.tenant_id, transfer(&fixture, dec!(8), None))
        .await
        .expect("transfer");
    assert!(outcome.reference_no.starts_with("TRF-"));

    let source = common::balance(&db, &fixture, fixture.main_warehouse).await.unwrap().unwrap();
    let destination = common::balance(&db, &fixture, fixture.second_warehouse)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(source.quantity_on_hand, dec!(12));
    assert_eq!(source.average_cost, dec!(5));
    assert_eq!(destination.quantity_on_hand, dec!(8));
    assert_eq!(destination.average_cost, dec!(5));

    let out = repo.get_movement(fixture.tenant_id, outcome.out_id).await.unwrap().unwrap();
    let inbound = repo.get_movement(fixture.tenant_id, outcome.in_id).await.unwrap().unwrap();
    assert_eq!(out.movement_type, DbMovementType::TransferOut);
    assert_eq!(inbound.movement_type, DbMovementType::TransferIn);
    assert_eq!(out.qty_delta, dec!(-8));
    assert_eq!(inbound.qty_delta, dec!(8));
    assert_eq!(out.reference_no, inbound.reference_no);
    assert_eq!(out.occurred_at, inbound.occurred_at);

    common::cleanup(&db, fixture.tenant_id).await.unwrap();
}

#[tokio::test]
async fn test_transfer_is_all_or_nothing() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = match common::setup(&db).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Skipping test - setup failed: {e}");
            return;
        }
    };
    let repo = InventoryRepository::new(db.clone());

    repo.create_receipt(
        fixture.tenant_id,
        receipt(&fixture, fixture.main_warehouse, dec!(20), dec!(5)),
    )
    .await
    .unwrap();

    // Outbound leg fails the negative-stock gate.
    let err = repo
        .create_transfer(fixture.tenant_id, transfer(&fixture, dec!(25), None))
        .await
        .unwrap_err();
    assert!(is_negative_stock(&err));

    // A cost too large for the cost columns never reaches the database.
    let err = repo
        .create_transfer(
            fixture.tenant_id,
            transfer(&fixture, dec!(5), Some(dec!(100000000000000))),
        )
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            StockError::Inventory(InventoryError::OutOfRange {
                field: "unit_cost",
                ..
            })
        ),
        "unexpected error: {err}"
    );

    // Outbound balance update succeeds in-transaction, then the movement
    // insert overflows reference_no. The whole transfer must roll back.
    let rollback_ref = format!("TRF-{}", "X".repeat(120));
    let mut failing = transfer(&fixture, dec!(5), None);
    failing.meta.reference_no = Some(rollback_ref.clone());
    let err = repo
        .create_transfer(fixture.tenant_id, failing)
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::Database(_)), "unexpected error: {err}");

    assert_eq!(
        common::quantity(&db, &fixture, fixture.main_warehouse).await.unwrap(),
        dec!(20)
    );
    assert_eq!(
        common::quantity(&db, &fixture, fixture.second_warehouse).await.unwrap(),
        Decimal::ZERO
    );

    let movements = common::movements(&db, fixture.tenant_id).await.unwrap();
    assert_eq!(movements.len(), 1);
    assert!(
        movements
            .iter()
            .all(|m| m.reference_no.as_deref() != Some(rollback_ref.as_str()))
    );

    let same = TransferInput {
        to_warehouse_id: fixture.main_warehouse,
        ..transfer(&fixture, dec!(1), None)
    };
    let err = repo.create_transfer(fixture.tenant_id, same).await.unwrap_err();
    assert!(matches!(
        err,
        StockError::Inventory(InventoryError::SameWarehouse)
    ));

    common::cleanup(&db, fixture.tenant_id).await.unwrap();
}

// ============================================================================
// Adjustments
// ============================================================================

#[tokio::test]
async fn test_adjustment_edit_revalidates_negative_stock() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = match common::setup(&db).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Skipping test - setup failed: {e}");
            return;
        }
    };
    let repo = InventoryRepository::new(db.clone());
    let main = fixture.main_warehouse;

    let id = repo
        .create_adjustment(fixture.tenant_id, adjustment(&fixture, main, dec!(5)))
        .await
        .unwrap();
    assert_eq!(common::quantity(&db, &fixture, main).await.unwrap(), dec!(5));

    let err = repo
        .update_adjustment(
            fixture.tenant_id,
            UpdateAdjustmentInput {
                movement_id: id,
                adjustment: adjustment(&fixture, main, dec!(-2)),
            },
        )
        .await
        .unwrap_err();
    assert!(is_negative_stock(&err));
    assert_eq!(common::quantity(&db, &fixture, main).await.unwrap(), dec!(5));

    repo.update_adjustment(
        fixture.tenant_id,
        UpdateAdjustmentInput {
            movement_id: id,
            adjustment: adjustment(&fixture, main, dec!(3)),
        },
    )
    .await
    .expect("edit to +3");
    assert_eq!(common::quantity(&db, &fixture, main).await.unwrap(), dec!(3));

    let stored = repo.get_movement(fixture.tenant_id, id).await.unwrap().unwrap();
    assert_eq!(stored.qty_delta, dec!(3));
    assert!(stored.reference_no.as_deref().unwrap_or_default().starts_with("ADJ-"));

    common::cleanup(&db, fixture.tenant_id).await.unwrap();
}

#[tokio::test]
async fn test_adjustment_edit_and_delete_with_negative_allowed() {
    let Some(db) = common::connect().await else {
        return;
    };
    let options = ItemOptions {
        allow_negative_stock: true,
        ..ItemOptions::default()
    };
    let fixture = match common::setup_with(&db, options).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Skipping test - setup failed: {e}");
            return;
        }
    };
    let repo = InventoryRepository::new(db.clone());
    let main = fixture.main_warehouse;

    let id = repo
        .create_adjustment(fixture.tenant_id, adjustment(&fixture, main, dec!(5)))
        .await
        .unwrap();
    repo.update_adjustment(
        fixture.tenant_id,
        UpdateAdjustmentInput {
            movement_id: id,
            adjustment: adjustment(&fixture, main, dec!(-2)),
        },
    )
    .await
    .expect("edit to -2");
    assert_eq!(common::quantity(&db, &fixture, main).await.unwrap(), dec!(-2));

    let delete = DeleteAdjustmentInput {
        movement_id: id,
        user_id: None,
    };
    repo.delete_adjustment(fixture.tenant_id, delete).await.expect("delete");
    assert_eq!(common::quantity(&db, &fixture, main).await.unwrap(), Decimal::ZERO);

    let stored = repo.get_movement(fixture.tenant_id, id).await.unwrap().unwrap();
    assert!(stored.deleted_at.is_some());

    let err = repo.delete_adjustment(fixture.tenant_id, delete).await.unwrap_err();
    assert!(matches!(
        err,
        StockError::Inventory(InventoryError::AdjustmentNotFound(missing)) if missing == id
    ));
    assert_eq!(err.code(), "ADJUSTMENT_NOT_FOUND");

    let drift = LedgerReportRepository::new(db.clone())
        .find_drift(fixture.tenant_id)
        .await
        .unwrap();
    assert!(drift.is_empty());

    common::cleanup(&db, fixture.tenant_id).await.unwrap();
}

#[tokio::test]
async fn test_adjustment_edit_can_move_between_warehouses() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = match common::setup(&db).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Skipping test - setup failed: {e}");
            return;
        }
    };
    let repo = InventoryRepository::new(db.clone());

    let id = repo
        .create_adjustment(
            fixture.tenant_id,
            adjustment(&fixture, fixture.main_warehouse, dec!(5)),
        )
        .await
        .unwrap();
    repo.update_adjustment(
        fixture.tenant_id,
        UpdateAdjustmentInput {
            movement_id: id,
            adjustment: adjustment(&fixture, fixture.second_warehouse, dec!(4)),
        },
    )
    .await
    .expect("move adjustment");

    assert_eq!(
        common::quantity(&db, &fixture, fixture.main_warehouse).await.unwrap(),
        Decimal::ZERO
    );
    assert_eq!(
        common::quantity(&db, &fixture, fixture.second_warehouse).await.unwrap(),
        dec!(4)
    );

    common::cleanup(&db, fixture.tenant_id).await.unwrap();
}

#[tokio::test]
async fn test_only_adjustments_can_be_edited() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = match common::setup(&db).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Skipping test - setup failed: {e}");
            return;
        }
    };
    let repo = InventoryRepository::new(db.clone());
    let main = fixture.main_warehouse;

    let receipt_id = repo
        .create_receipt(fixture.tenant_id, receipt(&fixture, main, dec!(5), dec!(1)))
        .await
        .unwrap();

    let err = repo
        .update_adjustment(
            fixture.tenant_id,
            UpdateAdjustmentInput {
                movement_id: receipt_id,
                adjustment: adjustment(&fixture, main, dec!(1)),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StockError::Inventory(InventoryError::AdjustmentNotFound(_))
    ));

    let err = repo
        .delete_adjustment(
            fixture.tenant_id,
            DeleteAdjustmentInput {
                movement_id: receipt_id,
                user_id: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StockError::Inventory(InventoryError::AdjustmentNotFound(_))
    ));
    assert_eq!(common::quantity(&db, &fixture, main).await.unwrap(), dec!(5));

    common::cleanup(&db, fixture.tenant_id).await.unwrap();
}

// ============================================================================
// Ledger reporter
// ============================================================================

#[tokio::test]
async fn test_ledger_running_balance_matches_snapshot() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = match common::setup(&db).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Skipping test - setup failed: {e}");
            return;
        }
    };
    let repo = InventoryRepository::new(db.clone());
    let reporter = LedgerReportRepository::new(db.clone());
    let main = fixture.main_warehouse;

    let mut first = receipt(&fixture, main, dec!(10), dec!(2));
    first.meta = meta_at(at(1, 9));
    let mut issued = issue(&fixture, main, dec!(4));
    issued.meta = meta_at(at(3, 9));
    let mut backdated = receipt(&fixture, main, dec!(6), dec!(2));
    backdated.meta = meta_at(at(2, 9));

    repo.create_receipt(fixture.tenant_id, first).await.unwrap();
    repo.create_issue(fixture.tenant_id, issued).await.unwrap();
    repo.create_receipt(fixture.tenant_id, backdated).await.unwrap();

    let filter = LedgerFilter {
        item_id: Some(fixture.item_id),
        ..LedgerFilter::default()
    };
    let page = reporter
        .get_ledger(fixture.tenant_id, &filter, None)
        .await
        .unwrap();

    assert_eq!(page.meta.total, 3);
    let balances: Vec<Decimal> = page.data.iter().map(|r| r.running_balance).collect();
    assert_eq!(balances, vec![dec!(12), dec!(16), dec!(10)]);
    assert_eq!(page.data[0].movement_type, MovementType::Issue);

    let snapshot = reporter
        .get_snapshot(fixture.tenant_id, &SnapshotFilter::default())
        .await
        .unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].quantity, page.data[0].running_balance);
    assert_eq!(snapshot[0].status, StockStatus::InStock);
    assert_eq!(
        snapshot[0].last_movement_at,
        Some(at(3, 9)),
        "backdated movements never move last_movement_at backwards"
    );

    // Date filters trim rows but keep earlier history in the running balance.
    let from_second = LedgerFilter {
        date_from: NaiveDate::from_ymd_opt(2026, 10, 2),
        ..filter.clone()
    };
    let page = reporter
        .get_ledger(fixture.tenant_id, &from_second, None)
        .await
        .unwrap();
    assert_eq!(page.meta.total, 2);
    assert_eq!(page.data[1].running_balance, dec!(16));

    let until_second = LedgerFilter {
        date_to: NaiveDate::from_ymd_opt(2026, 10, 2),
        ..filter.clone()
    };
    let page = reporter
        .get_ledger(fixture.tenant_id, &until_second, Some(PageRequest::new(1, 1)))
        .await
        .unwrap();
    assert_eq!(page.meta.total, 2);
    assert_eq!(page.meta.total_pages, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].running_balance, dec!(16));

    // Reads are idempotent.
    let again = reporter
        .get_ledger(fixture.tenant_id, &until_second, Some(PageRequest::new(1, 1)))
        .await
        .unwrap();
    assert_eq!(again.data, page.data);

    assert!(reporter.find_drift(fixture.tenant_id).await.unwrap().is_empty());

    common::cleanup(&db, fixture.tenant_id).await.unwrap();
}

#[tokio::test]
async fn test_snapshot_status_and_search() {
    let Some(db) = common::connect().await else {
        return;
    };
    let options = ItemOptions {
        min_stock: Some(dec!(5)),
        ..ItemOptions::default()
    };
    let fixture = match common::setup_with(&db, options).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Skipping test - setup failed: {e}");
            return;
        }
    };
    let repo = InventoryRepository::new(db.clone());
    let reporter = LedgerReportRepository::new(db.clone());

    repo.create_receipt(
        fixture.tenant_id,
        receipt(&fixture, fixture.main_warehouse, dec!(4), dec!(1)),
    )
    .await
    .unwrap();
    repo.create_receipt(
        fixture.tenant_id,
        receipt(&fixture, fixture.second_warehouse, dec!(9), dec!(1)),
    )
    .await
    .unwrap();

    let rows = reporter
        .get_snapshot(
            fixture.tenant_id,
            &SnapshotFilter {
                warehouse_id: Some(fixture.main_warehouse),
                ..SnapshotFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, StockStatus::LowStock);

    let rows = reporter
        .get_snapshot(
            fixture.tenant_id,
            &SnapshotFilter {
                search: Some("second".to_string()),
                ..SnapshotFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].warehouse_code, "SECOND");
    assert_eq!(rows[0].status, StockStatus::InStock);

    let other_tenant = reporter
        .get_snapshot(TenantId::new(), &SnapshotFilter::default())
        .await
        .unwrap();
    assert!(other_tenant.is_empty());

    common::cleanup(&db, fixture.tenant_id).await.unwrap();
}
