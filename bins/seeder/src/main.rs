//! Demo data seeder for Stockledger development.
//!
//! Seeds a demo tenant with two warehouses and a handful of items, then runs
//! a short movement history through the inventory façade so the snapshot
//! and ledger views have something to show. Safe to re-run: master data is
//! created once, movements are appended on every run.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use stockledger_core::inventory::{
    AdjustmentInput, IssueInput, MovementMeta, ReceiptInput, ReturnDirection, ReturnInput,
    StockTarget, TransferInput,
};
use stockledger_db::entities::{items, warehouses};
use stockledger_db::{InventoryRepository, LedgerReportRepository, SnapshotFilter};
use stockledger_shared::AppConfig;
use stockledger_shared::types::{ItemId, TenantId, WarehouseId};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::{Uuid, uuid};

/// Demo tenant (consistent for all seeds).
const DEMO_TENANT_ID: Uuid = uuid!("00000000-0000-0000-0000-00000000a001");

const MAIN_WAREHOUSE_ID: Uuid = uuid!("00000000-0000-0000-0000-00000000b001");
const OVERFLOW_WAREHOUSE_ID: Uuid = uuid!("00000000-0000-0000-0000-00000000b002");

/// Demo items: id, sku, name, min stock, allow negative.
const DEMO_ITEMS: [(Uuid, &str, &str, Decimal, bool); 3] = [
    (
        uuid!("00000000-0000-0000-0000-00000000c001"),
        "BOLT-M8",
        "Hex bolt M8x40",
        dec!(50),
        false,
    ),
    (
        uuid!("00000000-0000-0000-0000-00000000c002"),
        "NUT-M8",
        "Hex nut M8",
        dec!(100),
        false,
    ),
    (
        uuid!("00000000-0000-0000-0000-00000000c003"),
        "OIL-5W30",
        "Engine oil 5W-30 (litre)",
        dec!(10.5),
        true,
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seeder=info,stockledger_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let db = stockledger_db::connect_with(&config.database)
        .await
        .context("failed to connect to database")?;

    let tenant_id = TenantId::from_uuid(DEMO_TENANT_ID);

    info!("seeding warehouses");
    seed_warehouse(&db, MAIN_WAREHOUSE_ID, "MAIN", "Main warehouse").await?;
    seed_warehouse(&db, OVERFLOW_WAREHOUSE_ID, "OVF", "Overflow storage").await?;

    info!("seeding items");
    for (id, sku, name, min_stock, allow_negative) in DEMO_ITEMS {
        seed_item(&db, id, sku, name, min_stock, allow_negative).await?;
    }

    info!("recording sample movements");
    let repo = InventoryRepository::from_config(db.clone(), &config);
    seed_movements(&repo, tenant_id).await?;

    let snapshot = LedgerReportRepository::with_config(db, config.inventory)
        .get_snapshot(tenant_id, &SnapshotFilter::default())
        .await?;
    for row in &snapshot {
        info!(
            sku = %row.sku,
            warehouse = %row.warehouse_code,
            quantity = %row.quantity,
            average_cost = %row.average_cost,
            status = row.status.as_str(),
            "balance"
        );
    }

    info!(balances = snapshot.len(), "seeding complete");
    Ok(())
}

async fn seed_warehouse(
    db: &DatabaseConnection,
    id: Uuid,
    code: &str,
    name: &str,
) -> anyhow::Result<()> {
    if warehouses::Entity::find_by_id(id).one(db).await?.is_some() {
        info!(code, "warehouse already exists, skipping");
        return Ok(());
    }

    warehouses::ActiveModel {
        id: Set(id),
        tenant_id: Set(DEMO_TENANT_ID),
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        cost_center_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .with_context(|| format!("failed to insert warehouse {code}"))?;

    Ok(())
}

async fn seed_item(
    db: &DatabaseConnection,
    id: Uuid,
    sku: &str,
    name: &str,
    min_stock: Decimal,
    allow_negative_stock: bool,
) -> anyhow::Result<()> {
    if items::Entity::find_by_id(id).one(db).await?.is_some() {
        info!(sku, "item already exists, skipping");
        return Ok(());
    }

    items::ActiveModel {
        id: Set(id),
        tenant_id: Set(DEMO_TENANT_ID),
        sku: Set(sku.to_string()),
        name: Set(name.to_string()),
        track_inventory: Set(true),
        allow_negative_stock: Set(allow_negative_stock),
        average_cost: Set(Decimal::ZERO),
        last_purchase_cost: Set(Decimal::ZERO),
        base_selling_price: Set(Decimal::ZERO),
        min_stock: Set(Some(min_stock)),
        max_stock: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .with_context(|| format!("failed to insert item {sku}"))?;

    Ok(())
}

fn backdated(days: i64, notes: &str) -> MovementMeta {
    MovementMeta {
        occurred_at: Some(Utc::now() - Duration::days(days)),
        notes: Some(notes.to_string()),
        ..MovementMeta::default()
    }
}

async fn seed_movements(repo: &InventoryRepository, tenant_id: TenantId) -> anyhow::Result<()> {
    let main = WarehouseId::from_uuid(MAIN_WAREHOUSE_ID);
    let overflow = WarehouseId::from_uuid(OVERFLOW_WAREHOUSE_ID);
    let [bolt, nut, oil] = DEMO_ITEMS.map(|(id, ..)| ItemId::from_uuid(id));

    repo.create_receipt(
        tenant_id,
        ReceiptInput {
            target: StockTarget::new(bolt, main),
            quantity: dec!(200),
            unit_cost: Some(dec!(0.12)),
            unit_price: Some(dec!(0.25)),
            meta: backdated(7, "Opening stock"),
        },
    )
    .await?;
    repo.create_receipt(
        tenant_id,
        ReceiptInput {
            target: StockTarget::new(bolt, main),
            quantity: dec!(100),
            unit_cost: Some(dec!(0.15)),
            unit_price: None,
            meta: backdated(3, "Supplier delivery"),
        },
    )
    .await?;
    repo.create_issue(
        tenant_id,
        IssueInput {
            target: StockTarget::new(bolt, main),
            quantity: dec!(260),
            unit_price: Some(dec!(0.25)),
            meta: backdated(1, "Workshop order"),
        },
    )
    .await?;

    repo.create_receipt(
        tenant_id,
        ReceiptInput {
            target: StockTarget::new(nut, main),
            quantity: dec!(500),
            unit_cost: Some(dec!(0.04)),
            unit_price: None,
            meta: backdated(6, "Opening stock"),
        },
    )
    .await?;
    repo.create_transfer(
        tenant_id,
        TransferInput {
            item_id: nut,
            variant_id: None,
            from_warehouse_id: main,
            from_location_id: None,
            to_warehouse_id: overflow,
            to_location_id: None,
            quantity: dec!(150),
            unit_cost: None,
            meta: backdated(2, "Rebalance"),
        },
    )
    .await?;
    repo.create_return(
        tenant_id,
        ReturnInput {
            target: StockTarget::new(nut, main),
            quantity: dec!(20),
            direction: ReturnDirection::Out,
            unit_cost: None,
            unit_price: None,
            meta: backdated(1, "Damaged batch back to vendor"),
        },
    )
    .await?;

    repo.create_adjustment(
        tenant_id,
        AdjustmentInput {
            target: StockTarget::new(oil, overflow),
            qty_delta: dec!(-2.5),
            unit_cost: None,
            unit_price: None,
            meta: backdated(0, "Spill write-off"),
        },
    )
    .await?;

    Ok(())
}
