//! Inventory migration.
//!
//! Creates the master-data tables the engine reads, the balance store, the
//! movement ledger, the trigger guarding ledger edits, and RLS policies.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: MASTER DATA
        // ============================================================
        db.execute_unprepared(ITEMS_SQL).await?;
        db.execute_unprepared(WAREHOUSES_SQL).await?;

        // ============================================================
        // PART 2: BALANCE STORE & MOVEMENT LEDGER
        // ============================================================
        db.execute_unprepared(STOCK_BALANCES_SQL).await?;
        db.execute_unprepared(STOCK_MOVEMENTS_SQL).await?;

        // ============================================================
        // PART 3: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        // ============================================================
        // PART 4: ROW-LEVEL SECURITY
        // ============================================================
        db.execute_unprepared(RLS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ITEMS_SQL: &str = r"
CREATE TABLE items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL,
    sku VARCHAR(64) NOT NULL,
    name VARCHAR(255) NOT NULL,
    track_inventory BOOLEAN NOT NULL DEFAULT true,
    allow_negative_stock BOOLEAN NOT NULL DEFAULT false,
    average_cost NUMERIC(19, 6) NOT NULL DEFAULT 0,
    last_purchase_cost NUMERIC(19, 6) NOT NULL DEFAULT 0,
    base_selling_price NUMERIC(19, 6) NOT NULL DEFAULT 0,
    min_stock NUMERIC(19, 4),
    max_stock NUMERIC(19, 4),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ,
    CONSTRAINT chk_items_costs_non_negative CHECK (
        average_cost >= 0 AND last_purchase_cost >= 0 AND base_selling_price >= 0
    )
);

CREATE UNIQUE INDEX uq_items_tenant_sku ON items(tenant_id, sku) WHERE deleted_at IS NULL;
CREATE INDEX idx_items_tenant ON items(tenant_id) WHERE deleted_at IS NULL;
";

const WAREHOUSES_SQL: &str = r"
CREATE TABLE warehouses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL,
    code VARCHAR(32) NOT NULL,
    name VARCHAR(255) NOT NULL,
    cost_center_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ
);

CREATE UNIQUE INDEX uq_warehouses_tenant_code ON warehouses(tenant_id, code) WHERE deleted_at IS NULL;
CREATE INDEX idx_warehouses_tenant ON warehouses(tenant_id) WHERE deleted_at IS NULL;
";

const STOCK_BALANCES_SQL: &str = r"
-- One row per balance key. Rows are created lazily and never deleted.
CREATE TABLE stock_balances (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL,
    item_id UUID NOT NULL REFERENCES items(id),
    warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    variant_id UUID,
    location_id UUID,
    quantity_on_hand NUMERIC(19, 4) NOT NULL DEFAULT 0,
    average_cost NUMERIC(19, 6) NOT NULL DEFAULT 0,
    last_cost NUMERIC(19, 6) NOT NULL DEFAULT 0,
    selling_price NUMERIC(19, 6) NOT NULL DEFAULT 0,
    last_movement_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_balance_average_cost CHECK (average_cost >= 0)
);

-- Balance key. Absent variant/location collapse to the nil uuid so that
-- two rows without a variant still collide.
CREATE UNIQUE INDEX uq_stock_balances_key ON stock_balances (
    tenant_id,
    item_id,
    warehouse_id,
    COALESCE(variant_id, '00000000-0000-0000-0000-000000000000'::UUID),
    COALESCE(location_id, '00000000-0000-0000-0000-000000000000'::UUID)
);

CREATE INDEX idx_stock_balances_warehouse ON stock_balances(tenant_id, warehouse_id);
";

const STOCK_MOVEMENTS_SQL: &str = r"
CREATE TABLE stock_movements (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    item_id UUID NOT NULL REFERENCES items(id),
    variant_id UUID,
    location_id UUID,
    cost_center_id UUID,
    movement_type VARCHAR(20) NOT NULL,
    qty_delta NUMERIC(19, 4) NOT NULL,
    unit_cost NUMERIC(19, 6),
    unit_price NUMERIC(19, 6),
    reference_type VARCHAR(50),
    reference_id UUID,
    reference_no VARCHAR(100),
    notes TEXT,
    occurred_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID,
    updated_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ,
    deleted_by UUID,
    CONSTRAINT chk_movement_type CHECK (movement_type IN (
        'adjustment', 'receipt', 'issue', 'return_in', 'return_out', 'transfer_in', 'transfer_out'
    )),
    CONSTRAINT chk_movement_qty_non_zero CHECK (qty_delta <> 0),
    CONSTRAINT chk_movement_direction CHECK (
        movement_type = 'adjustment'
        OR (movement_type IN ('receipt', 'return_in', 'transfer_in') AND qty_delta > 0)
        OR (movement_type IN ('issue', 'return_out', 'transfer_out') AND qty_delta < 0)
    ),
    CONSTRAINT chk_movement_costs_non_negative CHECK (
        (unit_cost IS NULL OR unit_cost >= 0) AND (unit_price IS NULL OR unit_price >= 0)
    )
);

-- Ledger window: partition by key, order by (occurred_at, id)
CREATE INDEX idx_stock_movements_key_time ON stock_movements(
    tenant_id, item_id, warehouse_id, occurred_at, id
) WHERE deleted_at IS NULL;

CREATE INDEX idx_stock_movements_tenant_time ON stock_movements(tenant_id, occurred_at DESC)
    WHERE deleted_at IS NULL;

CREATE INDEX idx_stock_movements_reference ON stock_movements(tenant_id, reference_no);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_movement_modification
-- Only adjustments may be edited or soft-deleted; deleted rows are frozen.
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_movement_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.movement_type <> 'adjustment' THEN
        RAISE EXCEPTION 'Cannot modify % movement. Record a compensating movement instead.',
            OLD.movement_type;
    END IF;

    IF OLD.deleted_at IS NOT NULL THEN
        RAISE EXCEPTION 'Cannot modify deleted movement.';
    END IF;

    IF NEW.movement_type <> 'adjustment' THEN
        RAISE EXCEPTION 'Cannot change the type of an adjustment.';
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_movement_mod
BEFORE UPDATE ON stock_movements
FOR EACH ROW
EXECUTE FUNCTION prevent_movement_modification();
";

const RLS_SQL: &str = r"
-- Application sets context per transaction: SET LOCAL app.current_tenant_id = 'tenant-uuid';
ALTER TABLE items ENABLE ROW LEVEL SECURITY;
ALTER TABLE warehouses ENABLE ROW LEVEL SECURITY;
ALTER TABLE stock_balances ENABLE ROW LEVEL SECURITY;
ALTER TABLE stock_movements ENABLE ROW LEVEL SECURITY;

CREATE POLICY tenant_isolation ON items
    USING (tenant_id = current_setting('app.current_tenant_id', true)::UUID);

CREATE POLICY tenant_isolation ON warehouses
    USING (tenant_id = current_setting('app.current_tenant_id', true)::UUID);

CREATE POLICY tenant_isolation ON stock_balances
    USING (tenant_id = current_setting('app.current_tenant_id', true)::UUID);

CREATE POLICY tenant_isolation ON stock_movements
    USING (tenant_id = current_setting('app.current_tenant_id', true)::UUID);
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_prevent_movement_mod ON stock_movements;
DROP FUNCTION IF EXISTS prevent_movement_modification();
DROP TABLE IF EXISTS stock_movements CASCADE;
DROP TABLE IF EXISTS stock_balances CASCADE;
DROP TABLE IF EXISTS warehouses CASCADE;
DROP TABLE IF EXISTS items CASCADE;
";
