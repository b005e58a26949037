//! Inventory domain types for movement recording and balance keys.
//!
//! This module defines the movement classification, the balance key that
//! identifies one aggregate stock position, and the payloads accepted by the
//! inventory operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockledger_shared::types::{
    CostCenterId, ItemId, LocationId, MovementId, TenantId, UserId, VariantId, WarehouseId,
};
use uuid::Uuid;

/// Movement type classification.
///
/// Adjustments carry a signed delta chosen by the caller; every other kind has
/// a fixed direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Manual stock correction, positive or negative.
    Adjustment,
    /// Goods received into a warehouse.
    Receipt,
    /// Goods issued out of a warehouse.
    Issue,
    /// Returned goods coming back into stock.
    ReturnIn,
    /// Goods returned out of stock (e.g. defective goods back to a vendor).
    ReturnOut,
    /// Inbound leg of a transfer.
    TransferIn,
    /// Outbound leg of a transfer.
    TransferOut,
}

impl MovementType {
    /// All movement types.
    pub const ALL: [Self; 7] = [
        Self::Adjustment,
        Self::Receipt,
        Self::Issue,
        Self::ReturnIn,
        Self::ReturnOut,
        Self::TransferIn,
        Self::TransferOut,
    ];

    /// Returns the stored name of the movement type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Adjustment => "adjustment",
            Self::Receipt => "receipt",
            Self::Issue => "issue",
            Self::ReturnIn => "return_in",
            Self::ReturnOut => "return_out",
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
        }
    }

    /// Prefix used for generated reference numbers.
    #[must_use]
    pub const fn reference_prefix(self) -> &'static str {
        match self {
            Self::Adjustment => "ADJ",
            Self::Receipt => "GRN",
            Self::Issue => "ISS",
            Self::ReturnIn | Self::ReturnOut => "RTN",
            Self::TransferIn | Self::TransferOut => "TRF",
        }
    }

    /// Returns true if movements of this type may be edited or soft-deleted.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Adjustment)
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MovementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown movement type: {s}"))
    }
}

/// Direction of a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnDirection {
    /// Stock comes back in (customer return).
    In,
    /// Stock leaves (return to vendor).
    Out,
}

impl ReturnDirection {
    /// Movement type recorded for this direction.
    #[must_use]
    pub const fn movement_type(self) -> MovementType {
        match self {
            Self::In => MovementType::ReturnIn,
            Self::Out => MovementType::ReturnOut,
        }
    }

    /// Applies the direction sign to a positive quantity.
    #[must_use]
    pub fn signed(self, quantity: Decimal) -> Decimal {
        match self {
            Self::In => quantity,
            Self::Out => -quantity,
        }
    }
}

/// Identifies one aggregate stock position.
///
/// The derived ordering (tenant, warehouse, item, variant, location) is the
/// canonical lock order for operations touching more than one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Warehouse holding the stock.
    pub warehouse_id: WarehouseId,
    /// Stocked item.
    pub item_id: ItemId,
    /// Optional item variant.
    pub variant_id: Option<VariantId>,
    /// Optional location inside the warehouse.
    pub location_id: Option<LocationId>,
}

impl BalanceKey {
    /// Creates a key without variant or location.
    #[must_use]
    pub const fn new(tenant_id: TenantId, item_id: ItemId, warehouse_id: WarehouseId) -> Self {
        Self {
            tenant_id,
            warehouse_id,
            item_id,
            variant_id: None,
            location_id: None,
        }
    }

    /// Returns the key for a stock target within a tenant.
    #[must_use]
    pub const fn for_target(tenant_id: TenantId, target: &StockTarget) -> Self {
        Self {
            tenant_id,
            warehouse_id: target.warehouse_id,
            item_id: target.item_id,
            variant_id: target.variant_id,
            location_id: target.location_id,
        }
    }
}

/// Where a movement lands: item, warehouse and the optional finer dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockTarget {
    /// Item being moved.
    pub item_id: ItemId,
    /// Warehouse the stock is in.
    pub warehouse_id: WarehouseId,
    /// Optional item variant.
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    /// Optional location inside the warehouse.
    #[serde(default)]
    pub location_id: Option<LocationId>,
}

impl StockTarget {
    /// Creates a target without variant or location.
    #[must_use]
    pub const fn new(item_id: ItemId, warehouse_id: WarehouseId) -> Self {
        Self {
            item_id,
            warehouse_id,
            variant_id: None,
            location_id: None,
        }
    }
}

/// Pricing carried into a balance mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    /// Unit cost of an inflow; ignored on outflows.
    pub unit_cost: Option<Decimal>,
    /// New selling price, applied only when present.
    pub selling_price: Option<Decimal>,
}

/// Provenance and audit fields shared by every movement payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementMeta {
    /// Kind of the source document (e.g. `purchase_order`).
    pub reference_type: Option<String>,
    /// Id of the source document.
    pub reference_id: Option<Uuid>,
    /// Human-readable reference number; generated when absent.
    pub reference_no: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// When the movement happened; defaults to now, may be backdated.
    pub occurred_at: Option<DateTime<Utc>>,
    /// Cost center override; defaults to the warehouse's cost center.
    pub cost_center_id: Option<CostCenterId>,
    /// User performing the operation.
    pub user_id: Option<UserId>,
}

/// Payload for creating an adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentInput {
    /// Where the adjustment lands.
    pub target: StockTarget,
    /// Signed quantity delta, never zero.
    pub qty_delta: Decimal,
    /// Unit cost for positive adjustments.
    pub unit_cost: Option<Decimal>,
    /// Unit price to record (and apply as selling price on inflows).
    pub unit_price: Option<Decimal>,
    /// Provenance and audit fields.
    #[serde(default)]
    pub meta: MovementMeta,
}

/// Payload for editing an existing adjustment.
///
/// The new values replace the stored ones; `occurred_at` and `reference_no`
/// are kept when the payload leaves them empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAdjustmentInput {
    /// The adjustment movement being edited.
    pub movement_id: MovementId,
    /// Replacement values.
    pub adjustment: AdjustmentInput,
}

/// Payload for deleting an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAdjustmentInput {
    /// The adjustment movement being removed.
    pub movement_id: MovementId,
    /// User performing the deletion.
    pub user_id: Option<UserId>,
}

/// Payload for a goods receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptInput {
    /// Where the goods land.
    pub target: StockTarget,
    /// Quantity received, greater than zero.
    pub quantity: Decimal,
    /// Unit cost blended into the weighted average.
    pub unit_cost: Option<Decimal>,
    /// Selling price to apply to the balance.
    pub unit_price: Option<Decimal>,
    /// Provenance and audit fields.
    #[serde(default)]
    pub meta: MovementMeta,
}

/// Payload for a goods issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInput {
    /// Where the goods leave from.
    pub target: StockTarget,
    /// Quantity issued, greater than zero.
    pub quantity: Decimal,
    /// Price the goods were issued at, recorded on the movement only.
    pub unit_price: Option<Decimal>,
    /// Provenance and audit fields.
    #[serde(default)]
    pub meta: MovementMeta,
}

/// Payload for a return in either direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnInput {
    /// Where the return is booked.
    pub target: StockTarget,
    /// Quantity returned, greater than zero.
    pub quantity: Decimal,
    /// `in` adds stock, `out` removes it.
    pub direction: ReturnDirection,
    /// Unit cost for inbound returns.
    pub unit_cost: Option<Decimal>,
    /// Unit price to record on the movement.
    pub unit_price: Option<Decimal>,
    /// Provenance and audit fields.
    #[serde(default)]
    pub meta: MovementMeta,
}

/// Payload for a transfer between two warehouses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferInput {
    /// Item being moved; both legs use it.
    pub item_id: ItemId,
    /// Optional item variant.
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    /// Source warehouse.
    pub from_warehouse_id: WarehouseId,
    /// Optional source location.
    #[serde(default)]
    pub from_location_id: Option<LocationId>,
    /// Destination warehouse.
    pub to_warehouse_id: WarehouseId,
    /// Optional destination location.
    #[serde(default)]
    pub to_location_id: Option<LocationId>,
    /// Quantity moved, greater than zero.
    pub quantity: Decimal,
    /// Unit cost for the inbound leg; defaults to the source average cost.
    pub unit_cost: Option<Decimal>,
    /// Provenance and audit fields.
    #[serde(default)]
    pub meta: MovementMeta,
}

/// Result of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutcome {
    /// The `transfer_out` movement at the source key.
    pub out_id: MovementId,
    /// The `transfer_in` movement at the destination key.
    pub in_id: MovementId,
    /// Reference number shared by both legs.
    pub reference_no: String,
}
