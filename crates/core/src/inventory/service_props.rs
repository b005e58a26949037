//! Property-based tests for operation planning and lock ordering.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use stockledger_shared::types::{ItemId, LocationId, TenantId, VariantId, WarehouseId};
use uuid::Uuid;

use super::service::{StockService, lock_order};
use super::types::{BalanceKey, MovementMeta, TransferInput};

/// Strategy for ids drawn from a small pool so keys collide often.
fn pooled_uuid() -> impl Strategy<Value = Uuid> {
    (0u128..4).prop_map(Uuid::from_u128)
}

fn balance_key() -> impl Strategy<Value = BalanceKey> {
    (
        pooled_uuid(),
        pooled_uuid(),
        prop::option::of(pooled_uuid()),
        prop::option::of(pooled_uuid()),
    )
        .prop_map(|(warehouse, item, variant, location)| BalanceKey {
            tenant_id: TenantId::from_uuid(Uuid::from_u128(99)),
            warehouse_id: WarehouseId::from_uuid(warehouse),
            item_id: ItemId::from_uuid(item),
            variant_id: variant.map(VariantId::from_uuid),
            location_id: location.map(LocationId::from_uuid),
        })
}

fn transfer(item: ItemId, from: WarehouseId, to: WarehouseId) -> TransferInput {
    TransferInput {
        item_id: item,
        variant_id: None,
        from_warehouse_id: from,
        from_location_id: None,
        to_warehouse_id: to,
        to_location_id: None,
        quantity: Decimal::ONE,
        unit_cost: None,
        meta: MovementMeta::default(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Lock order does not depend on the order keys are supplied in.
    #[test]
    fn prop_lock_order_is_canonical(keys in prop::collection::vec(balance_key(), 1..8)) {
        let mut reversed = keys.clone();
        reversed.reverse();
        prop_assert_eq!(lock_order(&keys), lock_order(&reversed));
    }

    /// Lock order is strictly increasing: sorted and free of duplicates.
    #[test]
    fn prop_lock_order_strictly_increasing(keys in prop::collection::vec(balance_key(), 1..8)) {
        let ordered = lock_order(&keys);
        prop_assert!(ordered.windows(2).all(|w| w[0] < w[1]));
        for key in &keys {
            prop_assert!(ordered.contains(key));
        }
    }

    /// Opposing transfers between the same warehouses lock in the same order.
    #[test]
    fn prop_opposing_transfers_share_lock_order(a in pooled_uuid(), b in pooled_uuid()) {
        prop_assume!(a != b);
        let tenant = TenantId::new();
        let item = ItemId::new();
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();
        let (a, b) = (WarehouseId::from_uuid(a), WarehouseId::from_uuid(b));

        let forward = StockService::plan_transfer(tenant, &transfer(item, a, b), now).unwrap();
        let backward = StockService::plan_transfer(tenant, &transfer(item, b, a), now).unwrap();

        prop_assert_eq!(forward.lock_order, backward.lock_order);
    }
}
