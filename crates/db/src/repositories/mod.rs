//! Repository layer for the inventory engine.
//!
//! [`InventoryRepository`] is the write façade; [`LedgerReportRepository`]
//! serves the read-only views. The remaining modules are the building blocks
//! both share inside one tenant-scoped transaction.

pub mod balance;
pub mod error;
pub mod inventory;
pub mod ledger_report;
pub mod master_data;
pub mod movement;

pub use balance::{BalanceMutator, LockedBalance};
pub use error::StockError;
pub use inventory::InventoryRepository;
pub use ledger_report::{
    DriftRow, LedgerFilter, LedgerReportRepository, LedgerRow, SnapshotFilter, SnapshotRow,
};
pub use master_data::{ItemPolicy, WarehouseInfo};
pub use movement::MovementRecorder;
