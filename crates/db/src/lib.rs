//! Database layer for the inventory ledger.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - The inventory migration
//! - Tenant-scoped transactions and retry on lock contention
//! - The inventory write façade and the ledger reporter

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod retry;
pub mod tenant;

pub use repositories::{
    InventoryRepository, LedgerFilter, LedgerReportRepository, SnapshotFilter, StockError,
};
pub use retry::RetryPolicy;
pub use tenant::TenantScope;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use stockledger_shared::DatabaseConfig;
use tracing::info;

/// Establishes a connection to the database with default pool settings.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(config.sqlx_logging);

    let db = Database::connect(options).await?;
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "database pool ready"
    );
    Ok(db)
}
