//! Tenant-scoped transactions.
//!
//! Every inventory read and write runs inside a transaction that first sets
//! `app.current_tenant_id` (for the RLS policies) and `lock_timeout` (to
//! bound row-lock waits) with `SET LOCAL`, so both settings die with the
//! transaction.
//!
//! # Usage
//!
//! ```ignore
//! use stockledger_db::tenant::TenantScope;
//!
//! let scope = TenantScope::begin(&db, tenant_id, 5_000).await?;
//! let rows = stock_balances::Entity::find().all(scope.transaction()).await?;
//! scope.commit().await?;
//! ```

use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};
use stockledger_shared::types::TenantId;

/// A transaction bound to one tenant.
///
/// Dropping the scope without calling [`TenantScope::commit`] rolls the
/// transaction back and releases every row lock it holds.
pub struct TenantScope {
    txn: DatabaseTransaction,
    tenant_id: TenantId,
}

impl TenantScope {
    /// Begins a transaction and sets the tenant context and lock timeout.
    ///
    /// A `lock_timeout_ms` of zero leaves the server default in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the settings
    /// cannot be applied.
    pub async fn begin(
        db: &DatabaseConnection,
        tenant_id: TenantId,
        lock_timeout_ms: u64,
    ) -> Result<Self, DbErr> {
        let txn = db.begin().await?;

        txn.execute_unprepared(&tenant_context_sql(tenant_id)).await?;
        if lock_timeout_ms > 0 {
            txn.execute_unprepared(&lock_timeout_sql(lock_timeout_ms))
                .await?;
        }

        Ok(Self { txn, tenant_id })
    }

    /// Returns the underlying transaction.
    #[must_use]
    pub const fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Returns the tenant this scope is bound to.
    #[must_use]
    pub const fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// `SET LOCAL` statement for the tenant context.
///
/// The id is a parsed UUID, so formatting it into the statement is safe.
#[must_use]
pub fn tenant_context_sql(tenant_id: TenantId) -> String {
    format!("SET LOCAL app.current_tenant_id = '{tenant_id}'")
}

/// `SET LOCAL` statement for the lock wait bound.
#[must_use]
pub fn lock_timeout_sql(lock_timeout_ms: u64) -> String {
    format!("SET LOCAL lock_timeout = '{lock_timeout_ms}ms'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_tenant_context_sql_format() {
        let tenant_id = TenantId::from_uuid(
            Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
        );
        assert_eq!(
            tenant_context_sql(tenant_id),
            "SET LOCAL app.current_tenant_id = '550e8400-e29b-41d4-a716-446655440000'"
        );
    }

    #[test]
    fn test_lock_timeout_sql_format() {
        assert_eq!(lock_timeout_sql(5000), "SET LOCAL lock_timeout = '5000ms'");
    }
}
