//! Bounded retry for transient lock and serialization failures.
//!
//! Only whole operations are retried, each attempt in a fresh transaction.
//! The default policy makes a single attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use sea_orm::{DbErr, RuntimeErr};
use stockledger_shared::InventoryConfig;
use tracing::{debug, warn};

/// SQLSTATEs worth retrying: serialization failure, deadlock, lock timeout.
pub const RETRYABLE_SQLSTATES: [&str; 3] = ["40001", "40P01", "55P03"];

/// Upper bound on a single backoff sleep.
const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// Errors that can tell whether a fresh attempt might succeed.
pub trait Retryable {
    /// Returns true if the failed operation may be retried as a whole.
    fn is_retryable(&self) -> bool;
}

impl Retryable for DbErr {
    fn is_retryable(&self) -> bool {
        sqlstate(self).is_some_and(|code| RETRYABLE_SQLSTATES.contains(&code.as_str()))
    }
}

/// Extracts the Postgres SQLSTATE from a database error, if any.
#[must_use]
pub fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db_err))) => {
            db_err.code().map(std::borrow::Cow::into_owned)
        }
        _ => None,
    }
}

/// Retry policy for façade operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; at least one.
    pub max_attempts: u32,
    /// Sleep before the second attempt; doubles each time after.
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    /// A single attempt, no retry.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            base_backoff: Duration::ZERO,
        }
    }

    /// Builds the policy from inventory configuration.
    #[must_use]
    pub const fn from_config(config: &InventoryConfig) -> Self {
        Self {
            max_attempts: if config.retry_attempts == 0 {
                1
            } else {
                config.retry_attempts
            },
            base_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Sleep before attempt `attempt + 1`, given `attempt` failed (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// the policy runs out of attempts.
///
/// # Errors
///
/// Returns the last error produced by `operation`.
pub async fn with_retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    operation_name: &'static str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = operation_name, attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if attempt < policy.max_attempts && err.is_retryable() => {
                let delay = policy.backoff(attempt);
                warn!(
                    operation = operation_name,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
