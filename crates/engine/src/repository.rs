//! Injectable data-access seams.
//!
//! The pipeline never touches a storage handle directly: it is constructed
//! with trait objects so tests can run against deterministic in-memory
//! fakes. The sea-orm implementations live in [`crate::store`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::{ForecastResult, ResultEngine, series::CashRecord};

/// Read access to the transactional record store (invoices and expenses).
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Inflow records for `user_id` whose date falls in `[from, to]`,
    /// plus any dateless records (the aggregator skips those).
    async fn inflows_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<Vec<CashRecord>>;

    /// Outflow records for `user_id`, same contract as inflows.
    async fn outflows_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<Vec<CashRecord>>;

    /// Sum of all settled inflow amounts over the user's entire history.
    async fn settled_inflow_total(&self, user_id: &str) -> ResultEngine<i64>;

    /// Sum of all settled outflow amounts over the user's entire history.
    async fn settled_outflow_total(&self, user_id: &str) -> ResultEngine<i64>;
}

/// Access to the explicit ledger balance snapshot, when one exists.
#[async_trait]
pub trait BalanceRepository: Send + Sync {
    async fn balance_snapshot(&self, user_id: &str) -> ResultEngine<Option<i64>>;
}

/// Persistence for the single cached forecast per user.
#[async_trait]
pub trait ForecastStore: Send + Sync {
    async fn load(&self, user_id: &str) -> ResultEngine<Option<ForecastResult>>;

    /// Overwrites the user's stored forecast wholesale.
    async fn save(&self, user_id: &str, forecast: &ForecastResult) -> ResultEngine<()>;
}

/// User-activity registry consulted by the batch scheduler.
#[async_trait]
pub trait UserRegistry: Send + Sync {
    /// Ids of users whose last activity is at or after `cutoff`.
    async fn users_active_since(&self, cutoff: DateTime<Utc>) -> ResultEngine<Vec<String>>;
}
