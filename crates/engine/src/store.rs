//! sea-orm backed implementations of the repository traits.
//!
//! All storage-specific conversion (nullable dates, JSON payloads, minor
//! unit columns) happens here; the forecasting math never sees a database
//! handle or a storage timestamp type.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, Statement,
};

use crate::{
    BalanceRepository, CashRecord, ForecastResult, ForecastStore, ResultEngine,
    TransactionRepository, UserRegistry,
};

pub(crate) mod balance_snapshots;
pub(crate) mod expenses;
pub(crate) mod forecasts;
pub(crate) mod invoices;
pub(crate) mod users;

/// One adapter implements every repository trait over the same connection.
#[derive(Clone, Debug)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// `COALESCE(SUM(amount_minor), 0)` over a user's settled records.
    async fn settled_total(&self, table: &str, user_id: &str) -> ResultEngine<i64> {
        let backend = self.db.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            format!(
                "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
                 FROM {table} \
                 WHERE user_id = ? AND status IN (?, ?)"
            ),
            vec![user_id.into(), "settled".into(), "paid".into()],
        );
        let row = self.db.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0))
    }
}

#[async_trait]
impl TransactionRepository for SeaOrmStore {
    async fn inflows_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<Vec<CashRecord>> {
        let rows = invoices::Entity::find()
            .filter(invoices::Column::UserId.eq(user_id))
            .filter(
                Condition::any()
                    .add(invoices::Column::IssuedOn.between(from, to))
                    .add(invoices::Column::IssuedOn.is_null()),
            )
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|model| CashRecord {
                date: model.issued_on,
                amount_minor: model.amount_minor,
            })
            .collect())
    }

    async fn outflows_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<Vec<CashRecord>> {
        let rows = expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id))
            .filter(
                Condition::any()
                    .add(expenses::Column::PaidOn.between(from, to))
                    .add(expenses::Column::PaidOn.is_null()),
            )
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|model| CashRecord {
                date: model.paid_on,
                amount_minor: model.amount_minor,
            })
            .collect())
    }

    async fn settled_inflow_total(&self, user_id: &str) -> ResultEngine<i64> {
        self.settled_total("invoices", user_id).await
    }

    async fn settled_outflow_total(&self, user_id: &str) -> ResultEngine<i64> {
        self.settled_total("expenses", user_id).await
    }
}

#[async_trait]
impl BalanceRepository for SeaOrmStore {
    async fn balance_snapshot(&self, user_id: &str) -> ResultEngine<Option<i64>> {
        let snapshot = balance_snapshots::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await?;
        Ok(snapshot.map(|model| model.balance_minor))
    }
}

#[async_trait]
impl ForecastStore for SeaOrmStore {
    async fn load(&self, user_id: &str) -> ResultEngine<Option<ForecastResult>> {
        let Some(model) = forecasts::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let result: ForecastResult = serde_json::from_str(&model.payload)?;
        Ok(Some(result))
    }

    async fn save(&self, user_id: &str, forecast: &ForecastResult) -> ResultEngine<()> {
        let payload = serde_json::to_string(forecast)?;
        let existing = forecasts::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await?;

        let model = forecasts::ActiveModel {
            user_id: ActiveValue::Set(user_id.to_string()),
            generated_at: ActiveValue::Set(forecast.generated_at),
            horizon_days: ActiveValue::Set(forecast.horizon_days as i32),
            payload: ActiveValue::Set(payload),
        };

        if existing.is_some() {
            model.update(&self.db).await?;
        } else {
            model.insert(&self.db).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl UserRegistry for SeaOrmStore {
    async fn users_active_since(&self, cutoff: DateTime<Utc>) -> ResultEngine<Vec<String>> {
        let rows = users::Entity::find()
            .filter(users::Column::LastActiveAt.gte(cutoff))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|user| user.username).collect())
    }
}
