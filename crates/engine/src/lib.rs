//! Cash-flow forecasting and runway analysis.
//!
//! The engine turns a user's historical transaction activity into a
//! forward-looking projection of daily net cash flow, a cumulative balance
//! path and the number of days until funds are projected to run out.
//!
//! Data flows: aggregator -> estimators -> combiner -> projector, with a
//! confidence band derived from recent history, behind a read-through cache
//! holding one persisted result per user.

use std::sync::Arc;

use chrono::{DateTime, Days, Duration, Utc};

pub use error::EngineError;
pub use estimators::FIT_WINDOW;
pub use forecast::ForecastResult;
pub use repository::{BalanceRepository, ForecastStore, TransactionRepository, UserRegistry};
pub use series::{CashRecord, DailyNetSeries};
pub use store::SeaOrmStore;

mod confidence;
mod error;
mod estimators;
mod forecast;
mod projection;
mod repository;
mod series;
mod store;

pub type ResultEngine<T> = Result<T, EngineError>;

/// Valid projection horizons, in days.
pub const HORIZON_RANGE: std::ops::RangeInclusive<u32> = 1..=365;

/// Tunables for the generation pipeline.
#[derive(Clone, Copy, Debug)]
pub struct ForecastConfig {
    /// Days of history aggregated by the on-demand path.
    pub lookback_days: u32,
    /// Horizon used when the caller does not request one.
    pub default_horizon_days: u32,
    /// Holt level smoothing constant.
    pub alpha: f64,
    /// Holt trend smoothing constant.
    pub beta: f64,
    /// Maximum age of a cached forecast before a read regenerates it.
    pub freshness: Duration,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            lookback_days: 90,
            default_horizon_days: 90,
            alpha: 0.3,
            beta: 0.1,
            freshness: Duration::hours(12),
        }
    }
}

impl ForecastConfig {
    /// Smoothing constants used in production.
    pub fn production() -> Self {
        Self {
            alpha: 0.25,
            beta: 0.05,
            ..Self::default()
        }
    }
}

/// The forecasting engine: repositories in, forecast documents out.
pub struct ForecastEngine {
    transactions: Arc<dyn TransactionRepository>,
    balances: Arc<dyn BalanceRepository>,
    store: Arc<dyn ForecastStore>,
    config: ForecastConfig,
}

impl std::fmt::Debug for ForecastEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ForecastEngine {
    /// Return a builder for `ForecastEngine`.
    pub fn builder() -> ForecastEngineBuilder {
        ForecastEngineBuilder::default()
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Serves a forecast for `user_id`, from cache when fresh.
    ///
    /// The horizon defaults to [`ForecastConfig::default_horizon_days`] and
    /// must lie in [`HORIZON_RANGE`]; an invalid value is rejected before
    /// any data is touched. A cached result is returned when its age is
    /// below the freshness window and it was computed either for the
    /// requested horizon or for the default one.
    pub async fn forecast(
        &self,
        user_id: &str,
        horizon: Option<u32>,
    ) -> ResultEngine<ForecastResult> {
        let horizon = horizon.unwrap_or(self.config.default_horizon_days);
        if !HORIZON_RANGE.contains(&horizon) {
            return Err(EngineError::InvalidHorizon(format!(
                "horizon must be between {} and {}, got {horizon}",
                HORIZON_RANGE.start(),
                HORIZON_RANGE.end()
            )));
        }

        let now = Utc::now();
        if let Some(cached) = self.store.load(user_id).await?
            && self.is_fresh(&cached, horizon, now)
        {
            return Ok(cached);
        }

        self.regenerate_at(user_id, self.config.lookback_days, horizon, now)
            .await
    }

    fn is_fresh(&self, cached: &ForecastResult, horizon: u32, now: DateTime<Utc>) -> bool {
        cached.age(now) < self.config.freshness
            && (cached.horizon_days == horizon || horizon == self.config.default_horizon_days)
    }

    /// Runs the full generation pipeline, bypassing the cache.
    ///
    /// Zero matching records is not an error: the pipeline proceeds and
    /// produces a flat/zero forecast. A failed persist is logged and the
    /// in-memory result is still returned; the stale cache will trigger a
    /// recomputation on the next read.
    pub async fn regenerate(
        &self,
        user_id: &str,
        lookback_days: u32,
        horizon: u32,
    ) -> ResultEngine<ForecastResult> {
        self.regenerate_at(user_id, lookback_days, horizon, Utc::now())
            .await
    }

    async fn regenerate_at(
        &self,
        user_id: &str,
        lookback_days: u32,
        horizon: u32,
        now: DateTime<Utc>,
    ) -> ResultEngine<ForecastResult> {
        let today = now.date_naive();
        let window_start = today - Days::new(u64::from(lookback_days));

        let inflows = self
            .transactions
            .inflows_between(user_id, window_start, today)
            .await?;
        let outflows = self
            .transactions
            .outflows_between(user_id, window_start, today)
            .await?;
        let series = DailyNetSeries::build(today, lookback_days, &inflows, &outflows);

        let steps = horizon as usize;
        let linear = estimators::linear_forecast(&series.net, steps);
        let holt =
            estimators::holt_forecast(&series.net, self.config.alpha, self.config.beta, steps);
        let daily_net = estimators::combine(&holt, &linear);

        let current_balance = self.current_balance(user_id).await?;
        let cumulative_balance = projection::project_balance(current_balance, &daily_net);
        let runway_days = projection::runway_days(&cumulative_balance);

        let confidence_std = confidence::confidence_std(&series.net);
        let confidence_band = confidence::confidence_band(&daily_net, confidence_std);

        let dates = (1..=u64::from(horizon))
            .map(|offset| today + Days::new(offset))
            .collect();

        let result = ForecastResult {
            generated_at: now,
            horizon_days: horizon,
            dates,
            daily_net,
            cumulative_balance,
            current_balance,
            runway_days,
            confidence_std,
            confidence_band,
        };

        if let Err(err) = self.store.save(user_id, &result).await {
            tracing::warn!(user_id, "failed to persist forecast: {err}");
        }

        Ok(result)
    }

    /// Resolves the starting balance: the explicit ledger snapshot when one
    /// exists, else settled inflows minus settled outflows over all history.
    async fn current_balance(&self, user_id: &str) -> ResultEngine<f64> {
        if let Some(balance_minor) = self.balances.balance_snapshot(user_id).await? {
            return Ok(balance_minor as f64);
        }

        let inflow_total = self.transactions.settled_inflow_total(user_id).await?;
        let outflow_total = self.transactions.settled_outflow_total(user_id).await?;
        Ok((inflow_total - outflow_total) as f64)
    }
}

/// The builder for `ForecastEngine`.
#[derive(Default)]
pub struct ForecastEngineBuilder {
    transactions: Option<Arc<dyn TransactionRepository>>,
    balances: Option<Arc<dyn BalanceRepository>>,
    store: Option<Arc<dyn ForecastStore>>,
    config: Option<ForecastConfig>,
}

impl ForecastEngineBuilder {
    pub fn transactions(mut self, transactions: Arc<dyn TransactionRepository>) -> Self {
        self.transactions = Some(transactions);
        self
    }

    pub fn balances(mut self, balances: Arc<dyn BalanceRepository>) -> Self {
        self.balances = Some(balances);
        self
    }

    pub fn store(mut self, store: Arc<dyn ForecastStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(mut self, config: ForecastConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Wires every repository to the same sea-orm backed adapter.
    pub fn database(self, db: sea_orm::DatabaseConnection) -> Self {
        let adapter = Arc::new(SeaOrmStore::new(db));
        self.transactions(adapter.clone())
            .balances(adapter.clone())
            .store(adapter)
    }

    /// Construct `ForecastEngine`.
    pub fn build(self) -> ResultEngine<ForecastEngine> {
        let missing = |what: &str| EngineError::KeyNotFound(format!("missing {what} repository"));
        Ok(ForecastEngine {
            transactions: self.transactions.ok_or_else(|| missing("transaction"))?,
            balances: self.balances.ok_or_else(|| missing("balance"))?,
            store: self.store.ok_or_else(|| missing("forecast"))?,
            config: self.config.unwrap_or_default(),
        })
    }
}
