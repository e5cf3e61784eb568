//! Daily batch driver that proactively regenerates forecasts for active
//! users.
//!
//! Fan-out runs through a bounded worker pool; a single user's failure is
//! logged and counted, never propagated to or blocking the other users.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::{sync::Semaphore, task::JoinSet};

use engine::{ForecastEngine, ResultEngine, UserRegistry};

#[derive(Clone, Copy, Debug)]
pub struct SchedulerConfig {
    /// Days of history aggregated by the batch path.
    pub lookback_days: u32,
    pub horizon_days: u32,
    /// Users whose last activity is older than this are skipped.
    pub inactive_after_days: i64,
    /// Worker-pool ceiling for concurrent per-user generations.
    pub max_concurrency: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            lookback_days: 120,
            horizon_days: 90,
            inactive_after_days: 90,
            max_concurrency: 8,
        }
    }
}

/// Outcome of one batch run. Failures are per-user and already logged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
}

pub struct Scheduler {
    engine: Arc<ForecastEngine>,
    registry: Arc<dyn UserRegistry>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(
        engine: Arc<ForecastEngine>,
        registry: Arc<dyn UserRegistry>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            engine,
            registry,
            config,
        }
    }

    /// Runs one batch per day until the task is dropped.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(24 * 60 * 60));
        loop {
            interval.tick().await;
            match self.run_once().await {
                Ok(report) => tracing::info!(
                    succeeded = report.succeeded,
                    failed = report.failed,
                    "forecast batch complete"
                ),
                Err(err) => tracing::error!("forecast batch failed: {err}"),
            }
        }
    }

    /// Enumerates active users and regenerates each forecast independently.
    ///
    /// All tasks settle regardless of individual failure; the report only
    /// aggregates counts.
    pub async fn run_once(&self) -> ResultEngine<BatchReport> {
        let cutoff = Utc::now() - Duration::days(self.config.inactive_after_days);
        let users = self.registry.users_active_since(cutoff).await?;
        tracing::info!(users = users.len(), "starting forecast batch");

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut tasks = JoinSet::new();

        for user_id in users {
            let engine = self.engine.clone();
            let semaphore = semaphore.clone();
            let (lookback, horizon) = (self.config.lookback_days, self.config.horizon_days);

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return false;
                };
                match engine.regenerate(&user_id, lookback, horizon).await {
                    Ok(_) => true,
                    Err(err) => {
                        tracing::warn!(user = %user_id, "forecast generation failed: {err}");
                        false
                    }
                }
            });
        }

        let mut report = BatchReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(true) => report.succeeded += 1,
                Ok(false) => report.failed += 1,
                Err(err) => {
                    tracing::error!("forecast task panicked: {err}");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}
