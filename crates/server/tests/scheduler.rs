use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use engine::{
    BalanceRepository, CashRecord, EngineError, ForecastEngine, ForecastResult, ForecastStore,
    ResultEngine, TransactionRepository, UserRegistry,
};
use server::{BatchReport, Scheduler, SchedulerConfig};

/// A ledger that errors for one specific user and is empty for the rest.
struct FlakyLedger {
    failing_user: Option<String>,
}

impl FlakyLedger {
    fn check(&self, user_id: &str) -> ResultEngine<()> {
        if self.failing_user.as_deref() == Some(user_id) {
            return Err(EngineError::KeyNotFound(format!(
                "records unavailable for {user_id}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionRepository for FlakyLedger {
    async fn inflows_between(
        &self,
        user_id: &str,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> ResultEngine<Vec<CashRecord>> {
        self.check(user_id)?;
        Ok(Vec::new())
    }

    async fn outflows_between(
        &self,
        user_id: &str,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> ResultEngine<Vec<CashRecord>> {
        self.check(user_id)?;
        Ok(Vec::new())
    }

    async fn settled_inflow_total(&self, user_id: &str) -> ResultEngine<i64> {
        self.check(user_id)?;
        Ok(0)
    }

    async fn settled_outflow_total(&self, user_id: &str) -> ResultEngine<i64> {
        self.check(user_id)?;
        Ok(0)
    }
}

struct NoBalance;

#[async_trait]
impl BalanceRepository for NoBalance {
    async fn balance_snapshot(&self, _user_id: &str) -> ResultEngine<Option<i64>> {
        Ok(None)
    }
}

#[derive(Default)]
struct SharedStore {
    saved: Mutex<Vec<String>>,
}

#[async_trait]
impl ForecastStore for SharedStore {
    async fn load(&self, _user_id: &str) -> ResultEngine<Option<ForecastResult>> {
        Ok(None)
    }

    async fn save(&self, user_id: &str, _forecast: &ForecastResult) -> ResultEngine<()> {
        self.saved.lock().unwrap().push(user_id.to_string());
        Ok(())
    }
}

struct FixedRegistry {
    users: Vec<String>,
    seen_cutoff: Mutex<Option<DateTime<Utc>>>,
}

#[async_trait]
impl UserRegistry for FixedRegistry {
    async fn users_active_since(&self, cutoff: DateTime<Utc>) -> ResultEngine<Vec<String>> {
        *self.seen_cutoff.lock().unwrap() = Some(cutoff);
        Ok(self.users.clone())
    }
}

fn scheduler_with(
    users: &[&str],
    failing_user: Option<&str>,
    config: SchedulerConfig,
) -> (Scheduler, Arc<SharedStore>, Arc<FixedRegistry>) {
    let store = Arc::new(SharedStore::default());
    let registry = Arc::new(FixedRegistry {
        users: users.iter().map(|u| u.to_string()).collect(),
        seen_cutoff: Mutex::new(None),
    });
    let engine = ForecastEngine::builder()
        .transactions(Arc::new(FlakyLedger {
            failing_user: failing_user.map(|u| u.to_string()),
        }))
        .balances(Arc::new(NoBalance))
        .store(store.clone())
        .build()
        .unwrap();

    (
        Scheduler::new(Arc::new(engine), registry.clone(), config),
        store,
        registry,
    )
}

#[tokio::test]
async fn one_failing_user_does_not_block_the_others() {
    let (scheduler, store, _registry) = scheduler_with(
        &["alice", "bob", "carol"],
        Some("bob"),
        SchedulerConfig::default(),
    );

    let report = scheduler.run_once().await.unwrap();

    assert_eq!(
        report,
        BatchReport {
            succeeded: 2,
            failed: 1
        }
    );
    let mut saved = store.saved.lock().unwrap().clone();
    saved.sort();
    assert_eq!(saved, vec!["alice".to_string(), "carol".to_string()]);
}

#[tokio::test]
async fn inactivity_cutoff_is_ninety_days() {
    let (scheduler, _store, registry) =
        scheduler_with(&[], None, SchedulerConfig::default());

    let before = Utc::now() - Duration::days(90);
    scheduler.run_once().await.unwrap();
    let after = Utc::now() - Duration::days(90);

    let cutoff = registry.seen_cutoff.lock().unwrap().expect("cutoff passed");
    assert!(cutoff >= before && cutoff <= after);
}

#[tokio::test]
async fn empty_batch_reports_zero() {
    let (scheduler, store, _registry) =
        scheduler_with(&[], None, SchedulerConfig::default());

    let report = scheduler.run_once().await.unwrap();

    assert_eq!(report, BatchReport::default());
    assert!(store.saved.lock().unwrap().is_empty());
}

#[tokio::test]
async fn bounded_pool_still_processes_every_user() {
    let users: Vec<String> = (0..20).map(|i| format!("user-{i}")).collect();
    let user_refs: Vec<&str> = users.iter().map(String::as_str).collect();
    let config = SchedulerConfig {
        max_concurrency: 2,
        ..Default::default()
    };
    let (scheduler, store, _registry) = scheduler_with(&user_refs, None, config);

    let report = scheduler.run_once().await.unwrap();

    assert_eq!(report.succeeded, 20);
    assert_eq!(report.failed, 0);
    assert_eq!(store.saved.lock().unwrap().len(), 20);
}
