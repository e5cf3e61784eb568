use chrono::{Days, Duration, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    BalanceRepository, ForecastEngine, ForecastStore, SeaOrmStore, TransactionRepository,
    UserRegistry,
};
use migration::MigratorTrait;

async fn store_with_db() -> (SeaOrmStore, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    exec(
        &db,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    )
    .await;
    (SeaOrmStore::new(db.clone()), db)
}

async fn exec(db: &DatabaseConnection, sql: &str, values: Vec<sea_orm::Value>) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(backend, sql, values))
        .await
        .unwrap();
}

async fn insert_invoice(db: &DatabaseConnection, date: Option<&str>, amount: i64, status: &str) {
    exec(
        db,
        "INSERT INTO invoices (id, user_id, issued_on, amount_minor, status) \
         VALUES (?, ?, ?, ?, ?)",
        vec![
            Uuid::new_v4().to_string().into(),
            "alice".into(),
            date.map(|d| d.parse::<NaiveDate>().unwrap()).into(),
            amount.into(),
            status.into(),
        ],
    )
    .await;
}

async fn insert_expense(db: &DatabaseConnection, date: Option<&str>, amount: i64, status: &str) {
    exec(
        db,
        "INSERT INTO expenses (id, user_id, paid_on, amount_minor, status) \
         VALUES (?, ?, ?, ?, ?)",
        vec![
            Uuid::new_v4().to_string().into(),
            "alice".into(),
            date.map(|d| d.parse::<NaiveDate>().unwrap()).into(),
            amount.into(),
            status.into(),
        ],
    )
    .await;
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[tokio::test]
async fn inflows_respect_the_window_and_keep_dateless_rows() {
    let (store, db) = store_with_db().await;
    insert_invoice(&db, Some("2026-03-05"), 100, "settled").await;
    insert_invoice(&db, Some("2026-02-01"), 999, "settled").await;
    insert_invoice(&db, None, 50, "pending").await;

    let records = store
        .inflows_between("alice", date("2026-03-01"), date("2026-03-10"))
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().any(|r| r.date == Some(date("2026-03-05"))));
    assert!(records.iter().any(|r| r.date.is_none()));
}

#[tokio::test]
async fn outflows_are_scoped_per_user() {
    let (store, db) = store_with_db().await;
    exec(
        &db,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["bob".into(), "password".into()],
    )
    .await;
    insert_expense(&db, Some("2026-03-05"), 40, "settled").await;
    exec(
        &db,
        "INSERT INTO expenses (id, user_id, paid_on, amount_minor, status) \
         VALUES (?, ?, ?, ?, ?)",
        vec![
            Uuid::new_v4().to_string().into(),
            "bob".into(),
            date("2026-03-05").into(),
            7_000.into(),
            "settled".into(),
        ],
    )
    .await;

    let records = store
        .outflows_between("alice", date("2026-03-01"), date("2026-03-10"))
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].amount_minor, 40);
}

#[tokio::test]
async fn settled_totals_ignore_pending_records() {
    let (store, db) = store_with_db().await;
    insert_invoice(&db, Some("2026-01-01"), 1_000, "settled").await;
    insert_invoice(&db, Some("2026-01-02"), 2_000, "paid").await;
    insert_invoice(&db, Some("2026-01-03"), 4_000, "pending").await;
    insert_expense(&db, Some("2026-01-04"), 500, "settled").await;
    insert_expense(&db, Some("2026-01-05"), 300, "draft").await;

    assert_eq!(store.settled_inflow_total("alice").await.unwrap(), 3_000);
    assert_eq!(store.settled_outflow_total("alice").await.unwrap(), 500);
}

#[tokio::test]
async fn balance_snapshot_is_optional() {
    let (store, db) = store_with_db().await;

    assert_eq!(store.balance_snapshot("alice").await.unwrap(), None);

    exec(
        &db,
        "INSERT INTO balance_snapshots (user_id, balance_minor, updated_at) VALUES (?, ?, ?)",
        vec!["alice".into(), 12_345.into(), Utc::now().into()],
    )
    .await;

    assert_eq!(store.balance_snapshot("alice").await.unwrap(), Some(12_345));
}

#[tokio::test]
async fn forecast_round_trips_and_is_overwritten() {
    let (store, db) = store_with_db().await;
    let engine = ForecastEngine::builder()
        .database(db.clone())
        .build()
        .unwrap();

    let first = engine.regenerate("alice", 30, 14).await.unwrap();
    let loaded = store.load("alice").await.unwrap().unwrap();
    assert_eq!(loaded, first);

    let second = engine.regenerate("alice", 30, 60).await.unwrap();
    let reloaded = store.load("alice").await.unwrap().unwrap();
    assert_eq!(reloaded.horizon_days, 60);
    assert_eq!(reloaded, second);
}

#[tokio::test]
async fn pipeline_reads_real_records_end_to_end() {
    let (store, db) = store_with_db().await;
    let today = Utc::now().date_naive();
    for offset in 0..10u64 {
        let day = (today - Days::new(offset)).to_string();
        insert_invoice(&db, Some(&day), 200, "settled").await;
        insert_expense(&db, Some(&day), 50, "settled").await;
    }

    let engine = ForecastEngine::builder()
        .database(db.clone())
        .build()
        .unwrap();
    let result = engine.forecast("alice", Some(20)).await.unwrap();

    // 10 days of +150/day settled history and no snapshot.
    assert_eq!(result.current_balance, 1_500.0);
    assert_eq!(result.daily_net.len(), 20);
    assert_eq!(store.load("alice").await.unwrap().unwrap(), result);
}

#[tokio::test]
async fn active_users_filtered_by_cutoff() {
    let (store, db) = store_with_db().await;
    exec(
        &db,
        "INSERT INTO users (username, password, last_active_at) VALUES (?, ?, ?)",
        vec![
            "recent".into(),
            "password".into(),
            (Utc::now() - Duration::days(5)).into(),
        ],
    )
    .await;
    exec(
        &db,
        "INSERT INTO users (username, password, last_active_at) VALUES (?, ?, ?)",
        vec![
            "dormant".into(),
            "password".into(),
            (Utc::now() - Duration::days(120)).into(),
        ],
    )
    .await;

    let cutoff = Utc::now() - Duration::days(90);
    let users = store.users_active_since(cutoff).await.unwrap();

    // "alice" has no activity timestamp and is excluded too.
    assert_eq!(users, vec!["recent".to_string()]);
}
