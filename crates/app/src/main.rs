use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "cashcast={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    if let Some(server) = settings.server {
        tracing::info!("Found server settings...");
        let db = parse_database(&server.database).await?;
        let store = Arc::new(engine::SeaOrmStore::new(db.clone()));

        let server_engine = build_engine(&db)?;
        let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
        let addr = format!("{}:{}", bind, server.port);
        let server_db = db.clone();
        tasks.spawn(async move {
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!("failed to bind server listener: {err}");
                    return;
                }
            };
            if let Err(err) = server::run_with_listener(server_engine, server_db, listener).await {
                tracing::error!("server failed: {err}");
            }
        });

        let scheduler_settings = settings.scheduler.unwrap_or_default();
        if scheduler_settings.enabled.unwrap_or(true) {
            tracing::info!("Starting forecast scheduler...");
            let mut config = server::SchedulerConfig::default();
            if let Some(value) = scheduler_settings.lookback_days {
                config.lookback_days = value;
            }
            if let Some(value) = scheduler_settings.horizon_days {
                config.horizon_days = value;
            }
            if let Some(value) = scheduler_settings.inactive_after_days {
                config.inactive_after_days = value;
            }
            if let Some(value) = scheduler_settings.max_concurrency {
                config.max_concurrency = value;
            }

            let scheduler =
                server::Scheduler::new(Arc::new(build_engine(&db)?), store.clone(), config);
            tasks.spawn(async move {
                scheduler.run().await;
            });
        }
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

fn build_engine(
    db: &sea_orm::DatabaseConnection,
) -> Result<engine::ForecastEngine, engine::EngineError> {
    engine::ForecastEngine::builder()
        .database(db.clone())
        .config(engine::ForecastConfig::production())
        .build()
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
