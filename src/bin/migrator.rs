use dotenvy::dotenv;
use todo_gateway::{
    infrastructure::{config::Config, db},
    telemetry,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    telemetry::init();

    let config = Config::from_env()?;
    anyhow::ensure!(
        config.database.backend == "postgres",
        "migrator requires the postgres backend, got {}",
        config.database.backend
    );
    let pool = db::connect(&config.database).await?;
    db::run_migrations(&pool).await?;
    pool.close().await;

    info!(database = %config.database.redacted_url(), "database migrations completed");

    Ok(())
}
