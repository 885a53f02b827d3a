use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("connect to database")
}

/// Apply pending migrations. A failure is logged and startup continues.
pub async fn migrate(db: &PgPool) {
    match sqlx::migrate!("./migrations").run(db).await {
        Ok(()) => info!("migrations applied"),
        Err(e) => warn!(error = %e, "migration failed; continuing"),
    }
}
