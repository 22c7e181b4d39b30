use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::config::DatabaseConfig;

/// Opens the pooled connection and creates/extends the schema from the entity
/// definitions. Any failure here is fatal to startup.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(cfg.url.clone());
    options
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_idle)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!(backend = ?db.get_database_backend(), "connected to database");

    info!("syncing database schema from entities");
    db.get_schema_registry("todo_api::db::entities::*")
        .sync(&db)
        .await?;
    Ok(db)
}
