use std::sync::Arc;

use axum::Router;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

use crate::{config::AppConfig, routes::app, state::AppState};

/// Scripted storage for tests. Queries and execs are answered in the order
/// their results were appended.
pub fn mock_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::MySql)
}

pub fn test_state(config: AppConfig, db: DatabaseConnection) -> Arc<AppState> {
    AppState::new(config, db)
}

/// The full application, middleware included, over the given connection and
/// default configuration.
pub fn test_router(db: DatabaseConnection) -> Router {
    test_router_with(AppConfig::default(), db)
}

pub fn test_router_with(config: AppConfig, db: DatabaseConnection) -> Router {
    app(test_state(config, db))
}
