use sea_orm::DatabaseConnection;

use crate::{
    config::AppConfig, db::dao::DaoContext, services::todo_service::TodoService, state::AppState,
};

#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
    surface_storage_errors: bool,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection, config: &AppConfig) -> Self {
        Self {
            daos: DaoContext::new(db, config.database.delete_mode),
            surface_storage_errors: config.todo.surface_storage_errors,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db, &state.config)
    }

    pub fn todo(&self) -> TodoService {
        TodoService::new(self.daos.todo(), self.surface_storage_errors)
    }
}
