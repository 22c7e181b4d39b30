use sea_orm::DatabaseConnection;

use super::TodoDao;
use crate::config::DeleteMode;

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
    delete_mode: DeleteMode,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection, delete_mode: DeleteMode) -> Self {
        Self {
            db: db.clone(),
            delete_mode,
        }
    }

    pub fn todo(&self) -> TodoDao {
        TodoDao::new(&self.db, self.delete_mode)
    }
}
