use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::config::DeleteMode;
use crate::db::entities::{prelude::Todo, todo};

#[derive(Clone)]
pub struct TodoDao {
    db: DatabaseConnection,
    delete_mode: DeleteMode,
}

impl DaoBase for TodoDao {
    type Entity = Todo;
    const ENTITY_NAME: &'static str = "todo";

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    fn delete_mode(&self) -> DeleteMode {
        self.delete_mode
    }
}

impl TodoDao {
    pub fn new(db: &DatabaseConnection, delete_mode: DeleteMode) -> Self {
        Self {
            db: db.clone(),
            delete_mode,
        }
    }

    /// Inserts a row and returns the id the database assigned to it.
    pub async fn create(&self, title: &str, completed: i32) -> DaoResult<u32> {
        let now = Utc::now().fixed_offset();
        let model = todo::ActiveModel {
            title: Set(title.to_string()),
            completed: Set(completed),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        };
        let result = Todo::insert(model)
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.last_insert_id)
    }

    // No ORDER BY: rows come back in whatever order the database yields.
    pub async fn list(&self) -> DaoResult<Vec<todo::Model>> {
        self.find_active()
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn find_by_id(&self, id: u32) -> DaoResult<Option<todo::Model>> {
        // Auto-increment starts at 1, so 0 can never name a row.
        if id == 0 {
            return Ok(None);
        }
        self.find_active_by_id(id)
            .one(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn update_title(&self, id: u32, title: &str) -> DaoResult<()> {
        self.set_column(id, todo::Column::Title, title.to_string().into())
            .await
    }

    pub async fn update_completed(&self, id: u32, completed: i32) -> DaoResult<()> {
        self.set_column(id, todo::Column::Completed, completed.into())
            .await
    }

    pub async fn delete(&self, id: u32) -> DaoResult<()> {
        self.remove(id).await
    }
}
