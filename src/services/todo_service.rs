use tracing::{debug, warn};

use crate::{
    db::dao::{DaoLayerError, DaoResult, TodoDao},
    db::entities::todo,
    error::AppError,
};

/// The five todo operations. Holds no state between calls beyond the DAO's
/// connection handle.
///
/// With `surface_storage_errors` off, a failed storage call is logged and the
/// operation carries on with a fallback value: creates report id 0, reads look
/// empty, writes look successful.
#[derive(Clone)]
pub struct TodoService {
    todo_dao: TodoDao,
    surface_storage_errors: bool,
}

impl TodoService {
    pub fn new(todo_dao: TodoDao, surface_storage_errors: bool) -> Self {
        Self {
            todo_dao,
            surface_storage_errors,
        }
    }

    pub async fn create(&self, title: &str, completed: i32) -> Result<u32, AppError> {
        let id = self.settle("create", self.todo_dao.create(title, completed).await, 0)?;
        debug!(id, completed, "todo created");
        Ok(id)
    }

    /// Every live todo. An empty table is reported as not found.
    pub async fn list(&self) -> Result<Vec<todo::Model>, AppError> {
        let todos = self.settle("list", self.todo_dao.list().await, Vec::new())?;
        if todos.is_empty() {
            return Err(AppError::todo_not_found());
        }
        Ok(todos)
    }

    pub async fn require(&self, id: u32) -> Result<todo::Model, AppError> {
        self.settle("find", self.todo_dao.find_by_id(id).await, None)?
            .ok_or_else(AppError::todo_not_found)
    }

    /// Overwrites both fields, one statement each. There is no transaction
    /// around the pair, so a failure in between leaves only the title changed.
    pub async fn update(&self, id: u32, title: &str, completed: i32) -> Result<(), AppError> {
        self.require(id).await?;
        self.settle("update title", self.todo_dao.update_title(id, title).await, ())?;
        self.settle(
            "update completed",
            self.todo_dao.update_completed(id, completed).await,
            (),
        )?;
        debug!(id, "todo updated");
        Ok(())
    }

    pub async fn delete(&self, id: u32) -> Result<(), AppError> {
        self.require(id).await?;
        self.settle("delete", self.todo_dao.delete(id).await, ())?;
        debug!(id, "todo deleted");
        Ok(())
    }

    fn settle<T>(
        &self,
        op: &'static str,
        result: DaoResult<T>,
        fallback: T,
    ) -> Result<T, AppError> {
        match result {
            Ok(value) => Ok(value),
            Err(err) if self.surface_storage_errors => {
                if matches!(err, DaoLayerError::Db(_)) {
                    tracing::error!(op, error = %err, "storage call failed");
                }
                Err(err.into())
            }
            Err(err) => {
                warn!(op, error = %err, "storage call failed; answering as if it succeeded");
                Ok(fallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult};

    use super::TodoService;
    use crate::config::DeleteMode;
    use crate::db::dao::TodoDao;
    use crate::db::entities::todo;
    use crate::error::AppError;

    fn todo_model(id: u32, title: &str, completed: i32) -> todo::Model {
        let now = FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid");
        todo::Model {
            id,
            title: title.to_string(),
            completed,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn touched(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn service(db: &DatabaseConnection, surface_storage_errors: bool) -> TodoService {
        TodoService::new(TodoDao::new(db, DeleteMode::Soft), surface_storage_errors)
    }

    #[tokio::test]
    async fn list_reports_an_empty_table_as_not_found() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<todo::Model>::new()])
            .into_connection();

        let err = service(&db, false).list().await.expect_err("empty list");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_failure_is_swallowed_by_default() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_exec_errors([DbErr::Custom("insert failed".to_string())])
            .into_connection();

        let id = service(&db, false)
            .create("Buy milk", 1)
            .await
            .expect("failure should be absorbed");
        assert_eq!(id, 0);
    }

    #[tokio::test]
    async fn create_failure_is_surfaced_when_configured() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_exec_errors([DbErr::Custom("insert failed".to_string())])
            .into_connection();

        let err = service(&db, true)
            .create("Buy milk", 1)
            .await
            .expect_err("failure should surface");
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn lookup_failure_reads_as_not_found_by_default() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_errors([DbErr::Custom("lookup failed".to_string())])
            .into_connection();

        let err = service(&db, false).require(5).await.expect_err("missing");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_issues_one_statement_per_field() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![todo_model(4, "Old", 1)]])
            .append_exec_results([touched(1), touched(1)])
            .into_connection();

        service(&db, false)
            .update(4, "New", 0)
            .await
            .expect("update should succeed");

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 3);
        assert!(format!("{:?}", log[1]).contains("`title` = ?"));
        assert!(format!("{:?}", log[2]).contains("`completed` = ?"));
    }

    #[tokio::test]
    async fn update_stops_at_the_existence_check() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<todo::Model>::new()])
            .into_connection();

        let err = service(&db, false)
            .update(4, "New", 0)
            .await
            .expect_err("row is missing");
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn update_keeps_the_title_when_the_second_write_fails() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![todo_model(4, "Old", 1)]])
            .append_exec_results([touched(1)])
            .append_exec_errors([DbErr::Custom("lost connection".to_string())])
            .into_connection();

        let err = service(&db, true)
            .update(4, "New", 0)
            .await
            .expect_err("second write fails");
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn delete_rejects_zero_without_touching_storage() {
        let db = MockDatabase::new(DatabaseBackend::MySql).into_connection();

        let err = service(&db, true).delete(0).await.expect_err("id 0");
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(db.into_transaction_log().is_empty());
    }
}
