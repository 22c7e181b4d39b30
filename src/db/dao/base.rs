use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Select, Value};

use super::base_traits::SoftDeleteColumns;
use super::error::{DaoLayerError, DaoResult};
use crate::config::DeleteMode;

/// Shared by-id plumbing for entities keyed by an auto-increment `u32` that
/// carry a `deleted_at` marker. Every statement built here skips rows whose
/// marker is set.
#[async_trait::async_trait]
pub trait DaoBase: Clone + Send + Sync + Sized {
    type Entity: SoftDeleteColumns + Send + Sync;
    const ENTITY_NAME: &'static str;

    fn db(&self) -> &DatabaseConnection;

    fn delete_mode(&self) -> DeleteMode;

    fn find_active(&self) -> Select<Self::Entity> {
        Self::Entity::find().filter(Self::Entity::deleted_at_column().is_null())
    }

    fn find_active_by_id(&self, id: u32) -> Select<Self::Entity> {
        self.find_active().filter(Self::Entity::id_column().eq(id))
    }

    /// Overwrites one column of a live row and bumps `updated_at`.
    async fn set_column(
        &self,
        id: u32,
        column: <Self::Entity as EntityTrait>::Column,
        value: Value,
    ) -> DaoResult<()> {
        let result = Self::Entity::update_many()
            .col_expr(column, Expr::value(value))
            .col_expr(
                Self::Entity::updated_at_column(),
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(Self::Entity::id_column().eq(id))
            .filter(Self::Entity::deleted_at_column().is_null())
            .exec(self.db())
            .await
            .map_err(DaoLayerError::Db)?;

        if result.rows_affected == 0 {
            return Err(DaoLayerError::NotFound {
                entity: Self::ENTITY_NAME,
                id,
            });
        }
        Ok(())
    }

    async fn remove(&self, id: u32) -> DaoResult<()> {
        let rows_affected = match self.delete_mode() {
            DeleteMode::Soft => {
                Self::Entity::update_many()
                    .col_expr(
                        Self::Entity::deleted_at_column(),
                        Expr::value(Utc::now().fixed_offset()),
                    )
                    .filter(Self::Entity::id_column().eq(id))
                    .filter(Self::Entity::deleted_at_column().is_null())
                    .exec(self.db())
                    .await
                    .map_err(DaoLayerError::Db)?
                    .rows_affected
            }
            DeleteMode::Hard => {
                Self::Entity::delete_many()
                    .filter(Self::Entity::id_column().eq(id))
                    .exec(self.db())
                    .await
                    .map_err(DaoLayerError::Db)?
                    .rows_affected
            }
        };

        if rows_affected == 0 {
            return Err(DaoLayerError::NotFound {
                entity: Self::ENTITY_NAME,
                id,
            });
        }
        Ok(())
    }
}
