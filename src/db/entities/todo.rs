use sea_orm::entity::prelude::*;

use crate::db::dao::base_traits::SoftDeleteColumns;

/// Stored shape of a todo. `completed` stays an integer column (0/1) so the
/// table matches the one existing deployments already have.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "todo_models")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u32,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    #[sea_orm(default_value = 0)]
    pub completed: i32,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(indexed)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl ActiveModelBehavior for ActiveModel {}

impl SoftDeleteColumns for Entity {
    fn id_column() -> Self::Column {
        Column::Id
    }

    fn updated_at_column() -> Self::Column {
        Column::UpdatedAt
    }

    fn deleted_at_column() -> Self::Column {
        Column::DeletedAt
    }
}
