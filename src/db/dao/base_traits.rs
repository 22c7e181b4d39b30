/// Column handles the generic DAO needs to address a row by id and to keep
/// soft-deleted rows out of every read.
pub trait SoftDeleteColumns: sea_orm::EntityTrait {
    fn id_column() -> Self::Column;
    fn updated_at_column() -> Self::Column;
    fn deleted_at_column() -> Self::Column;
}
