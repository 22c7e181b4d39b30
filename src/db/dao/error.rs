use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaoLayerError {
    #[error("Database error: {0}")]
    Db(#[source] DbErr),
    #[error("{entity} not found (id={id})")]
    NotFound { entity: &'static str, id: u32 },
}

pub type DaoResult<T> = Result<T, DaoLayerError>;
