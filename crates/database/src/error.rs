use models::CatalogError;
use sea_orm::DbErr;
use thiserror::Error;

/// Failure of a store operation: either the database or a catalogue rule
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbErr),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Catalog(CatalogError::Serialization(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
