use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{0}")]
    Conflict(String),

    #[error("Person {0} does not exist")]
    UnknownPerson(i64),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn person_not_found(id: i64) -> Self {
        CatalogError::NotFound {
            entity: "Person",
            id,
        }
    }

    pub fn piece_not_found(id: i64) -> Self {
        CatalogError::NotFound { entity: "Piece", id }
    }
}

pub(super) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
