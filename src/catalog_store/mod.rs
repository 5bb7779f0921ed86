mod error;
mod models;
mod person_store;
mod piece_store;
mod query;
mod schema;
mod store;
mod trait_def;

pub use error::{CatalogError, CatalogResult};
pub use models::*;
pub use person_store::SqlitePersonStore;
pub use piece_store::SqlitePieceStore;
pub use query::{
    Pagination, PieceFilter, PieceQuery, QueryError, SortField, SortOrder, Sorting, DEFAULT_LIMIT,
    DEFAULT_PAGE, MAX_LIMIT,
};
pub use schema::CATALOG_VERSIONED_SCHEMAS;
pub use store::{SqliteCatalogStore, DEFAULT_READ_POOL_SIZE};
pub use trait_def::{PersonStore, PieceStore, Repository};
