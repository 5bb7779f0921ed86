//! Sheet Catalog Server Library
//!
//! This library exposes the internal modules for testing and the import tool.

pub mod cache;
pub mod catalog_store;
pub mod config;
pub mod formatting;
pub mod name_resolution;
pub mod server;
pub mod sqlite_persistence;
pub mod tsv_import;

// Re-export commonly used types for convenience
pub use catalog_store::{SqliteCatalogStore, SqlitePersonStore, SqlitePieceStore};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
