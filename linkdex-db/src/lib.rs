//! SQLite persistence layer for the resource catalog.
//!
//! Provides schema creation, CRUD operations, and the filtered listing
//! query compiler, backed by SQLite (via rusqlite with bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    CatalogStats, OperationError, catalog_stats, create_type, delete_resource, delete_type,
    get_resource, insert_resource, list_types, update_resource,
};
pub use queries::{QueryError, ResourceFilter, SortField, SortOrder, list_resources};
pub use schema::{open_database, open_memory};
