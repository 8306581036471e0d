//! CSV bulk transfer pipelines for the resource catalog.
//!
//! This crate owns the import/export logic: streaming CSV import with
//! row-isolated failure handling, export with guaranteed spool cleanup, and
//! the case-insensitive type-name resolver that maps the CSV `Type` column
//! to identifiers.

pub mod export;
pub mod import;
pub mod progress;
pub mod resolver;

pub use export::{EXPORT_HEADER, ExportError, ExportSpool, export_resources, export_spool};
pub use import::{ImportError, ImportSummary, RowError, import_resources, import_upload};
pub use progress::{ImportProgress, LogProgress, SilentProgress};
pub use resolver::TypeResolver;
