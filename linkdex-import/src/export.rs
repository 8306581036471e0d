//! CSV export of the full resource listing.
//!
//! Export uses the same header names the import pipeline reads, so an
//! exported file round-trips (type names re-resolve to ids on the way back
//! in). The spooled variant backs the CSV with a temp file that is deleted
//! on drop, covering both the success and the delivery-failure path.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use linkdex_db::queries::{QueryError, ResourceFilter, list_resources};
use rusqlite::Connection;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Export column order, matching what the import pipeline recognizes.
/// `Type` carries the resolved type name, empty when the resource has none.
pub const EXPORT_HEADER: [&str; 8] = [
    "Name",
    "Description",
    "URL",
    "Type",
    "Internal",
    "Date Created",
    "Tags",
    "Obsolete",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Query error: {0}")]
    Query(#[from] QueryError),
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Export produced non-UTF-8 output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serialize the full resource listing (no filter) to CSV text.
pub fn export_resources(conn: &Connection) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(conn, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Write the full resource listing as CSV to a temp file and hand back a
/// readable spool. The backing file is removed when the spool is dropped,
/// whether or not delivery completed.
pub fn export_spool(conn: &Connection) -> Result<ExportSpool, ExportError> {
    let mut file = NamedTempFile::new()?;
    write_csv(conn, &mut file)?;
    file.seek(SeekFrom::Start(0))?;
    Ok(ExportSpool { file })
}

/// A spooled CSV export. Readable front to back; deletes its backing file
/// on drop.
#[derive(Debug)]
pub struct ExportSpool {
    file: NamedTempFile,
}

impl ExportSpool {
    /// Path of the backing temp file, valid until the spool is dropped.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Read for ExportSpool {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

fn write_csv<W: Write>(conn: &Connection, out: W) -> Result<(), ExportError> {
    let views = list_resources(conn, &ResourceFilter::default())?;

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(EXPORT_HEADER)?;
    for view in &views {
        let r = &view.resource;
        writer.write_record([
            r.name.as_str(),
            r.description.as_str(),
            r.url.as_str(),
            view.type_name.as_deref().unwrap_or(""),
            if r.internal { "true" } else { "false" },
            r.date_created.as_str(),
            r.tags.as_str(),
            if r.obsolete { "true" } else { "false" },
        ])?;
    }
    writer.flush()?;
    Ok(())
}
