//! CSV bulk import with row-isolated failure handling.
//!
//! Rows are processed independently in file order: a failing row is recorded
//! in the summary and never aborts the batch or rolls back earlier rows.
//! Only a structural CSV failure (or a failure to load the type table)
//! aborts the whole pipeline.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use linkdex_catalog::NewResource;
use linkdex_db::operations::{OperationError, insert_resource};
use rusqlite::Connection;
use thiserror::Error;

use crate::progress::ImportProgress;
use crate::resolver::TypeResolver;

#[derive(Debug, Error)]
pub enum ImportError {
    /// Malformed CSV structure. Distinct from per-row content errors, which
    /// are collected in the summary instead.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
}

/// Aggregated result of a bulk import.
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub imported: u64,
    pub errors: u64,
    /// Failed rows in original file order.
    pub error_details: Vec<RowError>,
}

/// A single failed row: its 1-based data row number, the raw record, and
/// the error message.
#[derive(Debug, Clone)]
pub struct RowError {
    pub row: usize,
    pub record: csv::StringRecord,
    pub message: String,
}

/// Recognized header names. Extra columns are ignored; missing ones default.
#[derive(Debug, Default)]
struct Columns {
    name: Option<usize>,
    description: Option<usize>,
    url: Option<usize>,
    type_name: Option<usize>,
    internal: Option<usize>,
    date_created: Option<usize>,
    tags: Option<usize>,
    obsolete: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut cols = Self::default();
        for (i, header) in headers.iter().enumerate() {
            match header.trim() {
                "Name" => cols.name = Some(i),
                "Description" => cols.description = Some(i),
                "URL" => cols.url = Some(i),
                "Type" => cols.type_name = Some(i),
                "Internal" => cols.internal = Some(i),
                "Date Created" => cols.date_created = Some(i),
                "Tags" => cols.tags = Some(i),
                "Obsolete" => cols.obsolete = Some(i),
                _ => {}
            }
        }
        cols
    }
}

fn field<'r>(record: &'r csv::StringRecord, idx: Option<usize>) -> &'r str {
    idx.and_then(|i| record.get(i)).unwrap_or("")
}

/// Parse a lifecycle flag column: true only for the literal `"true"` or `"1"`.
fn parse_flag(s: &str) -> bool {
    matches!(s.trim(), "true" | "1")
}

/// Parse a `Date Created` cell into an RFC 3339 timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, and bare `YYYY-MM-DD`. Anything
/// else (including an empty cell) yields `None`, and storage falls back to
/// the current time.
fn parse_date(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).to_rfc3339());
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&ndt).to_rfc3339());
    }
    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let ndt = nd.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&ndt).to_rfc3339());
    }
    log::warn!("Unparseable Date Created value '{s}', defaulting to now");
    None
}

/// Import resources from a CSV byte stream.
///
/// The stream must carry a header row; columns are matched by name, not
/// position. Each data row is inserted independently — validation and
/// storage failures are collected per row while the batch continues. There
/// is no batch transaction by design: earlier successes stay committed.
pub fn import_resources<R: Read>(
    conn: &Connection,
    reader: R,
    progress: Option<&dyn ImportProgress>,
) -> Result<ImportSummary, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let cols = Columns::from_headers(&headers);

    // Structural failure here aborts the pipeline before any row is written.
    let records: Vec<csv::StringRecord> =
        csv_reader.records().collect::<Result<_, _>>()?;

    let resolver = TypeResolver::load(conn)?;

    let total = records.len();
    if let Some(p) = progress {
        p.on_phase(&format!("Importing {total} row(s)"));
    }

    let mut summary = ImportSummary::default();
    for (i, record) in records.iter().enumerate() {
        let row = i + 1;
        let name = field(record, cols.name).to_string();
        let payload = NewResource {
            name: name.clone(),
            description: field(record, cols.description).to_string(),
            url: field(record, cols.url).to_string(),
            type_id: resolver.resolve(field(record, cols.type_name)),
            internal: parse_flag(field(record, cols.internal)),
            date_created: parse_date(field(record, cols.date_created)),
            tags: field(record, cols.tags).to_string(),
            obsolete: parse_flag(field(record, cols.obsolete)),
        };

        match insert_resource(conn, &payload) {
            Ok(_) => summary.imported += 1,
            Err(e) => {
                log::warn!("Import row {row} ('{name}') failed: {e}");
                summary.errors += 1;
                summary.error_details.push(RowError {
                    row,
                    record: record.clone(),
                    message: e.to_string(),
                });
            }
        }

        if let Some(p) = progress {
            p.on_row(row, total, &name);
        }
    }

    if let Some(p) = progress {
        p.on_complete(&format!(
            "Imported {} resource(s), {} error(s)",
            summary.imported, summary.errors
        ));
    }

    Ok(summary)
}

/// Import from an uploaded CSV file, consuming it.
///
/// The file is removed on every exit path — after a completed batch and
/// after a pipeline-level failure alike — so a consumed upload never
/// lingers on disk.
pub fn import_upload(
    conn: &Connection,
    path: &Path,
    progress: Option<&dyn ImportProgress>,
) -> Result<ImportSummary, ImportError> {
    let _cleanup = RemoveOnDrop { path };
    let file = File::open(path)?;
    import_resources(conn, file, progress)
}

struct RemoveOnDrop<'a> {
    path: &'a Path,
}

impl Drop for RemoveOnDrop<'_> {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(self.path) {
            log::warn!("Failed to remove uploaded file {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(parse_flag(" true "));
        assert!(!parse_flag("TRUE"));
        assert!(!parse_flag("yes"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_parse_date_rfc3339() {
        assert_eq!(
            parse_date("2024-03-01T12:30:00+00:00").as_deref(),
            Some("2024-03-01T12:30:00+00:00")
        );
    }

    #[test]
    fn test_parse_date_naive_formats() {
        assert_eq!(
            parse_date("2024-03-01 12:30:00").as_deref(),
            Some("2024-03-01T12:30:00+00:00")
        );
        assert_eq!(
            parse_date("2024-03-01").as_deref(),
            Some("2024-03-01T00:00:00+00:00")
        );
    }

    #[test]
    fn test_parse_date_garbage_defaults() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("next tuesday"), None);
    }

    #[test]
    fn test_columns_ignore_unknown_headers() {
        let headers = csv::StringRecord::from(vec!["Name", "Color", "URL"]);
        let cols = Columns::from_headers(&headers);
        assert_eq!(cols.name, Some(0));
        assert_eq!(cols.url, Some(2));
        assert_eq!(cols.description, None);
    }
}
