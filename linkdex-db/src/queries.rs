//! Filtered listing queries for the resource catalog.
//!
//! The listing SQL is assembled dynamically from whichever filter fields are
//! present. Every value is bound as a parameter; the sort column is the one
//! position SQLite cannot parameterize, so it is restricted to the
//! [`SortField`] allow-list and caller text never reaches the query verbatim.

use linkdex_catalog::{Resource, ResourceView};
use rusqlite::Connection;
use rusqlite::types::ToSql;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Unknown sort field: '{0}'")]
    InvalidSortField(String),
    #[error("Unknown sort order: '{0}' (expected ASC or DESC)")]
    InvalidSortOrder(String),
}

/// Optional constraints for a resource listing.
///
/// Absent fields impose no constraint; present fields are ANDed together.
/// The sort fields are loosely typed because callers hand them over as raw
/// query strings; they are validated before any SQL is built.
#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    pub type_id: Option<i64>,
    pub internal: Option<bool>,
    pub obsolete: Option<bool>,
    /// Case-insensitive substring match against the tags column.
    pub tags: Option<String>,
    /// Case-insensitive substring match against name or description.
    pub search: Option<String>,
    /// Sort column; must parse as a [`SortField`]. Default: `created_at`.
    pub sort_by: Option<String>,
    /// `ASC` or `DESC` (any casing). Default: descending.
    pub sort_order: Option<String>,
}

/// Columns a listing may be sorted by.
///
/// This is the allow-list for the ORDER BY position. Anything that does not
/// parse here is rejected before the SQL is assembled, so a hostile
/// `sort_by` can never alter query semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Url,
    TypeId,
    TypeName,
    Internal,
    DateCreated,
    Obsolete,
    CreatedAt,
}

impl SortField {
    pub fn parse(s: &str) -> Result<Self, QueryError> {
        match s {
            "name" => Ok(Self::Name),
            "url" => Ok(Self::Url),
            "type_id" => Ok(Self::TypeId),
            "type_name" => Ok(Self::TypeName),
            "internal" => Ok(Self::Internal),
            "date_created" => Ok(Self::DateCreated),
            "obsolete" => Ok(Self::Obsolete),
            "created_at" => Ok(Self::CreatedAt),
            other => Err(QueryError::InvalidSortField(other.to_string())),
        }
    }

    /// Qualified column text placed into the ORDER BY clause.
    fn column(self) -> &'static str {
        match self {
            Self::Name => "r.name",
            Self::Url => "r.url",
            Self::TypeId => "r.type_id",
            Self::TypeName => "t.name",
            Self::Internal => "r.internal",
            Self::DateCreated => "r.date_created",
            Self::Obsolete => "r.obsolete",
            Self::CreatedAt => "r.created_at",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Result<Self, QueryError> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(QueryError::InvalidSortOrder(s.to_string()))
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// List resources joined with their type name, filtered and sorted.
///
/// Returns the conjunction of exactly the supplied filter fields. An unknown
/// sort field or order is rejected with a [`QueryError`] before the database
/// is touched (no silent fallback).
pub fn list_resources(
    conn: &Connection,
    filter: &ResourceFilter,
) -> Result<Vec<ResourceView>, QueryError> {
    let sort_field = match filter.sort_by.as_deref() {
        Some(s) => SortField::parse(s)?,
        None => SortField::CreatedAt,
    };
    let sort_order = match filter.sort_order.as_deref() {
        Some(s) => SortOrder::parse(s)?,
        None => SortOrder::Desc,
    };

    let mut sql = String::from(
        "SELECT r.id, r.name, r.description, r.url, r.type_id, r.internal,
                r.date_created, r.tags, r.obsolete, r.created_at, t.name
         FROM resources r
         LEFT JOIN resource_types t ON r.type_id = t.id
         WHERE 1=1",
    );
    let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(type_id) = filter.type_id {
        sql.push_str(" AND r.type_id = ?");
        param_values.push(Box::new(type_id));
    }
    if let Some(internal) = filter.internal {
        sql.push_str(" AND r.internal = ?");
        param_values.push(Box::new(internal));
    }
    if let Some(obsolete) = filter.obsolete {
        sql.push_str(" AND r.obsolete = ?");
        param_values.push(Box::new(obsolete));
    }
    if let Some(tags) = &filter.tags {
        sql.push_str(" AND r.tags LIKE ?");
        param_values.push(Box::new(format!("%{tags}%")));
    }
    if let Some(search) = &filter.search {
        sql.push_str(" AND (r.name LIKE ? OR r.description LIKE ?)");
        let pattern = format!("%{search}%");
        param_values.push(Box::new(pattern.clone()));
        param_values.push(Box::new(pattern));
    }

    sql.push_str(" ORDER BY ");
    sql.push_str(sort_field.column());
    sql.push(' ');
    sql.push_str(sort_order.keyword());

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn ToSql> = param_values.iter().map(|v| v.as_ref()).collect();
    let rows = stmt.query_map(params.as_slice(), row_to_view)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

fn row_to_view(row: &rusqlite::Row<'_>) -> rusqlite::Result<ResourceView> {
    Ok(ResourceView {
        resource: Resource {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            url: row.get(3)?,
            type_id: row.get(4)?,
            internal: row.get(5)?,
            date_created: row.get(6)?,
            tags: row.get(7)?,
            obsolete: row.get(8)?,
            created_at: row.get(9)?,
        },
        type_name: row.get(10)?,
    })
}
