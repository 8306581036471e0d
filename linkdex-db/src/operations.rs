//! CRUD operations for resources and resource types.

use linkdex_catalog::{NewResource, Resource, ResourceType, ResourceView};
use rusqlite::{Connection, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: i64 },
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Type already exists: '{0}'")]
    DuplicateType(String),
}

// ── Resource Operations ─────────────────────────────────────────────────────

/// Insert a new resource and return the stored row.
///
/// `date_created` defaults to the current time when absent. An empty name
/// is rejected with [`OperationError::Validation`].
pub fn insert_resource(conn: &Connection, new: &NewResource) -> Result<Resource, OperationError> {
    if new.name.trim().is_empty() {
        return Err(OperationError::Validation(
            "resource name must not be empty".to_string(),
        ));
    }

    let date_created = match &new.date_created {
        Some(d) => d.clone(),
        None => chrono::Utc::now().to_rfc3339(),
    };

    conn.execute(
        "INSERT INTO resources (name, description, url, type_id, internal, date_created, tags, obsolete)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            new.name,
            new.description,
            new.url,
            new.type_id,
            new.internal,
            date_created,
            new.tags,
            new.obsolete,
        ],
    )?;

    get_resource_row(conn, conn.last_insert_rowid())
}

/// Update an existing resource, returning the stored row.
///
/// An absent `date_created` keeps the stored value.
pub fn update_resource(
    conn: &Connection,
    id: i64,
    new: &NewResource,
) -> Result<Resource, OperationError> {
    if new.name.trim().is_empty() {
        return Err(OperationError::Validation(
            "resource name must not be empty".to_string(),
        ));
    }

    let changed = conn.execute(
        "UPDATE resources
         SET name = ?2, description = ?3, url = ?4, type_id = ?5, internal = ?6,
             date_created = COALESCE(?7, date_created), tags = ?8, obsolete = ?9
         WHERE id = ?1",
        params![
            id,
            new.name,
            new.description,
            new.url,
            new.type_id,
            new.internal,
            new.date_created,
            new.tags,
            new.obsolete,
        ],
    )?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "resource",
            id,
        });
    }

    get_resource_row(conn, id)
}

/// Delete a resource by id.
pub fn delete_resource(conn: &Connection, id: i64) -> Result<(), OperationError> {
    let changed = conn.execute("DELETE FROM resources WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "resource",
            id,
        });
    }
    Ok(())
}

/// Look up a resource by id, joined with its type name.
pub fn get_resource(conn: &Connection, id: i64) -> Result<Option<ResourceView>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.name, r.description, r.url, r.type_id, r.internal,
                r.date_created, r.tags, r.obsolete, r.created_at, t.name
         FROM resources r
         LEFT JOIN resource_types t ON r.type_id = t.id
         WHERE r.id = ?1",
    )?;
    let result = stmt.query_row(params![id], row_to_view);
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn get_resource_row(conn: &Connection, id: i64) -> Result<Resource, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, url, type_id, internal,
                date_created, tags, obsolete, created_at
         FROM resources WHERE id = ?1",
    )?;
    let result = stmt.query_row(params![id], row_to_resource);
    match result {
        Ok(r) => Ok(r),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(OperationError::NotFound {
            entity_type: "resource",
            id,
        }),
        Err(e) => Err(e.into()),
    }
}

// ── Type Operations ─────────────────────────────────────────────────────────

/// List all resource types, ordered by name.
pub fn list_types(conn: &Connection) -> Result<Vec<ResourceType>, OperationError> {
    let mut stmt = conn.prepare("SELECT id, name FROM resource_types ORDER BY name ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(ResourceType {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Create a resource type.
///
/// Names are unique case-insensitively; a clash surfaces as
/// [`OperationError::DuplicateType`] rather than a generic storage error.
pub fn create_type(conn: &Connection, name: &str) -> Result<ResourceType, OperationError> {
    if name.trim().is_empty() {
        return Err(OperationError::Validation(
            "type name must not be empty".to_string(),
        ));
    }

    let result = conn.execute(
        "INSERT INTO resource_types (name) VALUES (?1)",
        params![name],
    );
    match result {
        Ok(_) => Ok(ResourceType {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
        }),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(OperationError::DuplicateType(name.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a resource type by id.
///
/// Dependent resources keep their `type_id` as a dangling reference;
/// listings then resolve the type name to `None`.
pub fn delete_type(conn: &Connection, id: i64) -> Result<(), OperationError> {
    let changed = conn.execute("DELETE FROM resource_types WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "type",
            id,
        });
    }
    Ok(())
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Get overall catalog statistics.
pub fn catalog_stats(conn: &Connection) -> Result<CatalogStats, OperationError> {
    let resources: i64 = conn.query_row("SELECT COUNT(*) FROM resources", [], |r| r.get(0))?;
    let types: i64 = conn.query_row("SELECT COUNT(*) FROM resource_types", [], |r| r.get(0))?;
    let internal: i64 = conn.query_row(
        "SELECT COUNT(*) FROM resources WHERE internal = 1",
        [],
        |r| r.get(0),
    )?;
    let obsolete: i64 = conn.query_row(
        "SELECT COUNT(*) FROM resources WHERE obsolete = 1",
        [],
        |r| r.get(0),
    )?;

    Ok(CatalogStats {
        resources,
        types,
        internal,
        obsolete,
    })
}

/// Summary statistics for the catalog.
#[derive(Debug)]
pub struct CatalogStats {
    pub resources: i64,
    pub types: i64,
    pub internal: i64,
    pub obsolete: i64,
}

// ── Row Mapping Helpers ─────────────────────────────────────────────────────

fn row_to_resource(row: &rusqlite::Row<'_>) -> rusqlite::Result<Resource> {
    Ok(Resource {
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
    })
}

fn row_to_view(row: &rusqlite::Row<'_>) -> rusqlite::Result<ResourceView> {
    Ok(ResourceView {
        resource: row_to_resource(row)?,
        type_name: row.get(10)?,
    })
}
