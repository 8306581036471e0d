//! Case-insensitive type-name resolution for CSV import.

use std::collections::HashMap;

use linkdex_db::operations::{OperationError, list_types};
use rusqlite::Connection;

/// Maps lowercased type names to their identifiers.
///
/// Loaded once per import so every row resolves against the same snapshot.
#[derive(Debug, Default)]
pub struct TypeResolver {
    by_name: HashMap<String, i64>,
}

impl TypeResolver {
    /// Load all types from the database. Pure read, no side effects.
    pub fn load(conn: &Connection) -> Result<Self, OperationError> {
        let mut by_name = HashMap::new();
        for t in list_types(conn)? {
            by_name.insert(t.name.to_lowercase(), t.id);
        }
        Ok(Self { by_name })
    }

    /// Resolve a human-readable type name, ignoring case and surrounding
    /// whitespace. Unknown or empty names resolve to `None` rather than
    /// failing the row.
    pub fn resolve(&self, name: &str) -> Option<i64> {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        self.by_name.get(&key).copied()
    }
}
