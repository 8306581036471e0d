//! Data model types for the resource catalog.
//!
//! These types represent the persistent catalog schema: resources (links and
//! documents), user-defined resource types, and the joined listing view.

use serde::{Deserialize, Serialize};

// ── Resource Type ───────────────────────────────────────────────────────────

/// A user-defined category label attachable to a resource.
///
/// Names are unique case-insensitively: creating `"video"` when `"Video"`
/// exists fails with a duplicate error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceType {
    pub id: i64,
    pub name: String,
}

// ── Resource ────────────────────────────────────────────────────────────────

/// A cataloged item (link or document) with metadata and lifecycle flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub url: String,
    /// Soft reference to a [`ResourceType`]. The schema does not enforce it,
    /// so the id may dangle after the referenced type is deleted.
    pub type_id: Option<i64>,
    pub internal: bool,
    /// RFC 3339 timestamp supplied by the caller, or defaulted at insert.
    pub date_created: String,
    /// Comma-separated tag list, kept exactly as entered. Logical membership
    /// is derived with [`crate::split_tags`].
    pub tags: String,
    pub obsolete: bool,
    /// Set by storage on insert.
    pub created_at: String,
}

/// Insert/update payload for a resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewResource {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub type_id: Option<i64>,
    #[serde(default)]
    pub internal: bool,
    /// When absent, storage fills in the current time.
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub obsolete: bool,
}

/// A resource joined with its resolved type name.
///
/// `type_name` is `None` when the resource has no type or its `type_id`
/// dangles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceView {
    pub resource: Resource,
    pub type_name: Option<String>,
}
