//! Tag string handling.

/// Split a comma-separated tag string into trimmed tags.
///
/// Duplicates and casing are kept as entered; empty segments are dropped.
pub fn split_tags(tags: &str) -> Vec<&str> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}
