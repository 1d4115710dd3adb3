//! Storage keys and table names derived from upload coordinates.

use super::IngestError;
use crate::storage::is_reserved_table_name;
use crate::storage::models::SubCategory;

/// Top-level directory holding uploaded audio clips.
pub const CLIPS_PREFIX: &str = "clips";

/// Collapse an uploaded name to a safe basename.
///
/// Everything up to the last `/` or `\` is dropped, characters outside
/// `[A-Za-z0-9._-]` become `_`, and leading dots are stripped.
pub fn sanitize_filename(name: &str) -> Result<String, IngestError> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        return Err(IngestError::Validation(format!(
            "'{name}' is not a usable filename"
        )));
    }
    Ok(cleaned)
}

/// A property identifier must be one plain path segment.
pub fn validate_property(property: &str) -> Result<(), IngestError> {
    let ok = !property.is_empty()
        && property
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && property != CLIPS_PREFIX;
    if !ok {
        return Err(IngestError::Validation(format!(
            "'{property}' is not a valid property name"
        )));
    }
    Ok(())
}

/// `{property}/{sub_category}/{sanitized filename}`
pub fn resolve_key(
    property: &str,
    sub_category: SubCategory,
    filename: &str,
) -> Result<String, IngestError> {
    validate_property(property)?;
    let filename = sanitize_filename(filename)?;
    Ok(format!("{property}/{sub_category}/{filename}"))
}

/// `clips/{sanitized filename}`
pub fn clip_key(filename: &str) -> Result<String, IngestError> {
    Ok(format!("{CLIPS_PREFIX}/{}", sanitize_filename(filename)?))
}

/// Relational table name for a dataset file.
///
/// `.`, `-`, `/` and `\` map to `_`, as does anything else outside
/// `[A-Za-z0-9_]`. A leading digit gets a `t_` prefix. Empty results and
/// names that would shadow the catalog or SQLite internals are rejected.
/// Distinct filenames can still collide (`a-b.csv` and `a.b.csv`).
pub fn derive_table_name(filename: &str) -> Result<String, IngestError> {
    let mut name: String = filename
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    if name.is_empty() {
        return Err(IngestError::Validation(
            "cannot derive a table name from an empty filename".to_string(),
        ));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "t_");
    }
    if is_reserved_table_name(&name) {
        return Err(IngestError::Validation(format!(
            "'{filename}' maps to reserved table name '{name}'"
        )));
    }
    Ok(name)
}
