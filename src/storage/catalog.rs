use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::db::{Database, StoreError};
use super::models::{CatalogEntry, Patch, SubCategory};
use super::tables::CATALOG_TABLE;

const ENTRY_COLUMNS: &str = "property, tab, filename, source, description, uploaded_at";

type RawEntry = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
);

impl Database {
    // ========================================================================
    // Catalog log operations
    // ========================================================================

    /// Insert a catalog row unless one already exists for the key.
    /// Returns whether a row was inserted.
    pub fn record_upload(
        &self,
        property: &str,
        sub_category: SubCategory,
        filename: &str,
        uploaded_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        debug_assert!(!property.is_empty(), "property must not be empty");
        debug_assert!(!filename.is_empty(), "filename must not be empty");

        let conn = self.connect()?;
        let inserted = conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {CATALOG_TABLE} (property, tab, filename, uploaded_at)
                 VALUES (?1, ?2, ?3, ?4)"
            ),
            params![
                property,
                sub_category.as_str(),
                filename,
                format_timestamp(uploaded_at)
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Overwrite source and/or description in place. Returns whether a row matched.
    pub fn update_metadata(
        &self,
        property: &str,
        sub_category: SubCategory,
        filename: &str,
        source: &Patch<String>,
        description: &Patch<String>,
    ) -> Result<bool, StoreError> {
        let conn = self.connect()?;
        let tx = conn.unchecked_transaction()?;

        let exists: Option<i64> = tx
            .query_row(
                &format!(
                    "SELECT 1 FROM {CATALOG_TABLE} WHERE property = ?1 AND tab = ?2 AND filename = ?3"
                ),
                params![property, sub_category.as_str(), filename],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Ok(false);
        }

        for (column, patch) in [("source", source), ("description", description)] {
            let value = match patch {
                Patch::Absent => continue,
                Patch::Null => None,
                Patch::Value(v) => Some(v.as_str()),
            };
            tx.execute(
                &format!(
                    "UPDATE {CATALOG_TABLE} SET {column} = ?1
                     WHERE property = ?2 AND tab = ?3 AND filename = ?4"
                ),
                params![value, property, sub_category.as_str(), filename],
            )?;
        }

        tx.commit()?;
        Ok(true)
    }

    /// Remove the catalog row for a key. Returns whether a row was removed.
    pub fn delete_entry(
        &self,
        property: &str,
        sub_category: SubCategory,
        filename: &str,
    ) -> Result<bool, StoreError> {
        let conn = self.connect()?;
        let removed = conn.execute(
            &format!(
                "DELETE FROM {CATALOG_TABLE} WHERE property = ?1 AND tab = ?2 AND filename = ?3"
            ),
            params![property, sub_category.as_str(), filename],
        )?;
        Ok(removed > 0)
    }

    pub fn get_entry(
        &self,
        property: &str,
        sub_category: SubCategory,
        filename: &str,
    ) -> Result<Option<CatalogEntry>, StoreError> {
        let conn = self.connect()?;
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {ENTRY_COLUMNS} FROM {CATALOG_TABLE}
                     WHERE property = ?1 AND tab = ?2 AND filename = ?3"
                ),
                params![property, sub_category.as_str(), filename],
                read_raw,
            )
            .optional()?;
        raw.map(into_entry).transpose()
    }

    /// Every catalog row, newest first.
    pub fn list_all(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        let conn = self.connect()?;
        select_entries(
            &conn,
            &format!("SELECT {ENTRY_COLUMNS} FROM {CATALOG_TABLE} ORDER BY uploaded_at DESC"),
            [],
        )
    }

    /// Catalog rows under one property and sub-category, newest first.
    pub fn list_for(
        &self,
        property: &str,
        sub_category: SubCategory,
    ) -> Result<Vec<CatalogEntry>, StoreError> {
        let conn = self.connect()?;
        select_entries(
            &conn,
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM {CATALOG_TABLE}
                 WHERE property = ?1 AND tab = ?2
                 ORDER BY uploaded_at DESC"
            ),
            params![property, sub_category.as_str()],
        )
    }

    /// Case-insensitive substring search over property, tab, filename, and description.
    pub fn search(&self, query: &str) -> Result<Vec<CatalogEntry>, StoreError> {
        // SQLite's lower() folds ASCII only, so matching happens here
        let needle = query.to_lowercase();
        let entries = self
            .list_all()?
            .into_iter()
            .filter(|e| {
                folded_contains(&e.property, &needle)
                    || folded_contains(e.sub_category.as_str(), &needle)
                    || folded_contains(&e.filename, &needle)
                    || e.description
                        .as_deref()
                        .is_some_and(|d| folded_contains(d, &needle))
            })
            .collect();
        Ok(entries)
    }
}

/// Whether `haystack` contains an already-lowercased `needle`, ignoring case.
pub(crate) fn folded_contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Accepts RFC 3339 as well as the zone-less ISO form older rows carry.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEntry> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn into_entry(raw: RawEntry) -> Result<CatalogEntry, StoreError> {
    let (property, tab, filename, source, description, uploaded_at) = raw;
    let sub_category = tab.parse().map_err(|reason| StoreError::CorruptRow {
        table: CATALOG_TABLE,
        reason,
    })?;
    let uploaded_at = parse_timestamp(&uploaded_at).ok_or_else(|| StoreError::CorruptRow {
        table: CATALOG_TABLE,
        reason: format!("unparseable uploaded_at '{uploaded_at}'"),
    })?;
    Ok(CatalogEntry {
        property,
        sub_category,
        filename,
        source,
        description,
        uploaded_at,
    })
}

fn select_entries<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<CatalogEntry>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let raws = stmt
        .query_map(params, read_raw)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut entries = Vec::with_capacity(raws.len());
    for raw in raws {
        match into_entry(raw) {
            Ok(entry) => entries.push(entry),
            // Rows written by hand through the query tool may not fit the model
            Err(e) => tracing::warn!(error = %e, "Skipping unreadable catalog row"),
        }
    }
    Ok(entries)
}
