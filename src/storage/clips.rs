use rusqlite::{params, OptionalExtension};

use super::catalog::folded_contains;
use super::db::{Database, StoreError};
use super::models::MusicClip;
use super::tables::CLIPS_TABLE;

fn read_clip(row: &rusqlite::Row<'_>) -> rusqlite::Result<MusicClip> {
    Ok(MusicClip {
        id: row.get(0)?,
        filename: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
    })
}

impl Database {
    // ========================================================================
    // Music clip operations
    // ========================================================================

    pub fn add_clip(
        &self,
        filename: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<MusicClip, StoreError> {
        let conn = self.connect()?;
        conn.execute(
            &format!("INSERT INTO {CLIPS_TABLE} (filename, title, description) VALUES (?1, ?2, ?3)"),
            params![filename, title, description],
        )?;
        Ok(MusicClip {
            id: conn.last_insert_rowid(),
            filename: filename.to_string(),
            title: title.to_string(),
            description: description.map(|d| d.to_string()),
        })
    }

    pub fn get_clip(&self, id: i64) -> Result<Option<MusicClip>, StoreError> {
        let conn = self.connect()?;
        Ok(conn
            .query_row(
                &format!("SELECT id, filename, title, description FROM {CLIPS_TABLE} WHERE id = ?1"),
                params![id],
                read_clip,
            )
            .optional()?)
    }

    /// Every uploaded clip, newest first.
    pub fn list_clips(&self) -> Result<Vec<MusicClip>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, filename, title, description FROM {CLIPS_TABLE} ORDER BY id DESC"
        ))?;
        let clips = stmt
            .query_map([], read_clip)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(clips)
    }

    pub fn search_clips(&self, query: &str) -> Result<Vec<MusicClip>, StoreError> {
        let needle = query.to_lowercase();
        let clips = self
            .list_clips()?
            .into_iter()
            .filter(|c| {
                folded_contains(&c.title, &needle)
                    || folded_contains(&c.filename, &needle)
                    || c.description
                        .as_deref()
                        .is_some_and(|d| folded_contains(d, &needle))
            })
            .collect();
        Ok(clips)
    }

    pub fn delete_clip(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.connect()?;
        let removed = conn.execute(
            &format!("DELETE FROM {CLIPS_TABLE} WHERE id = ?1"),
            params![id],
        )?;
        Ok(removed > 0)
    }
}
