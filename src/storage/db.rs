use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::tables::{CATALOG_TABLE, CLIPS_TABLE};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),
    #[error("Corrupt row in {table}: {reason}")]
    CorruptRow { table: &'static str, reason: String },
}

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection factory for the SQLite store.
///
/// Every logical operation opens its own connection and drops it when done;
/// no transaction outlives a single call.
pub struct Database {
    path: Arc<PathBuf>,
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            path: Arc::clone(&self.path),
        }
    }
}

impl Database {
    /// Open or create the database file and ensure the catalog schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let db = Self {
            path: Arc::new(path),
        };

        let conn = db.connect()?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        initialize(&conn)?;

        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a fresh connection.
    pub fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(self.path.as_path())?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }
}

fn initialize(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS {CATALOG_TABLE} (
            property TEXT NOT NULL,
            tab TEXT NOT NULL,
            filename TEXT NOT NULL,
            source TEXT,
            description TEXT,
            uploaded_at TEXT NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_{CATALOG_TABLE}_key
            ON {CATALOG_TABLE}(property, tab, filename);
        CREATE INDEX IF NOT EXISTS idx_{CATALOG_TABLE}_uploaded_at
            ON {CATALOG_TABLE}(uploaded_at);
        CREATE TABLE IF NOT EXISTS {CLIPS_TABLE} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            filename TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT
        );
        "
    ))?;
    Ok(())
}
