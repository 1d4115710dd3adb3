//! Free-form SQL for the admin query tool.
//!
//! Nothing in the ingest pipeline calls into this module. Statements run
//! verbatim on their own connection, so the caller is the trust boundary.

use super::datasets::collect_rows;
use super::db::{Database, StoreError};
use super::models::QueryOutcome;

impl Database {
    /// Execute one caller-supplied statement exactly as given.
    pub fn unsafe_execute(&self, sql: &str) -> Result<QueryOutcome, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)?;

        if stmt.column_count() > 0 {
            let table = collect_rows(&mut stmt, [])?;
            return Ok(QueryOutcome::Rows(table));
        }

        let rows_affected = stmt.execute([])?;
        Ok(QueryOutcome::Affected { rows_affected })
    }
}
