use rusqlite::{params, params_from_iter, Connection};

use super::db::{Database, StoreError};
use super::models::{Table, Value};
use super::tables::{is_reserved_table_name, is_valid_table_name, quote_ident};

impl Database {
    // ========================================================================
    // Imported dataset tables
    // ========================================================================

    /// Drop and recreate `name` from `table` in one transaction.
    pub fn replace_table(&self, name: &str, table: &Table) -> Result<(), StoreError> {
        if !is_valid_table_name(name) || is_reserved_table_name(name) {
            return Err(StoreError::InvalidTableName(name.to_string()));
        }
        if table.columns.is_empty() {
            return Err(StoreError::InvalidTableName(format!(
                "{name} (no columns to create)"
            )));
        }

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let quoted = quote_ident(name);

        let column_defs: Vec<String> = table
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} {}", quote_ident(column), table.column_type(i).as_sql()))
            .collect();

        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {quoted};
             CREATE TABLE {quoted} ({});",
            column_defs.join(", ")
        ))?;

        {
            let placeholders = vec!["?"; table.columns.len()].join(", ");
            let mut stmt = tx.prepare(&format!("INSERT INTO {quoted} VALUES ({placeholders})"))?;
            for row in &table.rows {
                let padded = (0..table.columns.len()).map(|i| row.get(i).unwrap_or(&Value::Null));
                stmt.execute(params_from_iter(padded))?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Read a whole table back. `None` when it does not exist.
    pub fn read_table(&self, name: &str) -> Result<Option<Table>, StoreError> {
        if !is_valid_table_name(name) {
            return Err(StoreError::InvalidTableName(name.to_string()));
        }

        let conn = self.connect()?;
        if !table_exists(&conn, name)? {
            return Ok(None);
        }

        let mut stmt = conn.prepare(&format!("SELECT * FROM {}", quote_ident(name)))?;
        let table = collect_rows(&mut stmt, [])?;
        Ok(Some(table))
    }

    /// Serialize a table as CSV with a header row. `None` when it does not exist.
    pub fn export_csv(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let Some(table) = self.read_table(name)? else {
            return Ok(None);
        };

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&table.columns)?;
        for row in &table.rows {
            writer.write_record(row.iter().map(Value::to_field))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| StoreError::Io(e.into_error()))?;
        Ok(Some(bytes))
    }

    /// User tables in name order.
    pub fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
             ORDER BY name ASC",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool, StoreError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Materialize every row a prepared statement yields.
pub(crate) fn collect_rows<P: rusqlite::Params>(
    stmt: &mut rusqlite::Statement<'_>,
    params: P,
) -> Result<Table, StoreError> {
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();

    let mut rows = Vec::new();
    let mut cursor = stmt.query(params)?;
    while let Some(row) = cursor.next()? {
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            values.push(Value::from_sql(row.get_ref(i)?));
        }
        rows.push(values);
    }

    Ok(Table { columns, rows })
}
