//! Schema introspection over the live database.
//!
//! The migration steps decide what to do by looking at the actual
//! table, not at a recorded version number, so a half-migrated or
//! hand-edited file is still brought forward safely.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Information about a table column, from `PRAGMA table_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
}

/// Column details for a table. An unknown table yields an empty list.
pub fn columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table))?;

    let columns: Vec<ColumnInfo> = stmt
        .query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get(1)?,
                data_type: row.get::<_, String>(2)?.to_uppercase(),
                nullable: row.get::<_, i32>(3)? == 0,
                default_value: row.get(4)?,
                primary_key: row.get::<_, i32>(5)? > 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(columns)
}

/// Whether the table exists at all.
pub fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Whether a column is present. This is the precondition every
/// additive migration step checks before acting.
pub fn has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    Ok(columns(conn, table)?.iter().any(|c| c.name == column))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory database");
        conn.execute_batch("CREATE TABLE sample (id INTEGER PRIMARY KEY, label TEXT NOT NULL)")
            .expect("Failed to create table");
        conn
    }

    #[test]
    fn columns_reports_names_and_constraints() {
        let conn = test_conn();

        let cols = columns(&conn, "sample").expect("Failed to read columns");
        assert_eq!(cols.len(), 2);

        let id = &cols[0];
        assert_eq!(id.name, "id");
        assert!(id.primary_key);

        let label = &cols[1];
        assert_eq!(label.name, "label");
        assert!(!label.nullable);
        assert_eq!(label.data_type, "TEXT");
    }

    #[test]
    fn unknown_table_has_no_columns() {
        let conn = test_conn();
        let cols = columns(&conn, "missing").expect("PRAGMA on unknown table should not error");
        assert!(cols.is_empty());
    }

    #[test]
    fn table_and_column_existence_checks() {
        let conn = test_conn();

        assert!(table_exists(&conn, "sample").unwrap());
        assert!(!table_exists(&conn, "missing").unwrap());
        assert!(has_column(&conn, "sample", "label").unwrap());
        assert!(!has_column(&conn, "sample", "ghost").unwrap());
    }
}
