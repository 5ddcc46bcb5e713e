use std::collections::VecDeque;

use crate::driver::{DriverRows, NativeValue};
use crate::error::BridgeError;
use crate::sqlite::params::{convert_binds, sqlite_extract_value};

/// Client-side cursor over a `SQLite` query result.
///
/// rusqlite rows borrow their statement, so the driver drains the statement
/// here; the bridge-side cursor still consumes rows one at a time and stays
/// single-pass.
pub(crate) struct SqliteRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<NativeValue>>,
}

impl DriverRows for SqliteRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<NativeValue>>, BridgeError> {
        Ok(self.rows.pop_front())
    }
}

/// Prepare, bind, and run a query on a `SQLite` connection.
pub(crate) fn build_rows(
    conn: &rusqlite::Connection,
    sql: &str,
    binds: &[NativeValue],
) -> Result<SqliteRows, BridgeError> {
    let values = convert_binds(binds)?;
    let mut stmt = conn.prepare(sql)?;

    // Column metadata is read once, before the first fetch.
    let columns: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();

    let mut rows_iter = stmt.query(rusqlite::params_from_iter(values.iter()))?;
    let mut rows = VecDeque::new();
    while let Some(row) = rows_iter.next()? {
        let mut row_values = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            row_values.push(sqlite_extract_value(row, i)?);
        }
        rows.push_back(row_values);
    }

    Ok(SqliteRows { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetches_columns_and_rows() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let mut rows = build_rows(&conn, "select 1 as n, 'a' as name", &[]).unwrap();
        assert_eq!(rows.columns(), ["n".to_string(), "name".to_string()]);
        let row = rows.next_row().unwrap().unwrap();
        assert_eq!(row[0], NativeValue::Int(1));
        assert_eq!(row[1], NativeValue::Text("a".into()));
        assert!(rows.next_row().unwrap().is_none());
    }

    #[test]
    fn binds_are_positional() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let mut rows = build_rows(
            &conn,
            "select ?1 + ?2 as total",
            &[NativeValue::Int(40), NativeValue::Int(2)],
        )
        .unwrap();
        let row = rows.next_row().unwrap().unwrap();
        assert_eq!(row[0], NativeValue::Int(42));
    }
}
