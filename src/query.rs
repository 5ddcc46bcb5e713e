//! Query execution and the lazy row cursor.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::driver::{DriverConnection, DriverRows};
use crate::error::BridgeError;
use crate::marshal;
use crate::statement::scan_placeholders;
use crate::value::DynValue;

/// Validate, bind, and execute a parameterized query.
///
/// The bind-arity check runs against the statement's placeholder inventory
/// before any native execution happens.
pub(crate) fn run_query(
    conn: &mut dyn DriverConnection,
    sql: &str,
    binds: &[DynValue],
) -> Result<QueryResult, BridgeError> {
    if sql.trim().is_empty() {
        return Err(BridgeError::QueryError("empty SQL text".to_string()));
    }

    let info = scan_placeholders(sql);
    if info.positional != binds.len() {
        return Err(BridgeError::BindArity {
            expected: info.positional,
            supplied: binds.len(),
        });
    }

    let mut native = Vec::with_capacity(binds.len());
    for bind in binds {
        native.push(marshal::to_native(bind, None)?);
    }

    tracing::debug!(binds = binds.len(), "executing query");
    let rows = conn
        .execute_query(sql, &native)
        .map_err(BridgeError::into_query_error)?;
    Ok(QueryResult::new(rows))
}

/// The result of a query: a finite, forward-only sequence of rows.
///
/// Single pass over the underlying cursor; once exhausted (or closed), every
/// further iteration yields nothing. The column-name-to-index mapping is
/// computed once from result metadata and shared by every row.
pub struct QueryResult {
    columns: Arc<Vec<String>>,
    index: Arc<HashMap<String, usize>>,
    cursor: Option<Box<dyn DriverRows>>,
}

impl QueryResult {
    pub(crate) fn new(cursor: Box<dyn DriverRows>) -> Self {
        let columns = Arc::new(cursor.columns().to_vec());
        let index = Arc::new(
            columns
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect::<HashMap<_, _>>(),
        );
        Self {
            columns,
            index,
            cursor: Some(cursor),
        }
    }

    /// Column names, in result order, as the driver reports them.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Pull the next row from the cursor.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::QueryError` if the native fetch fails; the
    /// cursor is released on error.
    pub fn next_row(&mut self) -> Result<Option<Row>, BridgeError> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };
        match cursor.next_row() {
            Ok(Some(values)) => Ok(Some(Row {
                columns: Arc::clone(&self.columns),
                index: Arc::clone(&self.index),
                values,
            })),
            Ok(None) => {
                self.cursor = None;
                Ok(None)
            }
            Err(e) => {
                self.cursor = None;
                Err(e.into_query_error())
            }
        }
    }

    /// Release the underlying cursor without draining it.
    pub fn close(&mut self) {
        self.cursor = None;
    }
}

impl Iterator for QueryResult {
    type Item = Result<Row, BridgeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

impl std::fmt::Debug for QueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryResult")
            .field("columns", &self.columns)
            .field("open", &self.cursor.is_some())
            .finish()
    }
}

/// One result row with named and ordinal column access.
///
/// Values convert through the marshaller on each access; array-typed columns
/// come back as lazy [`crate::SqlArray`] handles.
#[derive(Debug)]
pub struct Row {
    columns: Arc<Vec<String>>,
    index: Arc<HashMap<String, usize>>,
    values: Vec<crate::driver::NativeValue>,
}

impl Row {
    /// Column names for this row.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Index of a column by exact name, as the driver reports it.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Value at the named column, or `None` if the column does not exist.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<DynValue> {
        self.column_index(name).and_then(|idx| self.get_at(idx))
    }

    /// Value at the 0-based column ordinal.
    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<DynValue> {
        self.values.get(index).cloned().map(marshal::to_dyn)
    }

    /// The whole row as an identifier → value mapping.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, DynValue> {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(i, name)| self.get_at(i).map(|v| (name.clone(), v)))
            .collect()
    }
}
