//! The connection handle owned by the bridge.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::call::run_call;
use crate::driver::{DriverConnection, SqlType};
use crate::error::BridgeError;
use crate::query::{QueryResult, run_query};
use crate::value::DynValue;

/// A handle wrapping exactly one native database connection.
///
/// Cloning shares the same underlying connection; identity is observable via
/// [`Connection::same_handle`] (and `PartialEq`, which compares identity, not
/// state). The handle is never closed implicitly: only [`Connection::close`]
/// releases the native connection, after which every operation fails with
/// `ConnectionError`.
///
/// A handle and anything derived from it (query results, arrays) are meant
/// for single-threaded use; callers sharing one across threads must serialize
/// access themselves.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Mutex<Option<Box<dyn DriverConnection>>>>,
}

impl Connection {
    /// Wrap an open native connection.
    #[must_use]
    pub fn new(raw: Box<dyn DriverConnection>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(raw))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn DriverConnection>>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn with_open<R>(
        &self,
        op: &str,
        f: impl FnOnce(&mut dyn DriverConnection) -> Result<R, BridgeError>,
    ) -> Result<R, BridgeError> {
        let mut guard = self.lock();
        match guard.as_deref_mut() {
            Some(raw) => f(raw),
            None => Err(BridgeError::ConnectionError(format!(
                "connection is closed ({op})"
            ))),
        }
    }

    /// Execute a query with no bind values.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` on closed connections, bind problems, or native
    /// execution failure.
    pub fn query(&self, sql: &str) -> Result<QueryResult, BridgeError> {
        self.query_with(sql, &[])
    }

    /// Execute a query with positional bind values.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::BindArity` if the bind count does not match the
    /// statement's placeholders, `BridgeError::QueryError` on native failure.
    pub fn query_with(&self, sql: &str, binds: &[DynValue]) -> Result<QueryResult, BridgeError> {
        self.with_open("query", |raw| run_query(raw, sql, binds))
    }

    /// Execute a callable statement with named in/out binds.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::CallError` for undeclared identifiers,
    /// conversion failures, or native execution failure.
    pub fn exec(
        &self,
        statement: &str,
        in_binds: &BTreeMap<String, DynValue>,
        out_binds: &BTreeMap<String, SqlType>,
    ) -> Result<BTreeMap<String, DynValue>, BridgeError> {
        self.with_open("exec", |raw| run_call(raw, statement, in_binds, out_binds))
    }

    /// Close the native connection. Further operations on any clone of this
    /// handle fail with `ConnectionError`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ConnectionError` if the handle is already closed
    /// or the native close fails.
    pub fn close(&self) -> Result<(), BridgeError> {
        let mut guard = self.lock();
        match guard.take() {
            Some(mut raw) => raw.close(),
            None => Err(BridgeError::ConnectionError(
                "connection is already closed".to_string(),
            )),
        }
    }

    /// Whether this handle has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    /// Whether two handles wrap the same underlying native connection.
    #[must_use]
    pub fn same_handle(&self, other: &Connection) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Connection {
    /// Handles compare by identity of the underlying connection.
    fn eq(&self, other: &Self) -> bool {
        self.same_handle(other)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("closed", &self.is_closed())
            .finish()
    }
}
