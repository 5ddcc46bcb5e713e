//! Connection management and the default-connection slot.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::connection::Connection;
use crate::driver::{Driver, SqlType};
use crate::error::BridgeError;
use crate::query::QueryResult;
use crate::value::DynValue;

/// The connection manager owned by the host execution environment.
///
/// Holds the injected [`Driver`] and the default-connection slot. The slot is
/// the only shared mutable state in this crate: reads that lazily create and
/// explicit writes go through one mutex, so two callers racing an empty slot
/// can never both open a connection.
pub struct Connector {
    driver: Arc<dyn Driver>,
    default_slot: Mutex<Option<Connection>>,
}

impl Connector {
    /// Create a connector over the given driver.
    #[must_use]
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            driver,
            default_slot: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Connection>> {
        match self.default_slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Open a new connection using the driver's implicit/default mechanism.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ConnectionError` if the underlying open fails.
    pub fn new_connection(&self) -> Result<Connection, BridgeError> {
        tracing::debug!("opening implicit connection");
        Ok(Connection::new(self.driver.connect_default()?))
    }

    /// Open a new explicit connection to `url` with the given credentials.
    /// The address is passed through to the driver verbatim.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ConnectionError` if the underlying open fails.
    pub fn new_connection_with(
        &self,
        url: &str,
        user: &str,
        password: &str,
    ) -> Result<Connection, BridgeError> {
        tracing::debug!(url, "opening explicit connection");
        Ok(Connection::new(self.driver.connect(url, user, password)?))
    }

    /// The default connection, lazily created on first read.
    ///
    /// Atomic with respect to [`Connector::set_default_connection`]: exactly
    /// one connection is created however many callers race the empty slot,
    /// and all of them observe the same handle.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ConnectionError` if lazy creation fails; the
    /// slot stays empty in that case.
    pub fn default_connection(&self) -> Result<Connection, BridgeError> {
        let mut slot = self.slot();
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }
        tracing::debug!("lazily creating default connection");
        let conn = Connection::new(self.driver.connect_default()?);
        *slot = Some(conn.clone());
        Ok(conn)
    }

    /// Replace or clear the default-connection slot.
    ///
    /// Passing `None` clears the slot, forcing re-creation on the next read.
    /// The previous handle, open or not, is never closed here; its lifecycle
    /// belongs to whoever holds it.
    pub fn set_default_connection(&self, connection: Option<Connection>) {
        let mut slot = self.slot();
        *slot = connection;
    }

    /// Execute a query on the default connection.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` from lazy connection creation or execution.
    pub fn query(&self, sql: &str) -> Result<QueryResult, BridgeError> {
        self.default_connection()?.query(sql)
    }

    /// Execute a query with positional binds on the default connection.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` from lazy connection creation or execution.
    pub fn query_with(&self, sql: &str, binds: &[DynValue]) -> Result<QueryResult, BridgeError> {
        self.default_connection()?.query_with(sql, binds)
    }

    /// Execute a callable statement on the default connection.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` from lazy connection creation or execution.
    pub fn exec(
        &self,
        statement: &str,
        in_binds: &BTreeMap<String, DynValue>,
        out_binds: &BTreeMap<String, SqlType>,
    ) -> Result<BTreeMap<String, DynValue>, BridgeError> {
        self.default_connection()?.exec(statement, in_binds, out_binds)
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("default_set", &self.slot().is_some())
            .finish()
    }
}
