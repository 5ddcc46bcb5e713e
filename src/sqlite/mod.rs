//! Embedded `SQLite` driver.
//!
//! The one real [`Driver`] implementation in this crate. `SQLite` has no
//! stored procedures and no array type, so callable statements and array
//! binds report errors instead of being emulated; a server RDBMS driver
//! would fill in those trait methods.

mod config;
mod params;
mod query;

pub use config::{IMPLICIT_URL, SqliteConfig, SqliteLocation};

use crate::driver::{Driver, DriverConnection, DriverRows, NativeValue, SqlType};
use crate::error::BridgeError;

/// Driver over the embedded `SQLite` library.
///
/// The implicit/default connection is a private in-memory database.
#[derive(Debug, Default)]
pub struct SqliteDriver;

impl SqliteDriver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn open(config: &SqliteConfig) -> Result<Box<dyn DriverConnection>, BridgeError> {
        let conn = match &config.location {
            SqliteLocation::Memory => rusqlite::Connection::open_in_memory(),
            SqliteLocation::File(path) => rusqlite::Connection::open(path),
        }
        .map_err(|e| BridgeError::ConnectionError(e.to_string()))?;
        Ok(Box::new(SqliteConnection { conn: Some(conn) }))
    }
}

impl Driver for SqliteDriver {
    fn connect_default(&self) -> Result<Box<dyn DriverConnection>, BridgeError> {
        Self::open(&SqliteConfig::from_url(IMPLICIT_URL)?)
    }

    fn connect(
        &self,
        url: &str,
        user: &str,
        password: &str,
    ) -> Result<Box<dyn DriverConnection>, BridgeError> {
        if !user.is_empty() || !password.is_empty() {
            tracing::debug!("sqlite has no authentication; credentials ignored");
        }
        Self::open(&SqliteConfig::from_url(url)?)
    }
}

struct SqliteConnection {
    conn: Option<rusqlite::Connection>,
}

impl SqliteConnection {
    fn open_conn(&self) -> Result<&rusqlite::Connection, BridgeError> {
        self.conn.as_ref().ok_or_else(|| {
            BridgeError::ConnectionError("sqlite connection is closed".to_string())
        })
    }
}

impl DriverConnection for SqliteConnection {
    fn execute_query(
        &mut self,
        sql: &str,
        binds: &[NativeValue],
    ) -> Result<Box<dyn DriverRows>, BridgeError> {
        let conn = self.open_conn()?;
        Ok(Box::new(query::build_rows(conn, sql, binds)?))
    }

    fn execute_call(
        &mut self,
        _statement: &str,
        _inputs: &[(String, NativeValue)],
        _outputs: &[(String, SqlType)],
    ) -> Result<Vec<(String, NativeValue)>, BridgeError> {
        Err(BridgeError::CallError(
            "the sqlite driver does not support callable statements".to_string(),
        ))
    }

    fn close(&mut self) -> Result<(), BridgeError> {
        match self.conn.take() {
            Some(conn) => conn
                .close()
                .map_err(|(_, e)| BridgeError::ConnectionError(e.to_string())),
            None => Err(BridgeError::ConnectionError(
                "sqlite connection is already closed".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_connection_is_in_memory() {
        let driver = SqliteDriver::new();
        let mut conn = driver.connect_default().unwrap();
        let mut rows = conn.execute_query("select 1", &[]).unwrap();
        assert!(rows.next_row().unwrap().is_some());
    }

    #[test]
    fn calls_are_unsupported() {
        let driver = SqliteDriver::new();
        let mut conn = driver.connect_default().unwrap();
        let err = conn.execute_call("begin end", &[], &[]).unwrap_err();
        assert!(matches!(err, BridgeError::CallError(_)));
    }

    #[test]
    fn close_is_terminal() {
        let driver = SqliteDriver::new();
        let mut conn = driver.connect_default().unwrap();
        conn.close().unwrap();
        assert!(conn.execute_query("select 1", &[]).is_err());
        assert!(conn.close().is_err());
    }
}
