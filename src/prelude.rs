//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types
//! to make it easier to get started with the library.

pub use crate::array::SqlArray;
pub use crate::connection::Connection;
pub use crate::context::Connector;
pub use crate::driver::{
    Driver, DriverArray, DriverConnection, DriverRows, NativeValue, SqlType, VecArray,
};
pub use crate::error::BridgeError;
pub use crate::query::{QueryResult, Row};
pub use crate::sqlite::{IMPLICIT_URL, SqliteDriver};
pub use crate::value::DynValue;

#[cfg(feature = "test-utils")]
pub use crate::test_utils::MockDriver;
