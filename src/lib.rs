mod array;
mod call;
mod connection;
mod context;
mod driver;
mod error;
mod marshal;
mod query;
mod statement;
mod value;

pub mod prelude;
pub mod sqlite;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use array::SqlArray;
pub use connection::Connection;
pub use context::Connector;
pub use driver::{
    Driver, DriverArray, DriverConnection, DriverRows, NativeValue, SqlType, VecArray,
};
pub use error::BridgeError;
pub use marshal::{to_dyn, to_native};
pub use query::{QueryResult, Row};
pub use statement::{StatementInfo, scan_placeholders};
pub use value::DynValue;
