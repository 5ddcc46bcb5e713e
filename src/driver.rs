//! The native-driver seam.
//!
//! The executors in this crate never talk to a database library directly;
//! they work against the traits below so a real driver (see [`crate::sqlite`])
//! or a test double can be injected without touching shared state.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use clap::ValueEnum;

use crate::error::BridgeError;

/// A value in the native driver's type system.
///
/// This is the driver-facing counterpart of [`crate::DynValue`]; conversion
/// between the two lives in [`crate::to_native`] and [`crate::to_dyn`].
#[derive(Clone)]
pub enum NativeValue {
    /// SQL NULL
    Null,
    /// 64-bit integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Text value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// Binary data
    Blob(Vec<u8>),
    /// Native array resource; element access goes back through the driver.
    Array(Arc<dyn DriverArray>),
}

impl fmt::Debug for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeValue::Null => write!(f, "Null"),
            NativeValue::Int(i) => write!(f, "Int({i})"),
            NativeValue::Float(v) => write!(f, "Float({v})"),
            NativeValue::Text(s) => write!(f, "Text({s:?})"),
            NativeValue::Bool(b) => write!(f, "Bool({b})"),
            NativeValue::Timestamp(ts) => write!(f, "Timestamp({ts})"),
            NativeValue::Blob(b) => write!(f, "Blob({} bytes)", b.len()),
            NativeValue::Array(_) => write!(f, "Array(..)"),
        }
    }
}

impl PartialEq for NativeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NativeValue::Null, NativeValue::Null) => true,
            (NativeValue::Int(a), NativeValue::Int(b)) => a == b,
            (NativeValue::Float(a), NativeValue::Float(b)) => a == b,
            (NativeValue::Text(a), NativeValue::Text(b)) => a == b,
            (NativeValue::Bool(a), NativeValue::Bool(b)) => a == b,
            (NativeValue::Timestamp(a), NativeValue::Timestamp(b)) => a == b,
            (NativeValue::Blob(a), NativeValue::Blob(b)) => a == b,
            // Array resources compare by identity, not contents.
            (NativeValue::Array(a), NativeValue::Array(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl NativeValue {
    /// Name of this value's native type, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            NativeValue::Null => "null",
            NativeValue::Int(_) => "integer",
            NativeValue::Float(_) => "float",
            NativeValue::Text(_) => "text",
            NativeValue::Bool(_) => "boolean",
            NativeValue::Timestamp(_) => "timestamp",
            NativeValue::Blob(_) => "blob",
            NativeValue::Array(_) => "array",
        }
    }
}

/// Declared SQL type for a bind parameter.
///
/// Out-bind declarations arrive from the scripting side as type-name strings;
/// `FromStr` accepts the usual spellings (`"int"`, `"varchar"`, `"bool"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum SqlType {
    /// 64-bit integer
    Integer,
    /// 64-bit float
    Float,
    /// Text
    Text,
    /// Boolean
    Boolean,
    /// Timestamp
    Timestamp,
    /// Binary data
    Blob,
    /// Array of scalars; element typing is left to the driver
    Array,
}

impl SqlType {
    /// Lowercase name of this type, matching what `FromStr` accepts.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SqlType::Integer => "integer",
            SqlType::Float => "float",
            SqlType::Text => "text",
            SqlType::Boolean => "boolean",
            SqlType::Timestamp => "timestamp",
            SqlType::Blob => "blob",
            SqlType::Array => "array",
        }
    }
}

impl std::str::FromStr for SqlType {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "int" | "integer" | "bigint" | "smallint" => Ok(SqlType::Integer),
            "float" | "real" | "double" | "number" | "numeric" => Ok(SqlType::Float),
            "text" | "varchar" | "char" | "string" | "clob" => Ok(SqlType::Text),
            "bool" | "boolean" => Ok(SqlType::Boolean),
            "timestamp" | "datetime" | "date" => Ok(SqlType::Timestamp),
            "blob" | "binary" | "bytea" => Ok(SqlType::Blob),
            "array" => Ok(SqlType::Array),
            other => Err(BridgeError::TypeMismatch {
                expected: "a SQL type name".to_string(),
                actual: format!("'{other}'"),
            }),
        }
    }
}

/// A native array resource. Indexing is 1-based, as drivers report it.
pub trait DriverArray: Send + Sync {
    /// Fetch a single element at 1-based `position`, or `None` past the end.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the native fetch fails.
    fn element(&self, position: usize) -> Result<Option<NativeValue>, BridgeError>;

    /// Fetch the whole array. Used for length discovery and eager consumers.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the native fetch fails.
    fn fetch_all(&self) -> Result<Vec<NativeValue>, BridgeError>;
}

/// Owned in-memory array, used for sequence binds and by the mock driver.
#[derive(Debug, Clone, PartialEq)]
pub struct VecArray {
    items: Vec<NativeValue>,
}

impl VecArray {
    #[must_use]
    pub fn new(items: Vec<NativeValue>) -> Self {
        Self { items }
    }
}

impl DriverArray for VecArray {
    fn element(&self, position: usize) -> Result<Option<NativeValue>, BridgeError> {
        if position == 0 {
            return Ok(None);
        }
        Ok(self.items.get(position - 1).cloned())
    }

    fn fetch_all(&self) -> Result<Vec<NativeValue>, BridgeError> {
        Ok(self.items.clone())
    }
}

/// A forward-only native row cursor. Single pass; there is no rewind.
pub trait DriverRows: Send {
    /// Column names, in result order, as the driver reports them.
    fn columns(&self) -> &[String];

    /// Pull the next row, or `None` when the cursor is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the native fetch fails.
    fn next_row(&mut self) -> Result<Option<Vec<NativeValue>>, BridgeError>;
}

/// One open native connection.
pub trait DriverConnection: Send {
    /// Prepare, bind, and execute a query with positional parameters.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if preparation or execution fails.
    fn execute_query(
        &mut self,
        sql: &str,
        binds: &[NativeValue],
    ) -> Result<Box<dyn DriverRows>, BridgeError>;

    /// Execute a callable statement. `inputs` are registered by identifier,
    /// `outputs` declare the identifiers and types to read back. The returned
    /// pairs cover at least every declared output.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if registration or execution fails.
    fn execute_call(
        &mut self,
        statement: &str,
        inputs: &[(String, NativeValue)],
        outputs: &[(String, SqlType)],
    ) -> Result<Vec<(String, NativeValue)>, BridgeError>;

    /// Close the native connection.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ConnectionError` if the native close fails.
    fn close(&mut self) -> Result<(), BridgeError>;
}

/// A database driver: the factory for native connections.
pub trait Driver: Send + Sync {
    /// Open a connection using the driver's implicit/default mechanism
    /// (no explicit address or credentials).
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ConnectionError` if the open fails.
    fn connect_default(&self) -> Result<Box<dyn DriverConnection>, BridgeError>;

    /// Open an explicit connection. The address format is
    /// `<scheme>:<subprotocol>:<subname>`, passed through verbatim.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ConnectionError` if the open fails.
    fn connect(
        &self,
        url: &str,
        user: &str,
        password: &str,
    ) -> Result<Box<dyn DriverConnection>, BridgeError>;
}

#[cfg(test)]
mod tests {
    use super::SqlType;
    use crate::error::BridgeError;

    #[test]
    fn sql_type_parses_the_usual_spellings() {
        let cases = [
            ("int", SqlType::Integer),
            ("INTEGER", SqlType::Integer),
            ("bigint", SqlType::Integer),
            ("float", SqlType::Float),
            ("number", SqlType::Float),
            ("varchar", SqlType::Text),
            ("string", SqlType::Text),
            ("bool", SqlType::Boolean),
            ("datetime", SqlType::Timestamp),
            ("Timestamp", SqlType::Timestamp),
            ("bytea", SqlType::Blob),
            ("array", SqlType::Array),
        ];
        for (spelling, expected) in cases {
            assert_eq!(spelling.parse::<SqlType>().unwrap(), expected, "{spelling}");
        }
    }

    #[test]
    fn sql_type_name_round_trips_through_from_str() {
        for ty in [
            SqlType::Integer,
            SqlType::Float,
            SqlType::Text,
            SqlType::Boolean,
            SqlType::Timestamp,
            SqlType::Blob,
            SqlType::Array,
        ] {
            assert_eq!(ty.name().parse::<SqlType>().unwrap(), ty);
        }
    }

    #[test]
    fn unknown_type_name_is_a_type_mismatch() {
        let err = "uuid".parse::<SqlType>().unwrap_err();
        match err {
            BridgeError::TypeMismatch { expected, actual } => {
                assert_eq!(expected, "a SQL type name");
                assert_eq!(actual, "'uuid'");
            }
            other => panic!("expected TypeMismatch, got {other}"),
        }
    }
}
