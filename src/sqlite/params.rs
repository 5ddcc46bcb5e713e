use rusqlite::types::Value;

use crate::driver::NativeValue;
use crate::error::BridgeError;

/// Convert a single native value to a rusqlite `Value`.
///
/// `SQLite` has no boolean or timestamp storage classes; booleans become
/// integers and timestamps text in `%F %T%.f` format.
///
/// # Errors
///
/// Returns `BridgeError::UnsupportedArgument` for array values; `SQLite` has
/// no array binds.
pub(crate) fn native_to_sqlite(value: &NativeValue) -> Result<Value, BridgeError> {
    match value {
        NativeValue::Null => Ok(Value::Null),
        NativeValue::Int(i) => Ok(Value::Integer(*i)),
        NativeValue::Float(f) => Ok(Value::Real(*f)),
        NativeValue::Text(s) => Ok(Value::Text(s.clone())),
        NativeValue::Bool(b) => Ok(Value::Integer(i64::from(*b))),
        NativeValue::Timestamp(dt) => Ok(Value::Text(dt.format("%F %T%.f").to_string())),
        NativeValue::Blob(bytes) => Ok(Value::Blob(bytes.clone())),
        NativeValue::Array(_) => Err(BridgeError::UnsupportedArgument(
            "the sqlite driver has no array bind support".to_string(),
        )),
    }
}

/// Convert a full bind set.
pub(crate) fn convert_binds(binds: &[NativeValue]) -> Result<Vec<Value>, BridgeError> {
    let mut values = Vec::with_capacity(binds.len());
    for bind in binds {
        values.push(native_to_sqlite(bind)?);
    }
    Ok(values)
}

/// Extract a native value from a `SQLite` row column.
///
/// # Errors
///
/// Returns `BridgeError::Sqlite` if the column cannot be read.
pub(crate) fn sqlite_extract_value(
    row: &rusqlite::Row,
    idx: usize,
) -> Result<NativeValue, BridgeError> {
    let value: Value = row.get(idx).map_err(BridgeError::Sqlite)?;
    match value {
        Value::Null => Ok(NativeValue::Null),
        Value::Integer(i) => Ok(NativeValue::Int(i)),
        Value::Real(f) => Ok(NativeValue::Float(f)),
        Value::Text(s) => Ok(NativeValue::Text(s)),
        Value::Blob(b) => Ok(NativeValue::Blob(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn scalars_map_to_storage_classes() {
        assert_eq!(
            native_to_sqlite(&NativeValue::Bool(true)).unwrap(),
            Value::Integer(1)
        );
        let ts =
            NaiveDateTime::parse_from_str("2024-01-01 08:00:01", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(
            native_to_sqlite(&NativeValue::Timestamp(ts)).unwrap(),
            Value::Text("2024-01-01 08:00:01".to_string())
        );
    }

    #[test]
    fn array_binds_are_unsupported() {
        use crate::driver::VecArray;
        use std::sync::Arc;
        let array = NativeValue::Array(Arc::new(VecArray::new(vec![])));
        assert!(matches!(
            native_to_sqlite(&array),
            Err(BridgeError::UnsupportedArgument(_))
        ));
    }
}
