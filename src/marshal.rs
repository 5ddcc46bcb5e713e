//! Conversion between the dynamic value model and native driver values.
//!
//! Pure functions, no state. Dynamic → native conversion is driven by the
//! declared target type where one exists (out binds, inout binds); native →
//! dynamic conversion is total.

use std::sync::Arc;

use crate::array::SqlArray;
use crate::driver::{NativeValue, SqlType, VecArray};
use crate::error::BridgeError;
use crate::value::DynValue;

fn mismatch(expected: &str, value: &DynValue) -> BridgeError {
    BridgeError::TypeMismatch {
        expected: expected.to_string(),
        actual: value.type_name().to_string(),
    }
}

/// Convert a dynamic value into a native bind value.
///
/// With no declared `target`, scalars map to their natural native type.
/// A sequence converts to a native array only under a declared
/// `SqlType::Array`; a mapping is never sent as a single bind value.
///
/// # Errors
///
/// Returns `BridgeError::TypeMismatch` for an unconvertible pairing and
/// `BridgeError::UnsupportedArgument` for values of the wrong capability.
pub fn to_native(value: &DynValue, target: Option<SqlType>) -> Result<NativeValue, BridgeError> {
    match (value, target) {
        (DynValue::Null, _) => Ok(NativeValue::Null),

        (DynValue::Int(i), None | Some(SqlType::Integer)) => Ok(NativeValue::Int(*i)),
        #[allow(clippy::cast_precision_loss)]
        (DynValue::Int(i), Some(SqlType::Float)) => Ok(NativeValue::Float(*i as f64)),
        (DynValue::Int(0), Some(SqlType::Boolean)) => Ok(NativeValue::Bool(false)),
        (DynValue::Int(1), Some(SqlType::Boolean)) => Ok(NativeValue::Bool(true)),

        (DynValue::Float(f), None | Some(SqlType::Float)) => Ok(NativeValue::Float(*f)),

        (DynValue::Text(s), None | Some(SqlType::Text)) => Ok(NativeValue::Text(s.clone())),
        (DynValue::Text(_), Some(SqlType::Timestamp)) => value
            .as_timestamp()
            .map(NativeValue::Timestamp)
            .ok_or_else(|| mismatch(SqlType::Timestamp.name(), value)),

        (DynValue::Bool(b), None | Some(SqlType::Boolean)) => Ok(NativeValue::Bool(*b)),
        (DynValue::Bool(b), Some(SqlType::Integer)) => Ok(NativeValue::Int(i64::from(*b))),

        (DynValue::Timestamp(ts), None | Some(SqlType::Timestamp)) => {
            Ok(NativeValue::Timestamp(*ts))
        }
        (DynValue::Timestamp(ts), Some(SqlType::Text)) => {
            Ok(NativeValue::Text(ts.format("%F %T%.f").to_string()))
        }

        (DynValue::Blob(bytes), None | Some(SqlType::Blob)) => {
            Ok(NativeValue::Blob(bytes.clone()))
        }

        (DynValue::Seq(items), Some(SqlType::Array)) => {
            let mut elements = Vec::with_capacity(items.len());
            for item in items {
                elements.push(to_native(item, None)?);
            }
            Ok(NativeValue::Array(Arc::new(VecArray::new(elements))))
        }
        (DynValue::Seq(_), _) => Err(BridgeError::UnsupportedArgument(
            "a sequence bind requires a declared array type".to_string(),
        )),

        (DynValue::Map(_), _) => Err(BridgeError::UnsupportedArgument(
            "a mapping cannot be used as a bind value".to_string(),
        )),

        (DynValue::Array(array), None | Some(SqlType::Array)) => {
            Ok(NativeValue::Array(array.native_handle()))
        }

        (other, Some(target)) => Err(mismatch(target.name(), other)),
    }
}

/// Convert a native value into a dynamic value.
///
/// Native arrays wrap into a lazy [`SqlArray`]; they are never flattened
/// here.
#[must_use]
pub fn to_dyn(value: NativeValue) -> DynValue {
    match value {
        NativeValue::Null => DynValue::Null,
        NativeValue::Int(i) => DynValue::Int(i),
        NativeValue::Float(f) => DynValue::Float(f),
        NativeValue::Text(s) => DynValue::Text(s),
        NativeValue::Bool(b) => DynValue::Bool(b),
        NativeValue::Timestamp(ts) => DynValue::Timestamp(ts),
        NativeValue::Blob(bytes) => DynValue::Blob(bytes),
        NativeValue::Array(handle) => DynValue::Array(SqlArray::new(handle)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use std::collections::BTreeMap;

    #[test]
    fn scalar_round_trip() {
        let samples = [
            DynValue::Null,
            DynValue::Int(-7),
            DynValue::Float(2.25),
            DynValue::Text("abc".into()),
            DynValue::Bool(true),
            DynValue::Timestamp(
                NaiveDateTime::parse_from_str("2024-06-01 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
            ),
            DynValue::Blob(vec![1, 2, 3]),
        ];
        for v in samples {
            assert_eq!(to_dyn(to_native(&v, None).unwrap()), v);
        }
    }

    #[test]
    fn declared_type_coercions() {
        assert_eq!(
            to_native(&DynValue::Int(3), Some(SqlType::Float)).unwrap(),
            NativeValue::Float(3.0)
        );
        assert_eq!(
            to_native(&DynValue::Bool(true), Some(SqlType::Integer)).unwrap(),
            NativeValue::Int(1)
        );
        assert_eq!(
            to_native(
                &DynValue::Text("2024-06-01 12:00:00".into()),
                Some(SqlType::Timestamp)
            )
            .unwrap(),
            NativeValue::Timestamp(
                NaiveDateTime::parse_from_str("2024-06-01 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
            )
        );
    }

    #[test]
    fn mismatch_names_both_types() {
        let err = to_native(&DynValue::Blob(vec![0]), Some(SqlType::Integer)).unwrap_err();
        match err {
            BridgeError::TypeMismatch { expected, actual } => {
                assert_eq!(expected, "integer");
                assert_eq!(actual, "blob");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sequence_needs_declared_array_type() {
        let seq = DynValue::Seq(vec![DynValue::Int(1), DynValue::Int(2)]);
        assert!(matches!(
            to_native(&seq, None),
            Err(BridgeError::UnsupportedArgument(_))
        ));

        let native = to_native(&seq, Some(SqlType::Array)).unwrap();
        match native {
            NativeValue::Array(handle) => {
                assert_eq!(handle.fetch_all().unwrap().len(), 2);
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn mapping_is_never_a_bind_value() {
        let map = DynValue::Map(BTreeMap::new());
        assert!(matches!(
            to_native(&map, Some(SqlType::Text)),
            Err(BridgeError::UnsupportedArgument(_))
        ));
    }

    #[test]
    fn native_array_wraps_lazily() {
        let native = NativeValue::Array(Arc::new(VecArray::new(vec![NativeValue::Int(5)])));
        match to_dyn(native) {
            DynValue::Array(array) => assert_eq!(array.get(0).unwrap(), DynValue::Int(5)),
            other => panic!("expected array, got {other:?}"),
        }
    }
}
