use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::array::SqlArray;
use crate::error::BridgeError;

/// The dynamic value exchanged between this crate and the host scripting
/// environment.
///
/// Template code has no compile-time schema knowledge, so everything crossing
/// the boundary is one of these variants:
/// ```rust
/// use sql_template_bridge::DynValue;
///
/// let binds = vec![
///     DynValue::Int(1),
///     DynValue::Text("alice".into()),
///     DynValue::Bool(true),
/// ];
/// # let _ = binds;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DynValue {
    /// Null/absent value
    Null,
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// Binary data
    Blob(Vec<u8>),
    /// Ordered sequence of dynamic values
    Seq(Vec<DynValue>),
    /// Mapping from identifier to dynamic value
    Map(BTreeMap<String, DynValue>),
    /// Lazy sequence backed by a native array resource
    Array(SqlArray),
}

impl DynValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let DynValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let DynValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let DynValue::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let DynValue::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let DynValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let DynValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_seq(&self) -> Option<&[DynValue]> {
        if let DynValue::Seq(items) = self {
            Some(items)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, DynValue>> {
        if let DynValue::Map(map) = self {
            Some(map)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&SqlArray> {
        if let DynValue::Array(array) = self {
            Some(array)
        } else {
            None
        }
    }

    /// Name of this value's dynamic type, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            DynValue::Null => "null",
            DynValue::Int(_) => "integer",
            DynValue::Float(_) => "float",
            DynValue::Text(_) => "text",
            DynValue::Bool(_) => "boolean",
            DynValue::Timestamp(_) => "timestamp",
            DynValue::Blob(_) => "blob",
            DynValue::Seq(_) => "sequence",
            DynValue::Map(_) => "mapping",
            DynValue::Array(_) => "array",
        }
    }

    /// Convert into a JSON value for the host boundary.
    ///
    /// Native-backed arrays are fetched eagerly here; this is the one place
    /// an array adapter is fully materialized on behalf of the host.
    ///
    /// Lossy for non-finite floats: JSON has no NaN or infinity, so those
    /// become `null`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if a native array fetch fails.
    pub fn to_json(&self) -> Result<JsonValue, BridgeError> {
        Ok(match self {
            DynValue::Null => JsonValue::Null,
            DynValue::Int(i) => JsonValue::from(*i),
            DynValue::Float(f) => {
                serde_json::Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number)
            }
            DynValue::Text(s) => JsonValue::String(s.clone()),
            DynValue::Bool(b) => JsonValue::Bool(*b),
            DynValue::Timestamp(ts) => JsonValue::String(ts.format("%F %T%.f").to_string()),
            DynValue::Blob(bytes) => {
                JsonValue::Array(bytes.iter().map(|b| JsonValue::from(*b)).collect())
            }
            DynValue::Seq(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(item.to_json()?);
                }
                JsonValue::Array(out)
            }
            DynValue::Map(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k.clone(), v.to_json()?);
                }
                JsonValue::Object(out)
            }
            DynValue::Array(array) => {
                let mut out = Vec::with_capacity(array.len()?);
                for item in array.to_vec()? {
                    out.push(item.to_json()?);
                }
                JsonValue::Array(out)
            }
        })
    }

    /// Build a dynamic value from JSON. Strings stay text; no timestamp
    /// inference happens here.
    #[must_use]
    pub fn from_json(value: &JsonValue) -> DynValue {
        match value {
            JsonValue::Null => DynValue::Null,
            JsonValue::Bool(b) => DynValue::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DynValue::Int(i)
                } else {
                    DynValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => DynValue::Text(s.clone()),
            JsonValue::Array(items) => DynValue::Seq(items.iter().map(Self::from_json).collect()),
            JsonValue::Object(map) => DynValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }
}
