//! Callable-statement execution with named in/out bind parameters.

use std::collections::BTreeMap;

use crate::driver::{DriverConnection, SqlType};
use crate::error::BridgeError;
use crate::marshal;
use crate::statement::scan_placeholders;
use crate::value::DynValue;

/// Execute a callable statement.
///
/// Every identifier in `in_binds` is registered as an input, every identifier
/// in `out_binds` as an output of its declared type; the two sets are
/// independent (an identifier in both is an inout parameter). Identifiers
/// absent from `out_binds` are never read back. The returned mapping is keyed
/// by the same identifiers as `out_binds`.
pub(crate) fn run_call(
    conn: &mut dyn DriverConnection,
    statement: &str,
    in_binds: &BTreeMap<String, DynValue>,
    out_binds: &BTreeMap<String, SqlType>,
) -> Result<BTreeMap<String, DynValue>, BridgeError> {
    if statement.trim().is_empty() {
        return Err(BridgeError::CallError("empty statement text".to_string()));
    }

    let info = scan_placeholders(statement);
    for ident in in_binds.keys().chain(out_binds.keys()) {
        if !info.declares(ident) {
            return Err(BridgeError::CallError(format!(
                "parameter ':{ident}' is not declared in the statement"
            )));
        }
    }

    let mut inputs = Vec::with_capacity(in_binds.len());
    for (ident, value) in in_binds {
        // For an inout parameter the declared output type drives conversion.
        let target = out_binds.get(ident).copied();
        let native = marshal::to_native(value, target).map_err(|e| {
            BridgeError::CallError(format!("in parameter ':{ident}': {e}"))
        })?;
        inputs.push((ident.clone(), native));
    }

    let outputs: Vec<(String, SqlType)> = out_binds
        .iter()
        .map(|(ident, ty)| (ident.clone(), *ty))
        .collect();

    tracing::debug!(
        inputs = inputs.len(),
        outputs = outputs.len(),
        "executing call"
    );
    let returned = conn
        .execute_call(statement, &inputs, &outputs)
        .map_err(BridgeError::into_call_error)?;

    let mut result = BTreeMap::new();
    for ident in out_binds.keys() {
        let value = returned
            .iter()
            .find(|(name, _)| name == ident)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| {
                BridgeError::CallError(format!(
                    "driver returned no value for out parameter ':{ident}'"
                ))
            })?;
        result.insert(ident.clone(), marshal::to_dyn(value));
    }
    Ok(result)
}
