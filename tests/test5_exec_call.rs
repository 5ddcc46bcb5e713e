use std::collections::BTreeMap;
use std::sync::Arc;

use sql_template_bridge::sqlite::SqliteDriver;
use sql_template_bridge::test_utils::MockDriver;
use sql_template_bridge::{BridgeError, Connector, DynValue, NativeValue, SqlType};

fn incrementing_driver() -> Arc<MockDriver> {
    let driver = Arc::new(MockDriver::new());
    // Models `begin :x := :y + 1; end;`.
    driver.set_call_handler(|_statement, inputs, outputs| {
        let y = inputs
            .iter()
            .find(|(name, _)| name == "y")
            .and_then(|(_, v)| match v {
                NativeValue::Int(i) => Some(*i),
                _ => None,
            })
            .ok_or_else(|| BridgeError::CallError("no :y input".to_string()))?;
        Ok(outputs
            .iter()
            .map(|(name, _)| (name.clone(), NativeValue::Int(y + 1)))
            .collect())
    });
    driver
}

#[test]
fn out_binds_come_back_by_identifier() -> Result<(), Box<dyn std::error::Error>> {
    let driver = incrementing_driver();
    let connector = Connector::new(driver.clone());

    let in_binds = BTreeMap::from([("y".to_string(), DynValue::Int(41))]);
    let out_binds = BTreeMap::from([("x".to_string(), SqlType::Integer)]);
    let result = connector.exec("begin :x := :y + 1; end;", &in_binds, &out_binds)?;

    assert_eq!(result.len(), 1);
    assert_eq!(result.get("x"), Some(&DynValue::Int(42)));
    assert_eq!(driver.calls_executed(), 1);
    Ok(())
}

#[test]
fn inout_parameters_use_one_identifier() -> Result<(), Box<dyn std::error::Error>> {
    let driver = Arc::new(MockDriver::new());
    driver.set_call_handler(|_statement, inputs, outputs| {
        let n = match inputs.first() {
            Some((_, NativeValue::Int(i))) => *i,
            _ => return Err(BridgeError::CallError("no input".to_string())),
        };
        Ok(outputs
            .iter()
            .map(|(name, _)| (name.clone(), NativeValue::Int(n * 2)))
            .collect())
    });
    let connector = Connector::new(driver.clone());

    let in_binds = BTreeMap::from([("n".to_string(), DynValue::Int(21))]);
    let out_binds = BTreeMap::from([("n".to_string(), SqlType::Integer)]);
    let result = connector.exec("begin :n := :n * 2; end;", &in_binds, &out_binds)?;
    assert_eq!(result.get("n"), Some(&DynValue::Int(42)));
    Ok(())
}

#[test]
fn undeclared_identifiers_never_reach_the_driver() -> Result<(), Box<dyn std::error::Error>> {
    let driver = incrementing_driver();
    let connector = Connector::new(driver.clone());

    let in_binds = BTreeMap::from([("z".to_string(), DynValue::Int(1))]);
    let err = connector
        .exec("begin :x := 1; end;", &in_binds, &BTreeMap::new())
        .unwrap_err();
    match err {
        BridgeError::CallError(msg) => assert!(msg.contains(":z"), "got: {msg}"),
        other => panic!("expected CallError, got {other:?}"),
    }
    assert_eq!(driver.calls_executed(), 0);
    Ok(())
}

#[test]
fn sqlite_driver_reports_calls_as_unsupported() -> Result<(), Box<dyn std::error::Error>> {
    let connector = Connector::new(Arc::new(SqliteDriver::new()));
    let out_binds = BTreeMap::from([("x".to_string(), SqlType::Integer)]);
    let err = connector
        .exec("begin :x := 1; end;", &BTreeMap::new(), &out_binds)
        .unwrap_err();
    assert!(matches!(err, BridgeError::CallError(_)));
    Ok(())
}
