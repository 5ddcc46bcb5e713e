use std::sync::Arc;

use sql_template_bridge::test_utils::MockDriver;
use sql_template_bridge::{BridgeError, Connector, DynValue};

#[test]
fn bind_arity_is_checked_before_execution() -> Result<(), Box<dyn std::error::Error>> {
    let driver = Arc::new(MockDriver::new());
    let connector = Connector::new(driver.clone());
    let conn = connector.default_connection()?;

    let err = conn
        .query_with(
            "select * from t where a = ?1 and b = ?2",
            &[DynValue::Int(1)],
        )
        .unwrap_err();
    match err {
        BridgeError::BindArity { expected, supplied } => {
            assert_eq!(expected, 2);
            assert_eq!(supplied, 1);
        }
        other => panic!("expected BindArity, got {other:?}"),
    }
    assert_eq!(driver.queries_executed(), 0, "statement must not execute");
    Ok(())
}

#[test]
fn placeholders_inside_literals_and_comments_do_not_count()
-> Result<(), Box<dyn std::error::Error>> {
    let driver = Arc::new(MockDriver::new());
    let connector = Connector::new(driver.clone());
    let conn = connector.default_connection()?;

    conn.query_with(
        "select '?' as lit, ?1 as bound -- trailing ? here\n from t",
        &[DynValue::Int(7)],
    )?;
    assert_eq!(driver.queries_executed(), 1);
    Ok(())
}

#[test]
fn empty_sql_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let connector = Connector::new(Arc::new(MockDriver::new()));
    let err = connector.query("   ").unwrap_err();
    assert!(matches!(err, BridgeError::QueryError(_)));
    Ok(())
}

#[test]
fn operations_after_close_fail_on_every_clone() -> Result<(), Box<dyn std::error::Error>> {
    let connector = Connector::new(Arc::new(MockDriver::new()));
    let conn = connector.default_connection()?;
    let alias = conn.clone();

    conn.close()?;
    assert!(conn.is_closed());
    assert!(alias.is_closed());

    let err = alias.query("select 1").unwrap_err();
    assert!(matches!(err, BridgeError::ConnectionError(_)));

    // Double close is an error too.
    assert!(matches!(
        conn.close(),
        Err(BridgeError::ConnectionError(_))
    ));
    Ok(())
}

#[test]
fn mapping_binds_are_unsupported() -> Result<(), Box<dyn std::error::Error>> {
    let connector = Connector::new(Arc::new(MockDriver::new()));
    let err = connector
        .query_with(
            "select ?1",
            &[DynValue::Map(std::collections::BTreeMap::new())],
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::UnsupportedArgument(_)));
    Ok(())
}
