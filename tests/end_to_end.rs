//! Whole-graph walks through a wrapped mock driver: transitive wrapping,
//! sparse capability surfaces, multiple result sets, and the connector path.

mod common;

use common::recording_hooks;
use sqltap::capability::{ConnectionCapability, RowsCapability, StatementCapability};
use sqltap::driver::{
    BoundValue, CallContext, Connection, ConnectionExt, Connector, Driver, DriverExt, Rows,
    RowsExt, Statement, StatementExt, Transaction, Value,
};
use sqltap::hooks::trace;
use sqltap::mock::MockDriver;
use sqltap::wrap_driver;

#[tokio::test]
async fn hooks_follow_every_handle_in_the_graph() {
    let (hooks, recorder) = recording_hooks();
    let driver = MockDriver::full();
    let wrapped = wrap_driver(Box::new(driver), hooks);

    let mut conn = wrapped.open("mock://db").await.expect("open");

    let mut stmt = conn.prepare("select n from t").await.expect("prepare");
    stmt.exec(&[Value::Int(1)]).await.expect("exec");
    stmt.close().await.expect("close statement");

    let mut rows = conn.query("select n from t", &[]).await.expect("query");
    let mut buf = vec![Value::Null];
    while rows.next_row(&mut buf).await.expect("advance") {}
    rows.close().await.expect("close rows");

    let mut tx = conn.begin().await.expect("begin");
    tx.commit().await.expect("commit");

    conn.close().await.expect("close connection");

    // Default mock dataset holds two rows, so advance-row fires three times.
    assert_eq!(
        recorder.events(),
        vec![
            "before driver.open",
            "success driver.open",
            "before connection.prepare",
            "success connection.prepare",
            "before statement.exec",
            "success statement.exec",
            "before statement.close",
            "success statement.close",
            "before connection.query",
            "success connection.query",
            "before rows.advance-row",
            "success rows.advance-row",
            "before rows.advance-row",
            "success rows.advance-row",
            "before rows.advance-row",
            "success rows.advance-row",
            "before rows.close",
            "success rows.close",
            "before connection.begin-transaction",
            "success connection.begin-transaction",
            "before transaction.commit",
            "success transaction.commit",
            "before connection.close",
            "success connection.close",
        ],
    );
}

#[tokio::test]
async fn connector_path_is_wrapped_transitively() {
    let (hooks, recorder) = recording_hooks();
    let driver = MockDriver::new()
        .with_connector()
        .with_connection_capabilities(&[ConnectionCapability::Ping.index()]);
    let wrapped = wrap_driver(Box::new(driver), hooks);

    let connector = wrapped
        .open_connector("mock://db")
        .await
        .expect("open connector");
    let mut conn = connector
        .connect(&CallContext::none())
        .await
        .expect("connect");
    conn.ping(&CallContext::none()).await.expect("ping");

    assert_eq!(
        recorder.events(),
        vec![
            "before driver.open-connector",
            "success driver.open-connector",
            "before connector.connect",
            "success connector.connect",
            "before connection.ping",
            "success connection.ping",
        ],
    );
}

#[tokio::test]
async fn sparse_surface_only_serves_what_it_has() {
    let (hooks, recorder) = recording_hooks();
    let driver = MockDriver::new().with_connection_capabilities(&[
        ConnectionCapability::Ping.index(),
        ConnectionCapability::ResetSession.index(),
    ]);
    let log = driver.log();
    let wrapped = wrap_driver(Box::new(driver), hooks);

    let mut conn = wrapped.open("mock://db").await.expect("open");
    let cx = CallContext::none();

    conn.ping(&cx).await.expect("ping");
    conn.reset_session(&cx).await.expect("reset session");

    let err = conn
        .begin_with_options(&cx, Default::default())
        .await
        .expect_err("no begin-with-options capability");
    assert!(err.is_unsupported());
    let err = conn
        .prepare_with_context(&cx, "select 1")
        .await
        .expect_err("no prepare-with-context capability");
    assert!(err.is_unsupported());
    let mut value = BoundValue {
        ordinal: 1,
        name: None,
        value: Value::Int(1),
    };
    let err = conn
        .check_bound_value(&mut value)
        .await
        .expect_err("no bound-value checking");
    assert!(err.is_unsupported());

    assert_eq!(
        log.calls().await,
        vec!["driver.open", "connection.ping", "connection.reset-session"],
    );
    assert!(!recorder
        .events()
        .iter()
        .any(|e| e.contains("begin-transaction-with-options")
            || e.contains("prepare-with-context")
            || e.contains("check-bound-value")));
}

#[tokio::test]
async fn context_capable_statement_serves_both_paths() {
    let (hooks, recorder) = recording_hooks();
    let driver = MockDriver::new()
        .with_statement_capabilities(&StatementCapability::ALL.map(|c| c.index()))
        .with_bound_value_checking();
    let wrapped = wrap_driver(Box::new(driver), hooks);

    let mut conn = wrapped.open("mock://db").await.expect("open");
    let mut stmt = conn.prepare("select n from t where n = ?").await.expect("prepare");

    let cx = CallContext::none();
    let mut param = BoundValue {
        ordinal: 1,
        name: Some("n".to_string()),
        value: Value::Int(3),
    };
    stmt.check_bound_value(&mut param).await.expect("check");

    let params = vec![param];
    stmt.exec_with_context(&cx, &params).await.expect("exec");
    let mut rows = stmt
        .query_with_context(&cx, &params)
        .await
        .expect("query");
    rows.close().await.expect("close rows");

    assert!(recorder.contains("success statement.check-bound-value"));
    assert!(recorder.contains("success statement.exec-with-context"));
    assert!(recorder.contains("success statement.query-with-context"));
    assert!(recorder.contains("success rows.close"));
}

#[tokio::test]
async fn multiple_result_sets_advance_through_the_proxy() {
    let (hooks, recorder) = recording_hooks();
    let driver = MockDriver::new()
        .with_rows_capabilities(&[RowsCapability::NextResultSet.index()])
        .with_result_sets(
            vec!["n".to_string()],
            vec![
                vec![vec![Value::Int(1)]],
                vec![vec![Value::Int(2)]],
            ],
        );
    let wrapped = wrap_driver(Box::new(driver), hooks);

    let mut conn = wrapped.open("mock://db").await.expect("open");
    let mut rows = conn.query("select n from t", &[]).await.expect("query");

    let mut buf = vec![Value::Null];
    assert!(rows.next_row(&mut buf).await.expect("first set"));
    assert_eq!(buf[0], Value::Int(1));

    assert!(rows.has_next_result_set());
    rows.next_result_set().await.expect("advance set");
    assert!(rows.next_row(&mut buf).await.expect("second set"));
    assert_eq!(buf[0], Value::Int(2));

    assert!(!rows.has_next_result_set());
    let err = rows
        .next_result_set()
        .await
        .expect_err("no further result set");
    assert!(!err.is_unsupported());

    assert_eq!(recorder.events().iter().filter(|e| *e == "success rows.advance-result-set").count(), 1);
    assert!(recorder.contains("failure rows.advance-result-set"));
}

#[tokio::test]
async fn traced_registry_walks_the_graph_without_panicking() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let driver = MockDriver::full();
    driver.fail().arm("statement.exec").await;
    let wrapped = wrap_driver(Box::new(driver), trace::traced());

    let mut conn = wrapped.open("mock://db").await.expect("open");
    conn.ping(&CallContext::none()).await.expect("ping");

    let mut stmt = conn.prepare("select 1").await.expect("prepare");
    stmt.exec(&[]).await.expect_err("armed failure");
    stmt.close().await.expect("close statement");

    let mut rows = conn.query("select 1", &[]).await.expect("query");
    let mut buf = vec![Value::Null];
    while rows.next_row(&mut buf).await.expect("advance") {}
    rows.close().await.expect("close rows");
    conn.close().await.expect("close connection");
}
