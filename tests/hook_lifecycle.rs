//! Hook dispatch through a wrapped driver graph: ordering, tag threading,
//! failure routing, and the unsupported-capability short circuit.

mod common;

use std::sync::{Arc, Mutex};

use common::recording_hooks;
use sqltap::capability::{CapabilitySet, ConnectionCapability};
use sqltap::driver::{CallContext, Connection, ConnectionExt, Driver, DriverError};
use sqltap::hooks::Outcome;
use sqltap::mock::MockDriver;
use sqltap::{wrap_driver, Hooks, Operation, Role, Tag};

#[tokio::test]
async fn success_fires_before_then_success() {
    let (hooks, recorder) = recording_hooks();
    let wrapped = wrap_driver(Box::new(MockDriver::new()), hooks);

    let mut conn = wrapped.open("mock://db").await.expect("open");
    conn.exec("insert into t values (1)", &[]).await.expect("exec");

    assert_eq!(
        recorder.events(),
        vec![
            "before driver.open",
            "success driver.open",
            "before connection.exec",
            "success connection.exec",
        ],
    );
}

#[tokio::test]
async fn failure_fires_before_then_failure() {
    let (hooks, recorder) = recording_hooks();
    let driver = MockDriver::new();
    driver.fail().arm("connection.exec").await;
    let wrapped = wrap_driver(Box::new(driver), hooks);

    let mut conn = wrapped.open("mock://db").await.expect("open");
    let err = conn
        .exec("insert into t values (1)", &[])
        .await
        .expect_err("armed failure");
    assert!(matches!(err, DriverError::Backend(_)));

    let events = recorder.events();
    assert_eq!(
        events[2..],
        ["before connection.exec", "failure connection.exec"],
    );
    assert!(!recorder.contains("success connection.exec"));
}

#[tokio::test]
async fn empty_registry_changes_nothing_observable() {
    let raw = MockDriver::new();
    let mut raw_conn = raw.open("mock://db").await.expect("open");
    let raw_outcome = raw_conn.exec("insert", &[]).await.expect("exec");

    let driver = MockDriver::new();
    let log = driver.log();
    let wrapped = wrap_driver(Box::new(driver), Hooks::none());
    let mut conn = wrapped.open("mock://db").await.expect("open");
    let outcome = conn.exec("insert", &[]).await.expect("exec");

    assert_eq!(outcome, raw_outcome);
    assert_eq!(log.calls().await, vec!["driver.open", "connection.exec"]);
}

#[tokio::test]
async fn unsupported_capability_short_circuits_without_hooks_or_driver() {
    let (hooks, recorder) = recording_hooks();
    let driver = MockDriver::new();
    let log = driver.log();
    let wrapped = wrap_driver(Box::new(driver), hooks);

    let mut conn = wrapped.open("mock://db").await.expect("open");
    let err = conn
        .ping(&CallContext::none())
        .await
        .expect_err("no ping capability");
    assert!(err.is_unsupported());

    assert_eq!(log.count("connection.ping").await, 0);
    assert!(!recorder
        .events()
        .iter()
        .any(|e| e.ends_with("connection.ping")));
}

#[tokio::test]
async fn tag_round_trips_through_the_proxy() {
    let observed = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&observed);

    let hooks = Hooks::builder()
        .before(Role::Connection, Operation::Ping, |_, _| {
            Some(Tag::new(7u32))
        })
        .on_success(Role::Connection, Operation::Ping, move |_, tag, _| {
            *sink.lock().expect("sink lock") = tag.and_then(|t| t.downcast::<u32>());
        })
        .build();

    let driver =
        MockDriver::new().with_connection_capabilities(&[ConnectionCapability::Ping.index()]);
    let wrapped = wrap_driver(Box::new(driver), hooks);

    let mut conn = wrapped.open("mock://db").await.expect("open");
    conn.ping(&CallContext::none()).await.expect("ping");

    assert_eq!(*observed.lock().expect("sink lock"), Some(7u32));
}

#[tokio::test]
async fn handle_outcome_reports_detected_capabilities() {
    let observed = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&observed);

    let hooks = Hooks::builder()
        .on_success(Role::Driver, Operation::Open, move |_, _, outcome| {
            if let Outcome::Handle { role, capabilities } = outcome {
                *sink.lock().expect("sink lock") = Some((*role, *capabilities));
            }
        })
        .build();

    let subset = [
        ConnectionCapability::BeginWithOptions.index(),
        ConnectionCapability::Ping.index(),
    ];
    let driver = MockDriver::new().with_connection_capabilities(&subset);
    let wrapped = wrap_driver(Box::new(driver), hooks);
    wrapped.open("mock://db").await.expect("open");

    let expected = CapabilitySet::from_indices(&subset);
    assert_eq!(
        *observed.lock().expect("sink lock"),
        Some((Role::Connection, expected)),
    );
}
