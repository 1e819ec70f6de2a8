//! Tests for the attribute macros, run against `runwith-worker`.

use runwith::prelude::*;
use runwith::{Error, Interpreter};

const WORKER: &str = env!("CARGO_BIN_EXE_runwith-worker");

fn quiet_worker() -> Interpreter {
    runwith::interpreter(WORKER).with_settings(Settings::default().echo_output(false))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Point {
    x: f64,
    y: f64,
    label: Option<String>,
}

/// Squares locally.
#[runwith::entry]
fn square(x: u32) -> u32 {
    x * x
}

#[runwith::entry(name = "tests.nothing")]
fn nothing() {}

#[runwith::interpreter(WORKER, name = "runwith.add")]
fn add(a: i64, b: i64) -> i64 {
    a + b
}

// The worker answers with its own ping, not this body.
#[runwith::remote(quiet_worker(), name = "runwith.ping")]
fn ping() -> String {
    "local".to_string()
}

#[runwith::remote(quiet_worker(), name = "runwith.echo")]
fn echo_point(point: Point) -> Point {
    point
}

#[runwith::slurm(SlurmOptions::new().partition("short"), "#!/bin/bash\necho no target\n")]
fn unschedulable() -> bool {
    true
}

#[test]
fn test_entry_keeps_function() {
    assert_eq!(square(7), 49);
    assert_eq!(SQUARE.invoke((7,)), 49);
    assert_eq!(SQUARE.name(), concat!(module_path!(), "::square"));

    NOTHING.invoke(());
    assert_eq!(NOTHING.name(), "tests.nothing");
}

#[test]
fn test_entry_registers() {
    let registry = Registry::new().with(SQUARE).with(NOTHING);
    let ret = registry
        .dispatch(SQUARE.name(), serde_json::json!([12]))
        .unwrap();
    assert_eq!(ret, serde_json::json!(144));
}

#[test]
fn test_interpreter_attribute() {
    assert_eq!(add(2, 3).unwrap(), 5);
    assert_eq!(ADD.invoke((2, 3)), 5);
}

#[test]
fn test_remote_runs_elsewhere() {
    assert_eq!(ping().unwrap(), "pong");
    assert_eq!(PING.invoke(()), "local");
}

#[test]
fn test_user_types_cross_the_boundary() {
    let point = Point {
        x: 1.5,
        y: -2.0,
        label: Some("origin-ish".to_string()),
    };
    assert_eq!(echo_point(point.clone()).unwrap(), point);
}

#[test]
fn test_slurm_template_without_target() {
    match unschedulable() {
        Err(Error::Template(message)) => assert!(message.contains("{target}")),
        other => panic!("Expected Template error, got {:?}", other),
    }
    assert!(UNSCHEDULABLE.invoke(()));
}
