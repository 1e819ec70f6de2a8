//! Diagnostic entries carried by `runwith-worker`.
//!
//! They need no user code on the remote side, which makes them handy for
//! checking that an interpreter path or a cluster setup works:
//!
//! ```rust,ignore
//! let worker = runwith::interpreter("/opt/bin/runwith-worker");
//! assert_eq!(worker.wrap(builtins::PING).call(())?, "pong");
//! ```

use std::path::PathBuf;

use runwith_core::Registry;
use serde_json::Value;

/// Liveness check.
#[runwith::entry(name = "runwith.ping")]
pub fn ping() -> String {
    "pong".to_string()
}

/// Returns its argument unchanged.
#[runwith::entry(name = "runwith.echo")]
pub fn echo(value: Value) -> Value {
    value
}

#[runwith::entry(name = "runwith.add")]
pub fn add(a: i64, b: i64) -> i64 {
    a.wrapping_add(b)
}

/// Path of the executable running the entry.
#[runwith::entry(name = "runwith.current_exe")]
pub fn current_exe() -> Option<PathBuf> {
    std::env::current_exe().ok()
}

#[runwith::entry(name = "runwith.pid")]
pub fn pid() -> u32 {
    std::process::id()
}

/// Value of an environment variable in the worker.
#[runwith::entry(name = "runwith.env")]
pub fn env(key: String) -> Option<String> {
    std::env::var(key).ok()
}

/// Terminates the worker with `code` without writing a result.
#[runwith::entry(name = "runwith.exit")]
pub fn exit(code: i32) {
    std::process::exit(code)
}

#[runwith::entry(name = "runwith.panic")]
pub fn panic(message: String) {
    panic!("{}", message)
}

/// Registry holding every built-in entry.
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    register(&mut registry);
    registry
}

/// Add the built-in entries to an existing registry.
pub fn register(registry: &mut Registry) {
    registry
        .register(PING)
        .register(ECHO)
        .register(ADD)
        .register(CURRENT_EXE)
        .register(PID)
        .register(ENV)
        .register(EXIT)
        .register(PANIC);
}
