//! runwith-worker: generic interpreter carrying the built-in entries.
//!
//! Started by a runner as `runwith-worker --runwith-bootstrap <package>`.
//! Run without arguments it lists the entries it can execute.

use std::io::Write;

use tracing_subscriber::EnvFilter;

/// Log filter, e.g. `RUNWITH_LOG=debug`.
const LOG_ENV: &str = "RUNWITH_LOG";

fn main() -> anyhow::Result<()> {
    // stdout belongs to the entry; logs go to stderr
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let registry = runwith::builtins::registry();
    tracing::debug!("Worker ready with {} entries", registry.len());
    runwith::bootstrap::run_if_requested(&registry);

    let mut out = std::io::stdout().lock();
    writeln!(out, "runwith-worker {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "usage: runwith-worker {} <package>", runwith::BOOTSTRAP_FLAG)?;
    writeln!(out)?;
    writeln!(out, "entries:")?;
    for name in registry.names() {
        writeln!(out, "  {}", name)?;
    }
    Ok(())
}
