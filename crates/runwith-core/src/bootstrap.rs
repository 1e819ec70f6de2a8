//! Child side of the process boundary.
//!
//! Any executable can act as a runwith worker by embedding a [`Registry`]
//! and calling [`run_if_requested`] first thing in `main`:
//!
//! ```rust,ignore
//! fn main() {
//!     let registry = Registry::new().with(COMPUTE);
//!     runwith::bootstrap::run_if_requested(&registry);
//!     // normal program continues here
//! }
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::entry::Registry;
use crate::error::{Error, Result};
use crate::package::{BOOTSTRAP_FLAG, Package, ResultEnvelope};

/// Exit status when the package or result file cannot be handled.
pub const EXIT_BAD_PACKAGE: i32 = 2;
/// Exit status when the package names an unknown entry.
pub const EXIT_ENTRY_NOT_FOUND: i32 = 3;
/// Exit status when the arguments do not fit the entry.
pub const EXIT_BAD_ARGUMENTS: i32 = 4;

/// Package path requested on the command line, if any.
///
/// `Some(Err(..))` means the flag was given without a path.
pub fn requested_package<I>(args: I) -> Option<Result<PathBuf>>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter().skip(1);
    if args.next()? != BOOTSTRAP_FLAG {
        return None;
    }
    Some(
        args.next()
            .map(PathBuf::from)
            .ok_or_else(|| Error::Package(format!("{} requires a package path", BOOTSTRAP_FLAG))),
    )
}

/// If this process was started in bootstrap mode, run the packaged entry
/// and exit. Otherwise return immediately.
pub fn run_if_requested(registry: &Registry) {
    let Some(request) = requested_package(std::env::args_os()) else {
        return;
    };

    let code = match request {
        Ok(path) => run_and_report(registry, &path),
        Err(e) => report(&e),
    };
    std::process::exit(code);
}

/// Run the package at `path` and map the outcome to an exit status.
pub fn run_and_report(registry: &Registry, path: &Path) -> i32 {
    match run(registry, path) {
        Ok(()) => 0,
        Err(e) => report(&e),
    }
}

/// Read the package, run its entry, write the result.
pub fn run(registry: &Registry, path: &Path) -> Result<()> {
    let package = Package::read(path)?;
    tracing::debug!("Bootstrapping '{}' ({})", package.entry, package.invocation);

    let value = registry.dispatch(&package.entry, package.args)?;

    ResultEnvelope {
        invocation: package.invocation,
        entry: package.entry,
        value,
    }
    .write(&package.result_path)
}

/// Exit status for a bootstrap failure.
pub fn exit_code(err: &Error) -> i32 {
    match err {
        Error::EntryNotFound(_) => EXIT_ENTRY_NOT_FOUND,
        Error::Deserialization(_) => EXIT_BAD_ARGUMENTS,
        _ => EXIT_BAD_PACKAGE,
    }
}

fn report(err: &Error) -> i32 {
    tracing::error!("Bootstrap failed: {}", err);
    eprintln!("runwith: {}", err);
    exit_code(err)
}
