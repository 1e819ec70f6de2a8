//! Runners: launch a packaged entry somewhere else and wait for it.
//!
//! Every call goes through the same linear pipeline:
//!
//! 1. encode the arguments (serialization errors surface here, before any
//!    file or process exists),
//! 2. [`Runner::preflight`] (missing binaries surface here),
//! 3. create [`Assets`] and write the [`Package`],
//! 4. [`Runner::launch`] and block until the child or job ends,
//! 5. turn a non-zero exit into [`Error::Runtime`],
//! 6. read the [`ResultEnvelope`] back and drop the assets.

mod interpreter;
mod options;
mod scheduler;
mod slurm;

pub use interpreter::{Interpreter, interpreter};
pub use options::{OptionValue, SlurmOptions};
pub use scheduler::{JobHandle, JobStatus, LocalShell, Scheduler};
pub use slurm::{Completion, JobGroup, Slurm, SlurmCli, SubmittedJob, slurm};

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::assets::Assets;
use crate::entry::Entry;
use crate::error::{Error, ExitInfo, Result};
use crate::package::{Package, ResultEnvelope, encode_args};
use crate::settings::Settings;

/// What a finished launch reports back.
#[derive(Debug, Clone)]
pub struct Launched {
    pub status: ExitInfo,
    pub stdout: String,
    pub stderr: String,
}

/// An execution context that can run one packaged entry.
///
/// Implementations write any captured output to `assets.log` themselves.
pub trait Runner: fmt::Debug + Send + Sync {
    /// Settings for this runner.
    fn settings(&self) -> &Settings;

    /// Where asset directories go when [`Settings::work_dir`] is unset.
    fn default_work_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }

    /// Checks that must pass before any asset is created.
    fn preflight(&self) -> Result<()> {
        Ok(())
    }

    /// Run the package in `assets` and block until it has finished.
    fn launch(&self, assets: &Assets) -> Result<Launched>;
}

/// Run `entry(args)` through `runner` and return its result.
pub fn run_entry<A, R>(runner: &dyn Runner, entry: Entry<A, R>, args: &A) -> Result<R>
where
    A: Serialize,
    R: DeserializeOwned,
{
    let (package, assets) = prepare(runner, entry, args)?;

    tracing::info!("Running '{}' via {:?}", package.entry, runner);
    let launched = runner.launch(&assets)?;

    finish(launched, &package, assets, runner.settings())
}

/// Steps 1-3 of the pipeline.
pub(crate) fn prepare<A, R>(
    runner: &dyn Runner,
    entry: Entry<A, R>,
    args: &A,
) -> Result<(Package, Assets)>
where
    A: Serialize,
{
    let args = encode_args(entry.name(), args)?;
    runner.preflight()?;

    let settings = runner.settings();
    let work_dir = settings.work_dir_or(|| runner.default_work_dir());
    let assets = Assets::create(&work_dir, settings.keep_assets)?;

    let package = Package::new(entry.name(), args, assets.result.clone());
    package.write(&assets.package)?;
    tracing::debug!("Wrote package for '{}' to {}", package.entry, assets.package.display());

    Ok((package, assets))
}

/// Steps 5-6 of the pipeline.
pub(crate) fn finish<R>(
    launched: Launched,
    package: &Package,
    assets: Assets,
    settings: &Settings,
) -> Result<R>
where
    R: DeserializeOwned,
{
    if settings.echo_output {
        echo(&launched);
    }

    if !launched.status.success() {
        tracing::debug!("'{}' failed with {}", package.entry, launched.status);
        return Err(Error::Runtime {
            status: launched.status,
            stdout: launched.stdout,
            stderr: launched.stderr,
        });
    }

    let value = ResultEnvelope::load(package)?;

    if let Err(e) = assets.cleanup() {
        tracing::warn!("Failed to remove assets: {}", e);
    }

    Ok(value)
}

fn echo(launched: &Launched) {
    echo_to(
        launched,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    );
}

/// Replay captured child output on the caller's streams.
fn echo_to(launched: &Launched, out: &mut impl Write, err: &mut impl Write) {
    if !launched.stdout.is_empty() {
        let _ = out.write_all(launched.stdout.as_bytes());
        let _ = out.flush();
    }
    if !launched.stderr.is_empty() {
        let _ = err.write_all(launched.stderr.as_bytes());
    }
}

/// Wraps an entry so calling it runs the entry through a runner.
pub struct Wrapped<A, R> {
    entry: Entry<A, R>,
    runner: Arc<dyn Runner>,
}

impl<A, R> Wrapped<A, R>
where
    A: Serialize,
    R: DeserializeOwned,
{
    pub fn new(entry: Entry<A, R>, runner: Arc<dyn Runner>) -> Self {
        Self { entry, runner }
    }

    /// Run the full pipeline once.
    ///
    /// Every call is independent: fresh assets, one child, no caching.
    pub fn call(&self, args: A) -> Result<R> {
        run_entry(self.runner.as_ref(), self.entry, &args)
    }

    pub fn entry(&self) -> Entry<A, R> {
        self.entry
    }

    pub fn runner(&self) -> &dyn Runner {
        self.runner.as_ref()
    }
}

impl<A, R> Clone for Wrapped<A, R> {
    fn clone(&self) -> Self {
        Self {
            entry: self.entry,
            runner: Arc::clone(&self.runner),
        }
    }
}

impl<A, R> fmt::Debug for Wrapped<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wrapped")
            .field("entry", &self.entry.name())
            .field("runner", &self.runner)
            .finish()
    }
}

/// Turns a runner configuration into a wrapper for entries.
pub trait Decorator: Runner + Clone + 'static {
    fn wrap<A, R>(&self, entry: Entry<A, R>) -> Wrapped<A, R>
    where
        A: Serialize,
        R: DeserializeOwned,
    {
        Wrapped::new(entry, Arc::new(self.clone()))
    }
}

impl<T: Runner + Clone + 'static> Decorator for T {}
