//! runwith: run Rust functions in another process.
//!
//! A function marked with one of the attribute macros keeps its signature
//! but executes elsewhere:
//! - **Interpreter**: a separate worker executable started for every call
//! - **Slurm**: a batch job on a cluster, launched through `srun`/`sbatch`
//!
//! Arguments and the return value cross the process boundary as JSON, so
//! both must implement serde's `Serialize` / `Deserialize`.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use runwith::prelude::*;
//!
//! /// Runs inside the worker binary.
//! #[runwith::interpreter("/opt/bin/my-worker")]
//! pub fn answer() -> bool {
//!     true
//! }
//!
//! fn main() -> runwith::Result<()> {
//!     assert!(answer()?);
//!     Ok(())
//! }
//! ```
//!
//! The worker side registers the same entries and hands control to the
//! bootstrap hook before doing anything else:
//!
//! ```rust,ignore
//! fn main() {
//!     let registry = Registry::new().with(ANSWER);
//!     runwith::bootstrap::run_if_requested(&registry);
//! }
//! ```
//!
//! # Slurm
//!
//! ```rust,ignore
//! #[runwith::slurm(
//!     SlurmOptions::new().partition("short").time("00:10:00"),
//!     "#!/bin/bash\nmodule load rust\n{target}\n"
//! )]
//! pub fn simulate(steps: u64) -> f64 {
//!     run_simulation(steps)
//! }
//! ```
//!
//! `{target}` in the template is replaced with the command that runs the
//! function on the allocated node.

// Generated code refers to `::runwith`, which must resolve inside this crate too.
extern crate self as runwith;

pub use runwith_macros::{entry, interpreter, remote, slurm};

pub use runwith_core::{
    Completion, Decorator, Entry, Error, ExitInfo, Interpreter, JobGroup, JobHandle, JobStatus,
    LocalShell, OptionValue, Registry, Result, Runner, Scheduler, ScriptTemplate, Settings, Slurm,
    SlurmCli, SlurmOptions, SubmittedJob, Wrapped, interpreter, slurm,
};

// Building blocks for custom runners and workers
pub use runwith_core::{
    Assets, BOOTSTRAP_FLAG, DEFAULT_TEMPLATE, Launched, Package, ResultEnvelope, bootstrap,
    run_entry,
};

pub mod builtins;

pub mod prelude {
    //! Common imports for code using runwith.
    //!
    //! ```rust,ignore
    //! use runwith::prelude::*;
    //! ```

    pub use crate::{entry, remote};

    pub use runwith_core::{
        Decorator, Entry, Registry, ScriptTemplate, Settings, SlurmOptions, interpreter, slurm,
    };

    // Argument and return types need these derives
    pub use serde::{Deserialize, Serialize};
}
