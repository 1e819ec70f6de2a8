//! Core engine for runwith.
//!
//! This crate provides:
//! - Named entry points and the registry that dispatches them
//! - The package / result wire format for the process boundary
//! - Per-call scratch assets
//! - Runners for a child interpreter and for Slurm jobs
//! - The bootstrap hook for the child side

pub mod assets;
pub mod bootstrap;
pub mod entry;
pub mod error;
mod json;
pub mod package;
pub mod runner;
pub mod settings;
pub mod template;

pub use assets::Assets;
pub use entry::{Entry, Registry};
pub use error::{Error, ExitInfo, Result};
pub use package::{BOOTSTRAP_FLAG, Package, ResultEnvelope};
pub use runner::{
    Completion, Decorator, Interpreter, JobGroup, JobHandle, JobStatus, Launched, LocalShell,
    OptionValue, Runner, Scheduler, Slurm, SlurmCli, SlurmOptions, SubmittedJob, Wrapped,
    interpreter, run_entry, slurm,
};
pub use settings::Settings;
pub use template::{DEFAULT_TEMPLATE, ScriptTemplate};
