//! The scheduler seam.
//!
//! A [`Scheduler`] takes a ready-to-run shell script and reports how the
//! resulting job ended. Keeping it behind a trait lets the scheduler CLI be
//! replaced by a fake in tests, or by [`LocalShell`] on a workstation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, ExitInfo, Result};

/// A submitted job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    id: Option<String>,
    cluster: Option<String>,
    log: PathBuf,
    finished: Option<JobStatus>,
}

impl JobHandle {
    /// A job that is queued or running.
    pub fn pending(id: impl Into<String>, log: impl Into<PathBuf>) -> Self {
        Self {
            id: Some(id.into()),
            cluster: None,
            log: log.into(),
            finished: None,
        }
    }

    /// A job whose submission already blocked until it ended.
    pub fn finished(id: Option<String>, log: impl Into<PathBuf>, status: JobStatus) -> Self {
        Self {
            id,
            cluster: None,
            log: log.into(),
            finished: Some(status),
        }
    }

    /// Cluster the job was submitted to, when not the default one.
    pub fn on_cluster(mut self, cluster: Option<String>) -> Self {
        self.cluster = cluster;
        self
    }

    /// Scheduler job id, if the scheduler reported one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn cluster(&self) -> Option<&str> {
        self.cluster.as_deref()
    }

    /// Where the job's output is written.
    pub fn log(&self) -> &Path {
        &self.log
    }

    /// Final status, if already known.
    pub fn status(&self) -> Option<&JobStatus> {
        self.finished.as_ref()
    }
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub exit: ExitInfo,
    /// Scheduler state name, e.g. `COMPLETED` or `TIMEOUT`.
    pub state: Option<String>,
    pub stdout: String,
    pub stderr: String,
}

impl JobStatus {
    pub fn success(&self) -> bool {
        self.exit.success() && self.state.as_deref().is_none_or(|s| s == "COMPLETED")
    }
}

/// Submits scripts and waits for them.
pub trait Scheduler: fmt::Debug + Send + Sync {
    /// Submit `script`. Batch output should go to `log`.
    ///
    /// Failing to submit is an [`Error::Launch`].
    fn submit(&self, script: &Path, log: &Path) -> Result<JobHandle>;

    /// Block until `job` has ended.
    fn wait(&self, job: &JobHandle) -> Result<JobStatus>;
}

/// Runs the script with `sh` on this machine and blocks.
#[derive(Debug, Clone)]
pub struct LocalShell {
    shell: PathBuf,
}

impl LocalShell {
    pub fn new() -> Self {
        Self {
            shell: PathBuf::from("/bin/sh"),
        }
    }

    /// Use a different shell binary.
    pub fn with_shell(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for LocalShell {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for LocalShell {
    fn submit(&self, script: &Path, log: &Path) -> Result<JobHandle> {
        tracing::info!("Running {} locally", script.display());

        let output = Command::new(&self.shell)
            .arg(script)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::Launch {
                program: self.shell.display().to_string(),
                message: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        std::fs::write(log, format!("{}{}", stdout, stderr))?;

        let status = JobStatus {
            exit: output.status.into(),
            state: None,
            stdout,
            stderr,
        };
        Ok(JobHandle::finished(None, log, status))
    }

    fn wait(&self, job: &JobHandle) -> Result<JobStatus> {
        job.status()
            .cloned()
            .ok_or_else(|| Error::Scheduler("local job has no recorded status".to_string()))
    }
}
