//! Error types for runwith-core.

use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Result type for runwith-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// How a child process or scheduled job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitInfo {
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    /// Terminating signal, if the process was killed (unix only).
    pub signal: Option<i32>,
}

impl ExitInfo {
    /// A normal exit with the given code.
    pub fn code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ExitInfo {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = std::os::unix::process::ExitStatusExt::signal(&status);
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {}", code),
            (None, Some(signal)) => write!(f, "signal {}", signal),
            (None, None) => write!(f, "unknown exit status"),
        }
    }
}

/// Errors that can occur while running an entry out of process.
#[derive(Debug, Error)]
pub enum Error {
    /// Arguments or return value could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A returned value did not match the expected type.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Shell template is missing a required placeholder.
    #[error("template error: {0}")]
    Template(String),

    /// The interpreter or scheduler binary could not be started, or rejected
    /// the submission.
    #[error("failed to launch '{program}': {message}")]
    Launch { program: String, message: String },

    /// The child process or job finished unsuccessfully.
    #[error("child process failed with {status}{}", format_output(stdout, stderr))]
    Runtime {
        status: ExitInfo,
        stdout: String,
        stderr: String,
    },

    /// The child reported success but left no usable result behind.
    #[error("missing result at {}: {reason}", path.display())]
    MissingResult { path: PathBuf, reason: String },

    /// No entry with this name is registered in the child.
    #[error("entry not registered: {0}")]
    EntryNotFound(String),

    /// The package handed to the bootstrap is unreadable or malformed.
    #[error("invalid package: {0}")]
    Package(String),

    /// A scheduler query failed or produced output we cannot interpret.
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Exit status carried by a runtime error.
    pub fn exit_status(&self) -> Option<ExitInfo> {
        match self {
            Error::Runtime { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn format_output(stdout: &str, stderr: &str) -> String {
    let mut out = String::new();
    if !stdout.trim().is_empty() {
        out.push_str("\n--- stdout ---\n");
        out.push_str(stdout.trim_end());
    }
    if !stderr.trim().is_empty() {
        out.push_str("\n--- stderr ---\n");
        out.push_str(stderr.trim_end());
    }
    out
}
