//! Run an entry in a child process started from another executable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::assets::Assets;
use crate::error::{Error, Result};
use crate::package::BOOTSTRAP_FLAG;
use crate::settings::Settings;

use super::{Launched, Runner};

/// Runs entries with `<path> --runwith-bootstrap <package>`.
///
/// The executable must embed a registry containing the entry and call
/// the bootstrap hook at the top of `main`.
#[derive(Debug, Clone)]
pub struct Interpreter {
    path: PathBuf,
    envs: Vec<(OsString, OsString)>,
    current_dir: Option<PathBuf>,
    settings: Settings,
}

/// Decorator running entries under the executable at `path`.
pub fn interpreter(path: impl Into<PathBuf>) -> Interpreter {
    Interpreter::new(path)
}

impl Interpreter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            envs: Vec::new(),
            current_dir: None,
            settings: Settings::from_env(),
        }
    }

    /// Set an environment variable for the child.
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Working directory for the child.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// The interpreter path as configured.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve the configured path to an executable.
    ///
    /// Paths are checked for existence and execute permission; bare names
    /// are looked up on `PATH`.
    pub fn resolve(&self) -> Result<PathBuf> {
        which::which(&self.path).map_err(|e| Error::Launch {
            program: self.path.display().to_string(),
            message: format!("not an executable: {}", e),
        })
    }
}

impl Runner for Interpreter {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn preflight(&self) -> Result<()> {
        self.resolve().map(|_| ())
    }

    fn launch(&self, assets: &Assets) -> Result<Launched> {
        let program = self.resolve()?;

        let mut command = Command::new(&program);
        command
            .arg(BOOTSTRAP_FLAG)
            .arg(&assets.package)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null());
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        tracing::debug!("Spawning {} {} {}", program.display(), BOOTSTRAP_FLAG, assets.package.display());

        let output = command.output().map_err(|e| Error::Launch {
            program: program.display().to_string(),
            message: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        assets.append_log("stdout", &stdout)?;
        assets.append_log("stderr", &stderr)?;

        Ok(Launched {
            status: output.status.into(),
            stdout,
            stderr,
        })
    }
}
