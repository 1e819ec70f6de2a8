//! Runtime settings shared by all runners.

use std::path::PathBuf;

/// Environment variable overriding where asset directories are created.
pub const ENV_WORK_DIR: &str = "RUNWITH_WORK_DIR";
/// Environment variable that keeps asset directories after a call ("1"/"true").
pub const ENV_KEEP_ASSETS: &str = "RUNWITH_KEEP_ASSETS";
/// Environment variable toggling echo of child output ("0"/"false" disables).
pub const ENV_ECHO: &str = "RUNWITH_ECHO";

/// Settings for one runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory in which per-call asset directories are created.
    /// `None` means the runner's default.
    pub work_dir: Option<PathBuf>,
    /// Keep asset directories after the call instead of removing them.
    pub keep_assets: bool,
    /// Print the child's captured stdout/stderr after it finishes.
    pub echo_output: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_dir: None,
            keep_assets: false,
            echo_output: true,
        }
    }
}

impl Settings {
    /// Defaults overridden by `RUNWITH_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(dir) = lookup(ENV_WORK_DIR).filter(|d| !d.is_empty()) {
            settings.work_dir = Some(PathBuf::from(dir));
        }
        if let Some(keep) = lookup(ENV_KEEP_ASSETS) {
            settings.keep_assets = parse_bool(&keep).unwrap_or(false);
        }
        if let Some(echo) = lookup(ENV_ECHO) {
            settings.echo_output = parse_bool(&echo).unwrap_or(true);
        }

        settings
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    pub fn keep_assets(mut self, keep: bool) -> Self {
        self.keep_assets = keep;
        self
    }

    pub fn echo_output(mut self, echo: bool) -> Self {
        self.echo_output = echo;
        self
    }

    /// Work directory, falling back to `default`.
    pub fn work_dir_or(&self, default: impl FnOnce() -> PathBuf) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(default)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
