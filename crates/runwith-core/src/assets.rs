//! Per-invocation scratch files.
//!
//! Every call gets its own directory:
//!
//! ```text
//! runwith_<random>/
//! ├── package.json   # Package handed to the child
//! ├── result.json    # ResultEnvelope written by the child
//! ├── job.sh         # Submission script (scheduler runner only)
//! └── job.log        # Captured child / job output
//! ```
//!
//! The directory is removed when [`Assets`] is dropped, on success and on
//! failure alike, unless it was created with `keep` set.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::Result;

const PREFIX: &str = "runwith_";

/// Scratch directory and file paths for one invocation.
#[derive(Debug)]
pub struct Assets {
    dir: AssetDir,
    /// Package file read by the child.
    pub package: PathBuf,
    /// Result file written by the child.
    pub result: PathBuf,
    /// Shell script submitted to a scheduler.
    pub script: PathBuf,
    /// Captured output.
    pub log: PathBuf,
}

#[derive(Debug)]
enum AssetDir {
    Temporary(TempDir),
    Kept(PathBuf),
}

impl Assets {
    /// Create a fresh asset directory under `parent`.
    pub fn create(parent: &Path, keep: bool) -> Result<Self> {
        fs::create_dir_all(parent)?;
        let parent = parent.canonicalize()?;

        let temp = tempfile::Builder::new().prefix(PREFIX).tempdir_in(&parent)?;
        let dir = if keep {
            AssetDir::Kept(temp.keep())
        } else {
            AssetDir::Temporary(temp)
        };

        let root = match &dir {
            AssetDir::Temporary(temp) => temp.path().to_path_buf(),
            AssetDir::Kept(path) => path.clone(),
        };

        tracing::debug!("Created assets in {}", root.display());

        Ok(Self {
            package: root.join("package.json"),
            result: root.join("result.json"),
            script: root.join("job.sh"),
            log: root.join("job.log"),
            dir,
        })
    }

    /// The asset directory itself.
    pub fn path(&self) -> &Path {
        match &self.dir {
            AssetDir::Temporary(temp) => temp.path(),
            AssetDir::Kept(path) => path,
        }
    }

    /// Whether the directory survives this value.
    pub fn is_kept(&self) -> bool {
        matches!(self.dir, AssetDir::Kept(_))
    }

    /// Append captured output to the log file.
    pub fn append_log(&self, label: &str, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log)?;
        writeln!(file, "--- {} ---", label)?;
        file.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            writeln!(file)?;
        }
        Ok(())
    }

    /// Read the log file, empty if none was written.
    pub fn read_log(&self) -> String {
        fs::read_to_string(&self.log).unwrap_or_default()
    }

    /// Write the submission script and mark it executable.
    pub fn write_script(&self, contents: &str) -> Result<()> {
        fs::write(&self.script, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.script)?.permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&self.script, perms)?;
        }

        Ok(())
    }

    /// Remove the directory now, reporting failures.
    ///
    /// Dropping also removes it, but silently.
    pub fn cleanup(self) -> Result<()> {
        match self.dir {
            AssetDir::Temporary(temp) => temp.close()?,
            AssetDir::Kept(path) => {
                tracing::info!("Keeping assets in {}", path.display());
            }
        }
        Ok(())
    }
}
