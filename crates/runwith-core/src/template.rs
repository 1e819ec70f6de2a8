//! Shell script templates.
//!
//! A template is a plain shell script with one `{target}` placeholder where
//! the bootstrap command goes. Only that literal token is replaced; every
//! other brace (`${HOME}`, `{a,b}`) is left as written.

use std::path::Path;

use crate::error::{Error, Result};
use crate::package::BOOTSTRAP_FLAG;

/// Placeholder replaced by the bootstrap command.
pub const TARGET_PLACEHOLDER: &str = "{target}";

/// Default submission script: just run the target.
pub const DEFAULT_TEMPLATE: &str = "#!/bin/bash\n{target}\n";

/// A validated script template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTemplate {
    source: String,
}

impl ScriptTemplate {
    /// Validate that `source` contains the `{target}` placeholder.
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        if !source.contains(TARGET_PLACEHOLDER) {
            return Err(Error::Template(format!(
                "template must contain a {} placeholder, but got:\n{}",
                TARGET_PLACEHOLDER, source
            )));
        }
        Ok(Self { source })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute `target` for every `{target}` occurrence.
    pub fn render(&self, target: &str) -> String {
        self.source.replace(TARGET_PLACEHOLDER, target)
    }
}

impl Default for ScriptTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Shell command that runs `program` in bootstrap mode on `package`.
pub fn bootstrap_command(program: &Path, package: &Path) -> String {
    format!(
        "{} {} {}",
        shell_quote(&program.to_string_lossy()),
        BOOTSTRAP_FLAG,
        shell_quote(&package.to_string_lossy())
    )
}

/// Single-quote a string for POSIX shells.
pub fn shell_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}
