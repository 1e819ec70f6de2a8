//! Wire format for the process boundary.
//!
//! The caller writes a [`Package`] to `package.json`; the child reads it,
//! runs the entry, and writes a [`ResultEnvelope`] to the path named inside
//! the package. Both files are serde JSON.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::json;

/// Argv marker that switches an executable into bootstrap mode.
pub const BOOTSTRAP_FLAG: &str = "--runwith-bootstrap";

/// Current package format version.
pub const FORMAT_VERSION: u32 = 1;

/// Serialize entry arguments.
///
/// Runs before any asset or process exists, so an unserializable argument
/// never leaves anything behind.
pub fn encode_args<A: Serialize>(entry: &str, args: &A) -> Result<Value> {
    json::to_value(args)
        .map_err(|e| Error::Serialization(format!("arguments for '{}': {}", entry, e)))
}

/// Everything the child needs to run one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub version: u32,
    /// Unique id of this invocation, echoed back in the result.
    pub invocation: Uuid,
    /// Registered entry name.
    pub entry: String,
    /// Serialized arguments (`null` for zero-argument entries).
    pub args: Value,
    /// Where the child must write its [`ResultEnvelope`].
    pub result_path: PathBuf,
}

impl Package {
    /// Build a package for already-encoded arguments.
    pub fn new(entry: &str, args: Value, result_path: PathBuf) -> Self {
        Self {
            version: FORMAT_VERSION,
            invocation: Uuid::new_v4(),
            entry: entry.to_string(),
            args,
            result_path,
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)
            .map_err(|e| Error::Serialization(format!("package: {}", e)))?;
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .map_err(|e| Error::Package(format!("cannot read {}: {}", path.display(), e)))?;
        let package: Package = serde_json::from_slice(&bytes)
            .map_err(|e| Error::Package(format!("cannot parse {}: {}", path.display(), e)))?;

        if package.version != FORMAT_VERSION {
            return Err(Error::Package(format!(
                "unsupported package version {} (expected {})",
                package.version, FORMAT_VERSION
            )));
        }
        Ok(package)
    }
}

/// Return value written by the child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub invocation: Uuid,
    pub entry: String,
    pub value: Value,
}

impl ResultEnvelope {
    pub fn write(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec(self)
            .map_err(|e| Error::Serialization(format!("result of '{}': {}", self.entry, e)))?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Read the result left for `package` and decode it as `R`.
    ///
    /// Absent, unreadable or foreign results are [`Error::MissingResult`];
    /// a well-formed result of the wrong type is [`Error::Deserialization`].
    pub fn load<R: DeserializeOwned>(package: &Package) -> Result<R> {
        let path = &package.result_path;
        let missing = |reason: String| Error::MissingResult {
            path: path.clone(),
            reason,
        };

        let bytes = fs::read(path).map_err(|e| missing(e.to_string()))?;
        let envelope: ResultEnvelope =
            serde_json::from_slice(&bytes).map_err(|e| missing(format!("malformed result: {}", e)))?;

        if envelope.invocation != package.invocation {
            return Err(missing(format!(
                "result belongs to invocation {}, expected {}",
                envelope.invocation, package.invocation
            )));
        }

        serde_json::from_value(envelope.value).map_err(|e| {
            Error::Deserialization(format!("return value of '{}': {}", package.entry, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_unit_args_serialize_as_null() {
        let temp = TempDir::new().unwrap();
        let args = encode_args("x", &()).unwrap();
        assert_eq!(args, Value::Null);
        let package = Package::new("x", args, temp.path().join("result.json"));
        assert_eq!(package.version, FORMAT_VERSION);
    }

    #[test]
    fn test_unserializable_args() {
        use std::collections::HashMap;

        // JSON object keys must be strings
        let mut map = HashMap::new();
        map.insert((1, 2), "pair");
        let err = encode_args("x", &map).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_non_finite_args_rejected() {
        let err = encode_args("x", &(1.0_f64, f64::NAN)).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)), "{err:?}");

        let args = encode_args("x", &(Some(0.25_f64),)).unwrap();
        assert_eq!(args, json!([0.25]));
    }

    #[test]
    fn test_write_and_read_package() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        let package = Package::new("math.add", json!([1, 2]), temp.path().join("result.json"));
        package.write(&path).unwrap();

        let read = Package::read(&path).unwrap();
        assert_eq!(read.invocation, package.invocation);
        assert_eq!(read.args, json!([1, 2]));
    }

    #[test]
    fn test_reject_other_version() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        let mut package = Package::new("x", Value::Null, temp.path().join("r.json"));
        package.version = 99;
        package.write(&path).unwrap();

        let err = Package::read(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported package version 99"));
    }

    #[test]
    fn test_load_missing_result() {
        let temp = TempDir::new().unwrap();
        let package = Package::new("x", Value::Null, temp.path().join("result.json"));
        let err = ResultEnvelope::load::<bool>(&package).unwrap_err();
        assert!(matches!(err, Error::MissingResult { .. }));
    }

    #[test]
    fn test_load_foreign_result() {
        let temp = TempDir::new().unwrap();
        let package = Package::new("x", Value::Null, temp.path().join("result.json"));
        ResultEnvelope {
            invocation: Uuid::new_v4(),
            entry: "x".into(),
            value: json!(true),
        }
        .write(&package.result_path)
        .unwrap();

        let err = ResultEnvelope::load::<bool>(&package).unwrap_err();
        assert!(err.to_string().contains("belongs to invocation"));
    }

    #[test]
    fn test_load_wrong_type() {
        let temp = TempDir::new().unwrap();
        let package = Package::new("x", Value::Null, temp.path().join("result.json"));
        ResultEnvelope {
            invocation: package.invocation,
            entry: "x".into(),
            value: json!("text"),
        }
        .write(&package.result_path)
        .unwrap();

        let err = ResultEnvelope::load::<bool>(&package).unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));

        let ok: String = ResultEnvelope::load(&package).unwrap();
        assert_eq!(ok, "text");
    }
}
