//! Scheduler options: a free-form map rendered to command-line flags.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Value of one option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// `true` renders as a bare flag, `false` is omitted.
    Flag(bool),
    Int(i64),
    Text(String),
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Flag(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Int(value.into())
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Int(value.into())
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

/// Options passed to the scheduler verbatim.
///
/// Keys are option names without leading dashes, in `snake_case` or
/// `kebab-case`. Nothing is validated: unknown keys reach the scheduler
/// unchanged and the scheduler decides. A `null` value in JSON means the
/// option is not set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlurmOptions {
    #[serde(deserialize_with = "skip_unset")]
    options: BTreeMap<String, OptionValue>,
}

fn skip_unset<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, OptionValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Option<OptionValue>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| Some((key, value?)))
        .collect())
}

impl SlurmOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON object file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
            .map_err(|e| Error::Deserialization(format!("slurm options in {}: {}", path.display(), e)))
    }

    /// Parse options from a JSON object.
    pub fn from_json(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Set an option, replacing any previous value.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        let key = key.into();
        let normalized = normalize(&key);
        self.options.retain(|k, _| normalize(k) != normalized);
        self.options.insert(key, value.into());
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        let key = normalize(key);
        self.options
            .iter()
            .find(|(k, _)| normalize(k) == key)
            .map(|(_, v)| v)
    }

    /// Whether an option is present, comparing `_` and `-` as equal.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn job_name(self, name: impl Into<String>) -> Self {
        self.set("job_name", name.into())
    }

    pub fn partition(self, partition: impl Into<String>) -> Self {
        self.set("partition", partition.into())
    }

    /// Wall-clock limit in Slurm's format, e.g. `1:00:00`.
    pub fn time(self, time: impl Into<String>) -> Self {
        self.set("time", time.into())
    }

    /// Memory per node, e.g. `1000M`.
    pub fn mem(self, mem: impl Into<String>) -> Self {
        self.set("mem", mem.into())
    }

    pub fn cpus_per_task(self, cpus: u32) -> Self {
        self.set("cpus_per_task", cpus)
    }

    /// Render as command-line arguments.
    ///
    /// Long names become `--name=value`; single-letter names become
    /// `-N value`.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.options.len());
        for (key, value) in &self.options {
            let name = normalize(key);
            let short = name.chars().count() == 1;
            let value = match value {
                OptionValue::Flag(false) => continue,
                OptionValue::Flag(true) => None,
                OptionValue::Int(n) => Some(n.to_string()),
                OptionValue::Text(s) => Some(s.clone()),
            };

            match (short, value) {
                (true, None) => args.push(format!("-{}", name)),
                (true, Some(value)) => {
                    args.push(format!("-{}", name));
                    args.push(value);
                }
                (false, None) => args.push(format!("--{}", name)),
                (false, Some(value)) => args.push(format!("--{}={}", name, value)),
            }
        }
        args
    }
}

impl<K, V> FromIterator<(K, V)> for SlurmOptions
where
    K: Into<String>,
    V: Into<OptionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = SlurmOptions::new();
        for (k, v) in iter {
            options.insert(k, v);
        }
        options
    }
}

impl From<BTreeMap<String, OptionValue>> for SlurmOptions {
    fn from(options: BTreeMap<String, OptionValue>) -> Self {
        options.into_iter().collect()
    }
}

fn normalize(key: &str) -> String {
    key.trim_start_matches('-').replace('_', "-")
}
