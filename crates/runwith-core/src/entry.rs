//! Named entry points and the registry that dispatches them.
//!
//! A closure cannot cross a process boundary, so every function that runs
//! out of process is a plain `fn` registered under a stable name. The caller
//! ships the name plus serialized arguments; the child looks the name up in
//! its own [`Registry`] and calls the function.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::json;

/// A typed, named function that can be invoked in another process.
///
/// Arguments travel as a single value `A` (a tuple for multi-argument
/// functions, `()` for none).
pub struct Entry<A, R> {
    name: &'static str,
    func: fn(A) -> R,
}

impl<A, R> Entry<A, R> {
    /// Create an entry from a name and a function pointer.
    pub const fn new(name: &'static str, func: fn(A) -> R) -> Self {
        Self { name, func }
    }

    /// Registered name of this entry.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Call the function in the current process.
    pub fn invoke(&self, args: A) -> R {
        (self.func)(args)
    }
}

impl<A, R> Clone for Entry<A, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, R> Copy for Entry<A, R> {}

impl<A, R> fmt::Debug for Entry<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry").field("name", &self.name).finish()
    }
}

type Handler = Box<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// Entry points known to a worker process.
#[derive(Default)]
pub struct Registry {
    handlers: FxHashMap<&'static str, Handler>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry, replacing any previous entry with the same name.
    pub fn with<A, R>(mut self, entry: Entry<A, R>) -> Self
    where
        A: DeserializeOwned + 'static,
        R: Serialize + 'static,
    {
        self.register(entry);
        self
    }

    /// Register an entry in place.
    pub fn register<A, R>(&mut self, entry: Entry<A, R>) -> &mut Self
    where
        A: DeserializeOwned + 'static,
        R: Serialize + 'static,
    {
        let name = entry.name();
        let handler: Handler = Box::new(move |args: Value| {
            let args: A = serde_json::from_value(args).map_err(|e| {
                Error::Deserialization(format!("arguments for '{}': {}", name, e))
            })?;
            let ret = entry.invoke(args);
            json::to_value(&ret).map_err(|e| {
                Error::Serialization(format!("return value of '{}': {}", name, e))
            })
        });

        if self.handlers.insert(name, handler).is_some() {
            tracing::warn!("Entry '{}' registered twice, keeping the latest", name);
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered entry names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the named entry on JSON arguments.
    pub fn dispatch(&self, name: &str, args: Value) -> Result<Value> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        handler(args)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.names())
            .finish()
    }
}
