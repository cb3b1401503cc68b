//! Immutable function table.
//!
//! Functions are collected into a [`FunctionRegistryBuilder`] during start-up
//! and frozen into a [`FunctionRegistry`] that the dispatcher owns. Lookups
//! are case-insensitive on both namespace and name.

use crate::function::Function;
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct FnKey {
    ns: String,
    name: String,
}

impl FnKey {
    fn new(ns: &str, name: &str) -> Self {
        Self {
            ns: ns.to_ascii_uppercase(),
            name: name.to_ascii_uppercase(),
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("function `{name}` is already registered in namespace `{namespace}`")]
    Duplicate {
        namespace: &'static str,
        name: &'static str,
    },
}

#[derive(Default)]
pub struct FunctionRegistryBuilder {
    map: FxHashMap<FnKey, Arc<dyn Function>>,
}

impl FunctionRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, f: Arc<dyn Function>) -> Result<&mut Self, RegistryError> {
        let key = FnKey::new(f.namespace(), f.name());
        if self.map.contains_key(&key) {
            return Err(RegistryError::Duplicate {
                namespace: f.namespace(),
                name: f.name(),
            });
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(name = f.name(), ns = f.namespace(), "register_function");
        self.map.insert(key, f);
        Ok(self)
    }

    pub fn build(self) -> FunctionRegistry {
        FunctionRegistry { map: self.map }
    }
}

impl std::fmt::Debug for FunctionRegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistryBuilder")
            .field("functions", &self.map.len())
            .finish()
    }
}

/// Frozen name → function table handed to the dispatcher.
pub struct FunctionRegistry {
    map: FxHashMap<FnKey, Arc<dyn Function>>,
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.map.len())
            .finish()
    }
}

impl FunctionRegistry {
    pub fn builder() -> FunctionRegistryBuilder {
        FunctionRegistryBuilder::new()
    }

    /// Registry holding every builtin shipped by this crate.
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut builder = Self::builder();
        crate::builtins::register_builtins(&mut builder)?;
        Ok(builder.build())
    }

    pub fn get(&self, ns: &str, name: &str) -> Option<&Arc<dyn Function>> {
        self.map.get(&FnKey::new(ns, name))
    }

    pub fn contains(&self, ns: &str, name: &str) -> bool {
        self.get(ns, name).is_some()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.map.values().map(|f| f.name()).collect();
        names.sort_unstable();
        names
    }

    /// Human-readable signature such as `DSUM(range, any, range)`.
    pub fn signature(&self, ns: &str, name: &str) -> Option<String> {
        let f = self.get(ns, name)?;
        let args: Vec<String> = f
            .arg_schema()
            .iter()
            .map(|s| {
                s.kinds
                    .iter()
                    .map(|k| k.to_string())
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect();
        Some(format!("{}({})", f.name(), args.join(", ")))
    }
}
