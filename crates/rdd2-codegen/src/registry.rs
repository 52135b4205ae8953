//! Named collection of derived control laws

use std::collections::BTreeMap;

use rdd2_core::control;
use rdd2_core::sym::Function;
use rdd2_core::{GraphError, LawConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Law {0} is already registered")]
    Duplicate(String),
    #[error("No law named {0}")]
    Unregistered(String),
    #[error("Derivation failed: {0}")]
    Graph(#[from] GraphError),
}

/// Laws keyed by name, iterated in name order
#[derive(Debug, Clone, Default)]
pub struct LawRegistry {
    laws: BTreeMap<String, Function>,
}

impl LawRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive and register every law of the cascade
    pub fn derive_all(config: &LawConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for law in control::derive_all(config)? {
            registry.register(law)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, law: Function) -> Result<(), RegistryError> {
        if self.laws.contains_key(law.name()) {
            return Err(RegistryError::Duplicate(law.name().to_string()));
        }
        self.laws.insert(law.name().to_string(), law);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Function, RegistryError> {
        self.laws
            .get(name)
            .ok_or_else(|| RegistryError::Unregistered(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.laws.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Function> {
        self.laws.values()
    }

    pub fn len(&self) -> usize {
        self.laws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laws.is_empty()
    }
}

impl IntoIterator for LawRegistry {
    type Item = Function;
    type IntoIter = std::collections::btree_map::IntoValues<String, Function>;

    fn into_iter(self) -> Self::IntoIter {
        self.laws.into_values()
    }
}
