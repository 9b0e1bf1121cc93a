//! Boss registry: symbolic key to boss definition factory
//!
//! Populated once by an explicit bootstrap ([`crate::analysis::bosses::default_registry`]).
//! Registering a key twice is an error; iteration follows insertion order.

use super::bosses::BossDefinition;
use crate::errors::{AppError, AppResult};

/// Builds a fresh boss definition
pub type BossFactory = fn() -> AppResult<BossDefinition>;

#[derive(Default)]
pub struct BossRegistry {
    entries: Vec<(String, BossFactory)>,
}

impl BossRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: &str, factory: BossFactory) -> AppResult<()> {
        if self.contains(key) {
            return Err(AppError::Configuration(format!(
                "boss '{}' is already registered",
                key
            )));
        }
        self.entries.push((key.to_string(), factory));
        Ok(())
    }

    pub fn get(&self, key: &str) -> AppResult<BossFactory> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, factory)| *factory)
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "unknown boss '{}' (available: {})",
                    key,
                    self.keys().collect::<Vec<_>>().join(", ")
                ))
            })
    }

    /// Build and validate the definition registered under `key`
    pub fn create(&self, key: &str) -> AppResult<BossDefinition> {
        let definition = (self.get(key)?)()?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Registered keys in insertion order; clone the iterator to restart it
    pub fn keys(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
