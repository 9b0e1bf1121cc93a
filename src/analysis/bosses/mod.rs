//! Built-in boss definitions
//!
//! Each boss is a TOML document compiled into the binary plus, where needed,
//! its custom analysis routines.

mod definition;
pub mod one_armed_bandit;
pub mod sprocketmonger;

pub use definition::BossDefinition;

use super::registry::BossRegistry;
use crate::errors::AppResult;

/// Registry holding every built-in boss
pub fn default_registry() -> AppResult<BossRegistry> {
    let mut registry = BossRegistry::new();
    registry.register(one_armed_bandit::KEY, one_armed_bandit::definition)?;
    registry.register(sprocketmonger::KEY, sprocketmonger::definition)?;
    Ok(registry)
}
