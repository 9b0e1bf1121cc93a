use super::BossDefinition;
use crate::errors::AppResult;

pub const KEY: &str = "one_armed_bandit";

const DEFINITION: &str = include_str!("one_armed_bandit.toml");

pub fn definition() -> AppResult<BossDefinition> {
    BossDefinition::from_toml(DEFINITION)
}
