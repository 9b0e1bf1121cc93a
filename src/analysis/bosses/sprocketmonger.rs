//! Sprocketmonger Lockenstock
//!
//! Besides the table-driven metrics, this boss has a "wrong mine" check: a
//! player whose Unstable Shrapnel debuff is removed (the mine goes off) is
//! blamed when the blast ability hits enough distinct raid members within
//! the correlation window that follows.

use super::BossDefinition;
use crate::analysis::executor::{require_i64, CustomFightInput};
use crate::analysis::source::{EventKind, EventQuery};
use crate::errors::AppResult;
use std::collections::HashSet;
use tracing::debug;

pub const KEY: &str = "sprocketmonger_lockenstock";

pub const WRONG_MINE_HANDLER: &str = "wrong_mine_analysis";

const DEFINITION: &str = include_str!("sprocketmonger_lockenstock.toml");

pub fn definition() -> AppResult<BossDefinition> {
    Ok(BossDefinition::from_toml(DEFINITION)?.with_handler(WRONG_MINE_HANDLER, wrong_mine_triggers))
}

/// Count debuff removals followed by a multi-victim blast, per debuffed player
pub fn wrong_mine_triggers(input: &CustomFightInput<'_>) -> AppResult<Vec<(String, f64)>> {
    let debuff_ability = require_i64(input.params, "debuff_ability_id")?;
    let damage_ability = require_i64(input.params, "damage_ability_id")?;
    let window_ms = require_i64(input.params, "correlation_window_ms")?;
    let min_victims = require_i64(input.params, "min_victims_threshold")?.max(1) as usize;

    let debuff_query = EventQuery {
        wipe_cutoff: Some(input.wipe_cutoff),
        ..EventQuery::new(EventKind::Debuffs, debuff_ability)
    };
    let damage_query = EventQuery {
        wipe_cutoff: Some(input.wipe_cutoff),
        ..EventQuery::new(EventKind::DamageTaken, damage_ability)
    };

    let removals = input
        .source
        .events(input.report_code, &input.fight.fight, &debuff_query)?;
    let hits: Vec<(i64, i64)> = input
        .source
        .events(input.report_code, &input.fight.fight, &damage_query)?
        .into_iter()
        .filter(|e| e.event_type == "damage")
        .filter_map(|e| e.target_id.map(|target| (e.timestamp, target)))
        .collect();

    let mut triggers = Vec::new();
    for removal in removals.iter().filter(|e| e.event_type == "removedebuff") {
        let Some(player) = removal
            .target_id
            .and_then(|id| input.fight.participant_by_id(id))
        else {
            continue;
        };

        let victims: HashSet<i64> = hits
            .iter()
            .filter(|(ts, _)| *ts >= removal.timestamp && *ts <= removal.timestamp + window_ms)
            .map(|(_, target)| *target)
            .collect();

        if victims.len() >= min_victims {
            debug!(
                "Fight {}: {} triggered a mine hitting {} players at {}",
                input.fight.fight.id,
                player.name,
                victims.len(),
                removal.timestamp
            );
            triggers.push((player.name.clone(), 1.0));
        }
    }

    Ok(triggers)
}
