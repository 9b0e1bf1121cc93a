//! Generic execution of one analysis entry against one report
//!
//! Every query is issued per qualifying fight and attributed through that
//! fight's roster, which is what lets role switches be deduplicated afterwards.

use super::context::{FightContext, ReportContext};
use super::contributions::ContributionSet;
use super::source::{EventKind, EventQuery, ReportSource, TableKind, TableQuery};
use crate::config::AnalysisSettings;
use crate::errors::{AppError, AppResult};
use crate::types::{
    AnalysisEntry, AnalysisKind, AnalysisResult, TableData, TableDataType, HIT_COUNT_COLUMN,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, info};

/// Input handed to a boss-specific analysis for one fight
pub struct CustomFightInput<'a> {
    pub source: &'a dyn ReportSource,
    pub report_code: &'a str,
    pub fight: &'a FightContext,
    pub params: &'a Map<String, Value>,
    pub wipe_cutoff: u32,
}

/// Boss-specific analysis: returns `(player name, amount)` pairs for one fight
pub type CustomAnalysisFn = fn(&CustomFightInput<'_>) -> AppResult<Vec<(String, f64)>>;

/// Named custom analyses of one boss
pub type CustomHandlers = HashMap<String, CustomAnalysisFn>;

/// Read a required integer parameter of a custom entry
pub fn require_i64(params: &Map<String, Value>, key: &str) -> AppResult<i64> {
    params
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| AppError::Configuration(format!("missing integer parameter '{}'", key)))
}

/// Execute `entry` against the qualifying fights of `ctx`
pub fn run_analysis(
    entry: &AnalysisEntry,
    ctx: &ReportContext<'_>,
    handlers: &CustomHandlers,
    settings: &AnalysisSettings,
) -> AppResult<AnalysisResult> {
    let wipe_cutoff = entry.wipe_cutoff.unwrap_or(settings.default_wipe_cutoff);
    let fights = ctx.qualifying_fights(wipe_cutoff);
    if fights.is_empty() {
        return Err(AppError::NoQualifyingFights {
            report: ctx.code.clone(),
            analysis: entry.name.clone(),
        });
    }

    let key = entry.result_key();
    let source = ctx.source();
    let mut set = ContributionSet::new();
    let mut uptime_column = None;

    match &entry.kind {
        AnalysisKind::Interrupts { ability_id } => {
            let query = EventQuery {
                wipe_cutoff: Some(wipe_cutoff),
                ..EventQuery::new(EventKind::Interrupts, *ability_id)
            };
            for fight in &fights {
                set.seed(&fight.roster, fight.fight.duration_ms() as f64);
                for event in source.events(&ctx.code, &fight.fight, &query)? {
                    match event.source_id.and_then(|id| fight.participant_by_id(id)) {
                        Some(participant) => set.add(participant, &key, 1.0),
                        None => debug!(
                            "Interrupt source {:?} not in roster of fight {}",
                            event.source_id, fight.fight.id
                        ),
                    }
                }
            }
        }
        AnalysisKind::TableData {
            data_type,
            ability_id,
            filter_expression,
        } => {
            let query = TableQuery {
                ability_id: *ability_id,
                filter_expression: filter_expression.clone(),
                wipe_cutoff: Some(wipe_cutoff),
                ..TableQuery::new(match data_type {
                    TableDataType::Debuffs => TableKind::Debuffs,
                    TableDataType::DamageTaken => TableKind::DamageTaken,
                    TableDataType::Deaths => TableKind::Deaths,
                })
            };
            if *data_type == TableDataType::Debuffs {
                uptime_column = Some(key.clone());
            }
            for fight in &fights {
                let table = source.table(&ctx.code, &fight.fight, &query)?;
                accumulate_table(&mut set, fight, *data_type, *ability_id, &key, table)?;
            }
        }
        AnalysisKind::DamageToActor {
            target_game_id,
            filter_expression,
        } => {
            let targets: Vec<i64> = ctx
                .actors()?
                .iter()
                .filter(|a| a.game_id == *target_game_id)
                .map(|a| a.id)
                .collect();
            if targets.is_empty() {
                return Err(AppError::DataShape(format!(
                    "no actors with game id {} in report {}",
                    target_game_id, ctx.code
                )));
            }
            debug!("Target actors for game id {}: {:?}", target_game_id, targets);

            for fight in &fights {
                set.seed(&fight.roster, fight.fight.duration_ms() as f64);
                for target in &targets {
                    let query = TableQuery {
                        target_id: Some(*target),
                        filter_expression: filter_expression.clone(),
                        wipe_cutoff: Some(wipe_cutoff),
                        ..TableQuery::new(TableKind::DamageDone)
                    };
                    match source.table(&ctx.code, &fight.fight, &query)? {
                        TableData::Damage(entries) => {
                            for damage in entries {
                                if let Some(p) = fight.participant_by_name(&damage.name) {
                                    set.add(p, &key, damage.total);
                                }
                            }
                        }
                        other => return Err(unexpected_table("DamageDone", &other)),
                    }
                }
            }
        }
        AnalysisKind::Custom {
            handler, params, ..
        } => {
            let function = handlers.get(handler).ok_or_else(|| {
                AppError::Configuration(format!(
                    "custom analysis '{}' is not registered for this boss",
                    handler
                ))
            })?;
            for fight in &fights {
                set.seed(&fight.roster, fight.fight.duration_ms() as f64);
                let input = CustomFightInput {
                    source,
                    report_code: &ctx.code,
                    fight: *fight,
                    params,
                    wipe_cutoff,
                };
                for (name, amount) in function(&input)? {
                    match fight.participant_by_name(&name) {
                        Some(p) => set.add(p, &key, amount),
                        None => debug!("Custom result for unknown player {}", name),
                    }
                }
            }
        }
    }

    let rows = set.into_rows(entry, uptime_column.as_deref());
    let duration_ms = fights.iter().map(|f| f.fight.duration_ms()).sum();
    info!(
        "{} [{}]: {} rows over {} fights",
        entry.name,
        ctx.code,
        rows.len(),
        fights.len()
    );

    Ok(AnalysisResult {
        name: entry.name.clone(),
        result_key: key,
        columns: entry.columns(),
        rows,
        duration_ms,
        fight_ids: fights.iter().map(|f| f.fight.id).collect(),
    })
}

fn accumulate_table(
    set: &mut ContributionSet,
    fight: &FightContext,
    data_type: TableDataType,
    ability_id: Option<i64>,
    key: &str,
    table: TableData,
) -> AppResult<()> {
    match (data_type, table) {
        (TableDataType::Debuffs, TableData::Auras { total_time_ms, auras }) => {
            let active = if total_time_ms > 0.0 {
                total_time_ms
            } else {
                fight.fight.duration_ms() as f64
            };
            set.seed(&fight.roster, active);
            for aura in auras {
                if let Some(p) = fight.participant_by_name(&aura.name) {
                    set.add_uptime(p, aura.total_uptime_ms);
                    set.add(p, HIT_COUNT_COLUMN, aura.total_uses as f64);
                }
            }
        }
        (TableDataType::DamageTaken, TableData::Damage(entries)) => {
            set.seed(&fight.roster, fight.fight.duration_ms() as f64);
            for damage in entries {
                if let Some(p) = fight.participant_by_name(&damage.name) {
                    set.add(p, key, damage.total);
                    set.add(p, HIT_COUNT_COLUMN, damage.hit_count as f64);
                }
            }
        }
        (TableDataType::Deaths, TableData::Deaths(deaths)) => {
            set.seed(&fight.roster, fight.fight.duration_ms() as f64);
            for death in deaths {
                if ability_id.is_some() && death.killing_ability_id != ability_id {
                    continue;
                }
                if let Some(p) = fight.participant_by_name(&death.name) {
                    set.add(p, key, 1.0);
                }
            }
        }
        (expected, other) => return Err(unexpected_table(&format!("{:?}", expected), &other)),
    }
    Ok(())
}

fn unexpected_table(expected: &str, got: &TableData) -> AppError {
    let shape = match got {
        TableData::Auras { .. } => "auras",
        TableData::Damage(_) => "damage entries",
        TableData::Deaths(_) => "death entries",
    };
    AppError::DataShape(format!("expected {} table, got {}", expected, shape))
}
