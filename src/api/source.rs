//! [`ReportSource`] backed by the Warcraft Logs GraphQL API
//!
//! Responses are parsed into typed records with serde; a missing or ill-typed
//! field is a [`ApiError::MalformedResponse`], never a silent zero.

use super::queries;
use super::GraphQlTransport;
use crate::analysis::source::{EventQuery, ReportSource, TableKind, TableQuery};
use crate::errors::{ApiError, ApiResult};
use crate::types::{
    Actor, AuraEntry, CombatEvent, DamageEntry, DeathEntry, Fight, Participant, ReportInfo, Role,
    TableData,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Upper bound on event pages per request, guards against a server that
/// keeps returning the same cursor
const MAX_EVENT_PAGES: usize = 1000;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReport {
    start_time: i64,
    fights: Vec<RawFight>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFight {
    id: u32,
    #[serde(rename = "encounterID")]
    encounter_id: u32,
    difficulty: Option<u32>,
    start_time: i64,
    end_time: i64,
    #[serde(default)]
    kill: Option<bool>,
}

#[derive(Deserialize)]
struct RawPlayer {
    id: i64,
    name: String,
    #[serde(rename = "type")]
    class: String,
    #[serde(default)]
    specs: Vec<RawSpec>,
}

#[derive(Deserialize)]
struct RawSpec {
    spec: String,
}

#[derive(Deserialize)]
struct RawActor {
    id: i64,
    name: String,
    #[serde(rename = "gameID")]
    game_id: i64,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEventPage {
    data: Vec<RawEvent>,
    next_page_timestamp: Option<f64>,
}

#[derive(Deserialize)]
struct RawEvent {
    timestamp: i64,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(rename = "sourceID", default)]
    source_id: Option<i64>,
    #[serde(rename = "targetID", default)]
    target_id: Option<i64>,
    #[serde(rename = "abilityGameID", default)]
    ability_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAuraTable {
    total_time: f64,
    #[serde(default)]
    auras: Vec<RawAura>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAura {
    name: String,
    total_uptime: f64,
    #[serde(default)]
    total_uses: u64,
}

#[derive(Deserialize)]
struct RawEntries<T> {
    #[serde(default = "Vec::new")]
    entries: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDamage {
    name: String,
    total: f64,
    #[serde(default)]
    hit_count: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDeath {
    name: String,
    #[serde(default)]
    killing_blow: Option<RawAbility>,
}

#[derive(Deserialize)]
struct RawAbility {
    guid: i64,
}

/// Issues report queries through a [`GraphQlTransport`]
pub struct WclDataSource<T: GraphQlTransport> {
    transport: T,
}

impl<T: GraphQlTransport> WclDataSource<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `data.reportData.report` of a response, parsed at `path` below it
    fn report_field<R: DeserializeOwned>(
        &self,
        code: &str,
        query: &str,
        variables: Value,
        path: &str,
    ) -> ApiResult<R> {
        let document = self.transport.execute(query, &variables)?;
        let report = document
            .pointer("/data/reportData/report")
            .filter(|v| !v.is_null())
            .ok_or_else(|| ApiError::MalformedResponse(format!("report {} not found", code)))?;
        let field = report.pointer(path).ok_or_else(|| {
            ApiError::MalformedResponse(format!("report {}: missing {}", code, path))
        })?;
        R::deserialize(field).map_err(|e| {
            ApiError::MalformedResponse(format!("report {}: {}: {}", code, path, e))
        })
    }

    fn table_data(&self, code: &str, fight: &Fight, query: &TableQuery) -> ApiResult<Value> {
        let variables = json!({
            "code": code,
            "fightIds": [fight.id],
            "dataType": query.kind.as_graphql(),
            "abilityId": query.ability_id,
            "targetId": query.target_id,
            "filterExpression": query.filter_expression,
            "wipeCutoff": query.wipe_cutoff,
        });
        self.report_field(code, queries::TABLE, variables, "/table/data")
    }
}

fn parse<R: DeserializeOwned>(value: Value, what: &str) -> ApiResult<R> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::MalformedResponse(format!("{}: {}", what, e)))
}

impl<T: GraphQlTransport> ReportSource for WclDataSource<T> {
    fn report(&self, code: &str, encounter_id: u32, difficulty: u32) -> ApiResult<ReportInfo> {
        let variables = json!({
            "code": code,
            "encounterId": encounter_id,
            "difficulty": difficulty,
        });
        let raw: RawReport = self.report_field(code, queries::REPORT_FIGHTS, variables, "")?;

        let fights = raw
            .fights
            .into_iter()
            .map(|f| {
                if f.end_time < f.start_time {
                    return Err(ApiError::MalformedResponse(format!(
                        "report {}: fight {} ends before it starts",
                        code, f.id
                    )));
                }
                let difficulty = f.difficulty.ok_or_else(|| {
                    ApiError::MalformedResponse(format!(
                        "report {}: fight {} has no difficulty",
                        code, f.id
                    ))
                })?;
                Ok(Fight {
                    id: f.id,
                    encounter_id: f.encounter_id,
                    difficulty,
                    start_time: f.start_time,
                    end_time: f.end_time,
                    kill: f.kill.unwrap_or(false),
                })
            })
            .collect::<ApiResult<Vec<_>>>()?;

        debug!("Report {}: {} fights fetched", code, fights.len());
        Ok(ReportInfo {
            code: code.to_string(),
            start_time_ms: raw.start_time,
            fights,
        })
    }

    fn death_count(&self, code: &str, fight: &Fight) -> ApiResult<u32> {
        let data = self.table_data(code, fight, &TableQuery::new(TableKind::Deaths))?;
        let deaths: RawEntries<RawDeath> = parse(data, "deaths table")?;
        Ok(deaths.entries.len() as u32)
    }

    fn participants(&self, code: &str, fight: &Fight) -> ApiResult<Vec<Participant>> {
        let variables = json!({ "code": code, "fightIds": [fight.id] });
        let groups: BTreeMap<String, Vec<RawPlayer>> = self.report_field(
            code,
            queries::PLAYER_DETAILS,
            variables,
            "/playerDetails/data/playerDetails",
        )?;

        let mut players = Vec::new();
        for role in Role::ALL {
            let group = match role {
                Role::Tank => "tanks",
                Role::Healer => "healers",
                Role::Dps => "dps",
            };
            for raw in groups.get(group).into_iter().flatten() {
                players.push(Participant {
                    id: raw.id,
                    name: raw.name.clone(),
                    class: raw.class.clone(),
                    spec: raw.specs.first().map(|s| s.spec.clone()),
                    role,
                });
            }
        }
        debug!("Fight {}: {} players", fight.id, players.len());
        Ok(players)
    }

    fn actors(&self, code: &str) -> ApiResult<Vec<Actor>> {
        let variables = json!({ "code": code });
        let raw: Vec<RawActor> = self.report_field(
            code,
            queries::MASTER_DATA_ACTORS,
            variables,
            "/masterData/actors",
        )?;
        Ok(raw
            .into_iter()
            .map(|a| Actor {
                id: a.id,
                name: a.name,
                game_id: a.game_id,
                kind: a.kind,
            })
            .collect())
    }

    fn events(
        &self,
        code: &str,
        fight: &Fight,
        query: &EventQuery,
    ) -> ApiResult<Vec<CombatEvent>> {
        let mut events = Vec::new();
        let mut start_time = fight.start_time as f64;

        for _ in 0..MAX_EVENT_PAGES {
            let variables = json!({
                "code": code,
                "fightIds": [fight.id],
                "dataType": query.kind.as_graphql(),
                "abilityId": query.ability_id,
                "startTime": start_time,
                "endTime": fight.end_time,
                "wipeCutoff": query.wipe_cutoff,
            });
            let page: RawEventPage =
                self.report_field(code, queries::EVENTS, variables, "/events")?;

            events.extend(page.data.into_iter().map(|e| CombatEvent {
                timestamp: e.timestamp,
                event_type: e.event_type,
                source_id: e.source_id,
                target_id: e.target_id,
                ability_id: e.ability_id,
            }));

            match page.next_page_timestamp {
                Some(next) if next > start_time => start_time = next,
                _ => return Ok(events),
            }
        }

        Err(ApiError::MalformedResponse(format!(
            "report {}: event pagination did not terminate",
            code
        )))
    }

    fn table(&self, code: &str, fight: &Fight, query: &TableQuery) -> ApiResult<TableData> {
        let data = self.table_data(code, fight, query)?;
        match query.kind {
            TableKind::Debuffs => {
                let table: RawAuraTable = parse(data, "debuffs table")?;
                Ok(TableData::Auras {
                    total_time_ms: table.total_time,
                    auras: table
                        .auras
                        .into_iter()
                        .map(|a| AuraEntry {
                            name: a.name,
                            total_uptime_ms: a.total_uptime,
                            total_uses: a.total_uses,
                        })
                        .collect(),
                })
            }
            TableKind::DamageTaken | TableKind::DamageDone => {
                let table: RawEntries<RawDamage> = parse(data, "damage table")?;
                Ok(TableData::Damage(
                    table
                        .entries
                        .into_iter()
                        .map(|d| DamageEntry {
                            name: d.name,
                            total: d.total,
                            hit_count: d.hit_count,
                        })
                        .collect(),
                ))
            }
            TableKind::Deaths => {
                let table: RawEntries<RawDeath> = parse(data, "deaths table")?;
                Ok(TableData::Deaths(
                    table
                        .entries
                        .into_iter()
                        .map(|d| DeathEntry {
                            name: d.name,
                            killing_ability_id: d.killing_blow.map(|k| k.guid),
                        })
                        .collect(),
                ))
            }
        }
    }
}
