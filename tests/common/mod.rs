//! Common Test Utilities
//!
//! In-memory report data for driving the analysis engine without the network,
//! plus a canned GraphQL transport for exercising the API data source.

#![allow(dead_code)]

use guild_log_analysis::analysis::{
    BossDefinition, BossRegistry, EventKind, EventQuery, ReportSource, TableKind, TableQuery,
};
use guild_log_analysis::api::GraphQlTransport;
use guild_log_analysis::config::{AnalysisSettings, ImageFormat, PlotSettings};
use guild_log_analysis::errors::{ApiError, ApiResult, AppResult};
use guild_log_analysis::types::{
    Actor, CombatEvent, Fight, Participant, ReportInfo, Role, TableData,
};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

pub const ENCOUNTER_ID: u32 = 3014;
pub const DIFFICULTY: u32 = 5;
pub const KICK_ABILITY: i64 = 460582;
/// 2024-01-01T00:00:00Z
pub const JAN_1: i64 = 1_704_067_200_000;
pub const DAY_MS: i64 = 86_400_000;

/// Small boss exercising interrupts, debuff uptime and deaths
pub const TEST_BOSS: &str = r#"
key = "test_boss"
name = "Test Boss"
encounter_id = 3014
difficulty = 5

[[analyses]]
name = "Interrupts"
type = "interrupts"
ability_id = 460582

[[analyses]]
name = "Debuff Uptime"
type = "table_data"
data_type = "Debuffs"
ability_id = 460444

[[analyses]]
name = "Deaths"
type = "table_data"
data_type = "Deaths"

[[plots]]
analysis = "Interrupts"
type = "NumberPlot"
value_header = "Interrupts"

[[plots]]
analysis = "Debuff Uptime"
type = "PercentagePlot"
value_header = "Uptime"

[[plots]]
analysis = "Deaths"
type = "NumberPlot"
invert_change_colors = true
"#;

pub fn test_boss() -> AppResult<BossDefinition> {
    BossDefinition::from_toml(TEST_BOSS)
}

pub fn test_registry() -> BossRegistry {
    let mut registry = BossRegistry::new();
    registry.register("test_boss", test_boss).unwrap();
    registry
}

pub fn settings() -> AnalysisSettings {
    AnalysisSettings {
        default_difficulty: DIFFICULTY,
        default_wipe_cutoff: 4,
        normalization_window_seconds: 1800.0,
    }
}

pub fn svg_settings() -> PlotSettings {
    PlotSettings {
        dpi: 100,
        image_format: ImageFormat::Svg,
        font_file: None,
    }
}

/// Fight of the test encounter, times in seconds from report start
pub fn fight(id: u32, start_s: i64, end_s: i64, kill: bool) -> Fight {
    Fight {
        id,
        encounter_id: ENCOUNTER_ID,
        difficulty: DIFFICULTY,
        start_time: start_s * 1000,
        end_time: end_s * 1000,
        kill,
    }
}

pub fn player(id: i64, name: &str, class: &str, role: Role) -> Participant {
    Participant {
        id,
        name: name.to_string(),
        class: class.to_string(),
        spec: None,
        role,
    }
}

/// `count` interrupt events cast by `source_id`
pub fn interrupts(source_id: i64, count: usize) -> Vec<CombatEvent> {
    (0..count)
        .map(|i| CombatEvent {
            timestamp: 1_000 * i as i64,
            event_type: "interrupt".to_string(),
            source_id: Some(source_id),
            target_id: None,
            ability_id: Some(KICK_ABILITY),
        })
        .collect()
}

type FightKey = (String, u32);

/// In-memory [`ReportSource`] with a log of the calls it served
#[derive(Default)]
pub struct FakeSource {
    reports: HashMap<String, ReportInfo>,
    deaths: HashMap<FightKey, u32>,
    rosters: HashMap<FightKey, Vec<Participant>>,
    actors: HashMap<String, Vec<Actor>>,
    events: HashMap<(String, u32, EventKind), Vec<CombatEvent>>,
    tables: HashMap<(String, u32, TableKind), TableData>,
    target_tables: HashMap<(String, u32, i64), TableData>,
    failing: HashMap<String, String>,
    pub calls: RefCell<Vec<String>>,
    pub table_queries: RefCell<Vec<TableQuery>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_report(mut self, code: &str, start_time_ms: i64, fights: Vec<Fight>) -> Self {
        self.reports.insert(
            code.to_string(),
            ReportInfo {
                code: code.to_string(),
                start_time_ms,
                fights,
            },
        );
        self
    }

    pub fn with_roster(mut self, code: &str, fight_id: u32, roster: Vec<Participant>) -> Self {
        self.rosters.insert((code.to_string(), fight_id), roster);
        self
    }

    pub fn with_deaths(mut self, code: &str, fight_id: u32, deaths: u32) -> Self {
        self.deaths.insert((code.to_string(), fight_id), deaths);
        self
    }

    pub fn with_events(
        mut self,
        code: &str,
        fight_id: u32,
        kind: EventKind,
        events: Vec<CombatEvent>,
    ) -> Self {
        self.events
            .entry((code.to_string(), fight_id, kind))
            .or_default()
            .extend(events);
        self
    }

    pub fn with_table(mut self, code: &str, fight_id: u32, kind: TableKind, table: TableData) -> Self {
        self.tables.insert((code.to_string(), fight_id, kind), table);
        self
    }

    /// Table answered only to queries for `target_id`
    pub fn with_target_table(
        mut self,
        code: &str,
        fight_id: u32,
        target_id: i64,
        table: TableData,
    ) -> Self {
        self.target_tables
            .insert((code.to_string(), fight_id, target_id), table);
        self
    }

    pub fn with_actors(mut self, code: &str, actors: Vec<Actor>) -> Self {
        self.actors.insert(code.to_string(), actors);
        self
    }

    /// Every request for `code` fails with an authentication error
    pub fn failing(mut self, code: &str, reason: &str) -> Self {
        self.failing.insert(code.to_string(), reason.to_string());
        self
    }

    fn log(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn check(&self, code: &str) -> ApiResult<()> {
        match self.failing.get(code) {
            Some(reason) => Err(ApiError::Authentication(reason.clone())),
            None => Ok(()),
        }
    }

    /// Calls that touched fight `fight_id` of `code`
    pub fn calls_for_fight(&self, code: &str, fight_id: u32) -> Vec<String> {
        let suffix = format!(":{}:{}", code, fight_id);
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.ends_with(&suffix))
            .cloned()
            .collect()
    }
}

impl ReportSource for FakeSource {
    fn report(&self, code: &str, _encounter_id: u32, _difficulty: u32) -> ApiResult<ReportInfo> {
        self.check(code)?;
        self.log(format!("report:{}", code));
        self.reports
            .get(code)
            .cloned()
            .ok_or_else(|| ApiError::MalformedResponse(format!("report {} not found", code)))
    }

    fn death_count(&self, code: &str, fight: &Fight) -> ApiResult<u32> {
        self.check(code)?;
        self.log(format!("deaths:{}:{}", code, fight.id));
        Ok(self
            .deaths
            .get(&(code.to_string(), fight.id))
            .copied()
            .unwrap_or(0))
    }

    fn participants(&self, code: &str, fight: &Fight) -> ApiResult<Vec<Participant>> {
        self.check(code)?;
        self.log(format!("participants:{}:{}", code, fight.id));
        Ok(self
            .rosters
            .get(&(code.to_string(), fight.id))
            .cloned()
            .unwrap_or_default())
    }

    fn actors(&self, code: &str) -> ApiResult<Vec<Actor>> {
        self.check(code)?;
        self.log(format!("actors:{}", code));
        Ok(self.actors.get(code).cloned().unwrap_or_default())
    }

    fn events(&self, code: &str, fight: &Fight, query: &EventQuery) -> ApiResult<Vec<CombatEvent>> {
        self.check(code)?;
        self.log(format!("events:{:?}:{}:{}", query.kind, code, fight.id));
        Ok(self
            .events
            .get(&(code.to_string(), fight.id, query.kind))
            .cloned()
            .unwrap_or_default())
    }

    fn table(&self, code: &str, fight: &Fight, query: &TableQuery) -> ApiResult<TableData> {
        self.check(code)?;
        self.log(format!("table:{:?}:{}:{}", query.kind, code, fight.id));
        self.table_queries.borrow_mut().push(query.clone());
        let stored = match query.target_id {
            Some(target) => self.target_tables.get(&(code.to_string(), fight.id, target)),
            None => self.tables.get(&(code.to_string(), fight.id, query.kind)),
        };
        Ok(match (stored, query.kind) {
            (Some(table), _) => table.clone(),
            (None, TableKind::Debuffs) => TableData::Auras {
                total_time_ms: 0.0,
                auras: Vec::new(),
            },
            (None, TableKind::Deaths) => TableData::Deaths(Vec::new()),
            (None, _) => TableData::Damage(Vec::new()),
        })
    }
}

/// Transport answering queries from a queue, recording the variables sent
#[derive(Default)]
pub struct CannedTransport {
    responses: RefCell<VecDeque<ApiResult<Value>>>,
    pub requests: RefCell<Vec<(String, Value)>>,
}

impl CannedTransport {
    pub fn new(responses: Vec<Value>) -> Self {
        Self {
            responses: RefCell::new(responses.into_iter().map(Ok).collect()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn push_error(&self, error: ApiError) {
        self.responses.borrow_mut().push_back(Err(error));
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl GraphQlTransport for CannedTransport {
    fn execute(&self, query: &str, variables: &Value) -> ApiResult<Value> {
        self.requests
            .borrow_mut()
            .push((query.to_string(), variables.clone()));
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no canned response left".to_string())))
    }
}

/// Wrap a report payload in the `data.reportData.report` envelope
pub fn report_envelope(report: Value) -> Value {
    serde_json::json!({ "data": { "reportData": { "report": report } } })
}
