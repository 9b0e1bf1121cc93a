//! Contract between the analysis engine and whatever supplies report data
//!
//! The engine only ever talks to [`ReportSource`]; the Warcraft Logs
//! implementation lives in `crate::api`, tests use an in-memory one.

use crate::errors::ApiResult;
use crate::types::{Actor, CombatEvent, Fight, Participant, ReportInfo, TableData};

/// Table kinds the engine asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Debuffs,
    DamageTaken,
    DamageDone,
    Deaths,
}

impl TableKind {
    /// GraphQL `TableDataType` literal
    pub fn as_graphql(&self) -> &'static str {
        match self {
            TableKind::Debuffs => "Debuffs",
            TableKind::DamageTaken => "DamageTaken",
            TableKind::DamageDone => "DamageDone",
            TableKind::Deaths => "Deaths",
        }
    }
}

/// Parameters of a per-fight table query
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    pub kind: TableKind,
    pub ability_id: Option<i64>,
    pub target_id: Option<i64>,
    pub filter_expression: Option<String>,
    pub wipe_cutoff: Option<u32>,
}

impl TableQuery {
    pub fn new(kind: TableKind) -> Self {
        Self {
            kind,
            ability_id: None,
            target_id: None,
            filter_expression: None,
            wipe_cutoff: None,
        }
    }
}

/// Event streams the engine asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Interrupts,
    Debuffs,
    DamageTaken,
}

impl EventKind {
    /// GraphQL `EventDataType` literal
    pub fn as_graphql(&self) -> &'static str {
        match self {
            EventKind::Interrupts => "Interrupts",
            EventKind::Debuffs => "Debuffs",
            EventKind::DamageTaken => "DamageTaken",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub kind: EventKind,
    pub ability_id: Option<i64>,
    pub wipe_cutoff: Option<u32>,
}

impl EventQuery {
    pub fn new(kind: EventKind, ability_id: i64) -> Self {
        Self {
            kind,
            ability_id: Some(ability_id),
            wipe_cutoff: None,
        }
    }
}

/// Blocking access to report data
///
/// Every call returns a fully materialized value. Authentication, rate-limit
/// and transport failures surface as distinct [`crate::errors::ApiError`] variants.
pub trait ReportSource {
    /// Report start time and the fights of one encounter at one difficulty
    fn report(&self, code: &str, encounter_id: u32, difficulty: u32) -> ApiResult<ReportInfo>;

    /// Number of player deaths in a fight
    fn death_count(&self, code: &str, fight: &Fight) -> ApiResult<u32>;

    /// Players and their roles for one fight
    fn participants(&self, code: &str, fight: &Fight) -> ApiResult<Vec<Participant>>;

    /// Master-data actors of the report
    fn actors(&self, code: &str) -> ApiResult<Vec<Actor>>;

    /// All events of one kind in a fight, pagination resolved
    fn events(&self, code: &str, fight: &Fight, query: &EventQuery)
        -> ApiResult<Vec<CombatEvent>>;

    /// Aggregated per-player table for a fight
    fn table(&self, code: &str, fight: &Fight, query: &TableQuery) -> ApiResult<TableData>;
}
