use serde::{Deserialize, Serialize};
use std::fmt;

/// Raid role assigned to a participant for one fight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Tank,
    Healer,
    Dps,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Tank, Role::Healer, Role::Dps];

    /// Map a `playerDetails` group key (`tanks`, `healers`, `dps`) to a role
    pub fn from_group_key(key: &str) -> Option<Self> {
        match key {
            "tanks" => Some(Role::Tank),
            "healers" => Some(Role::Healer),
            "dps" => Some(Role::Dps),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Tank => "Tank",
            Role::Healer => "Healer",
            Role::Dps => "DPS",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One attempt at an encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fight {
    pub id: u32,
    pub encounter_id: u32,
    pub difficulty: u32,
    /// Milliseconds relative to report start
    pub start_time: i64,
    pub end_time: i64,
    pub kill: bool,
}

impl Fight {
    pub fn duration_ms(&self) -> i64 {
        (self.end_time - self.start_time).max(0)
    }
}

/// Report header plus the fights of one encounter/difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportInfo {
    pub code: String,
    /// Unix milliseconds
    pub start_time_ms: i64,
    pub fights: Vec<Fight>,
}

/// A player present in one fight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Report-local actor id
    pub id: i64,
    pub name: String,
    pub class: String,
    #[serde(default)]
    pub spec: Option<String>,
    pub role: Role,
}

/// Master-data actor (players, NPCs, pets)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub game_id: i64,
    pub kind: String,
}

/// A single combat log event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEvent {
    pub timestamp: i64,
    pub event_type: String,
    pub source_id: Option<i64>,
    pub target_id: Option<i64>,
    pub ability_id: Option<i64>,
}

/// Debuff uptime for one actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuraEntry {
    pub name: String,
    pub total_uptime_ms: f64,
    pub total_uses: u64,
}

/// Damage done or taken by one actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageEntry {
    pub name: String,
    pub total: f64,
    pub hit_count: u64,
}

/// One player death
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathEntry {
    pub name: String,
    pub killing_ability_id: Option<i64>,
}

/// Aggregated table returned by the data source, one shape per table kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableData {
    Auras {
        total_time_ms: f64,
        auras: Vec<AuraEntry>,
    },
    Damage(Vec<DamageEntry>),
    Deaths(Vec<DeathEntry>),
}
