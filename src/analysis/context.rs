//! Per-report state shared by all analysis entries of one boss

use super::source::ReportSource;
use crate::errors::ApiResult;
use crate::types::{Actor, Fight, Participant};
use std::cell::OnceCell;
use tracing::{debug, info};

/// A fight with its death count and roster
#[derive(Debug, Clone)]
pub struct FightContext {
    pub fight: Fight,
    pub deaths: u32,
    pub roster: Vec<Participant>,
}

impl FightContext {
    /// Kills always count; wipes need at least `wipe_cutoff` deaths
    pub fn qualifies(&self, wipe_cutoff: u32) -> bool {
        self.fight.kill || self.deaths >= wipe_cutoff
    }

    pub fn participant_by_id(&self, actor_id: i64) -> Option<&Participant> {
        self.roster.iter().find(|p| p.id == actor_id)
    }

    pub fn participant_by_name(&self, name: &str) -> Option<&Participant> {
        self.roster.iter().find(|p| p.name == name)
    }
}

/// Fights, rosters and lazily fetched actors of one report
pub struct ReportContext<'a> {
    pub code: String,
    pub start_time_ms: i64,
    pub encounter_id: u32,
    pub difficulty: u32,
    fights: Vec<FightContext>,
    source: &'a dyn ReportSource,
    actors: OnceCell<Vec<Actor>>,
}

impl<'a> ReportContext<'a> {
    /// Fetch the encounter's fights plus death counts and rosters
    pub fn load(
        source: &'a dyn ReportSource,
        code: &str,
        encounter_id: u32,
        difficulty: u32,
    ) -> ApiResult<Self> {
        let report = source.report(code, encounter_id, difficulty)?;

        let mut fights = Vec::new();
        for fight in report
            .fights
            .into_iter()
            .filter(|f| f.encounter_id == encounter_id && f.difficulty == difficulty)
        {
            // Kills qualify regardless of deaths
            let deaths = if fight.kill {
                0
            } else {
                source.death_count(code, &fight)?
            };
            let roster = source.participants(code, &fight)?;
            debug!(
                "Report {} fight {}: kill={}, deaths={}, players={}",
                code,
                fight.id,
                fight.kill,
                deaths,
                roster.len()
            );
            fights.push(FightContext {
                fight,
                deaths,
                roster,
            });
        }

        info!(
            "Report {}: {} fights for encounter {} (difficulty {})",
            code,
            fights.len(),
            encounter_id,
            difficulty
        );

        Ok(Self {
            code: code.to_string(),
            start_time_ms: report.start_time_ms,
            encounter_id,
            difficulty,
            fights,
            source,
            actors: OnceCell::new(),
        })
    }

    pub fn fights(&self) -> &[FightContext] {
        &self.fights
    }

    pub fn qualifying_fights(&self, wipe_cutoff: u32) -> Vec<&FightContext> {
        self.fights
            .iter()
            .filter(|f| f.qualifies(wipe_cutoff))
            .collect()
    }

    pub fn source(&self) -> &'a dyn ReportSource {
        self.source
    }

    /// Master-data actors, fetched on first use
    pub fn actors(&self) -> ApiResult<&[Actor]> {
        if let Some(actors) = self.actors.get() {
            return Ok(actors);
        }
        let fetched = self.source.actors(&self.code)?;
        Ok(self.actors.get_or_init(|| fetched))
    }
}
