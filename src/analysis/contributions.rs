//! Per-role accumulation and role deduplication
//!
//! Values are collected per `(player, role)` because the roster of each fight
//! can assign a player a different role. [`ContributionSet::into_rows`] then
//! collapses each player to one row with the entry's [`Reduction`].

use crate::types::{AnalysisEntry, MetricKind, Participant, Reduction, ResultRow, Role};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default)]
struct Contribution {
    class: String,
    values: BTreeMap<String, f64>,
    /// Time in qualifying fights under this role
    active_ms: f64,
    /// Debuff time under this role
    uptime_ms: f64,
}

type Key = (String, Role);

#[derive(Debug, Default)]
pub struct ContributionSet {
    order: Vec<Key>,
    entries: HashMap<Key, Contribution>,
}

impl ContributionSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, participant: &Participant) -> &mut Contribution {
        let key = (participant.name.clone(), participant.role);
        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }
        let contribution = self.entries.entry(key).or_default();
        if contribution.class.is_empty() {
            contribution.class = participant.class.clone();
        }
        contribution
    }

    /// Register a fight's roster so that players without events still get a zero row
    pub fn seed(&mut self, roster: &[Participant], active_ms: f64) {
        for participant in roster {
            self.entry(participant).active_ms += active_ms;
        }
    }

    pub fn add(&mut self, participant: &Participant, column: &str, amount: f64) {
        *self
            .entry(participant)
            .values
            .entry(column.to_string())
            .or_insert(0.0) += amount;
    }

    pub fn add_uptime(&mut self, participant: &Participant, uptime_ms: f64) {
        self.entry(participant).uptime_ms += uptime_ms;
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collapse to one row per player
    ///
    /// Contributions from roles the entry does not allow are dropped first, so a
    /// player only appears if they played an allowed role at least once.
    /// `uptime_column` receives the per-role uptime percentage before reduction.
    pub fn into_rows(self, entry: &AnalysisEntry, uptime_column: Option<&str>) -> Vec<ResultRow> {
        let columns = entry.columns();
        let reduction = entry.reduction();

        let mut grouped: Vec<(String, Vec<(Role, Contribution)>)> = Vec::new();
        let mut entries = self.entries;
        for key in self.order {
            if !entry.allows_role(key.1) {
                continue;
            }
            let Some(mut contribution) = entries.remove(&key) else {
                continue;
            };
            if let Some(column) = uptime_column {
                let percentage = if contribution.active_ms > 0.0 {
                    (contribution.uptime_ms / contribution.active_ms * 100.0).clamp(0.0, 100.0)
                } else {
                    0.0
                };
                contribution.values.insert(column.to_string(), percentage);
            }

            let (name, role) = key;
            match grouped.iter_mut().find(|(n, _)| *n == name) {
                Some((_, per_role)) => per_role.push((role, contribution)),
                None => grouped.push((name, vec![(role, contribution)])),
            }
        }

        grouped
            .into_iter()
            .map(|(player_name, per_role)| {
                let mut values = BTreeMap::new();
                for column in &columns {
                    let reduced = reduce(
                        per_role
                            .iter()
                            .map(|(_, c)| c.values.get(&column.key).copied().unwrap_or(0.0)),
                        reduction,
                    );
                    let value = match column.metric {
                        MetricKind::Percentage => reduced.clamp(0.0, 100.0),
                        _ => reduced.max(0.0),
                    };
                    values.insert(column.key.clone(), value);
                }

                // Primary role is the one with the most fight time; first seen wins ties
                let mut primary = &per_role[0];
                for candidate in &per_role[1..] {
                    if candidate.1.active_ms > primary.1.active_ms {
                        primary = candidate;
                    }
                }
                let class = per_role
                    .iter()
                    .map(|(_, c)| c.class.clone())
                    .find(|c| !c.is_empty())
                    .unwrap_or_default();

                ResultRow {
                    player_name,
                    class,
                    role: primary.0,
                    values,
                }
            })
            .collect()
    }
}

fn reduce(values: impl Iterator<Item = f64>, reduction: Reduction) -> f64 {
    match reduction {
        Reduction::Sum => values.sum(),
        Reduction::Max => values.fold(0.0, f64::max),
    }
}
