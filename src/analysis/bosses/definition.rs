use crate::analysis::executor::{CustomAnalysisFn, CustomHandlers};
use crate::errors::{AppError, AppResult};
use crate::types::{AnalysisEntry, AnalysisKind, PlotEntry, TableDataType};
use serde::Deserialize;
use std::collections::HashSet;

/// Data-only description of one boss: which metrics to compute and how to plot them
#[derive(Debug, Clone, Deserialize)]
pub struct BossDefinition {
    pub key: String,
    pub name: String,
    pub encounter_id: u32,
    /// Falls back to the configured default difficulty
    #[serde(default)]
    pub difficulty: Option<u32>,
    #[serde(default)]
    pub analyses: Vec<AnalysisEntry>,
    #[serde(default)]
    pub plots: Vec<PlotEntry>,
    #[serde(skip)]
    pub handlers: CustomHandlers,
}

impl BossDefinition {
    /// Parse a TOML boss document
    pub fn from_toml(text: &str) -> AppResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Attach a named custom analysis routine
    pub fn with_handler(mut self, name: &str, handler: CustomAnalysisFn) -> Self {
        self.handlers.insert(name.to_string(), handler);
        self
    }

    pub fn difficulty_or(&self, default: u32) -> u32 {
        self.difficulty.unwrap_or(default)
    }

    /// Look up an analysis entry by display name or result key
    pub fn analysis(&self, name_or_key: &str) -> Option<&AnalysisEntry> {
        self.analyses
            .iter()
            .find(|a| a.name == name_or_key || a.result_key() == name_or_key)
    }

    /// Reject entries the engine could not execute or plot
    pub fn validate(&self) -> AppResult<()> {
        let mut names = HashSet::new();
        let mut keys = HashSet::new();

        for entry in &self.analyses {
            let context = |msg: String| {
                AppError::Configuration(format!("{} / '{}': {}", self.key, entry.name, msg))
            };
            if !names.insert(entry.name.clone()) {
                return Err(context("duplicate analysis name".to_string()));
            }
            if !keys.insert(entry.result_key()) {
                return Err(context(format!(
                    "duplicate result key '{}'",
                    entry.result_key()
                )));
            }
            match &entry.kind {
                AnalysisKind::TableData {
                    data_type: data_type @ (TableDataType::Debuffs | TableDataType::DamageTaken),
                    ability_id: None,
                    ..
                } => {
                    return Err(context(format!("{:?} requires ability_id", data_type)));
                }
                AnalysisKind::Custom { handler, .. } if !self.handlers.contains_key(handler) => {
                    return Err(context(format!("unknown custom analysis '{}'", handler)));
                }
                _ => {}
            }
        }

        for plot in &self.plots {
            let context = |msg: String| {
                AppError::Configuration(format!(
                    "{} / plot for '{}': {}",
                    self.key, plot.analysis, msg
                ))
            };
            let entry = self
                .analyses
                .iter()
                .find(|a| plot.refers_to(a))
                .ok_or_else(|| context("no analysis with this name".to_string()))?;

            let columns: Vec<String> = entry.columns().into_iter().map(|c| c.key).collect();
            let value_column = plot.value_column_for(entry);
            if !columns.contains(&value_column) {
                return Err(context(format!(
                    "analysis has no column '{}' (has {})",
                    value_column,
                    columns.join(", ")
                )));
            }
            if let Some(secondary) = plot.secondary_column_for(entry) {
                if !columns.contains(&secondary) {
                    return Err(context(format!("analysis has no column '{}'", secondary)));
                }
            }
        }

        Ok(())
    }
}
