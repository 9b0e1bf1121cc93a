use super::report::Role;
use crate::utils::naming::snake_case;
use serde::{Deserialize, Serialize};

/// Auxiliary column carrying hit/use counts next to a table metric
pub const HIT_COUNT_COLUMN: &str = "hit_count";

/// How a metric behaves when comparing reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Event counts, normalized per time window
    #[default]
    Count,
    /// Damage totals, normalized per time window
    Damage,
    /// 0-100 values compared directly
    Percentage,
    /// Raw discrete death counts
    Deaths,
}

impl MetricKind {
    /// Whether values are scaled by fight duration before differencing
    pub fn is_rate(&self) -> bool {
        matches!(self, MetricKind::Count | MetricKind::Damage)
    }
}

/// Collapsing rule for a player who shows up under several roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    Sum,
    Max,
}

/// Sub-kinds of the `table_data` analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableDataType {
    Debuffs,
    DamageTaken,
    Deaths,
}

/// Type-specific parameters of an analysis entry, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisKind {
    Interrupts {
        ability_id: i64,
    },
    TableData {
        data_type: TableDataType,
        #[serde(default)]
        ability_id: Option<i64>,
        #[serde(default)]
        filter_expression: Option<String>,
    },
    DamageToActor {
        target_game_id: i64,
        #[serde(default)]
        filter_expression: Option<String>,
    },
    /// Boss-specific routine looked up by name in the boss definition
    Custom {
        handler: String,
        #[serde(default)]
        metric: MetricKind,
        #[serde(default)]
        params: serde_json::Map<String, serde_json::Value>,
    },
}

impl AnalysisKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            AnalysisKind::Interrupts { .. } => "interrupts",
            AnalysisKind::TableData { .. } => "table_data",
            AnalysisKind::DamageToActor { .. } => "damage_to_actor",
            AnalysisKind::Custom { .. } => "custom",
        }
    }

    fn default_reduction(&self) -> Reduction {
        match self {
            AnalysisKind::TableData {
                data_type: TableDataType::Debuffs,
                ..
            } => Reduction::Max,
            _ => Reduction::Sum,
        }
    }

    fn primary_metric(&self) -> MetricKind {
        match self {
            AnalysisKind::Interrupts { .. } => MetricKind::Count,
            AnalysisKind::TableData { data_type, .. } => match data_type {
                TableDataType::Debuffs => MetricKind::Percentage,
                TableDataType::DamageTaken => MetricKind::Damage,
                TableDataType::Deaths => MetricKind::Deaths,
            },
            AnalysisKind::DamageToActor { .. } => MetricKind::Damage,
            AnalysisKind::Custom { metric, .. } => *metric,
        }
    }

    fn has_hit_counts(&self) -> bool {
        matches!(
            self,
            AnalysisKind::TableData {
                data_type: TableDataType::Debuffs | TableDataType::DamageTaken,
                ..
            }
        )
    }
}

/// A result column and how it compares across reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub key: String,
    pub metric: MetricKind,
}

/// Declares one metric to compute for a boss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEntry {
    pub name: String,
    /// Overrides the snake-cased name
    #[serde(default, rename = "result_key")]
    pub result_key_override: Option<String>,
    /// Only contributions made in these roles count; empty means all roles
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub wipe_cutoff: Option<u32>,
    #[serde(default)]
    pub reduction: Option<Reduction>,
    #[serde(flatten)]
    pub kind: AnalysisKind,
}

impl AnalysisEntry {
    pub fn new(name: impl Into<String>, kind: AnalysisKind) -> Self {
        Self {
            name: name.into(),
            result_key_override: None,
            roles: Vec::new(),
            wipe_cutoff: None,
            reduction: None,
            kind,
        }
    }

    pub fn with_roles(mut self, roles: Vec<Role>) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_wipe_cutoff(mut self, cutoff: u32) -> Self {
        self.wipe_cutoff = Some(cutoff);
        self
    }

    pub fn with_reduction(mut self, reduction: Reduction) -> Self {
        self.reduction = Some(reduction);
        self
    }

    pub fn result_key(&self) -> String {
        self.result_key_override
            .clone()
            .unwrap_or_else(|| snake_case(&self.name))
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
            .unwrap_or_else(|| self.kind.default_reduction())
    }

    /// Columns produced for every row, primary column first
    pub fn columns(&self) -> Vec<Column> {
        let mut columns = vec![Column {
            key: self.result_key(),
            metric: self.kind.primary_metric(),
        }];
        if self.kind.has_hit_counts() {
            columns.push(Column {
                key: HIT_COUNT_COLUMN.to_string(),
                metric: MetricKind::Count,
            });
        }
        columns
    }

    pub fn metric_for(&self, column: &str) -> Option<MetricKind> {
        self.columns()
            .into_iter()
            .find(|c| c.key == column)
            .map(|c| c.metric)
    }

    pub fn allows_role(&self, role: Role) -> bool {
        self.roles.is_empty() || self.roles.contains(&role)
    }
}

/// Table plot flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlotType {
    NumberPlot,
    PercentagePlot,
    HitCountPlot,
}

fn default_true() -> bool {
    true
}

/// Declares how to render one analysis as a table plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotEntry {
    /// Analysis name or result key
    pub analysis: String,
    #[serde(rename = "type")]
    pub plot_type: PlotType,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub value_column: Option<String>,
    #[serde(default)]
    pub secondary_column: Option<String>,
    #[serde(default)]
    pub name_header: Option<String>,
    #[serde(default)]
    pub value_header: Option<String>,
    #[serde(default)]
    pub secondary_header: Option<String>,
    #[serde(default)]
    pub bar_header: Option<String>,
    #[serde(default)]
    pub change_header: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default = "default_true")]
    pub totals: bool,
    /// Lower is better (deaths, damage taken)
    #[serde(default)]
    pub invert_change_colors: bool,
}

impl PlotEntry {
    pub fn new(analysis: impl Into<String>, plot_type: PlotType) -> Self {
        Self {
            analysis: analysis.into(),
            plot_type,
            title: None,
            description: None,
            value_column: None,
            secondary_column: None,
            name_header: None,
            value_header: None,
            secondary_header: None,
            bar_header: None,
            change_header: None,
            roles: Vec::new(),
            totals: true,
            invert_change_colors: false,
        }
    }

    pub fn refers_to(&self, entry: &AnalysisEntry) -> bool {
        self.analysis == entry.name || self.analysis == entry.result_key()
    }

    pub fn title_for(&self, entry: &AnalysisEntry) -> String {
        self.title.clone().unwrap_or_else(|| entry.name.clone())
    }

    pub fn value_column_for(&self, entry: &AnalysisEntry) -> String {
        match (&self.value_column, self.plot_type) {
            (Some(column), _) => column.clone(),
            (None, PlotType::HitCountPlot) => HIT_COUNT_COLUMN.to_string(),
            (None, _) => entry.result_key(),
        }
    }

    /// HitCountPlot shows the damage figure beside the hit count when the analysis has one
    pub fn secondary_column_for(&self, entry: &AnalysisEntry) -> Option<String> {
        if self.secondary_column.is_some() {
            return self.secondary_column.clone();
        }
        let key = entry.result_key();
        match self.plot_type {
            PlotType::HitCountPlot if entry.metric_for(&key) == Some(MetricKind::Damage) => {
                Some(key)
            }
            _ => None,
        }
    }

    pub fn allows_role(&self, role: Role) -> bool {
        self.roles.is_empty() || self.roles.contains(&role)
    }
}
