use crate::common::{DAY_MS, JAN_1};
use guild_log_analysis::errors::AppError;
use guild_log_analysis::plotting::{build_trend, render_svg, TrendGrouping};
use guild_log_analysis::types::{
    AnalysisEntry, AnalysisKind, AnalysisResult, PlotEntry, PlotType, ReportResults, ResultRow,
    Role,
};
use std::collections::BTreeMap;

fn entry() -> AnalysisEntry {
    AnalysisEntry::new("Interrupts", AnalysisKind::Interrupts { ability_id: 1 })
}

fn plot() -> PlotEntry {
    PlotEntry::new("Interrupts", PlotType::NumberPlot)
}

fn report(code: &str, day: i64, duration_ms: i64, rows: &[(&str, Role, f64)]) -> ReportResults {
    ReportResults {
        code: code.to_string(),
        start_time_ms: JAN_1 + day * DAY_MS,
        analyses: vec![AnalysisResult {
            name: "Interrupts".to_string(),
            result_key: "interrupts".to_string(),
            columns: entry().columns(),
            rows: rows
                .iter()
                .map(|(name, role, value)| ResultRow {
                    player_name: name.to_string(),
                    class: "Shaman".to_string(),
                    role: *role,
                    values: BTreeMap::from([("interrupts".to_string(), *value)]),
                })
                .collect(),
            duration_ms,
            fight_ids: vec![1],
        }],
    }
}

fn three_weeks() -> Vec<ReportResults> {
    vec![
        report("c", 14, 1_800_000, &[("Amy", Role::Dps, 6.0), ("Bob", Role::Tank, 3.0)]),
        report("a", 0, 900_000, &[("Amy", Role::Dps, 2.0), ("Bob", Role::Tank, 1.0)]),
        report("b", 7, 1_800_000, &[("Bob", Role::Tank, 5.0), ("Cid", Role::Dps, 4.0)]),
    ]
}

#[test]
fn test_player_series_are_normalized_with_gaps() {
    let chart = build_trend(&plot(), &entry(), &three_weeks(), TrendGrouping::Player, 1800.0).unwrap();

    assert_eq!(chart.labels, vec!["01.01.2024", "08.01.2024", "15.01.2024"]);
    assert_eq!(
        chart.filename("svg"),
        "2024-01-01_to_2024-01-15_interrupts_progress.svg"
    );

    let amy = chart.series.iter().find(|s| s.label == "Amy").unwrap();
    // 2 over 900s is 4 per 30 minutes; Amy skipped the second report
    assert_eq!(amy.points, vec![Some(4.0), None, Some(6.0)]);

    let labels: Vec<_> = chart.series.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Amy", "Bob", "Cid"]);
}

#[test]
fn test_role_series_sum_per_report() {
    let chart = build_trend(&plot(), &entry(), &three_weeks(), TrendGrouping::Role, 1800.0).unwrap();

    let labels: Vec<_> = chart.series.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Tank", "DPS"]);
    let dps = &chart.series[1];
    assert_eq!(dps.points, vec![Some(4.0), Some(4.0), Some(6.0)]);
}

#[test]
fn test_single_report_cannot_trend() {
    let reports = vec![report("a", 0, 900_000, &[("Amy", Role::Dps, 2.0)])];
    let err = build_trend(&plot(), &entry(), &reports, TrendGrouping::Player, 1800.0).unwrap_err();
    assert!(matches!(err, AppError::Render(_)));
}

#[test]
fn test_trend_renders_to_svg() {
    let chart = build_trend(&plot(), &entry(), &three_weeks(), TrendGrouping::Player, 1800.0).unwrap();
    let svg = render_svg(&chart, 1.0).unwrap();
    for text in ["Interrupts", "01.01.2024 - 15.01.2024", "Amy", "Cid", "15.01.2024"] {
        assert!(svg.contains(text), "missing {}", text);
    }
}
