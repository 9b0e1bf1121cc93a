use crate::common::{fight, interrupts, player, settings, FakeSource, DAY_MS, JAN_1};
use guild_log_analysis::analysis::normalize::{change_between, normalize_value};
use guild_log_analysis::analysis::{compute_change, normalize_rate, BossAnalysis, EventKind, Snapshot};
use guild_log_analysis::types::{Change, MetricKind, ResultRow, Role};
use std::collections::BTreeMap;
use std::rc::Rc;

const ALL_METRICS: [MetricKind; 4] = [
    MetricKind::Count,
    MetricKind::Damage,
    MetricKind::Percentage,
    MetricKind::Deaths,
];

fn rows(values: &[(&str, f64)]) -> Vec<ResultRow> {
    values
        .iter()
        .map(|(name, value)| ResultRow {
            player_name: name.to_string(),
            class: "Mage".to_string(),
            role: Role::Dps,
            values: BTreeMap::from([("v".to_string(), *value)]),
        })
        .collect()
}

#[test]
fn test_change_against_itself_is_zero_for_every_metric() {
    let current = rows(&[("Amy", 3.7), ("Bob", 0.0), ("Cid", 12_345.6)]);
    for metric in ALL_METRICS {
        let snapshot = Snapshot::new(&current, "v", 123_456);
        let changes = compute_change(&snapshot, Some(&snapshot), metric, 1800.0);
        assert_eq!(changes.len(), 3);
        for (name, change) in changes {
            assert_eq!(change, Change::Delta(0.0), "{:?} for {}", metric, name);
        }
    }
}

#[test]
fn test_normalized_change_matches_worked_example() {
    // 10 over 900s against 4 over 1800s
    let change = change_between(10.0, 900_000, Some(4.0), 1_800_000, MetricKind::Count, 1800.0);
    assert_eq!(change, Change::Delta(16.0));
}

#[test]
fn test_doubling_count_and_duration_keeps_rate() {
    for (count, duration_ms) in [(3.0, 300_000), (17.0, 1_234_000), (0.5, 61_000)] {
        let base = normalize_rate(count, duration_ms, 1800.0);
        let doubled = normalize_rate(count * 2.0, duration_ms * 2, 1800.0);
        assert!((base - doubled).abs() < 1e-9);
    }
}

#[test]
fn test_only_rates_are_normalized() {
    assert_eq!(normalize_value(MetricKind::Damage, 1_000.0, 900_000, 1800.0), 2_000.0);
    assert_eq!(normalize_value(MetricKind::Percentage, 40.0, 900_000, 1800.0), 40.0);
    assert_eq!(normalize_value(MetricKind::Deaths, 2.0, 900_000, 1800.0), 2.0);
}

#[test]
fn test_missing_player_uses_zero_baseline_except_percentages() {
    let current = rows(&[("Amy", 2.0)]);
    let previous = rows(&[("Bob", 5.0)]);
    let cur = Snapshot::new(&current, "v", 1_800_000);
    let prev = Snapshot::new(&previous, "v", 1_800_000);

    assert_eq!(
        compute_change(&cur, Some(&prev), MetricKind::Count, 1800.0)["Amy"],
        Change::Delta(2.0)
    );
    assert_eq!(
        compute_change(&cur, Some(&prev), MetricKind::Deaths, 1800.0)["Amy"],
        Change::Delta(2.0)
    );
    assert_eq!(
        compute_change(&cur, Some(&prev), MetricKind::Percentage, 1800.0)["Amy"],
        Change::NotAvailable
    );
}

#[test]
fn test_engine_compares_against_previous_report() {
    // Previous: 4 interrupts in one 1800s kill. Current: 10 over 300s + 600s.
    let source = FakeSource::new()
        .with_report("old", JAN_1, vec![fight(1, 0, 1800, true)])
        .with_roster("old", 1, vec![player(10, "Amy", "Rogue", Role::Dps)])
        .with_events("old", 1, EventKind::Interrupts, interrupts(10, 4))
        .with_report(
            "new",
            JAN_1 + 7 * DAY_MS,
            vec![fight(1, 0, 300, true), fight(2, 300, 900, true)],
        )
        .with_roster("new", 1, vec![player(10, "Amy", "Rogue", Role::Dps)])
        .with_roster("new", 2, vec![player(10, "Amy", "Rogue", Role::Dps)])
        .with_events("new", 1, EventKind::Interrupts, interrupts(10, 4))
        .with_events("new", 2, EventKind::Interrupts, interrupts(10, 6));

    let mut analysis = BossAnalysis::new(
        crate::common::test_boss().unwrap(),
        Rc::new(source),
        settings(),
    );
    // Out of order on purpose: results are ordered by report start time
    analysis
        .analyze(&["new".to_string(), "old".to_string()])
        .unwrap();

    let codes: Vec<_> = analysis.results().iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["old", "new"]);

    let changes = analysis.changes("Interrupts").unwrap();
    assert_eq!(changes["Amy"], Change::Delta(16.0));
}

#[test]
fn test_single_report_has_no_changes() {
    let source = FakeSource::new()
        .with_report("only", JAN_1, vec![fight(1, 0, 600, true)])
        .with_roster("only", 1, vec![player(10, "Amy", "Rogue", Role::Dps)])
        .with_events("only", 1, EventKind::Interrupts, interrupts(10, 2));

    let mut analysis = BossAnalysis::new(
        crate::common::test_boss().unwrap(),
        Rc::new(source),
        settings(),
    );
    analysis.analyze(&["only".to_string()]).unwrap();
    let changes = analysis.changes("interrupts").unwrap();
    assert_eq!(changes["Amy"], Change::NotAvailable);
}
