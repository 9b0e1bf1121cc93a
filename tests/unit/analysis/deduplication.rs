use crate::common::{fight, interrupts, player, settings, FakeSource, DIFFICULTY, ENCOUNTER_ID, JAN_1};
use guild_log_analysis::analysis::{
    run_analysis, CustomHandlers, EventKind, ReportContext, TableKind,
};
use guild_log_analysis::errors::AppError;
use guild_log_analysis::types::{
    AnalysisEntry, AnalysisKind, AuraEntry, Role, TableData, TableDataType, HIT_COUNT_COLUMN,
};

/// Amy plays DPS in fight 1 (300s) and Tank in fight 2 (600s)
fn role_switch_source() -> FakeSource {
    FakeSource::new()
        .with_report("r1", JAN_1, vec![fight(1, 0, 300, true), fight(2, 300, 900, true)])
        .with_roster("r1", 1, vec![player(10, "Amy", "Monk", Role::Dps)])
        .with_roster("r1", 2, vec![player(10, "Amy", "Monk", Role::Tank)])
        .with_events("r1", 1, EventKind::Interrupts, interrupts(10, 3))
        .with_events("r1", 2, EventKind::Interrupts, interrupts(10, 5))
}

fn kicks() -> AnalysisEntry {
    AnalysisEntry::new("Interrupts", AnalysisKind::Interrupts { ability_id: 460582 })
}

fn uptime() -> AnalysisEntry {
    AnalysisEntry::new(
        "Debuff Uptime",
        AnalysisKind::TableData {
            data_type: TableDataType::Debuffs,
            ability_id: Some(460444),
            filter_expression: None,
        },
    )
}

fn auras(total_time_ms: f64, uptime_ms: f64, uses: u64) -> TableData {
    TableData::Auras {
        total_time_ms,
        auras: vec![AuraEntry {
            name: "Amy".to_string(),
            total_uptime_ms: uptime_ms,
            total_uses: uses,
        }],
    }
}

#[test]
fn test_role_switch_sums_additive_metric_once() {
    let source = role_switch_source();
    let ctx = ReportContext::load(&source, "r1", ENCOUNTER_ID, DIFFICULTY).unwrap();
    let result = run_analysis(&kicks(), &ctx, &CustomHandlers::new(), &settings()).unwrap();

    assert_eq!(result.rows.len(), 1);
    let row = &result.rows[0];
    assert_eq!(row.player_name, "Amy");
    assert_eq!(row.value("interrupts"), 8.0);
    // Tank time (600s) outweighs DPS time (300s)
    assert_eq!(row.role, Role::Tank);
    assert_eq!(result.duration_ms, 900_000);
    assert_eq!(result.fight_ids, vec![1, 2]);
}

#[test]
fn test_role_switch_takes_max_for_uptime() {
    let source = role_switch_source()
        .with_table("r1", 1, TableKind::Debuffs, auras(300_000.0, 150_000.0, 2))
        .with_table("r1", 2, TableKind::Debuffs, auras(600_000.0, 480_000.0, 3));
    let ctx = ReportContext::load(&source, "r1", ENCOUNTER_ID, DIFFICULTY).unwrap();
    let result = run_analysis(&uptime(), &ctx, &CustomHandlers::new(), &settings()).unwrap();

    assert_eq!(result.rows.len(), 1);
    let row = &result.rows[0];
    // 50% as DPS, 80% as Tank: the max, never the 130% sum
    assert!((row.value("debuff_uptime") - 80.0).abs() < 1e-9);
    assert_eq!(row.value(HIT_COUNT_COLUMN), 3.0);
}

#[test]
fn test_uptime_is_time_weighted_within_one_role() {
    let source = FakeSource::new()
        .with_report("r1", JAN_1, vec![fight(1, 0, 300, true), fight(2, 300, 900, true)])
        .with_roster("r1", 1, vec![player(10, "Amy", "Monk", Role::Dps)])
        .with_roster("r1", 2, vec![player(10, "Amy", "Monk", Role::Dps)])
        .with_table("r1", 1, TableKind::Debuffs, auras(300_000.0, 150_000.0, 1))
        .with_table("r1", 2, TableKind::Debuffs, auras(600_000.0, 480_000.0, 1));
    let ctx = ReportContext::load(&source, "r1", ENCOUNTER_ID, DIFFICULTY).unwrap();
    let result = run_analysis(&uptime(), &ctx, &CustomHandlers::new(), &settings()).unwrap();

    // (150s + 480s) / 900s
    assert!((result.rows[0].value("debuff_uptime") - 70.0).abs() < 1e-9);
}

#[test]
fn test_role_filter_drops_contributions_from_other_roles() {
    let source = role_switch_source();
    let ctx = ReportContext::load(&source, "r1", ENCOUNTER_ID, DIFFICULTY).unwrap();

    let dps_only = kicks().with_roles(vec![Role::Dps]);
    let result = run_analysis(&dps_only, &ctx, &CustomHandlers::new(), &settings()).unwrap();
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0].value("interrupts"), 3.0);
    assert_eq!(result.rows[0].role, Role::Dps);

    let healers_only = kicks().with_roles(vec![Role::Healer]);
    let result = run_analysis(&healers_only, &ctx, &CustomHandlers::new(), &settings()).unwrap();
    assert!(result.rows.is_empty());
}

#[test]
fn test_players_without_events_get_zero_rows() {
    let source = role_switch_source().with_roster(
        "r1",
        1,
        vec![
            player(10, "Amy", "Monk", Role::Dps),
            player(11, "Bob", "Priest", Role::Healer),
        ],
    );
    let ctx = ReportContext::load(&source, "r1", ENCOUNTER_ID, DIFFICULTY).unwrap();
    let result = run_analysis(&kicks(), &ctx, &CustomHandlers::new(), &settings()).unwrap();

    let bob = result.row("Bob").unwrap();
    assert_eq!(bob.value("interrupts"), 0.0);
    assert_eq!(bob.class, "Priest");
    assert!(result.rows.iter().all(|r| r.values.values().all(|v| *v >= 0.0)));
}

#[test]
fn test_unknown_interrupt_source_is_ignored() {
    let source = role_switch_source().with_events("r1", 1, EventKind::Interrupts, interrupts(99, 4));
    let ctx = ReportContext::load(&source, "r1", ENCOUNTER_ID, DIFFICULTY).unwrap();
    let result = run_analysis(&kicks(), &ctx, &CustomHandlers::new(), &settings()).unwrap();
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0].value("interrupts"), 8.0);
}

#[test]
fn test_mismatched_table_shape_is_data_shape_error() {
    let source = role_switch_source().with_table(
        "r1",
        1,
        TableKind::Debuffs,
        TableData::Deaths(Vec::new()),
    );
    let ctx = ReportContext::load(&source, "r1", ENCOUNTER_ID, DIFFICULTY).unwrap();
    let err = run_analysis(&uptime(), &ctx, &CustomHandlers::new(), &settings()).unwrap_err();
    assert!(matches!(err, AppError::DataShape(_)));
}
