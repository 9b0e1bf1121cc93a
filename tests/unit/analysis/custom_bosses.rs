use crate::common::{fight, player, settings, FakeSource, DAY_MS, JAN_1};
use guild_log_analysis::analysis::bosses::sprocketmonger::{self, wrong_mine_triggers};
use guild_log_analysis::analysis::{
    default_registry, BossAnalysis, BossDefinition, CustomFightInput, EventKind, FightContext,
};
use guild_log_analysis::errors::{AppError, AppResult};
use guild_log_analysis::types::{
    AnalysisEntry, AnalysisKind, Change, CombatEvent, Fight, MetricKind, Role,
};
use serde_json::{json, Map, Value};
use std::rc::Rc;

const SPROCKET_ENCOUNTER: u32 = 3013;

fn mine_fight() -> Fight {
    Fight {
        id: 1,
        encounter_id: SPROCKET_ENCOUNTER,
        difficulty: 5,
        start_time: 0,
        end_time: 300_000,
        kill: true,
    }
}

fn event(timestamp: i64, event_type: &str, target: i64) -> CombatEvent {
    CombatEvent {
        timestamp,
        event_type: event_type.to_string(),
        source_id: None,
        target_id: Some(target),
        ability_id: None,
    }
}

fn roster() -> Vec<guild_log_analysis::types::Participant> {
    vec![
        player(10, "Amy", "Rogue", Role::Dps),
        player(11, "Bob", "Priest", Role::Healer),
        player(12, "Cid", "Warrior", Role::Tank),
    ]
}

/// Amy's mine hits three players inside the window, Bob's only two
fn mine_source() -> FakeSource {
    FakeSource::new()
        .with_report("m1", JAN_1, vec![mine_fight()])
        .with_roster("m1", 1, roster())
        .with_events(
            "m1",
            1,
            EventKind::Debuffs,
            vec![
                event(1_000, "applydebuff", 10),
                event(5_000, "removedebuff", 10),
                event(20_000, "removedebuff", 11),
            ],
        )
        .with_events(
            "m1",
            1,
            EventKind::DamageTaken,
            vec![
                event(5_100, "damage", 10),
                event(5_400, "damage", 11),
                event(5_400, "absorbed", 12),
                event(5_900, "damage", 12),
                event(6_500, "damage", 11),
                event(20_100, "damage", 10),
                event(20_200, "damage", 12),
            ],
        )
}

fn params() -> Map<String, Value> {
    match json!({
        "debuff_ability_id": 1218342,
        "damage_ability_id": 1219047,
        "correlation_window_ms": 1000,
        "min_victims_threshold": 3,
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[test]
fn test_wrong_mine_blames_player_with_enough_victims() {
    let source = mine_source();
    let ctx = FightContext {
        fight: mine_fight(),
        deaths: 0,
        roster: roster(),
    };
    let params = params();
    let input = CustomFightInput {
        source: &source,
        report_code: "m1",
        fight: &ctx,
        params: &params,
        wipe_cutoff: 4,
    };

    let triggers = wrong_mine_triggers(&input).unwrap();
    assert_eq!(triggers, vec![("Amy".to_string(), 1.0)]);
}

#[test]
fn test_wrong_mine_requires_parameters() {
    let source = mine_source();
    let ctx = FightContext {
        fight: mine_fight(),
        deaths: 0,
        roster: roster(),
    };
    let mut params = params();
    params.remove("correlation_window_ms");
    let input = CustomFightInput {
        source: &source,
        report_code: "m1",
        fight: &ctx,
        params: &params,
        wipe_cutoff: 4,
    };

    assert!(matches!(
        wrong_mine_triggers(&input),
        Err(AppError::Configuration(_))
    ));
}

#[test]
fn test_registered_boss_runs_custom_analysis() {
    let definition = default_registry()
        .unwrap()
        .create(sprocketmonger::KEY)
        .unwrap();
    let mut analysis = BossAnalysis::new(definition, Rc::new(mine_source()), settings());
    let summary = analysis.analyze(&["m1".to_string()]).unwrap();
    assert!(summary.failed.is_empty());

    let result = analysis.results()[0].get("wrong_mine_triggers").unwrap();
    assert_eq!(result.row("Amy").unwrap().value("wrong_mine_triggers"), 1.0);
    assert_eq!(result.row("Bob").unwrap().value("wrong_mine_triggers"), 0.0);
}

/// Reports more than a full fight of coverage for Amy
fn overcapped_coverage(_input: &CustomFightInput<'_>) -> AppResult<Vec<(String, f64)>> {
    Ok(vec![("Amy".to_string(), 150.0), ("Bob".to_string(), 40.0)])
}

#[test]
fn test_custom_percentage_rows_stay_within_bounds() {
    let mut definition = BossDefinition::from_toml(
        r#"
key = "coverage"
name = "Coverage"
encounter_id = 3014
"#,
    )
    .unwrap()
    .with_handler("overcapped_coverage", overcapped_coverage);
    definition.analyses.push(AnalysisEntry::new(
        "Coverage",
        AnalysisKind::Custom {
            handler: "overcapped_coverage".to_string(),
            metric: MetricKind::Percentage,
            params: Map::new(),
        },
    ));

    let roster = vec![
        player(10, "Amy", "Rogue", Role::Dps),
        player(11, "Bob", "Priest", Role::Healer),
    ];
    let source = FakeSource::new()
        .with_report("w1", JAN_1, vec![fight(1, 0, 300, true)])
        .with_roster("w1", 1, roster.clone())
        .with_report("w2", JAN_1 + DAY_MS, vec![fight(1, 0, 600, true)])
        .with_roster("w2", 1, roster);
    let mut analysis = BossAnalysis::new(definition, Rc::new(source), settings());
    analysis
        .analyze(&["w1".to_string(), "w2".to_string()])
        .unwrap();

    for report in analysis.results() {
        let result = report.get("coverage").unwrap();
        assert_eq!(result.row("Amy").unwrap().value("coverage"), 100.0);
        assert_eq!(result.row("Bob").unwrap().value("coverage"), 40.0);
    }
    // Identical data in both reports means no change
    let changes = analysis.changes("Coverage").unwrap();
    assert_eq!(changes["Amy"], Change::Delta(0.0));
    assert_eq!(changes["Bob"], Change::Delta(0.0));
}
