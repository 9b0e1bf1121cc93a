use crate::common::{report_envelope, CannedTransport};
use guild_log_analysis::analysis::{EventKind, EventQuery, ReportSource, TableKind, TableQuery};
use guild_log_analysis::api::WclDataSource;
use guild_log_analysis::errors::{ApiError, AppError};
use guild_log_analysis::types::{Fight, Role, TableData};
use serde_json::json;

fn fight() -> Fight {
    Fight {
        id: 7,
        encounter_id: 3014,
        difficulty: 5,
        start_time: 1_000,
        end_time: 301_000,
        kill: false,
    }
}

#[test]
fn test_report_fights_are_parsed() {
    let transport = CannedTransport::new(vec![report_envelope(json!({
        "startTime": 1_704_067_200_000i64,
        "fights": [
            { "id": 3, "encounterID": 3014, "difficulty": 5, "startTime": 0, "endTime": 300_000, "kill": true },
            { "id": 4, "encounterID": 3014, "difficulty": 5, "startTime": 310_000, "endTime": 400_000, "kill": null }
        ]
    }))]);
    let source = WclDataSource::new(&transport);

    let report = source.report("aBcD", 3014, 5).unwrap();
    assert_eq!(report.start_time_ms, 1_704_067_200_000);
    assert_eq!(report.fights.len(), 2);
    assert!(report.fights[0].kill);
    assert!(!report.fights[1].kill);

    let requests = transport.requests.borrow();
    assert_eq!(requests[0].1["code"], "aBcD");
    assert_eq!(requests[0].1["encounterId"], 3014);
}

#[test]
fn test_fight_ending_before_start_is_malformed() {
    let transport = CannedTransport::new(vec![report_envelope(json!({
        "startTime": 0,
        "fights": [{ "id": 1, "encounterID": 3014, "difficulty": 5, "startTime": 500, "endTime": 100 }]
    }))]);
    let err = WclDataSource::new(&transport)
        .report("x", 3014, 5)
        .unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse(_)));

    // Malformed data is a data-shape problem for the engine
    assert!(matches!(AppError::from(err), AppError::DataShape(_)));
}

#[test]
fn test_missing_report_is_malformed() {
    let transport = CannedTransport::new(vec![report_envelope(json!(null))]);
    let err = WclDataSource::new(&transport)
        .report("gone", 3014, 5)
        .unwrap_err();
    assert!(err.to_string().contains("report gone not found"));
}

#[test]
fn test_transport_errors_pass_through() {
    let transport = CannedTransport::new(Vec::new());
    transport.push_error(ApiError::RateLimited {
        retry_after: Some(30),
    });
    let err = WclDataSource::new(&transport)
        .report("x", 3014, 5)
        .unwrap_err();
    assert!(matches!(err, ApiError::RateLimited { retry_after: Some(30) }));
}

#[test]
fn test_participants_take_role_from_group() {
    let transport = CannedTransport::new(vec![report_envelope(json!({
        "playerDetails": { "data": { "playerDetails": {
            "tanks": [{ "id": 1, "name": "Cid", "type": "Warrior", "specs": [{ "spec": "Protection" }] }],
            "healers": [{ "id": 2, "name": "Bob", "type": "Priest" }],
            "dps": [{ "id": 3, "name": "Amy", "type": "Rogue", "specs": [] }]
        }}}
    }))]);
    let players = WclDataSource::new(&transport)
        .participants("x", &fight())
        .unwrap();

    let summary: Vec<_> = players
        .iter()
        .map(|p| (p.name.as_str(), p.role, p.class.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Cid", Role::Tank, "Warrior"),
            ("Bob", Role::Healer, "Priest"),
            ("Amy", Role::Dps, "Rogue"),
        ]
    );
    assert_eq!(players[0].spec.as_deref(), Some("Protection"));
    assert_eq!(transport.requests.borrow()[0].1["fightIds"], json!([7]));
}

#[test]
fn test_events_follow_pagination() {
    let page = |events: serde_json::Value, next: serde_json::Value| {
        report_envelope(json!({ "events": { "data": events, "nextPageTimestamp": next } }))
    };
    let transport = CannedTransport::new(vec![
        page(
            json!([{ "timestamp": 2_000, "type": "interrupt", "sourceID": 3, "abilityGameID": 460582 }]),
            json!(150_000),
        ),
        page(
            json!([{ "timestamp": 160_000, "type": "interrupt", "sourceID": 4, "targetID": 99 }]),
            json!(null),
        ),
    ]);
    let events = WclDataSource::new(&transport)
        .events("x", &fight(), &EventQuery::new(EventKind::Interrupts, 460582))
        .unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].source_id, Some(3));
    assert_eq!(events[1].target_id, Some(99));

    let requests = transport.requests.borrow();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].1["startTime"], 1_000.0);
    assert_eq!(requests[1].1["startTime"], 150_000.0);
    assert_eq!(requests[1].1["dataType"], "Interrupts");
}

#[test]
fn test_debuff_table_is_parsed() {
    let transport = CannedTransport::new(vec![report_envelope(json!({
        "table": { "data": {
            "totalTime": 300_000,
            "auras": [{ "name": "Amy", "totalUptime": 150_000, "totalUses": 4 }]
        }}
    }))]);
    let query = TableQuery {
        ability_id: Some(460444),
        wipe_cutoff: Some(4),
        ..TableQuery::new(TableKind::Debuffs)
    };
    let table = WclDataSource::new(&transport)
        .table("x", &fight(), &query)
        .unwrap();

    match table {
        TableData::Auras {
            total_time_ms,
            auras,
        } => {
            assert_eq!(total_time_ms, 300_000.0);
            assert_eq!(auras[0].total_uses, 4);
        }
        other => panic!("unexpected table {:?}", other),
    }
    let requests = transport.requests.borrow();
    assert_eq!(requests[0].1["abilityId"], 460444);
    assert_eq!(requests[0].1["wipeCutoff"], 4);
}

#[test]
fn test_deaths_count_and_killing_blows() {
    let deaths = report_envelope(json!({
        "table": { "data": { "entries": [
            { "name": "Amy", "killingBlow": { "guid": 1216415 } },
            { "name": "Bob" }
        ]}}
    }));
    let transport = CannedTransport::new(vec![deaths.clone(), deaths]);
    let source = WclDataSource::new(&transport);

    assert_eq!(source.death_count("x", &fight()).unwrap(), 2);
    match source
        .table("x", &fight(), &TableQuery::new(TableKind::Deaths))
        .unwrap()
    {
        TableData::Deaths(entries) => {
            assert_eq!(entries[0].killing_ability_id, Some(1216415));
            assert_eq!(entries[1].killing_ability_id, None);
        }
        other => panic!("unexpected table {:?}", other),
    }
}

#[test]
fn test_ill_typed_damage_table_is_malformed() {
    let transport = CannedTransport::new(vec![report_envelope(json!({
        "table": { "data": { "entries": [{ "name": "Amy", "total": "lots" }] } }
    }))]);
    let err = WclDataSource::new(&transport)
        .table("x", &fight(), &TableQuery::new(TableKind::DamageTaken))
        .unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse(_)));
}

#[test]
fn test_actors_are_parsed() {
    let transport = CannedTransport::new(vec![report_envelope(json!({
        "masterData": { "actors": [
            { "id": 40, "name": "Reel Assistant", "gameID": 228463, "type": "NPC", "subType": "NPC" }
        ]}
    }))]);
    let actors = WclDataSource::new(&transport).actors("x").unwrap();
    assert_eq!(actors[0].game_id, 228463);
    assert_eq!(actors[0].kind, "NPC");
}
