use crate::common::report_envelope;
use guild_log_analysis::analysis::ReportSource;
use guild_log_analysis::api::queries::MASTER_DATA_ACTORS;
use guild_log_analysis::api::{ResponseCache, WarcraftLogsClient, WclDataSource};
use guild_log_analysis::config::{ApiConfig, CacheConfig};
use serde_json::json;

fn offline_api() -> ApiConfig {
    ApiConfig {
        access_token: Some("test-token".to_string()),
        url: "http://127.0.0.1:9/api/v2/client".to_string(),
        max_retries: 1,
        timeout_seconds: 1,
        ..ApiConfig::default()
    }
}

#[test]
fn test_disabled_cache_stays_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    let config = CacheConfig {
        enabled: false,
        directory: dir.path().to_path_buf(),
        ..CacheConfig::default()
    };
    let mut cache = ResponseCache::from_config(&config);
    cache.insert("query A { a }", &json!({}), json!({"data": 1}));

    assert!(cache.path().is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_cached_responses_serve_the_data_source_offline() {
    let dir = tempfile::tempdir().unwrap();
    let variables = json!({ "code": "aBcD" });
    {
        let mut cache = ResponseCache::open(dir.path(), 1024 * 1024, 2);
        cache.insert(
            MASTER_DATA_ACTORS,
            &variables,
            report_envelope(json!({
                "masterData": { "actors": [
                    { "id": 40, "name": "Boss", "gameID": 228458, "type": "NPC" }
                ]}
            })),
        );
    }

    let cache = ResponseCache::open(dir.path(), 1024 * 1024, 2);
    assert_eq!(cache.len(), 1);
    let client = WarcraftLogsClient::new(offline_api(), cache).unwrap();
    let source = WclDataSource::new(client);

    let actors = source.actors("aBcD").unwrap();
    assert_eq!(actors[0].name, "Boss");
    let stats = source.transport().cache_stats();
    assert_eq!((stats.hits, stats.misses), (1, 0));
    assert_eq!(stats.hit_rate(), 100.0);
}
