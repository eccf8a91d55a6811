use std::collections::BTreeMap;
use std::sync::RwLock;

use serde_json::json;

use super::common::{sample_candidate, FixedStrategy};
use crate::config::{EngineConfig, StrategyConfig};
use crate::strategy::{ManagerError, StrategyManager};

fn two_entry_config() -> EngineConfig {
    let mut strategy_configs = BTreeMap::new();
    strategy_configs.insert(
        "aggressive".to_string(),
        StrategyConfig::new("ratio", json!({ "min_seeders": 1 })),
    );
    strategy_configs.insert(
        "balanced".to_string(),
        StrategyConfig::new(
            "composite",
            json!({
                "combination_type": "and",
                "children": [{ "kind": "size" }, { "kind": "ratio" }]
            }),
        ),
    );
    EngineConfig {
        strategy_configs,
        default_strategy: "balanced".to_string(),
    }
}

#[test]
fn load_activates_the_configured_default() {
    let manager = StrategyManager::new(two_entry_config());

    assert_eq!(manager.active(), Some("balanced"));
    assert_eq!(
        manager.available_strategies(),
        vec!["aggressive", "balanced"]
    );
}

#[test]
fn missing_default_falls_back_to_a_loaded_entry() {
    let mut config = two_entry_config();
    config.default_strategy = "nonexistent".to_string();

    let manager = StrategyManager::new(config);
    assert_eq!(manager.active(), Some("aggressive"));
}

#[test]
fn broken_entries_are_skipped_and_the_rest_load() {
    let mut config = two_entry_config();
    config.strategy_configs.insert(
        "broken".to_string(),
        StrategyConfig::new("size", json!({ "min_size": "huge" })),
    );

    let manager = StrategyManager::new(config);
    assert_eq!(
        manager.available_strategies(),
        vec!["aggressive", "balanced"]
    );
}

#[test]
fn empty_registry_installs_the_builtin_default_set() {
    let manager = StrategyManager::new(EngineConfig::default());

    assert_eq!(manager.active(), Some("default"));
    let info = manager.strategy_info("default").expect("fallback exists");
    assert_eq!(info.kind, "composite");
    assert!(info.valid);

    // The fallback is usable immediately.
    assert!(manager.evaluate(&sample_candidate()).accepted);
}

#[test]
fn fully_invalid_config_still_yields_the_fallback() {
    let mut strategy_configs = BTreeMap::new();
    strategy_configs.insert(
        "bad".to_string(),
        StrategyConfig::new("mystery", json!({})),
    );
    let manager = StrategyManager::new(EngineConfig {
        strategy_configs,
        default_strategy: "bad".to_string(),
    });

    assert_eq!(manager.active(), Some("default"));
}

#[test]
fn evaluate_delegates_to_the_active_strategy() {
    let manager = StrategyManager::new(two_entry_config());
    let item = sample_candidate();

    let verdict = manager.evaluate(&item);
    assert!(verdict.accepted, "unexpected reject: {}", verdict.reason);
    let priority = manager.priority(&item);
    assert!((0.0..=1.0).contains(&priority));
}

#[test]
fn activate_switches_and_rejects_unknown_names() {
    let mut manager = StrategyManager::new(two_entry_config());

    manager.activate("aggressive").expect("known name");
    assert_eq!(manager.active(), Some("aggressive"));

    let error = manager.activate("nonexistent").unwrap_err();
    assert_eq!(
        error,
        ManagerError::UnknownStrategy("nonexistent".to_string())
    );
    // Failed activation leaves the previous choice in place.
    assert_eq!(manager.active(), Some("aggressive"));
}

#[test]
fn removing_the_active_entry_falls_over_to_a_survivor() {
    let mut manager = StrategyManager::new(two_entry_config());
    assert_eq!(manager.active(), Some("balanced"));

    manager.remove("balanced").expect("entry exists");
    assert_eq!(manager.active(), Some("aggressive"));

    manager.remove("aggressive").expect("entry exists");
    assert_eq!(manager.active(), None);
}

#[test]
fn with_nothing_active_evaluation_fails_closed() {
    let mut manager = StrategyManager::new(two_entry_config());
    manager.remove("balanced").expect("entry exists");
    manager.remove("aggressive").expect("entry exists");

    let item = sample_candidate();
    let verdict = manager.evaluate(&item);
    assert!(!verdict.accepted);
    assert!(verdict.reason.contains("no active strategy"));
    assert_eq!(manager.priority(&item), 0.0);
}

#[test]
fn removing_an_unknown_entry_is_an_error() {
    let mut manager = StrategyManager::new(two_entry_config());
    assert_eq!(
        manager.remove("nonexistent"),
        Err(ManagerError::UnknownStrategy("nonexistent".to_string()))
    );
}

#[test]
fn reload_restores_the_configured_registry() {
    let mut manager = StrategyManager::new(two_entry_config());
    manager.remove("balanced").expect("entry exists");
    manager.insert("handmade", FixedStrategy::boxed(true, 1.0));

    manager.reload();

    assert_eq!(
        manager.available_strategies(),
        vec!["aggressive", "balanced"]
    );
    assert_eq!(manager.active(), Some("balanced"));
    assert!(manager.get("handmade").is_none());
}

#[test]
fn load_replaces_the_stored_configuration() {
    let mut manager = StrategyManager::new(two_entry_config());

    let mut strategy_configs = BTreeMap::new();
    strategy_configs.insert(
        "lean".to_string(),
        StrategyConfig::new("time", json!({})),
    );
    manager.load(EngineConfig {
        strategy_configs,
        default_strategy: "lean".to_string(),
    });

    assert_eq!(manager.available_strategies(), vec!["lean"]);
    assert_eq!(manager.active(), Some("lean"));

    // Subsequent reloads use the new document.
    manager.reload();
    assert_eq!(manager.active(), Some("lean"));
}

#[test]
fn insert_overwrites_and_activates_when_nothing_is() {
    let mut manager = StrategyManager::new(two_entry_config());
    manager.remove("balanced").expect("entry exists");
    manager.remove("aggressive").expect("entry exists");
    assert_eq!(manager.active(), None);

    manager.insert("handmade", FixedStrategy::boxed(false, 0.1));
    assert_eq!(manager.active(), Some("handmade"));
    assert!(!manager.evaluate(&sample_candidate()).accepted);

    manager.insert("handmade", FixedStrategy::boxed(true, 0.9));
    assert!(manager.evaluate(&sample_candidate()).accepted);
}

#[test]
fn strategy_info_reports_kind_and_validity() {
    let manager = StrategyManager::new(two_entry_config());

    let info = manager.strategy_info("balanced").expect("entry exists");
    assert_eq!(info.name, "balanced");
    assert_eq!(info.kind, "composite");
    assert!(info.valid);

    assert_eq!(
        manager.strategy_info("nonexistent"),
        Err(ManagerError::UnknownStrategy("nonexistent".to_string()))
    );
}

#[test]
fn concurrent_readers_never_observe_a_partial_reload() {
    let manager = RwLock::new(StrategyManager::new(two_entry_config()));
    let item = sample_candidate();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..200 {
                    let guard = manager.read().expect("reader lock");
                    let verdict = guard.evaluate(&item);
                    // The registry always carries an active entry, so the
                    // fail-closed reason must never appear mid-reload.
                    assert!(!verdict.reason.contains("no active strategy"));
                    let priority = guard.priority(&item);
                    assert!((0.0..=1.0).contains(&priority));
                }
            });
        }

        scope.spawn(|| {
            for _ in 0..50 {
                manager.write().expect("writer lock").reload();
            }
        });
    });

    let guard = manager.read().expect("reader lock");
    assert_eq!(guard.active(), Some("balanced"));
}
