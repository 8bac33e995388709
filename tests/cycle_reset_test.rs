//! Data Cycle Reset Tests
//!
//! The lazy daily reset riding on request traffic, with both store implementations.

mod guard_test_utils;
use guard_test_utils::GuardTestUtils;

use chrono::{FixedOffset, TimeZone, Utc};
use shieldgate::engine::DryRunEngine;
use shieldgate::security::{CycleResetGate, CYCLE_LENGTH_SECS};
use shieldgate::{FileSettingsStore, GuardOutcome, GuardSettings, MemorySettingsStore, SettingsStore};
use tempfile::tempdir;

fn cycling_settings() -> GuardSettings {
    let mut settings = GuardSettings::default();
    settings.daemon.reset_data_cycle = true;
    settings
}

#[test]
fn test_first_request_anchors_cycle() {
    let store = MemorySettingsStore::new(cycling_settings());
    let now = GuardTestUtils::at(2024, 3, 1, 9, 30, 0);

    let run = GuardTestUtils::evaluate(&store, GuardTestUtils::request("/"), now);

    assert!(!run.called("rebuild"));
    assert_eq!(
        store.last_reset_epoch().unwrap(),
        Some(GuardTestUtils::at(2024, 3, 1, 0, 0, 0).timestamp())
    );
}

#[test]
fn test_reset_boundary_through_pipeline() {
    let t = GuardTestUtils::at(2024, 3, 1, 0, 0, 0).timestamp();

    let store = MemorySettingsStore::new(cycling_settings()).with_last_reset_epoch(t);
    let run = GuardTestUtils::evaluate(
        &store,
        GuardTestUtils::request("/"),
        GuardTestUtils::epoch(t + CYCLE_LENGTH_SECS - 1),
    );
    assert!(!run.called("rebuild"));
    assert_eq!(store.last_reset_epoch().unwrap(), Some(t));

    let run = GuardTestUtils::evaluate(
        &store,
        GuardTestUtils::request("/"),
        GuardTestUtils::epoch(t + CYCLE_LENGTH_SECS + 1),
    );
    assert_eq!(run.engine.calls_named("rebuild").len(), 1);
    assert_eq!(run.operations()[0], "rebuild");
    assert_eq!(store.last_reset_epoch().unwrap(), Some(t + CYCLE_LENGTH_SECS));
}

#[test]
fn test_excluded_traffic_still_drives_the_reset() {
    let t = GuardTestUtils::at(2024, 3, 1, 0, 0, 0).timestamp();
    let store = MemorySettingsStore::new(cycling_settings()).with_last_reset_epoch(t);

    let run = GuardTestUtils::evaluate(
        &store,
        GuardTestUtils::request("/wp-json/wp/v2/posts"),
        GuardTestUtils::at(2024, 3, 5, 8, 0, 0),
    );

    assert_eq!(run.outcome, GuardOutcome::Excluded);
    assert_eq!(run.operations(), vec!["rebuild"]);
    assert_eq!(
        store.last_reset_epoch().unwrap(),
        Some(GuardTestUtils::at(2024, 3, 5, 0, 0, 0).timestamp())
    );
}

#[test]
fn test_repeated_reset_is_harmless() {
    // two racing requests both saw the old marker and both reset
    let t = GuardTestUtils::at(2024, 3, 1, 0, 0, 0).timestamp();
    let now = GuardTestUtils::epoch(t + CYCLE_LENGTH_SECS + 5);
    let gate = CycleResetGate::from_settings(&cycling_settings());
    let store = MemorySettingsStore::new(cycling_settings());
    let mut engine = DryRunEngine::new();

    let first = gate.evaluate(Some(t), now);
    let second = gate.evaluate(Some(t), now);
    assert_eq!(first, second);

    for decision in [first, second] {
        if let Some(epoch) = decision.persist {
            store.set_last_reset_epoch(epoch).unwrap();
        }
        if decision.reset {
            shieldgate::FirewallEngine::rebuild(&mut engine).unwrap();
        }
    }

    assert_eq!(engine.calls_named("rebuild").len(), 2);
    assert_eq!(store.last_reset_epoch().unwrap(), Some(t + CYCLE_LENGTH_SECS));
}

#[test]
fn test_marker_persisted_before_wipe_failure() {
    let t = GuardTestUtils::at(2024, 3, 1, 0, 0, 0).timestamp();
    let store = MemorySettingsStore::new(cycling_settings()).with_last_reset_epoch(t);
    let mut engine = DryRunEngine::new().failing_on("rebuild");

    let result = CycleResetGate::from_settings(&cycling_settings()).run(
        &store,
        &mut engine,
        GuardTestUtils::at(2024, 3, 3, 10, 0, 0),
    );

    assert!(result.is_err());
    assert_eq!(
        store.last_reset_epoch().unwrap(),
        Some(GuardTestUtils::at(2024, 3, 3, 0, 0, 0).timestamp())
    );
}

#[test]
fn test_site_offset_moves_the_day_boundary() {
    let mut settings = cycling_settings();
    settings.site.utc_offset_minutes = 9 * 60;
    let store = MemorySettingsStore::new(settings);

    // 20:00 UTC on 1 March is 05:00 on 2 March at UTC+9
    GuardTestUtils::evaluate(&store, GuardTestUtils::request("/"), GuardTestUtils::at(2024, 3, 1, 20, 0, 0));

    let offset = FixedOffset::east_opt(9 * 3600).unwrap();
    let local_midnight = offset.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
    assert_eq!(store.last_reset_epoch().unwrap(), Some(local_midnight.timestamp()));
}

#[test]
fn test_file_store_persists_marker() {
    let dir = tempdir().unwrap();
    let settings_path = dir.path().join("shieldgate.yaml");
    let state_path = dir.path().join("state").join("cycle.json");
    std::fs::write(&settings_path, "daemon:\n  reset_data_cycle: true\n").unwrap();

    let store = FileSettingsStore::new(&settings_path, &state_path);
    let t = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap().timestamp();

    let run = GuardTestUtils::evaluate(&store, GuardTestUtils::request("/"), GuardTestUtils::at(2024, 3, 1, 15, 0, 0));
    assert!(!run.called("rebuild"));
    assert_eq!(store.load_state().unwrap().last_reset_epoch, Some(t));

    // a fresh store over the same files sees the marker
    let reopened = FileSettingsStore::new(&settings_path, &state_path);
    let run = GuardTestUtils::evaluate(&reopened, GuardTestUtils::request("/"), GuardTestUtils::at(2024, 3, 2, 0, 0, 2));
    assert!(run.called("rebuild"));
    assert_eq!(
        reopened.last_reset_epoch().unwrap(),
        Some(GuardTestUtils::at(2024, 3, 2, 0, 0, 0).timestamp())
    );
}
