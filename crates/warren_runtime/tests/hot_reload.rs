//! Hot-reload integration tests driving the real file watcher.

use std::fs;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use warren_runtime::prelude::*;

const FIRST_DOC: &str = "\
corridors:
  generation_distance: 40
  cleanup_distance: 90

rules:
  - name: sprint_surge
    priority: 2
    conditions:
      - type: PlayerSpeed operator: GreaterThan value: 6.5
    actions:
      - action: AdjustLighting target: neon
";

const SECOND_DOC: &str = "\
corridors:
  generation_distance: 60
  cleanup_distance: 120

rules:
  - name: fog_creep
    priority: 3
    conditions:
      - type: DwellTime operator: GreaterThan value: 10
    actions:
      - action: ChangeFogDensity intensity: 0.9
";

/// Tick the system until the predicate holds or the deadline passes.
fn tick_until(
    system: &mut EnvironmentSystem,
    predicate: impl Fn() -> bool,
    timeout: Duration,
) -> bool {
    let deadline = Instant::now() + timeout;
    let mut game_time = 0.0f32;
    while Instant::now() < deadline {
        system.tick(&WorldSnapshot::new(), game_time);
        if predicate() {
            return true;
        }
        game_time += 0.2;
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

#[test]
fn file_change_reloads_configuration_and_rebuilds_triggers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("environment.cfg");
    fs::write(&path, FIRST_DOC).unwrap();

    let mut system = EnvironmentSystem::new();
    system
        .manager_mut()
        .set_reload_settle(Duration::from_millis(50));

    let reloaded = Arc::new(Mutex::new(false));
    let reloaded_clone = reloaded.clone();
    system.subscribe(move |event| {
        if matches!(event, EnvironmentEvent::ConfigurationReloaded(_)) {
            *reloaded_clone.lock().unwrap() = true;
        }
    });

    system.load_configuration(&path);
    assert_eq!(
        system
            .manager()
            .current_configuration()
            .corridors
            .generation_distance,
        40.0
    );

    // The sprint rule from the first document is live
    let sprinting = WorldSnapshot::new().with_speed(8.0);
    let dispatched = system.tick(&sprinting, 0.0);
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].rule_name, "sprint_surge");

    // Coarse-mtime filesystems need the timestamp to visibly advance
    std::thread::sleep(Duration::from_millis(1100));
    fs::write(&path, SECOND_DOC).unwrap();

    let observed = tick_until(
        &mut system,
        || *reloaded.lock().unwrap(),
        Duration::from_secs(10),
    );
    assert!(observed, "reload was never observed");

    let config = system.manager().current_configuration();
    assert_eq!(config.corridors.generation_distance, 60.0);
    assert_eq!(config.rules.len(), 1);
    assert_eq!(config.rules[0].name, "fog_creep");

    // The trigger set was rebuilt from the new rule list
    let lingering = WorldSnapshot::new().with_dwell_time(30.0);
    let dispatched = system.tick(&lingering, 100.0);
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].rule_name, "fog_creep");
}

#[test]
fn broken_rewrite_still_yields_a_valid_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("environment.cfg");
    fs::write(&path, FIRST_DOC).unwrap();

    let mut system = EnvironmentSystem::new();
    system
        .manager_mut()
        .set_reload_settle(Duration::from_millis(50));

    let reloaded = Arc::new(Mutex::new(false));
    let reloaded_clone = reloaded.clone();
    system.subscribe(move |event| {
        if matches!(event, EnvironmentEvent::ConfigurationReloaded(_)) {
            *reloaded_clone.lock().unwrap() = true;
        }
    });

    system.load_configuration(&path);

    std::thread::sleep(Duration::from_millis(1100));
    fs::write(&path, "corridors:\n  generation_distance: -5\n%%% garbage").unwrap();

    let observed = tick_until(
        &mut system,
        || *reloaded.lock().unwrap(),
        Duration::from_secs(10),
    );
    assert!(observed, "reload was never observed");

    // The lenient loader repaired the document; the system keeps running
    // on a valid configuration
    let config = system.manager().current_configuration();
    assert!(config.is_valid());
    assert_eq!(config.corridors.generation_distance, 50.0);
}
