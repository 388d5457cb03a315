//! Scenario and tag loading integration tests

use guard_watch::core::config::SimulationConfig;
use guard_watch::core::error::GuardError;
use guard_watch::core::types::{Direction, GuardId, Scope, TilePos};
use guard_watch::guard::collaborators::{EffectLog, WorldQuery};
use guard_watch::guard::config::{PatrolSpec, ScanPattern, TriggerMode};
use guard_watch::loader::scenario::{load_named_scenario, Scenario};
use guard_watch::loader::tags::parse_guard_tags;
use guard_watch::simulation::tick::run_guard_tick;

#[test]
fn test_town_square_loads() {
    let scenario = load_named_scenario("town_square").expect("bundled scenario");
    assert_eq!(scenario.name, "town_square");
    assert_eq!(scenario.simulation.safe_regions, vec![1]);

    let world = scenario.build_world().expect("world builds");
    assert_eq!(world.guards.len(), 2);
    assert_eq!(world.map.wanted_level("TownWatch", Scope::Faction), Some(100));
    assert_eq!(world.map.region_id(TilePos::new(7, 9)), 1);

    let watcher = &world.guards[0];
    assert_eq!(watcher.id, GuardId(1));
    assert_eq!(watcher.facing, Direction::Down);
    assert_eq!(watcher.config.auto_detain.wanted_threshold, 1000);
    assert_eq!(watcher.config.idle.map(|i| i.pattern), Some(ScanPattern::Cross));
    assert!(!watcher.state.patrol_active);

    let patroller = &world.guards[1];
    assert_eq!(patroller.config.vision.range, 5.0);
    assert_eq!(patroller.config.alert.trigger_mode, TriggerMode::Hard);
    assert!(patroller.state.active);
    assert!(matches!(
        &patroller.config.patrol,
        PatrolSpec::Fixed { points, looping: true, wait: 60 } if points.len() == 4
    ));
}

#[test]
fn test_town_square_runs_deterministically() {
    let run = || {
        let scenario = load_named_scenario("town_square").expect("bundled scenario");
        let mut world = scenario.build_world().expect("world builds");
        let mut script = scenario.target_script();
        let mut log = EffectLog::new();
        let mut events = Vec::new();
        for _ in 0..1200 {
            script.advance(&mut world.map, world.current_tick);
            events.extend(run_guard_tick(&mut world, &scenario.simulation, &mut log));
        }
        let positions: Vec<_> = world.guards.iter().map(|g| g.position).collect();
        (events, positions, log.effects)
    };

    let first = run();
    assert_eq!(first.1.len(), 2);
    assert_eq!(run(), first);
}

#[test]
fn test_tag_guard_matches_inline_guard() {
    let tags = "<guard: TownWatch range:6 fov:80 soft:120 warn:25 detain:75 open:on>";
    let from_tags = parse_guard_tags(tags, 60).unwrap().unwrap();

    let toml = r#"
[map]
rows = ["....."]

[[guards]]
x = 0
y = 0
[guards.config]
authority = "TownWatch"
"#;
    let scenario = Scenario::from_toml_str(toml).unwrap();
    let world = scenario.build_world().unwrap();
    let inline = &world.guards[0].config;

    assert_eq!(from_tags.authority, inline.authority);
    assert_eq!(from_tags.vision.range, inline.vision.range);
    assert_eq!(from_tags.vision.hard_fov, inline.vision.hard_fov);
    assert_eq!(from_tags.vision.soft_fov, inline.vision.soft_fov);
    assert_eq!(from_tags.alert.warn_threshold, inline.alert.warn_threshold);
    assert_eq!(from_tags.alert.detain_threshold, inline.alert.detain_threshold);
    assert!(from_tags.active && inline.active);
}

#[test]
fn test_invalid_simulation_rejected() {
    let toml = r#"
[map]
rows = ["..."]

[simulation]
scan_interval = 0
"#;
    assert!(matches!(
        Scenario::from_toml_str(toml),
        Err(GuardError::InvalidConfig(_))
    ));
}

#[test]
fn test_bad_toml_surfaces_decode_error() {
    assert!(matches!(
        Scenario::from_toml_str("[map\nrows = 3"),
        Err(GuardError::TomlError(_))
    ));
}

#[test]
fn test_invalid_guard_spawns_inactive() {
    let toml = r#"
[map]
rows = ["....."]

[[guards]]
x = 1
y = 0
[guards.config]
authority = "TownWatch"
[guards.config.patrol]
mode = "fixed"
points = []
"#;
    let scenario = Scenario::from_toml_str(toml).unwrap();
    let mut world = scenario.build_world().unwrap();
    assert!(!world.guards[0].state.active);

    let mut log = EffectLog::new();
    for _ in 0..30 {
        run_guard_tick(&mut world, &SimulationConfig::default(), &mut log);
    }
    assert_eq!(world.guards[0].position, TilePos::new(1, 0));
    assert!(log.effects.is_empty());
}

#[test]
fn test_bad_tag_guard_does_not_block_others() {
    let toml = r#"
[map]
rows = [".......", "......."]

[target]
x = 6
y = 1

[[guards]]
x = 0
y = 0
tags = "<guard: TownGuards open:on>"

[[guards]]
x = 2
y = 0
tags = "<guard: Harbor range:far open:on>"

[[guards]]
x = 4
y = 0
tags = "<patrol: 4,0 | 6,0>"

[[guards]]
x = 6
y = 0
tags = "<guard: range:5 open:on>"
"#;
    let scenario = Scenario::from_toml_str(toml).unwrap();
    let mut world = scenario.build_world().expect("bad guards do not fail the scenario");
    assert_eq!(world.guards.len(), 4);
    assert_eq!(world.guards[0].id, GuardId(1));
    assert_eq!(world.guards[3].id, GuardId(4));
    assert!(world.guards[0].state.active);
    assert_eq!(world.guards[0].config.authority, "TownGuards");
    for guard in &world.guards[1..] {
        assert!(!guard.state.active, "{} should be inactive", guard.id);
        assert!(!guard.state.patrol_active);
    }

    let mut log = EffectLog::new();
    for _ in 0..120 {
        run_guard_tick(&mut world, &SimulationConfig::default(), &mut log);
    }
    assert_eq!(world.guards[1].position, TilePos::new(2, 0));
    assert_eq!(world.guards[2].position, TilePos::new(4, 0));
    assert_eq!(world.guards[3].position, TilePos::new(6, 0));
    assert!(world.guards[1..].iter().all(|g| g.state.suspicion == 0.0));
}
