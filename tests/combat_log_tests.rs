//! Tests for the combat log produced by full runs
//!
//! These tests verify that:
//! - Every line follows the `[time] TYPE message` layout
//! - Timestamps never go backwards
//! - Saved logs match the in-memory entries
//! - Simulation speed scales log time

use regex::Regex;

use skirmish::combat::SimulationSpeed;
use skirmish::headless::{run_headless_scenario, run_scenario, ScenarioConfig};
use skirmish::sim::hero::HeroConfig;
use skirmish::sim::navigation::OpenGround;
use skirmish::sim::spawner::{SpawnEntry, SpawnerConfig};
use skirmish::{CombatLog, CombatLogEventType, SimSettings, Simulation};

fn skirmish_config() -> ScenarioConfig {
    ScenarioConfig {
        name: "Log test".to_string(),
        random_seed: Some(2024),
        max_duration_secs: 30.0,
        hero: HeroConfig {
            name: "Hero".to_string(),
            position: [0.0, 0.0, 12.0],
            max_health: 800.0,
            defense: 0.1,
            attack_power: 40.0,
            attack_range: 2.5,
            attack_cooldown: 1.0,
            power_strike_cooldown: 5.0,
            move_speed: 5.0,
            route: vec![],
            loop_route: false,
        },
        arena: OpenGround::default(),
        spawners: vec![SpawnerConfig {
            name: "Camp".to_string(),
            origin: [0.0, 0.0, 20.0],
            spawn_radius: 2.0,
            activation_distance: 30.0,
            entries: vec![SpawnEntry {
                template: "Goblin".to_string(),
                count: 2,
            }],
            elite_chance: 1.0,
            special_pool: vec!["Fireball".to_string()],
        }],
        save_file: None,
        output_path: None,
    }
}

fn line_pattern() -> Regex {
    Regex::new(r"^\[\s*\d+\.\d{2}\] [A-Z]+ +\S.*$").unwrap()
}

// =============================================================================
// Format Tests
// =============================================================================

#[test]
fn test_every_line_matches_layout() {
    let result = run_scenario(&skirmish_config(), SimSettings::default()).unwrap();
    let pattern = line_pattern();

    assert!(!result.log_lines.is_empty());
    for line in &result.log_lines {
        assert!(pattern.is_match(line), "Malformed log line: {}", line);
    }
}

#[test]
fn test_run_logs_activation_and_combat() {
    let result = run_scenario(&skirmish_config(), SimSettings::default()).unwrap();

    let spawn = Regex::new(r"SPAWN +Camp activates \(2 enemies\)").unwrap();
    assert!(result.log_lines.iter().any(|line| spawn.is_match(line)));

    let damage = Regex::new(r"DAMAGE +.+ hits .+ for \d+ damage").unwrap();
    assert!(result.log_lines.iter().any(|line| damage.is_match(line)));

    assert!(result.log_lines.iter().any(|line| line.contains("Elite Goblin")));
}

#[test]
fn test_timestamps_are_monotonic() {
    let mut sim = Simulation::new(&skirmish_config()).unwrap();
    for _ in 0..600 {
        sim.tick(1.0 / 60.0);
    }

    let entries = &sim.combat_log().entries;
    assert!(entries.len() > 1);
    for pair in entries.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

// =============================================================================
// Output Tests
// =============================================================================

#[test]
fn test_saved_log_matches_entries() {
    let path = std::env::temp_dir().join(format!("skirmish_log_{}.txt", std::process::id()));
    let result = run_headless_scenario(
        skirmish_config(),
        SimSettings::default(),
        Some(path.as_path()),
        None,
    )
    .unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), result.log_lines.len());
    assert_eq!(lines.first().copied(), result.log_lines.first().map(String::as_str));

    let _ = std::fs::remove_file(path);
}

#[test]
fn test_first_entry_announces_scenario() {
    let sim = Simulation::new(&skirmish_config()).unwrap();
    let log = sim.combat_log();

    assert_eq!(log.count(CombatLogEventType::SimEvent), 1);
    let line = CombatLog::format_entry(&log.entries[0]);
    assert_eq!(line, "[    0.00] SIM     Scenario 'Log test' started with 1 spawner(s)");
}

// =============================================================================
// Simulation Speed Tests
// =============================================================================

#[test]
fn test_paused_simulation_does_not_advance() {
    let mut sim = Simulation::new(&skirmish_config()).unwrap();
    sim.world_mut().resource_mut::<SimulationSpeed>().pause();
    for _ in 0..60 {
        sim.tick(1.0 / 60.0);
    }

    assert_eq!(sim.elapsed(), 0.0);
    assert_eq!(sim.combat_log().sim_time, 0.0);
    assert!(sim.group_snapshots().iter().all(|g| !g.active));
}

#[test]
fn test_double_speed_scales_time() {
    let mut sim = Simulation::new(&skirmish_config()).unwrap();
    sim.world_mut().resource_mut::<SimulationSpeed>().double_speed();
    for _ in 0..10 {
        sim.tick(0.05);
    }

    assert!((sim.elapsed() - 1.0).abs() < 1e-3);
}
