//! Headless scenario execution
//!
//! Runs a scenario at a fixed tick rate until it resolves, then reports
//! the outcome and optionally writes the combat log and save file.

use bevy::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::progression::SaveData;
use crate::settings::SimSettings;
use crate::sim::enemy::EnemyState;
use crate::sim::{EnemySnapshot, ScenarioOutcome, Simulation, SimulationData};

use super::config::ScenarioConfig;

/// Result of a completed headless run
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub outcome: ScenarioOutcome,
    /// Simulated seconds until the outcome
    pub duration: f32,
    pub hero_health: f32,
    pub hero_damage_taken: f32,
    pub enemies_spawned: usize,
    pub enemies_killed: usize,
    pub elites_spawned: usize,
    pub groups_activated: usize,
    /// Casts only; delivered hits are logged as damage
    pub special_attacks_cast: usize,
    pub level: u32,
    pub experience: u32,
    pub currency: u32,
    pub random_seed: Option<u64>,
    /// Progression at the end of the run
    pub save_data: SaveData,
    /// Formatted combat log lines
    pub log_lines: Vec<String>,
}

impl ScenarioResult {
    pub fn summary(&self) -> String {
        format!(
            "{} after {:.1}s: {}/{} enemies killed ({} elite), hero at {:.0} health, level {} ({} xp, {} currency)",
            self.outcome.name(),
            self.duration,
            self.enemies_killed,
            self.enemies_spawned,
            self.elites_spawned,
            self.hero_health,
            self.level,
            self.experience,
            self.currency
        )
    }
}

/// Run a scenario to completion
pub fn run_scenario(config: &ScenarioConfig, settings: SimSettings) -> Result<ScenarioResult, String> {
    simulate(config, settings).map(|(_, result)| result)
}

fn simulate(
    config: &ScenarioConfig,
    settings: SimSettings,
) -> Result<(Simulation, ScenarioResult), String> {
    let data = SimulationData::from_settings(&settings)?;
    let dt = settings.tick_delta();
    let mut sim = Simulation::with_data(config, data, settings)?;

    // Corpses are despawned, so remember every enemy seen
    let mut seen: BTreeMap<Entity, EnemySnapshot> = BTreeMap::new();
    let mut record = |sim: &mut Simulation| {
        for snapshot in sim.enemy_snapshots() {
            seen.insert(snapshot.entity, snapshot);
        }
    };
    record(&mut sim);

    let outcome = loop {
        sim.tick(dt);
        record(&mut sim);
        if let Some(outcome) = sim.outcome() {
            break outcome;
        }
        if sim.elapsed() >= config.max_duration_secs {
            info!("Scenario timed out after {:.1}s", sim.elapsed());
            break ScenarioOutcome::TimedOut;
        }
    };

    let (hero_health, hero_damage_taken) = sim
        .hero()
        .map(|hero| (hero.current_health.max(0.0), hero.damage_taken))
        .unwrap_or((0.0, 0.0));
    let groups_activated = sim.group_snapshots().iter().filter(|g| g.active).count();

    let log = sim.combat_log();
    let progression = sim.progression();
    let result = ScenarioResult {
        outcome,
        duration: sim.elapsed(),
        hero_health,
        hero_damage_taken,
        enemies_spawned: seen.len(),
        enemies_killed: seen.values().filter(|s| s.state == EnemyState::Dead).count(),
        elites_spawned: seen.values().filter(|s| s.is_elite).count(),
        groups_activated,
        special_attacks_cast: log.count(CombatLogEventType::SpecialAttack),
        level: progression.level,
        experience: progression.experience,
        currency: progression.currency,
        random_seed: config.random_seed,
        save_data: sim.save_data(),
        log_lines: log.entries.iter().map(CombatLog::format_entry).collect(),
    };
    info!("{}", result.summary());
    Ok((sim, result))
}

/// Run a scenario, print a summary and write the requested outputs
pub fn run_headless_scenario(
    config: ScenarioConfig,
    settings: SimSettings,
    output_path: Option<&Path>,
    save_path: Option<&Path>,
) -> Result<ScenarioResult, String> {
    println!("Starting headless scenario '{}'...", config.name);
    println!("  Spawners: {}", config.spawners.len());
    println!("  Max duration: {:.0}s", config.max_duration_secs);
    if let Some(seed) = config.random_seed {
        println!("  Seed: {}", seed);
    }

    let (sim, result) = simulate(&config, settings)?;
    println!("{}", result.summary());

    let output = output_path
        .map(Path::to_path_buf)
        .or_else(|| config.output_path.as_ref().map(Into::into));
    if let Some(path) = output {
        let written = sim.combat_log().save_to_file(&path)?;
        println!("Combat log saved to: {}", written);
    }

    if let Some(path) = save_path {
        result.save_data.save_to_file(path)?;
    }

    Ok(result)
}
