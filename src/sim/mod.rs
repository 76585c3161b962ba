//! Simulation core
//!
//! Enemy groups, their state machines, special attacks and the hero they
//! fight, driven by an explicit `Simulation::tick(dt)` instead of a frame
//! loop. Nothing here needs a window, renderer or physics engine.
//!
//! ## Usage
//!
//! ```ignore
//! let scenario = ScenarioConfig::load_from_file(Path::new("scenarios/demo.json"))?;
//! let mut sim = Simulation::new(&scenario)?;
//! while sim.outcome().is_none() {
//!     sim.tick(1.0 / 60.0);
//! }
//! ```

pub mod components;
pub mod constants;
pub mod damage;
pub mod effects;
pub mod enemy;
pub mod enemy_ai;
pub mod group;
pub mod hero;
pub mod navigation;
pub mod sensor;
pub mod spawner;
pub mod special_attacks;
pub mod status;
pub mod systems;
pub mod templates;
pub mod utils;

use std::time::Duration;

use bevy::ecs::query::Has;
use bevy::prelude::*;

use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::combat::{CombatPlugin, SimulationSpeed};
use crate::headless::config::ScenarioConfig;
use crate::progression::{
    Equipment, Inventory, LevelTable, LootTables, Persistent, Progression, SaveData,
};
use crate::settings::SimSettings;

use components::{Dormant, GameRng};
use damage::Damageable;
use enemy::{Enemy, EnemyState};
use group::EnemyGroup;
use hero::{Hero, HeroRoute};
use navigation::Navigation;
use spawner::{build_spawner, Spawner, SpawnerManager};
use special_attacks::SpecialAttackLibrary;
use templates::EnemyTemplates;

/// Registers the simulation schedule and its shared resources
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(CombatPlugin)
            .init_resource::<Time>()
            .init_resource::<Inventory>()
            .init_resource::<Equipment>()
            .init_resource::<SimSettings>()
            .init_resource::<SpawnerManager>();

        systems::configure_phase_ordering(app);
        systems::add_core_systems(app, simulation_running);
    }
}

/// Systems hold still while the simulation is paused
fn simulation_running(speed: Res<SimulationSpeed>) -> bool {
    !speed.is_paused()
}

/// Read-only data tables a simulation is built from
#[derive(Debug, Clone)]
pub struct SimulationData {
    pub specials: SpecialAttackLibrary,
    pub templates: EnemyTemplates,
    pub loot: LootTables,
    pub levels: LevelTable,
}

impl SimulationData {
    /// The tables shipped with the crate
    pub fn builtin() -> Result<Self, String> {
        Ok(Self {
            specials: SpecialAttackLibrary::builtin()?,
            templates: EnemyTemplates::builtin()?,
            loot: LootTables::builtin()?,
            levels: LevelTable::builtin()?,
        })
    }

    /// Built-in tables, replaced by any file the settings point at
    pub fn from_settings(settings: &SimSettings) -> Result<Self, String> {
        let mut data = Self::builtin()?;
        if let Some(path) = &settings.special_attacks_path {
            data.specials = SpecialAttackLibrary::load_from_file(path)?;
        }
        if let Some(path) = &settings.enemies_path {
            data.templates = EnemyTemplates::load_from_file(path)?;
        }
        if let Some(path) = &settings.loot_path {
            data.loot = LootTables::load_from_file(path)?;
        }
        if let Some(path) = &settings.levels_path {
            data.levels = LevelTable::load_from_file(path)?;
        }
        Ok(data)
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioOutcome {
    HeroDefeated,
    /// Every spawner woke, every enemy died and the route is done
    AreaCleared,
    TimedOut,
}

impl ScenarioOutcome {
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioOutcome::HeroDefeated => "Hero defeated",
            ScenarioOutcome::AreaCleared => "Area cleared",
            ScenarioOutcome::TimedOut => "Timed out",
        }
    }
}

/// Point-in-time view of one enemy
#[derive(Debug, Clone, PartialEq)]
pub struct EnemySnapshot {
    pub entity: Entity,
    pub kind: String,
    pub state: EnemyState,
    pub current_health: f32,
    pub max_health: f32,
    pub position: Vec3,
    pub target: Option<Entity>,
    pub group: Option<Entity>,
    pub is_elite: bool,
    pub special_attack: Option<String>,
    pub dormant: bool,
}

/// Point-in-time view of one group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSnapshot {
    pub entity: Entity,
    pub name: String,
    pub members: Vec<Entity>,
    pub has_aggro: bool,
    pub active: bool,
}

/// Owns a headless `App` and advances it one tick at a time
pub struct Simulation {
    app: App,
    hero: Entity,
}

impl Simulation {
    pub fn new(scenario: &ScenarioConfig) -> Result<Self, String> {
        Self::with_data(scenario, SimulationData::builtin()?, SimSettings::default())
    }

    pub fn with_data(
        scenario: &ScenarioConfig,
        data: SimulationData,
        settings: SimSettings,
    ) -> Result<Self, String> {
        scenario.validate()?;
        settings.validate()?;

        let mut rng = match scenario.random_seed {
            Some(seed) => {
                info!("Using deterministic RNG with seed: {}", seed);
                GameRng::from_seed(seed)
            }
            None => {
                info!("Using non-deterministic RNG (no seed provided)");
                GameRng::from_entropy()
            }
        };

        let mut app = App::new();
        app.add_plugins(SimulationPlugin);

        let mut progression = Progression::new(data.levels.clone());
        let mut equipment = Equipment::default();
        let mut inventory = Inventory::default();
        if let Some(path) = &scenario.save_file {
            let save = SaveData::load_from_file(path)
                .map_err(|e| warn!("{}, starting fresh", e))
                .ok();
            progression.load_from_save_data(save.as_ref());
            equipment.load_from_save_data(save.as_ref());
            inventory.load_from_save_data(save.as_ref());
        }

        let world = app.world_mut();
        let hero = world
            .spawn((
                Hero::from_config(&scenario.hero),
                HeroRoute::new(
                    scenario.hero.route.iter().map(|p| Vec3::from_array(*p)).collect(),
                    scenario.hero.loop_route,
                ),
                Transform::from_translation(Vec3::from_array(scenario.hero.position)),
            ))
            .id();

        {
            let mut commands = world.commands();
            for spawner in &scenario.spawners {
                build_spawner(&mut commands, spawner, &data.templates, &data.specials, &mut rng);
            }
        }
        world.flush();

        world.insert_resource(rng);
        world.insert_resource(Navigation::new(scenario.arena.clone()));
        world.insert_resource(SpawnerManager::new(settings.activation_poll_interval));
        world.insert_resource(progression);
        world.insert_resource(equipment);
        world.insert_resource(inventory);
        world.insert_resource(data.specials);
        world.insert_resource(data.templates);
        world.insert_resource(data.loot);
        world.insert_resource(settings);

        world.resource_mut::<CombatLog>().log(
            CombatLogEventType::SimEvent,
            format!(
                "Scenario '{}' started with {} spawner(s)",
                scenario.name,
                scenario.spawners.len()
            ),
        );

        app.finish();
        app.cleanup();

        Ok(Self { app, hero })
    }

    /// Advance the simulation by `dt` seconds, scaled by `SimulationSpeed`
    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt < 0.0 {
            warn!("Ignoring invalid tick delta {}", dt);
            return;
        }
        let scaled = self.app.world().resource::<SimulationSpeed>().scale(dt);
        self.app
            .world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(scaled));
        self.app.update();
    }

    /// Simulated seconds since the start
    pub fn elapsed(&self) -> f32 {
        self.app.world().resource::<Time>().elapsed_secs()
    }

    pub fn hero_entity(&self) -> Entity {
        self.hero
    }

    pub fn hero(&self) -> Option<&Hero> {
        self.app.world().get::<Hero>(self.hero)
    }

    pub fn hero_position(&self) -> Option<Vec3> {
        self.app
            .world()
            .get::<Transform>(self.hero)
            .map(|transform| transform.translation)
    }

    pub fn enemy_snapshots(&mut self) -> Vec<EnemySnapshot> {
        let world = self.app.world_mut();
        let mut query = world.query::<(Entity, &Enemy, &Transform, Has<Dormant>)>();
        let mut snapshots: Vec<EnemySnapshot> = query
            .iter(world)
            .map(|(entity, enemy, transform, dormant)| EnemySnapshot {
                entity,
                kind: enemy.kind.clone(),
                state: enemy.state(),
                current_health: enemy.current_health(),
                max_health: enemy.stats.max_health,
                position: transform.translation,
                target: enemy.target(),
                group: enemy.group,
                is_elite: enemy.is_elite,
                special_attack: enemy.special_attack.as_ref().map(|s| s.name.clone()),
                dormant,
            })
            .collect();
        snapshots.sort_by_key(|s| s.entity);
        snapshots
    }

    pub fn group_snapshots(&mut self) -> Vec<GroupSnapshot> {
        let world = self.app.world_mut();
        let mut query = world.query::<(Entity, &EnemyGroup)>();
        let mut snapshots: Vec<GroupSnapshot> = query
            .iter(world)
            .map(|(entity, group)| GroupSnapshot {
                entity,
                name: group.name.clone(),
                members: group.members().to_vec(),
                has_aggro: group.has_aggro(),
                active: group.is_active(),
            })
            .collect();
        snapshots.sort_by_key(|s| s.entity);
        snapshots
    }

    /// None while the run is still going. Timeouts are the caller's call.
    pub fn outcome(&mut self) -> Option<ScenarioOutcome> {
        if !self.hero().map(|hero| hero.is_alive()).unwrap_or(false) {
            return Some(ScenarioOutcome::HeroDefeated);
        }

        let world = self.app.world_mut();
        let route_done = world
            .get::<HeroRoute>(self.hero)
            .map(|route| route.looping || route.is_finished())
            .unwrap_or(true);
        let all_active = world
            .query::<&Spawner>()
            .iter(world)
            .all(|spawner| spawner.is_active());
        let all_dead = world
            .query::<&Enemy>()
            .iter(world)
            .all(|enemy| enemy.state() == EnemyState::Dead);

        (route_done && all_active && all_dead).then_some(ScenarioOutcome::AreaCleared)
    }

    pub fn combat_log(&self) -> &CombatLog {
        self.app.world().resource::<CombatLog>()
    }

    pub fn progression(&self) -> &Progression {
        self.app.world().resource::<Progression>()
    }

    /// Snapshot of everything the save file persists
    pub fn save_data(&self) -> SaveData {
        let world = self.app.world();
        SaveData::capture(
            world.resource::<Progression>(),
            world.resource::<Equipment>(),
            world.resource::<Inventory>(),
        )
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
