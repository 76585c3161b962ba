//! Spawners
//!
//! A spawner builds its whole group once, up front, and leaves it dormant.
//! The `SpawnerManager` polls the hero's distance on a fixed interval and
//! wakes each group the first time the hero comes within range. Activation
//! is one-way: groups are never rebuilt or put back to sleep.

use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::events::GroupActivated;
use crate::combat::log::{CombatLog, CombatLogEventType};

use super::components::{Dormant, GameRng};
use super::constants::{ACTIVATION_POLL_INTERVAL, DEFAULT_ELITE_CHANCE, ELITE_STAT_MULTIPLIER};
use super::enemy::Enemy;
use super::group::EnemyGroup;
use super::hero::Hero;
use super::navigation::NavAgent;
use super::special_attacks::{SpecialAttackDefinition, SpecialAttackLibrary};
use super::templates::EnemyTemplates;

/// Enemy kind and how many of it to place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub template: String,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnerConfig {
    pub name: String,
    pub origin: [f32; 3],
    pub spawn_radius: f32,
    pub activation_distance: f32,
    pub entries: Vec<SpawnEntry>,
    /// Chance that the single elite candidate turns elite
    #[serde(default = "default_elite_chance")]
    pub elite_chance: f32,
    /// Special attacks an elite may draw; empty means the whole library
    #[serde(default)]
    pub special_pool: Vec<String>,
}

fn default_elite_chance() -> f32 {
    DEFAULT_ELITE_CHANCE
}

impl SpawnerConfig {
    pub fn origin(&self) -> Vec3 {
        Vec3::from_array(self.origin)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.spawn_radius < 0.0 {
            return Err(format!("spawner '{}': spawn_radius must be non-negative", self.name));
        }
        if self.activation_distance < 0.0 {
            return Err(format!(
                "spawner '{}': activation_distance must be non-negative",
                self.name
            ));
        }
        if !(0.0..=1.0).contains(&self.elite_chance) {
            warn!(
                "spawner '{}': elite_chance {} outside [0, 1], clamping",
                self.name, self.elite_chance
            );
        }
        Ok(())
    }
}

/// One enemy the spawner will place
#[derive(Debug, Clone)]
pub struct PlannedEnemy {
    pub template: String,
    pub position: Vec3,
    pub is_elite: bool,
    pub special: Option<Arc<SpecialAttackDefinition>>,
}

/// The concrete roster for one spawner
#[derive(Debug, Clone, Default)]
pub struct SpawnPlan {
    pub enemies: Vec<PlannedEnemy>,
    /// Index of the only enemy allowed to roll elite
    pub elite_candidate: Option<usize>,
}

impl SpawnPlan {
    pub fn elite_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_elite).count()
    }
}

/// Expand a spawner's entries into concrete enemies.
///
/// Exactly one index is drawn as the elite candidate and only it rolls
/// against `elite_chance`, so a plan holds at most one elite.
pub fn plan_spawn_group(
    config: &SpawnerConfig,
    templates: &EnemyTemplates,
    specials: &SpecialAttackLibrary,
    rng: &mut GameRng,
) -> SpawnPlan {
    let mut enemies: Vec<PlannedEnemy> = Vec::new();
    for entry in &config.entries {
        if templates.get(&entry.template).is_none() {
            warn!(
                "Spawner '{}' references unknown enemy '{}', skipping",
                config.name, entry.template
            );
            continue;
        }
        for _ in 0..entry.count {
            enemies.push(PlannedEnemy {
                template: entry.template.clone(),
                position: rng.point_in_disc(config.origin(), config.spawn_radius),
                is_elite: false,
                special: None,
            });
        }
    }

    if enemies.is_empty() {
        return SpawnPlan::default();
    }

    let candidate = rng.random_index(enemies.len());
    if rng.chance(config.elite_chance) {
        let special = specials.pick(&config.special_pool, rng);
        if special.is_none() {
            warn!(
                "Spawner '{}' has an elite but no usable special attack",
                config.name
            );
        }
        enemies[candidate].is_elite = true;
        enemies[candidate].special = special;
    }

    SpawnPlan {
        enemies,
        elite_candidate: Some(candidate),
    }
}

/// Spawner bookkeeping, one entity per spawner
#[derive(Component, Debug, Clone)]
pub struct Spawner {
    pub name: String,
    pub origin: Vec3,
    pub activation_distance: f32,
    pub group: Entity,
    active: bool,
}

impl Spawner {
    pub fn new(name: impl Into<String>, origin: Vec3, activation_distance: f32, group: Entity) -> Self {
        Self {
            name: name.into(),
            origin,
            activation_distance,
            group,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Latched distance check: true only on the poll that activates
    pub fn check_activation(&mut self, player_position: Vec3) -> bool {
        if self.active {
            return false;
        }
        if self.origin.distance(player_position) <= self.activation_distance {
            self.active = true;
            return true;
        }
        false
    }
}

/// Build a spawner's dormant group. Returns the spawner entity.
pub fn build_spawner(
    commands: &mut Commands,
    config: &SpawnerConfig,
    templates: &EnemyTemplates,
    specials: &SpecialAttackLibrary,
    rng: &mut GameRng,
) -> Entity {
    let plan = plan_spawn_group(config, templates, specials, rng);
    let group_entity = commands.spawn_empty().id();

    let mut members = Vec::with_capacity(plan.enemies.len());
    for planned in plan.enemies {
        let Some(template) = templates.get(&planned.template) else {
            continue;
        };
        let multiplier = if planned.is_elite { ELITE_STAT_MULTIPLIER } else { 1.0 };
        let mut enemy = Enemy::new(&template.name, template.stats(multiplier), planned.position)
            .with_group(group_entity)
            .with_rewards(template.rewards());
        enemy.patrol_wait_time = template.patrol_wait_time;
        if planned.is_elite {
            enemy = enemy.with_elite(planned.special);
        }

        let mut agent = NavAgent::new(template.move_speed);
        agent.set_enabled(false);
        let member = commands
            .spawn((enemy, agent, Transform::from_translation(planned.position), Dormant))
            .id();
        members.push(member);
    }

    let count = members.len();
    commands
        .entity(group_entity)
        .insert(EnemyGroup::new(config.name.clone(), members));

    info!("Spawner '{}' built {} dormant enemies", config.name, count);
    commands
        .spawn((
            Spawner::new(
                config.name.clone(),
                config.origin(),
                config.activation_distance,
                group_entity,
            ),
            Transform::from_translation(config.origin()),
        ))
        .id()
}

/// Fixed-interval activation poller
#[derive(Resource, Debug, Clone)]
pub struct SpawnerManager {
    pub poll_interval: f32,
    timer: f32,
}

impl Default for SpawnerManager {
    fn default() -> Self {
        Self::new(ACTIVATION_POLL_INTERVAL)
    }
}

impl SpawnerManager {
    /// First poll happens on the first tick
    pub fn new(poll_interval: f32) -> Self {
        Self {
            poll_interval: poll_interval.max(f32::EPSILON),
            timer: 0.0,
        }
    }

    /// Advance the timer; true when a poll is due
    pub fn tick(&mut self, dt: f32) -> bool {
        self.timer -= dt;
        if self.timer > 0.0 {
            return false;
        }
        self.timer = (self.timer + self.poll_interval).max(0.0);
        if self.timer <= 0.0 {
            self.timer = self.poll_interval;
        }
        true
    }
}

pub fn poll_spawner_activation(
    time: Res<Time>,
    mut commands: Commands,
    mut manager: ResMut<SpawnerManager>,
    heroes: Query<&Transform, With<Hero>>,
    mut spawners: Query<(Entity, &mut Spawner)>,
    mut groups: Query<&mut EnemyGroup>,
    mut agents: Query<&mut NavAgent, With<Dormant>>,
    mut activated: EventWriter<GroupActivated>,
    mut combat_log: ResMut<CombatLog>,
) {
    if !manager.tick(time.delta_secs()) {
        return;
    }
    let Ok(player) = heroes.get_single() else {
        return;
    };
    let player_position = player.translation;

    for (spawner_entity, mut spawner) in spawners.iter_mut() {
        if !spawner.check_activation(player_position) {
            continue;
        }
        let Ok(mut group) = groups.get_mut(spawner.group) else {
            error!("Spawner '{}' lost its group", spawner.name);
            continue;
        };
        if !group.activate() {
            continue;
        }

        for &member in group.members() {
            if let Ok(mut agent) = agents.get_mut(member) {
                agent.set_enabled(true);
            }
            commands.entity(member).remove::<Dormant>();
        }

        activated.send(GroupActivated {
            spawner: spawner_entity,
            group: spawner.group,
        });
        combat_log.log(
            CombatLogEventType::Spawn,
            format!(
                "{} activates ({} enemies)",
                spawner.name,
                group.members().len()
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(elite_chance: f32) -> SpawnerConfig {
        SpawnerConfig {
            name: "Camp".to_string(),
            origin: [10.0, 2.0, 10.0],
            spawn_radius: 5.0,
            activation_distance: 50.0,
            entries: vec![
                SpawnEntry {
                    template: "Goblin".to_string(),
                    count: 3,
                },
                SpawnEntry {
                    template: "Orc".to_string(),
                    count: 1,
                },
            ],
            elite_chance,
            special_pool: vec![],
        }
    }

    fn libraries() -> (EnemyTemplates, SpecialAttackLibrary) {
        (
            EnemyTemplates::builtin().unwrap(),
            SpecialAttackLibrary::builtin().unwrap(),
        )
    }

    #[test]
    fn test_plan_expands_entries_within_radius() {
        let (templates, specials) = libraries();
        let mut rng = GameRng::from_seed(1);
        let plan = plan_spawn_group(&config(0.15), &templates, &specials, &mut rng);

        assert_eq!(plan.enemies.len(), 4);
        for enemy in &plan.enemies {
            assert_eq!(enemy.position.y, 2.0);
            assert!(enemy.position.distance(Vec3::new(10.0, 2.0, 10.0)) <= 5.0 + 1e-4);
        }
    }

    #[test]
    fn test_at_most_one_elite_and_only_the_candidate() {
        let (templates, specials) = libraries();
        for seed in 0..200 {
            let mut rng = GameRng::from_seed(seed);
            let plan = plan_spawn_group(&config(0.5), &templates, &specials, &mut rng);

            assert!(plan.elite_count() <= 1);
            for (index, enemy) in plan.enemies.iter().enumerate() {
                if enemy.is_elite {
                    assert_eq!(Some(index), plan.elite_candidate);
                    assert!(enemy.special.is_some(), "elite draws from the full library");
                } else {
                    assert!(enemy.special.is_none());
                }
            }
        }
    }

    #[test]
    fn test_elite_chance_extremes() {
        let (templates, specials) = libraries();
        let mut rng = GameRng::from_seed(4);
        assert_eq!(
            plan_spawn_group(&config(1.0), &templates, &specials, &mut rng).elite_count(),
            1
        );
        assert_eq!(
            plan_spawn_group(&config(0.0), &templates, &specials, &mut rng).elite_count(),
            0
        );
    }

    #[test]
    fn test_special_pool_restricts_choice() {
        let (templates, specials) = libraries();
        let mut config = config(1.0);
        config.special_pool = vec!["Frost Wave".to_string()];

        for seed in 0..20 {
            let mut rng = GameRng::from_seed(seed);
            let plan = plan_spawn_group(&config, &templates, &specials, &mut rng);
            let elite = plan.enemies.iter().find(|e| e.is_elite).unwrap();
            assert_eq!(elite.special.as_ref().unwrap().name, "Frost Wave");
        }
    }

    #[test]
    fn test_unknown_templates_are_skipped() {
        let (templates, specials) = libraries();
        let mut config = config(0.15);
        config.entries.push(SpawnEntry {
            template: "Dragon".to_string(),
            count: 2,
        });
        let mut rng = GameRng::from_seed(2);
        assert_eq!(plan_spawn_group(&config, &templates, &specials, &mut rng).enemies.len(), 4);

        config.entries = vec![SpawnEntry {
            template: "Dragon".to_string(),
            count: 2,
        }];
        let empty = plan_spawn_group(&config, &templates, &specials, &mut rng);
        assert!(empty.enemies.is_empty());
        assert_eq!(empty.elite_candidate, None);
    }

    #[test]
    fn test_activation_is_latched_by_distance() {
        let mut spawner = Spawner::new("Camp", Vec3::ZERO, 50.0, Entity::from_raw(9));
        assert!(!spawner.check_activation(Vec3::new(80.0, 0.0, 0.0)));
        assert!(!spawner.is_active());

        assert!(spawner.check_activation(Vec3::new(40.0, 0.0, 0.0)));
        assert!(spawner.is_active());
        assert!(!spawner.check_activation(Vec3::new(40.0, 0.0, 0.0)));
        assert!(!spawner.check_activation(Vec3::new(80.0, 0.0, 0.0)));
        assert!(spawner.is_active(), "activation never reverts");
    }

    #[test]
    fn test_manager_polls_on_interval() {
        let mut manager = SpawnerManager::new(1.0);
        assert!(manager.tick(0.25), "first poll is immediate");
        let polls = (0..8).filter(|_| manager.tick(0.25)).count();
        assert_eq!(polls, 2);
    }
}
