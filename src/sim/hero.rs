//! Hero
//!
//! The player-side target enemies hunt. In the simulation the hero follows a
//! scripted route, fights whatever comes into reach, and carries the status
//! effects special attacks leave behind.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::events::{ActorKilled, HitCause, HitEvent};
use crate::combat::log::{CombatLog, CombatLogEventType};

use super::components::{Dormant, GameRng};
use super::constants::{BLIND_MISS_CHANCE, POWER_STRIKE_MULTIPLIER};
use super::damage::{DamageOutcome, Damageable, SpecialEffectOutcome};
use super::enemy::{Enemy, EnemyState};
use super::navigation::Navigation;
use super::special_attacks::SpecialAttackDefinition;
use super::status::StatusEffects;
use super::utils::{flat_direction, flat_distance};

/// Hero setup as written in a scenario file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroConfig {
    #[serde(default = "default_hero_name")]
    pub name: String,
    #[serde(default)]
    pub position: [f32; 3],
    pub max_health: f32,
    /// Fraction of incoming damage ignored
    #[serde(default)]
    pub defense: f32,
    pub attack_power: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    #[serde(default = "default_power_strike_cooldown")]
    pub power_strike_cooldown: f32,
    pub move_speed: f32,
    /// Waypoints walked in order
    #[serde(default)]
    pub route: Vec<[f32; 3]>,
    #[serde(default)]
    pub loop_route: bool,
}

fn default_hero_name() -> String {
    "Hero".to_string()
}

fn default_power_strike_cooldown() -> f32 {
    8.0
}

impl HeroConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_health <= 0.0 {
            return Err("hero max_health must be positive".to_string());
        }
        if !(0.0..0.95).contains(&self.defense) {
            return Err(format!("hero defense {} must be within [0, 0.95)", self.defense));
        }
        if self.attack_cooldown <= 0.0 || self.power_strike_cooldown <= 0.0 {
            return Err("hero cooldowns must be positive".to_string());
        }
        if self.attack_range < 0.0 || self.move_speed < 0.0 {
            return Err("hero attack_range and move_speed must be non-negative".to_string());
        }
        Ok(())
    }
}

/// Decision for one auto-attack swing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strike {
    Hit { cause: HitCause, damage: f32 },
    Miss,
}

/// The player character
#[derive(Component, Debug, Clone)]
pub struct Hero {
    pub name: String,
    pub max_health: f32,
    pub current_health: f32,
    /// Fraction of incoming damage ignored
    pub defense: f32,
    pub attack_power: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub power_strike_cooldown: f32,
    pub move_speed: f32,
    pub damage_taken: f32,
    pub status: StatusEffects,
    attack_timer: f32,
    power_strike_timer: f32,
    alive: bool,
}

impl Hero {
    pub fn from_config(config: &HeroConfig) -> Self {
        Self {
            name: config.name.clone(),
            max_health: config.max_health,
            current_health: config.max_health,
            defense: config.defense,
            attack_power: config.attack_power,
            attack_range: config.attack_range,
            attack_cooldown: config.attack_cooldown,
            power_strike_cooldown: config.power_strike_cooldown,
            move_speed: config.move_speed,
            damage_taken: 0.0,
            status: StatusEffects::default(),
            attack_timer: 0.0,
            power_strike_timer: config.power_strike_cooldown,
            alive: true,
        }
    }

    pub fn health_pct(&self) -> f32 {
        if self.max_health > 0.0 {
            (self.current_health / self.max_health).max(0.0)
        } else {
            0.0
        }
    }

    pub fn tick_cooldowns(&mut self, dt: f32) {
        self.attack_timer = (self.attack_timer - dt).max(0.0);
        self.power_strike_timer = (self.power_strike_timer - dt).max(0.0);
    }

    /// Swing if the attack is off cooldown and nothing prevents it
    pub fn next_strike(&mut self, rng: &mut GameRng) -> Option<Strike> {
        if !self.alive || !self.status.can_attack() || self.attack_timer > 0.0 {
            return None;
        }
        self.attack_timer = self.attack_cooldown;

        if self.status.is_blinded() && rng.chance(BLIND_MISS_CHANCE) {
            return Some(Strike::Miss);
        }

        if !self.status.is_silenced() && self.power_strike_timer <= 0.0 {
            self.power_strike_timer = self.power_strike_cooldown;
            return Some(Strike::Hit {
                cause: HitCause::PowerStrike,
                damage: self.attack_power * POWER_STRIKE_MULTIPLIER,
            });
        }

        Some(Strike::Hit {
            cause: HitCause::HeroStrike,
            damage: self.attack_power,
        })
    }
}

impl Damageable for Hero {
    fn label(&self) -> String {
        self.name.clone()
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome::Ignored;
        }
        let dealt = amount.max(0.0) * (1.0 - self.defense) * self.status.damage_taken_multiplier();
        self.current_health -= dealt;
        self.damage_taken += dealt;

        if self.current_health <= 0.0 {
            self.die();
            DamageOutcome::Killed { dealt }
        } else {
            DamageOutcome::Hurt { dealt }
        }
    }

    fn apply_special_effect(&mut self, definition: &SpecialAttackDefinition) -> SpecialEffectOutcome {
        if !self.alive {
            return SpecialEffectOutcome::default();
        }

        let damage = self.take_damage(definition.instant_damage_fraction * self.max_health);
        if damage.is_killing_blow() {
            return SpecialEffectOutcome {
                damage: damage.dealt(),
                killed: true,
                ..Default::default()
            };
        }

        let afflicted = definition
            .kit
            .status_effects(&definition.name)
            .into_iter()
            .filter(|effect| self.status.apply(effect.clone()))
            .map(|effect| effect.kind)
            .collect();

        SpecialEffectOutcome {
            damage: damage.dealt(),
            killed: false,
            afflicted,
            knockback: definition.kit.knockback_distance(),
        }
    }

    fn die(&mut self) {
        self.alive = false;
        self.current_health = 0.0;
        self.status.clear();
    }
}

/// Scripted path the hero walks
#[derive(Component, Debug, Clone, Default)]
pub struct HeroRoute {
    pub waypoints: Vec<Vec3>,
    pub index: usize,
    pub looping: bool,
}

impl HeroRoute {
    pub fn new(waypoints: Vec<Vec3>, looping: bool) -> Self {
        Self {
            waypoints,
            index: 0,
            looping,
        }
    }

    pub fn current(&self) -> Option<Vec3> {
        self.waypoints.get(self.index).copied()
    }

    pub fn advance(&mut self) {
        self.index += 1;
        if self.looping && self.index >= self.waypoints.len() {
            self.index = 0;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.waypoints.len()
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Tick hero cooldowns and status effects, applying burn damage
pub fn tick_hero_status(
    time: Res<Time>,
    mut heroes: Query<(Entity, &mut Hero)>,
    mut killed: EventWriter<ActorKilled>,
    mut combat_log: ResMut<CombatLog>,
) {
    let dt = time.delta_secs();
    for (entity, mut hero) in heroes.iter_mut() {
        if !hero.is_alive() {
            continue;
        }
        hero.tick_cooldowns(dt);

        let burn = hero.status.tick(dt);
        if burn <= 0.0 {
            continue;
        }
        let outcome = hero.take_damage(burn);
        combat_log.log(
            CombatLogEventType::Damage,
            format!("Burn deals {:.0} damage to {}", outcome.dealt(), hero.name),
        );
        if outcome.is_killing_blow() {
            killed.send(ActorKilled {
                victim: entity,
                killer: None,
            });
            combat_log.log(
                CombatLogEventType::Death,
                format!("{} has burned to death", hero.name),
            );
        }
    }
}

/// Nearest live enemy within reach of `position`
fn nearest_enemy_in_range<'a>(
    position: Vec3,
    range: f32,
    enemies: impl Iterator<Item = (Entity, &'a Enemy, &'a Transform)>,
) -> Option<(Entity, &'a Enemy)> {
    enemies
        .filter(|(_, enemy, _)| enemy.state() != EnemyState::Dead)
        .map(|(entity, enemy, transform)| {
            (entity, enemy, flat_distance(position, transform.translation))
        })
        .filter(|(_, _, distance)| *distance <= range)
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(entity, enemy, _)| (entity, enemy))
}

/// Hero swings at the nearest enemy in range
pub fn hero_auto_attack(
    mut heroes: Query<(Entity, &mut Hero, &Transform)>,
    enemies: Query<(Entity, &Enemy, &Transform), (Without<Dormant>, Without<Hero>)>,
    mut rng: ResMut<GameRng>,
    mut hits: EventWriter<HitEvent>,
    mut combat_log: ResMut<CombatLog>,
) {
    for (hero_entity, mut hero, transform) in heroes.iter_mut() {
        if !hero.is_alive() {
            continue;
        }
        let Some((enemy_entity, enemy)) =
            nearest_enemy_in_range(transform.translation, hero.attack_range, enemies.iter())
        else {
            continue;
        };

        match hero.next_strike(&mut rng) {
            Some(Strike::Hit { cause, damage }) => {
                hits.send(HitEvent {
                    source: hero_entity,
                    source_name: hero.name.clone(),
                    target: enemy_entity,
                    amount: damage,
                    cause,
                });
            }
            Some(Strike::Miss) => {
                combat_log.log(
                    CombatLogEventType::Damage,
                    format!("{}'s strike misses {} (blinded)", hero.name, enemy.label()),
                );
            }
            None => {}
        }
    }
}

/// Walk the hero along its route, pausing to fight anything in reach
pub fn advance_hero_route(
    time: Res<Time>,
    mut heroes: Query<(&Hero, &mut HeroRoute, &mut Transform)>,
    enemies: Query<(Entity, &Enemy, &Transform), (Without<Dormant>, Without<Hero>)>,
    navigation: Option<Res<Navigation>>,
) {
    let dt = time.delta_secs();
    for (hero, mut route, mut transform) in heroes.iter_mut() {
        if !hero.is_alive() || hero.status.is_immobilized() {
            continue;
        }
        if nearest_enemy_in_range(transform.translation, hero.attack_range, enemies.iter()).is_some() {
            continue;
        }
        let Some(waypoint) = route.current() else {
            continue;
        };

        let position = transform.translation;
        let distance = flat_distance(position, waypoint);
        let travel = hero.move_speed * hero.status.speed_multiplier() * dt;
        if distance <= travel {
            transform.translation.x = waypoint.x;
            transform.translation.z = waypoint.z;
            route.advance();
            continue;
        }

        let next = position + flat_direction(position, waypoint) * travel;
        let blocked = navigation
            .as_ref()
            .map(|nav| nav.surface().blocks(next))
            .unwrap_or(false);
        if blocked {
            warn!("{} cannot walk through blocked ground, skipping waypoint", hero.name);
            route.advance();
        } else {
            transform.translation = next;
        }
    }
}
