//! Enemy Brains
//!
//! Glue between the world and `Enemy::think`: builds each enemy's
//! perception from the sensor and navigator, runs the state machine, and
//! carries out the commands it returns. Also handles what happens when an
//! enemy dies.

use bevy::prelude::*;

use crate::combat::events::{
    ActorKilled, AggroShared, HitCause, HitEvent, LootSpawnRequest, SpecialAttackCast,
};
use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::progression::{roll_drop, Progression};
use crate::settings::SimSettings;

use super::components::{DeathTimer, Dormant, GameRng};
use super::damage::Damageable;
use super::enemy::{Enemy, EnemyCommand, EnemyState, Perception, TargetSighting};
use super::hero::Hero;
use super::navigation::{NavAgent, Navigation};
use super::sensor::{TargetFilter, TargetSensor};
use super::utils::flat_direction;

/// Advance every active enemy's state machine by one tick
#[allow(clippy::too_many_arguments)]
pub fn run_enemy_brains(
    time: Res<Time>,
    navigation: Option<Res<Navigation>>,
    mut missing_navigation_reported: Local<bool>,
    sensor: TargetSensor,
    mut enemies: Query<
        (Entity, &mut Enemy, &mut NavAgent, &mut Transform),
        (Without<Dormant>, Without<Hero>),
    >,
    mut rng: ResMut<GameRng>,
    mut hits: EventWriter<HitEvent>,
    mut casts: EventWriter<SpecialAttackCast>,
    mut aggro: EventWriter<AggroShared>,
    mut combat_log: ResMut<CombatLog>,
) {
    let Some(navigation) = navigation else {
        if !*missing_navigation_reported {
            error!("No navigation surface installed, enemies will stay idle");
            *missing_navigation_reported = true;
        }
        return;
    };
    let surface = navigation.surface();
    let dt = time.delta_secs();

    for (entity, mut enemy, mut agent, mut transform) in enemies.iter_mut() {
        if enemy.state() == EnemyState::Dead {
            continue;
        }
        let position = transform.translation;
        let sight = |target: Entity, target_position: Vec3| TargetSighting {
            entity: target,
            position: target_position,
            path: surface.compute_path(position, target_position),
        };

        let detected = if enemy.state() == EnemyState::Patrol {
            sensor
                .nearest(position, enemy.stats.detection_range, TargetFilter::default())
                .map(|found| sight(found.entity, found.position))
        } else {
            None
        };
        let target = enemy
            .target()
            .and_then(|target| sensor.position_of(target).map(|p| sight(target, p)));

        let perception = Perception {
            position,
            detected,
            target,
            arrived: agent.has_arrived(),
        };

        let before = enemy.state();
        let commands = enemy.think(dt, &perception);
        if enemy.state() != before {
            combat_log.log(
                CombatLogEventType::StateChange,
                format!("{}: {} -> {}", enemy.label(), before.name(), enemy.state().name()),
            );
        }

        for command in commands {
            match command {
                EnemyCommand::MoveTo(point) => {
                    agent.set_destination(position, point, surface);
                }
                EnemyCommand::Stop => agent.stop(),
                EnemyCommand::ResetPath => agent.reset_path(),
                EnemyCommand::PickPatrolPoint => {
                    let home = enemy.home;
                    let radius = enemy.stats.patrol_radius;
                    match surface.sample_reachable_point(position, home, radius, &mut rng) {
                        Some(point) => {
                            agent.set_destination(position, point, surface);
                        }
                        None => debug!("{} found no reachable patrol point", enemy.label()),
                    }
                }
                EnemyCommand::FaceTowards(point) => {
                    let direction = flat_direction(position, point);
                    transform.rotation = Quat::from_rotation_y(direction.x.atan2(direction.z));
                }
                EnemyCommand::ShareAggro(target) => {
                    combat_log.log(
                        CombatLogEventType::Aggro,
                        format!("{} spots a target", enemy.label()),
                    );
                    if let Some(group) = enemy.group {
                        aggro.send(AggroShared {
                            group,
                            reporter: entity,
                            target,
                        });
                    }
                }
                EnemyCommand::BasicAttack { target, damage } => {
                    hits.send(HitEvent {
                        source: entity,
                        source_name: enemy.label(),
                        target,
                        amount: damage,
                        cause: HitCause::BasicAttack,
                    });
                }
                EnemyCommand::SpecialAttack {
                    target,
                    target_position,
                } => {
                    let Some(definition) = enemy.special_attack.clone() else {
                        continue;
                    };
                    combat_log.log(
                        CombatLogEventType::SpecialAttack,
                        format!(
                            "{} casts {} ({})",
                            enemy.label(),
                            definition.name,
                            definition.delivery.name()
                        ),
                    );
                    casts.send(SpecialAttackCast {
                        caster: entity,
                        target,
                        definition,
                        caster_position: position,
                        target_position,
                    });
                }
            }
        }
    }
}

/// Death side effects: rewards, loot, and the corpse timer
pub fn handle_enemy_deaths(
    mut commands: Commands,
    mut killed: EventReader<ActorKilled>,
    mut enemies: Query<(&Enemy, &mut NavAgent, &Transform)>,
    settings: Res<SimSettings>,
    mut progression: ResMut<Progression>,
    mut rng: ResMut<GameRng>,
    mut loot: EventWriter<LootSpawnRequest>,
    mut combat_log: ResMut<CombatLog>,
) {
    for death in killed.read() {
        let Ok((enemy, mut agent, transform)) = enemies.get_mut(death.victim) else {
            continue;
        };

        agent.set_enabled(false);

        let rewards = &enemy.rewards;
        let levels = progression.gain_experience(rewards.experience);
        progression.gain_currency(rewards.currency);
        combat_log.log(
            CombatLogEventType::Reward,
            format!(
                "{} grants {} experience and {} currency",
                enemy.label(),
                rewards.experience,
                rewards.currency
            ),
        );
        if levels > 0 {
            combat_log.log(
                CombatLogEventType::Reward,
                format!("Level up! Now level {}", progression.level),
            );
        }

        if roll_drop(rewards.drop_chance, &mut rng) {
            loot.send(LootSpawnRequest {
                position: transform.translation,
                table: rewards.loot_table.clone(),
            });
        }

        commands.entity(death.victim).insert(DeathTimer {
            remaining: settings.death_animation_time,
        });
    }
}
