//! Enemy State Machine
//!
//! Each enemy runs Patrol -> Chase -> Attack, with Dead as the absorbing
//! terminal state. The machine itself is pure: `Enemy::think` reads a
//! `Perception` snapshot built by the brain system and returns the commands
//! to carry out, so every transition is testable without a world.
//!
//! Engagement uses two radii on purpose: a patrolling enemy engages inside
//! `detection_range` but a chasing one only gives up beyond
//! `chase_abandon_range`.

use std::sync::Arc;

use bevy::prelude::*;
use smallvec::SmallVec;

use super::constants::{HIT_REACTION_TIME, PATROL_WAIT_TIME};
use super::damage::{DamageOutcome, Damageable};
use super::navigation::PathStatus;
use super::special_attacks::SpecialAttackDefinition;
use super::utils::flat_distance;

/// Stats fixed at spawn time
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyStats {
    pub max_health: f32,
    pub current_health: f32,
    pub attack_power: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub move_speed: f32,
    pub patrol_radius: f32,
    pub detection_range: f32,
    pub chase_abandon_range: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyState {
    Patrol,
    Chase,
    Attack,
    Dead,
}

impl EnemyState {
    pub fn name(&self) -> &'static str {
        match self {
            EnemyState::Patrol => "Patrol",
            EnemyState::Chase => "Chase",
            EnemyState::Attack => "Attack",
            EnemyState::Dead => "Dead",
        }
    }

    /// Chase or Attack
    pub fn is_engaged(&self) -> bool {
        matches!(self, EnemyState::Chase | EnemyState::Attack)
    }
}

/// What killing this enemy is worth
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rewards {
    pub experience: u32,
    pub currency: u32,
    pub drop_chance: f32,
    pub loot_table: String,
}

/// A target the enemy can see this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSighting {
    pub entity: Entity,
    pub position: Vec3,
    /// Path from the enemy to the target
    pub path: PathStatus,
}

/// Everything the state machine needs from the world for one tick
#[derive(Debug, Clone, Default)]
pub struct Perception {
    pub position: Vec3,
    /// Nearest live target inside detection range
    pub detected: Option<TargetSighting>,
    /// The remembered target, if it still exists and is alive
    pub target: Option<TargetSighting>,
    /// Navigator reports arrival at the current destination
    pub arrived: bool,
}

/// Orders produced by `Enemy::think`
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyCommand {
    MoveTo(Vec3),
    Stop,
    ResetPath,
    /// Walk to a random reachable point within the patrol radius of home
    PickPatrolPoint,
    FaceTowards(Vec3),
    ShareAggro(Entity),
    BasicAttack { target: Entity, damage: f32 },
    SpecialAttack { target: Entity, target_position: Vec3 },
}

pub type EnemyCommands = SmallVec<[EnemyCommand; 4]>;

#[derive(Component, Debug, Clone)]
pub struct Enemy {
    /// Template name, also used as the log label
    pub kind: String,
    pub stats: EnemyStats,
    state: EnemyState,
    target: Option<Entity>,
    /// Owning group, if any
    pub group: Option<Entity>,
    /// Patrol centre
    pub home: Vec3,
    attack_timer: f32,
    special_timer: f32,
    patrol_wait: f32,
    pub patrol_wait_time: f32,
    hit_reaction: f32,
    pub is_elite: bool,
    pub special_attack: Option<Arc<SpecialAttackDefinition>>,
    pub rewards: Rewards,
}

impl Enemy {
    pub fn new(kind: impl Into<String>, stats: EnemyStats, home: Vec3) -> Self {
        Self {
            kind: kind.into(),
            stats,
            state: EnemyState::Patrol,
            target: None,
            group: None,
            home,
            attack_timer: 0.0,
            special_timer: 0.0,
            patrol_wait: 0.0,
            patrol_wait_time: PATROL_WAIT_TIME,
            hit_reaction: 0.0,
            is_elite: false,
            special_attack: None,
            rewards: Rewards::default(),
        }
    }

    pub fn with_group(mut self, group: Entity) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_rewards(mut self, rewards: Rewards) -> Self {
        self.rewards = rewards;
        self
    }

    /// Mark as elite, optionally carrying a special attack.
    /// The first cast waits one full cooldown.
    pub fn with_elite(mut self, special: Option<Arc<SpecialAttackDefinition>>) -> Self {
        self.is_elite = true;
        self.special_timer = special.as_ref().map(|s| s.cooldown).unwrap_or(0.0);
        self.special_attack = special;
        self
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn current_health(&self) -> f32 {
        self.stats.current_health
    }

    /// True while the hit-reaction feedback is playing
    pub fn is_reacting(&self) -> bool {
        self.hit_reaction > 0.0
    }

    pub fn special_ready(&self) -> bool {
        self.is_elite && self.special_attack.is_some() && self.special_timer <= 0.0
    }

    /// Advance one tick and return what to do about it
    pub fn think(&mut self, dt: f32, perception: &Perception) -> EnemyCommands {
        let mut commands = EnemyCommands::new();
        if self.state == EnemyState::Dead {
            return commands;
        }

        self.attack_timer = (self.attack_timer - dt).max(0.0);
        self.special_timer = (self.special_timer - dt).max(0.0);
        self.hit_reaction = (self.hit_reaction - dt).max(0.0);

        match self.state {
            EnemyState::Patrol => self.patrol(dt, perception, &mut commands),
            EnemyState::Chase => self.chase(perception, &mut commands),
            EnemyState::Attack => self.attack(perception, &mut commands),
            EnemyState::Dead => {}
        }
        commands
    }

    fn patrol(&mut self, dt: f32, perception: &Perception, commands: &mut EnemyCommands) {
        if let Some(sighting) = perception.detected {
            self.target = Some(sighting.entity);
            self.state = EnemyState::Chase;
            self.patrol_wait = 0.0;
            commands.push(EnemyCommand::ShareAggro(sighting.entity));
            commands.push(EnemyCommand::MoveTo(sighting.position));
            return;
        }

        if !perception.arrived {
            self.patrol_wait = 0.0;
            return;
        }
        self.patrol_wait += dt;
        if self.patrol_wait >= self.patrol_wait_time {
            self.patrol_wait = 0.0;
            commands.push(EnemyCommand::PickPatrolPoint);
        }
    }

    fn chase(&mut self, perception: &Perception, commands: &mut EnemyCommands) {
        let Some(sighting) = perception.target else {
            self.lose_target(commands);
            return;
        };
        if sighting.path != PathStatus::Complete {
            self.lose_target(commands);
            return;
        }

        let distance = flat_distance(perception.position, sighting.position);
        if distance > self.stats.chase_abandon_range {
            self.lose_target(commands);
        } else if distance <= self.stats.attack_range {
            self.state = EnemyState::Attack;
            commands.push(EnemyCommand::Stop);
            commands.push(EnemyCommand::FaceTowards(sighting.position));
        } else {
            commands.push(EnemyCommand::MoveTo(sighting.position));
        }
    }

    fn attack(&mut self, perception: &Perception, commands: &mut EnemyCommands) {
        let Some(sighting) = perception.target else {
            self.lose_target(commands);
            return;
        };

        let distance = flat_distance(perception.position, sighting.position);
        if distance > self.stats.attack_range {
            self.state = EnemyState::Chase;
            commands.push(EnemyCommand::MoveTo(sighting.position));
            return;
        }

        commands.push(EnemyCommand::Stop);
        commands.push(EnemyCommand::FaceTowards(sighting.position));

        if self.special_ready() {
            self.special_timer = self.special_attack.as_ref().map_or(0.0, |s| s.cooldown);
            commands.push(EnemyCommand::SpecialAttack {
                target: sighting.entity,
                target_position: sighting.position,
            });
        } else if self.attack_timer <= 0.0 {
            self.attack_timer = self.stats.attack_cooldown;
            commands.push(EnemyCommand::BasicAttack {
                target: sighting.entity,
                damage: self.stats.attack_power,
            });
        }
    }

    fn lose_target(&mut self, commands: &mut EnemyCommands) {
        self.target = None;
        self.state = EnemyState::Patrol;
        self.patrol_wait = 0.0;
        commands.push(EnemyCommand::ResetPath);
    }

    /// Join a group-wide chase. Only patrolling members listen.
    pub fn adopt_shared_target(&mut self, target: Entity) -> bool {
        if self.state != EnemyState::Patrol {
            return false;
        }
        self.target = Some(target);
        self.state = EnemyState::Chase;
        self.patrol_wait = 0.0;
        true
    }
}

impl Damageable for Enemy {
    fn label(&self) -> String {
        if self.is_elite {
            format!("Elite {}", self.kind)
        } else {
            self.kind.clone()
        }
    }

    fn is_alive(&self) -> bool {
        self.state != EnemyState::Dead
    }

    /// Health may go negative; there is no floor before the death check.
    fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.state == EnemyState::Dead {
            return DamageOutcome::Ignored;
        }
        self.stats.current_health -= amount;
        self.hit_reaction = HIT_REACTION_TIME;

        if self.stats.current_health <= 0.0 {
            self.die();
            DamageOutcome::Killed { dealt: amount }
        } else {
            DamageOutcome::Hurt { dealt: amount }
        }
    }

    fn die(&mut self) {
        self.state = EnemyState::Dead;
        self.target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::special_attacks::{Delivery, ElementalKit};

    fn stats() -> EnemyStats {
        EnemyStats {
            max_health: 100.0,
            current_health: 100.0,
            attack_power: 10.0,
            attack_range: 2.0,
            attack_cooldown: 1.0,
            move_speed: 4.0,
            patrol_radius: 8.0,
            detection_range: 12.0,
            chase_abandon_range: 25.0,
        }
    }

    fn special() -> Arc<SpecialAttackDefinition> {
        Arc::new(SpecialAttackDefinition {
            name: "Fireball".to_string(),
            kit: ElementalKit::Fire {
                burn_duration: 3.0,
                burn_damage_per_second: 4.0,
            },
            delivery: Delivery::Projectile {
                speed: 12.0,
                hit_radius: 0.8,
            },
            instant_damage_fraction: 0.1,
            cooldown: 6.0,
            lifetime: 3.0,
            visual_effect: None,
        })
    }

    fn target() -> Entity {
        Entity::from_raw(42)
    }

    fn sighting(position: Vec3) -> TargetSighting {
        TargetSighting {
            entity: target(),
            position,
            path: PathStatus::Complete,
        }
    }

    fn seen_at(position: Vec3) -> Perception {
        Perception {
            position: Vec3::ZERO,
            detected: Some(sighting(position)),
            target: Some(sighting(position)),
            arrived: false,
        }
    }

    fn chasing_enemy() -> Enemy {
        let mut enemy = Enemy::new("Goblin", stats(), Vec3::ZERO);
        assert!(enemy.adopt_shared_target(target()));
        enemy
    }

    // =========================================================================
    // Damage
    // =========================================================================

    #[test]
    fn test_damage_then_death_is_absorbing() {
        let mut enemy = Enemy::new("Goblin", stats(), Vec3::ZERO);

        assert_eq!(enemy.take_damage(40.0), DamageOutcome::Hurt { dealt: 40.0 });
        assert_eq!(enemy.current_health(), 60.0);
        assert_eq!(enemy.state(), EnemyState::Patrol);

        assert!(enemy.take_damage(70.0).is_killing_blow());
        assert_eq!(enemy.current_health(), -10.0, "no floor clamp");
        assert_eq!(enemy.state(), EnemyState::Dead);

        assert_eq!(enemy.take_damage(25.0), DamageOutcome::Ignored);
        assert_eq!(enemy.current_health(), -10.0);
        assert_eq!(enemy.state(), EnemyState::Dead);
    }

    #[test]
    fn test_dead_enemy_issues_no_commands_and_ignores_aggro() {
        let mut enemy = Enemy::new("Goblin", stats(), Vec3::ZERO);
        enemy.take_damage(500.0);

        assert!(enemy.think(0.1, &seen_at(Vec3::new(1.0, 0.0, 0.0))).is_empty());
        assert!(!enemy.adopt_shared_target(target()));
        assert_eq!(enemy.state(), EnemyState::Dead);
    }

    #[test]
    fn test_hit_reaction_plays_then_fades() {
        let mut enemy = Enemy::new("Goblin", stats(), Vec3::ZERO);
        enemy.take_damage(5.0);
        assert!(enemy.is_reacting());
        enemy.think(1.0, &Perception::default());
        assert!(!enemy.is_reacting());
    }

    // =========================================================================
    // Patrol
    // =========================================================================

    #[test]
    fn test_patrol_detects_and_shares_aggro() {
        let mut enemy = Enemy::new("Goblin", stats(), Vec3::ZERO);
        let commands = enemy.think(0.1, &seen_at(Vec3::new(10.0, 0.0, 0.0)));

        assert_eq!(enemy.state(), EnemyState::Chase);
        assert_eq!(enemy.target(), Some(target()));
        assert_eq!(commands[0], EnemyCommand::ShareAggro(target()));
        assert_eq!(commands[1], EnemyCommand::MoveTo(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_patrol_waits_before_new_point() {
        let mut enemy = Enemy::new("Goblin", stats(), Vec3::ZERO);
        let arrived = Perception {
            arrived: true,
            ..Default::default()
        };

        assert!(enemy.think(1.0, &arrived).is_empty());
        assert!(enemy.think(0.5, &arrived).is_empty());
        let commands = enemy.think(0.5, &arrived);
        assert_eq!(commands.as_slice(), &[EnemyCommand::PickPatrolPoint]);

        assert!(enemy.think(1.0, &arrived).is_empty(), "wait timer restarts");
    }

    #[test]
    fn test_patrol_wait_resets_while_walking() {
        let mut enemy = Enemy::new("Goblin", stats(), Vec3::ZERO);
        let arrived = Perception {
            arrived: true,
            ..Default::default()
        };

        enemy.think(1.5, &arrived);
        enemy.think(0.1, &Perception::default());
        assert!(enemy.think(1.5, &arrived).is_empty());
    }

    // =========================================================================
    // Chase
    // =========================================================================

    #[test]
    fn test_chase_follows_target() {
        let mut enemy = chasing_enemy();
        let commands = enemy.think(0.1, &seen_at(Vec3::new(8.0, 0.0, 0.0)));
        assert_eq!(enemy.state(), EnemyState::Chase);
        assert_eq!(commands.as_slice(), &[EnemyCommand::MoveTo(Vec3::new(8.0, 0.0, 0.0))]);
    }

    #[test]
    fn test_chase_drops_lost_target() {
        let mut enemy = chasing_enemy();
        let commands = enemy.think(0.1, &Perception::default());

        assert_eq!(enemy.state(), EnemyState::Patrol);
        assert_eq!(enemy.target(), None);
        assert_eq!(commands.as_slice(), &[EnemyCommand::ResetPath]);
    }

    #[test]
    fn test_chase_drops_unreachable_target() {
        for path in [PathStatus::Partial, PathStatus::Invalid] {
            let mut enemy = chasing_enemy();
            let mut perception = seen_at(Vec3::new(8.0, 0.0, 0.0));
            perception.target = Some(TargetSighting {
                path,
                ..sighting(Vec3::new(8.0, 0.0, 0.0))
            });

            enemy.think(0.1, &perception);
            assert_eq!(enemy.state(), EnemyState::Patrol, "{:?} path", path);
        }
    }

    #[test]
    fn test_chase_keeps_going_beyond_detection_range() {
        let mut enemy = chasing_enemy();
        enemy.think(0.1, &Perception {
            detected: None,
            ..seen_at(Vec3::new(20.0, 0.0, 0.0))
        });
        assert_eq!(enemy.state(), EnemyState::Chase);

        enemy.think(0.1, &Perception {
            detected: None,
            ..seen_at(Vec3::new(30.0, 0.0, 0.0))
        });
        assert_eq!(enemy.state(), EnemyState::Patrol, "abandoned beyond 25");
    }

    #[test]
    fn test_chase_enters_attack_in_range() {
        let mut enemy = chasing_enemy();
        let commands = enemy.think(0.1, &seen_at(Vec3::new(1.5, 0.0, 0.0)));
        assert_eq!(enemy.state(), EnemyState::Attack);
        assert_eq!(commands[0], EnemyCommand::Stop);
    }

    // =========================================================================
    // Attack
    // =========================================================================

    #[test]
    fn test_basic_attack_respects_cooldown() {
        let mut enemy = chasing_enemy();
        let close = seen_at(Vec3::new(1.0, 0.0, 0.0));
        enemy.think(0.1, &close);

        let first = enemy.think(0.1, &close);
        assert!(first.contains(&EnemyCommand::BasicAttack {
            target: target(),
            damage: 10.0
        }));

        let second = enemy.think(0.5, &close);
        assert!(!second.iter().any(|c| matches!(c, EnemyCommand::BasicAttack { .. })));

        let third = enemy.think(0.5, &close);
        assert!(third.iter().any(|c| matches!(c, EnemyCommand::BasicAttack { .. })));
    }

    #[test]
    fn test_attack_returns_to_chase_when_target_steps_away() {
        let mut enemy = chasing_enemy();
        enemy.think(0.1, &seen_at(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(enemy.state(), EnemyState::Attack);

        let commands = enemy.think(0.1, &seen_at(Vec3::new(6.0, 0.0, 0.0)));
        assert_eq!(enemy.state(), EnemyState::Chase);
        assert_eq!(commands.as_slice(), &[EnemyCommand::MoveTo(Vec3::new(6.0, 0.0, 0.0))]);
    }

    #[test]
    fn test_attack_falls_back_to_patrol_when_target_gone() {
        let mut enemy = chasing_enemy();
        enemy.think(0.1, &seen_at(Vec3::new(1.0, 0.0, 0.0)));
        enemy.think(0.1, &Perception::default());
        assert_eq!(enemy.state(), EnemyState::Patrol);
        assert_eq!(enemy.target(), None);
    }

    #[test]
    fn test_elite_prefers_special_when_ready() {
        let mut enemy = Enemy::new("Goblin", stats(), Vec3::ZERO).with_elite(Some(special()));
        enemy.adopt_shared_target(target());
        let close = seen_at(Vec3::new(1.0, 0.0, 0.0));
        enemy.think(0.1, &close);
        assert!(!enemy.special_ready(), "first cast waits a full cooldown");

        let mut specials = 0;
        let mut basics = 0;
        for _ in 0..70 {
            for command in enemy.think(0.1, &close) {
                match command {
                    EnemyCommand::SpecialAttack { .. } => specials += 1,
                    EnemyCommand::BasicAttack { .. } => basics += 1,
                    _ => {}
                }
            }
        }
        assert_eq!(specials, 1, "one cast per 6s cooldown within 7s");
        assert!(basics >= 5);
    }

    #[test]
    fn test_elite_without_special_uses_basic_attacks() {
        let mut enemy = Enemy::new("Goblin", stats(), Vec3::ZERO).with_elite(None);
        enemy.adopt_shared_target(target());
        let close = seen_at(Vec3::new(1.0, 0.0, 0.0));
        enemy.think(0.1, &close);

        let commands = enemy.think(0.1, &close);
        assert!(commands.iter().any(|c| matches!(c, EnemyCommand::BasicAttack { .. })));
        assert_eq!(enemy.label(), "Elite Goblin");
    }

    #[test]
    fn test_adopt_shared_target_only_from_patrol() {
        let mut enemy = chasing_enemy();
        assert!(!enemy.adopt_shared_target(Entity::from_raw(7)));
        assert_eq!(enemy.target(), Some(target()));
    }
}
