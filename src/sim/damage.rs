//! Damage Resolution
//!
//! The damageable capability shared by heroes and enemies, and the systems
//! that turn hit events into health changes. Every hit is re-validated
//! against the live world: a target that despawned or died since the hit was
//! queued simply ignores it.

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::combat::events::{ActorKilled, HitEvent, SpecialHitEvent};
use crate::combat::log::{CombatLog, CombatLogEventType};

use super::hero::Hero;
use super::navigation::Navigation;
use super::special_attacks::SpecialAttackDefinition;
use super::status::StatusKind;
use super::utils::flat_direction;

/// Result of a single `take_damage` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Target was already dead
    Ignored,
    /// Damage applied, target survives
    Hurt { dealt: f32 },
    /// Damage applied and this was the killing blow
    Killed { dealt: f32 },
}

impl DamageOutcome {
    pub fn dealt(&self) -> f32 {
        match self {
            DamageOutcome::Ignored => 0.0,
            DamageOutcome::Hurt { dealt } | DamageOutcome::Killed { dealt } => *dealt,
        }
    }

    pub fn is_killing_blow(&self) -> bool {
        matches!(self, DamageOutcome::Killed { .. })
    }
}

/// What applying a special attack did to its target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecialEffectOutcome {
    pub damage: f32,
    pub killed: bool,
    /// Status kinds newly applied; refreshed ones are left out
    pub afflicted: SmallVec<[StatusKind; 2]>,
    /// Distance to push the target away from the effect origin
    pub knockback: f32,
}

/// Anything that can be hit
pub trait Damageable {
    /// Name used in the combat log
    fn label(&self) -> String;

    fn is_alive(&self) -> bool;

    /// Subtract health; transitions to dead when health reaches zero.
    /// Must be a no-op once dead.
    fn take_damage(&mut self, amount: f32) -> DamageOutcome;

    /// Apply a special attack's kit. Targets that have no use for
    /// elemental effects ignore it.
    fn apply_special_effect(&mut self, _definition: &SpecialAttackDefinition) -> SpecialEffectOutcome {
        SpecialEffectOutcome::default()
    }

    fn die(&mut self);
}

/// Apply queued direct hits to every target carrying `T`
pub fn resolve_hits<T: Component + Damageable>(
    mut hits: EventReader<HitEvent>,
    mut targets: Query<&mut T>,
    mut killed: EventWriter<ActorKilled>,
    mut combat_log: ResMut<CombatLog>,
) {
    for hit in hits.read() {
        let Ok(mut target) = targets.get_mut(hit.target) else {
            continue;
        };

        let outcome = target.take_damage(hit.amount);
        if outcome == DamageOutcome::Ignored {
            continue;
        }

        let target_name = target.label();
        combat_log.log(
            CombatLogEventType::Damage,
            format!(
                "{}'s {} hits {} for {:.0} damage",
                hit.source_name,
                hit.cause.name(),
                target_name,
                outcome.dealt()
            ),
        );

        if outcome.is_killing_blow() {
            killed.send(ActorKilled {
                victim: hit.target,
                killer: Some(hit.source),
            });
            combat_log.log(
                CombatLogEventType::Death,
                format!("{} has been slain by {}", target_name, hit.source_name),
            );
        }
    }
}

/// Deliver special attacks to heroes, including knockback
pub fn resolve_special_hits(
    mut hits: EventReader<SpecialHitEvent>,
    mut heroes: Query<(&mut Hero, &mut Transform)>,
    navigation: Option<Res<Navigation>>,
    mut killed: EventWriter<ActorKilled>,
    mut combat_log: ResMut<CombatLog>,
) {
    for hit in hits.read() {
        let Ok((mut hero, mut transform)) = heroes.get_mut(hit.target) else {
            continue;
        };
        if !hero.is_alive() {
            continue;
        }

        let outcome = hero.apply_special_effect(&hit.definition);
        combat_log.log(
            CombatLogEventType::Damage,
            format!(
                "{} hits {} for {:.0} damage",
                hit.definition.name,
                hero.label(),
                outcome.damage
            ),
        );

        if !outcome.afflicted.is_empty() {
            let names: Vec<&'static str> =
                outcome.afflicted.iter().map(StatusKind::name).collect();
            combat_log.log(
                CombatLogEventType::StatusApplied,
                format!("{} is afflicted by {}", hero.label(), names.join(", ")),
            );
        }

        if outcome.killed {
            killed.send(ActorKilled {
                victim: hit.target,
                killer: Some(hit.caster),
            });
            combat_log.log(
                CombatLogEventType::Death,
                format!("{} has been slain by {}", hero.label(), hit.definition.name),
            );
            continue;
        }

        if outcome.knockback > 0.0 {
            let position = transform.translation;
            let destination = position + flat_direction(hit.origin, position) * outcome.knockback;
            let blocked = navigation
                .as_ref()
                .map(|nav| nav.surface().blocks(destination))
                .unwrap_or(false);
            if !blocked {
                transform.translation = destination;
            }
        }
    }
}
