//! Combat events
//!
//! Defines the events that flow between the simulation phases. Producers never
//! hold references to the receivers; every event carries plain `Entity` handles
//! that the consumer re-validates before use.

use std::sync::Arc;

use bevy::prelude::*;

use crate::sim::special_attacks::SpecialAttackDefinition;

/// Event fired when a direct hit lands (basic attacks, hero strikes)
#[derive(Event, Debug, Clone)]
pub struct HitEvent {
    /// Entity dealing the damage
    pub source: Entity,
    /// Log name of the source, captured when the hit was queued
    pub source_name: String,
    /// Entity receiving the damage
    pub target: Entity,
    /// Amount of damage before mitigation
    pub amount: f32,
    /// What produced the hit
    pub cause: HitCause,
}

/// Origin of a hit, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitCause {
    /// Enemy basic attack
    BasicAttack,
    /// Hero auto-attack
    HeroStrike,
    /// Hero power strike (blocked by silence)
    PowerStrike,
}

impl HitCause {
    pub fn name(&self) -> &'static str {
        match self {
            HitCause::BasicAttack => "Attack",
            HitCause::HeroStrike => "Strike",
            HitCause::PowerStrike => "Power Strike",
        }
    }
}

/// Event fired when an elite enemy casts its special attack
#[derive(Event, Debug, Clone)]
pub struct SpecialAttackCast {
    pub caster: Entity,
    pub target: Entity,
    pub definition: Arc<SpecialAttackDefinition>,
    pub caster_position: Vec3,
    pub target_position: Vec3,
}

/// Event fired when a transient effect delivers a special attack to a target
#[derive(Event, Debug, Clone)]
pub struct SpecialHitEvent {
    /// Enemy that cast the attack (may already be despawned)
    pub caster: Entity,
    pub target: Entity,
    pub definition: Arc<SpecialAttackDefinition>,
    /// Where the effect struck from; knockback pushes away from this point
    pub origin: Vec3,
}

/// Event fired by the first group member to spot a target
#[derive(Event, Debug, Clone, Copy)]
pub struct AggroShared {
    pub group: Entity,
    pub reporter: Entity,
    pub target: Entity,
}

/// Event fired when a damageable actor dies
#[derive(Event, Debug, Clone, Copy)]
pub struct ActorKilled {
    pub victim: Entity,
    /// None for deaths caused by damage over time
    pub killer: Option<Entity>,
}

/// Request for the loot collaborator to place an item roll at a position
#[derive(Event, Debug, Clone)]
pub struct LootSpawnRequest {
    pub position: Vec3,
    pub table: String,
}

/// Event fired when a spawner wakes its group
#[derive(Event, Debug, Clone, Copy)]
pub struct GroupActivated {
    pub spawner: Entity,
    pub group: Entity,
}
