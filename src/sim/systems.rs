//! Simulation Systems API
//!
//! Stable entry point for wiring the simulation into an `App`. Callers use
//! `configure_phase_ordering` and `add_core_systems` instead of reaching
//! into individual modules.
//!
//! ## System Phases
//!
//! Every tick runs five ordered phases:
//!
//! 1. **Upkeep** - spawner polling, hero status effects, corpse timers
//! 2. **Decision** - enemy brains, group aggro, hero actions
//! 3. **Effects** - special-attack dispatch and transient effects
//! 4. **Resolution** - damage, deaths, rewards, loot
//! 5. **Movement** - navigation agents
//!
//! Deferred commands are flushed between phases, so an entity spawned or
//! despawned in one phase is visible to the next.

use bevy::prelude::*;

// === Phase 1: Upkeep ===
pub use super::components::despawn_finished_corpses;
pub use super::hero::tick_hero_status;
pub use super::spawner::poll_spawner_activation;

// === Phase 2: Decision ===
pub use super::enemy_ai::run_enemy_brains;
pub use super::group::{reevaluate_group_aggro, share_group_aggro};
pub use super::hero::{advance_hero_route, hero_auto_attack};

// === Phase 3: Effects ===
pub use super::effects::{advance_waves, dispatch_special_attacks, move_projectiles, resolve_area_effects};

// === Phase 4: Resolution ===
pub use super::damage::{resolve_hits, resolve_special_hits};
pub use super::enemy_ai::handle_enemy_deaths;
pub use crate::progression::loot::{pickup_items, spawn_loot};

// === Phase 5: Movement ===
pub use super::navigation::move_nav_agents;

use super::enemy::Enemy;
use super::hero::Hero;

/// System set labels for simulation ordering
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationPhase {
    Upkeep,
    Decision,
    Effects,
    Resolution,
    Movement,
}

/// Chain the phases. Call once before `add_core_systems`.
pub fn configure_phase_ordering(app: &mut App) {
    app.configure_sets(
        Update,
        (
            SimulationPhase::Upkeep,
            SimulationPhase::Decision,
            SimulationPhase::Effects,
            SimulationPhase::Resolution,
            SimulationPhase::Movement,
        )
            .chain(),
    );
}

/// Adds every simulation system under `run_condition`
pub fn add_core_systems<M>(app: &mut App, run_condition: impl Condition<M> + Clone)
where
    M: 'static,
{
    // Phase 1: Upkeep
    app.add_systems(
        Update,
        (poll_spawner_activation, tick_hero_status, despawn_finished_corpses)
            .chain()
            .in_set(SimulationPhase::Upkeep)
            .run_if(run_condition.clone()),
    );

    // Phase 2: Decision
    app.add_systems(
        Update,
        (
            run_enemy_brains,
            share_group_aggro,
            reevaluate_group_aggro,
            hero_auto_attack,
            advance_hero_route,
        )
            .chain()
            .in_set(SimulationPhase::Decision)
            .run_if(run_condition.clone()),
    );

    // Phase 3: Effects
    app.add_systems(
        Update,
        (
            dispatch_special_attacks,
            apply_deferred, // Effect entities must exist before they move
            move_projectiles,
            advance_waves,
            resolve_area_effects,
        )
            .chain()
            .in_set(SimulationPhase::Effects)
            .run_if(run_condition.clone()),
    );

    // Phase 4: Resolution
    app.add_systems(
        Update,
        (
            resolve_hits::<Enemy>,
            resolve_hits::<Hero>,
            resolve_special_hits,
            handle_enemy_deaths,
            spawn_loot,
            apply_deferred,
            pickup_items,
        )
            .chain()
            .in_set(SimulationPhase::Resolution)
            .run_if(run_condition.clone()),
    );

    // Phase 5: Movement
    app.add_systems(
        Update,
        move_nav_agents
            .in_set(SimulationPhase::Movement)
            .run_if(run_condition),
    );

    // Flush deferred commands between phases
    let phases = [
        SimulationPhase::Upkeep,
        SimulationPhase::Decision,
        SimulationPhase::Effects,
        SimulationPhase::Resolution,
        SimulationPhase::Movement,
    ];
    for pair in phases.windows(2) {
        app.add_systems(
            Update,
            apply_deferred.after(pair[0].clone()).before(pair[1].clone()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_are_distinct() {
        assert_ne!(SimulationPhase::Upkeep, SimulationPhase::Decision);
        assert_ne!(SimulationPhase::Effects, SimulationPhase::Resolution);
        assert_ne!(SimulationPhase::Resolution, SimulationPhase::Movement);
    }
}
