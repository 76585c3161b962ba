//! Combat system
//!
//! Shared plumbing for the simulation:
//! - Events exchanged between system phases
//! - The combat log
//! - Simulation speed control

use bevy::prelude::*;

pub mod events;
pub mod log;

use events::*;

/// Plugin for the combat plumbing
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app
            // Combat events
            .add_event::<HitEvent>()
            .add_event::<SpecialAttackCast>()
            .add_event::<SpecialHitEvent>()
            .add_event::<AggroShared>()
            .add_event::<ActorKilled>()
            .add_event::<LootSpawnRequest>()
            .add_event::<GroupActivated>()
            // Resources
            .init_resource::<log::CombatLog>()
            .init_resource::<SimulationSpeed>()
            .add_systems(First, advance_log_clock);
    }
}

/// Keep the combat log timestamps in step with simulation time
fn advance_log_clock(time: Res<Time>, mut combat_log: ResMut<log::CombatLog>) {
    combat_log.sim_time += time.delta_secs();
}

/// Controls the speed of the simulation
#[derive(Resource)]
pub struct SimulationSpeed {
    /// Speed multiplier (0.0 = paused, 0.5 = half speed, 1.0 = normal, 2.0 = double)
    pub multiplier: f32,
}

impl Default for SimulationSpeed {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

impl SimulationSpeed {
    pub fn pause(&mut self) {
        self.multiplier = 0.0;
    }

    pub fn half_speed(&mut self) {
        self.multiplier = 0.5;
    }

    pub fn normal_speed(&mut self) {
        self.multiplier = 1.0;
    }

    pub fn double_speed(&mut self) {
        self.multiplier = 2.0;
    }

    pub fn is_paused(&self) -> bool {
        self.multiplier == 0.0
    }

    /// Scale a wall-clock delta into simulation time
    pub fn scale(&self, delta: f32) -> f32 {
        (delta * self.multiplier).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paused_speed_scales_to_zero() {
        let mut speed = SimulationSpeed::default();
        assert_eq!(speed.scale(0.5), 0.5);

        speed.pause();
        assert!(speed.is_paused());
        assert_eq!(speed.scale(0.5), 0.0);

        speed.double_speed();
        assert_eq!(speed.scale(0.5), 1.0);
    }
}
