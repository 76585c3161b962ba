//! Simulation Constants
//!
//! Centralized location for magic numbers used throughout the simulation.
//! Values that designers tune per run live in `SimSettings` instead; these
//! are the defaults those settings fall back to.

// ============================================================================
// Timing
// ============================================================================

/// Default simulation rate for the headless runner (ticks per second)
pub const DEFAULT_TICK_RATE: f32 = 60.0;

/// How often the spawner manager measures hero distance (seconds)
pub const ACTIVATION_POLL_INTERVAL: f32 = 1.0;

/// How long a patrolling enemy idles at a waypoint before picking a new one
pub const PATROL_WAIT_TIME: f32 = 2.0;

/// Duration of the hit-reaction flinch after taking damage
pub const HIT_REACTION_TIME: f32 = 0.3;

/// Time between death and removal from the simulation
pub const DEATH_ANIMATION_TIME: f32 = 2.0;

// ============================================================================
// Spawning
// ============================================================================

/// Chance that a spawn group's elite candidate is promoted
pub const DEFAULT_ELITE_CHANCE: f32 = 0.15;

/// Health and attack power multiplier applied to elites
pub const ELITE_STAT_MULTIPLIER: f32 = 1.5;

// ============================================================================
// Navigation
// ============================================================================

/// Remaining distance at which an agent counts as arrived
pub const ARRIVAL_TOLERANCE: f32 = 0.5;

/// Attempts made when sampling a reachable patrol point
pub const PATROL_SAMPLE_ATTEMPTS: usize = 30;

// ============================================================================
// Hero
// ============================================================================

/// Distance at which the hero collects dropped items
pub const ITEM_PICKUP_RADIUS: f32 = 1.5;

/// Chance that a blinded hero's attack misses
pub const BLIND_MISS_CHANCE: f32 = 0.5;

/// Damage multiplier of the hero's power strike
pub const POWER_STRIKE_MULTIPLIER: f32 = 2.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probabilities_are_valid() {
        assert!((0.0..=1.0).contains(&DEFAULT_ELITE_CHANCE));
        assert!((0.0..=1.0).contains(&BLIND_MISS_CHANCE));
    }

    #[test]
    fn test_timers_are_positive() {
        assert!(ACTIVATION_POLL_INTERVAL > 0.0);
        assert!(PATROL_WAIT_TIME > 0.0);
        assert!(DEATH_ANIMATION_TIME > 0.0);
        assert!(DEFAULT_TICK_RATE > 0.0);
    }
}
