//! Shared Components and Resources
//!
//! Small ECS types used by several simulation modules. Domain-specific
//! components (`Enemy`, `Hero`, `EnemyGroup`, effect entities) live next to
//! the systems that own them.

use bevy::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;

// ============================================================================
// Resources
// ============================================================================

/// Seeded random number generator for deterministic simulation.
///
/// When a seed is provided (e.g., via scenario config), the same seed will
/// always produce the same run. Without a seed, uses system entropy.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    /// Create a new GameRng with a specific seed for deterministic behavior
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a new GameRng with random entropy (non-deterministic)
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Generate a random f32 in the range [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Generate a random f32 in the given range
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random_f32() * (max - min)
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn random_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Bernoulli roll; `chance` is clamped to [0, 1]
    pub fn chance(&mut self, chance: f32) -> bool {
        let chance = chance.clamp(0.0, 1.0);
        if chance >= 1.0 {
            return true;
        }
        self.random_f32() < chance
    }

    /// Uniform point on the XZ disc of `radius` around `center`, keeping its Y
    pub fn point_in_disc(&mut self, center: Vec3, radius: f32) -> Vec3 {
        let angle = self.random_range(0.0, std::f32::consts::TAU);
        let distance = radius.max(0.0) * self.random_f32().sqrt();
        center + Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance)
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

// ============================================================================
// Markers
// ============================================================================

/// Marks members of a spawn group that has not been activated yet.
/// Dormant enemies are skipped by every per-tick system.
#[derive(Component, Debug, Default)]
pub struct Dormant;

/// Counts down a dead actor's death animation before it is despawned
#[derive(Component, Debug)]
pub struct DeathTimer {
    pub remaining: f32,
}

/// Removes finished corpses from the simulation
pub fn despawn_finished_corpses(
    mut commands: Commands,
    time: Res<Time>,
    mut corpses: Query<(Entity, &mut DeathTimer)>,
) {
    let dt = time.delta_secs();
    for (entity, mut timer) in corpses.iter_mut() {
        timer.remaining -= dt;
        if timer.remaining <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // GameRng Tests
    // =========================================================================

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let seed = 42;
        let mut rng1 = GameRng::from_seed(seed);
        let mut rng2 = GameRng::from_seed(seed);

        for _ in 0..100 {
            assert_eq!(rng1.random_f32(), rng2.random_f32());
        }
    }

    #[test]
    fn test_random_range() {
        let mut rng = GameRng::from_seed(123);

        for _ in 0..100 {
            let value = rng.random_range(10.0, 20.0);
            assert!(value >= 10.0, "Value {} should be >= 10.0", value);
            assert!(value < 20.0, "Value {} should be < 20.0", value);
        }
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = GameRng::from_seed(7);
        for _ in 0..100 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
            assert!(rng.chance(3.0), "chance above 1 clamps to certain");
            assert!(!rng.chance(-1.0), "chance below 0 clamps to never");
        }
    }

    #[test]
    fn test_point_in_disc_stays_inside_and_flat() {
        let mut rng = GameRng::from_seed(9);
        let center = Vec3::new(10.0, 2.0, -5.0);

        for _ in 0..200 {
            let p = rng.point_in_disc(center, 4.0);
            assert_eq!(p.y, 2.0);
            assert!(p.distance(center) <= 4.0 + 1e-4);
        }
    }

    #[test]
    fn test_random_index_in_bounds() {
        let mut rng = GameRng::from_seed(11);
        for _ in 0..100 {
            assert!(rng.random_index(3) < 3);
        }
    }
}
