//! World Sensor
//!
//! Read-only view of damageable targets. Every lookup goes through the live
//! world, so a target that despawned or died simply stops showing up.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use smallvec::SmallVec;

use super::damage::Damageable;
use super::hero::Hero;
use super::utils::flat_distance;

/// Restricts which targets a query returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetFilter {
    pub exclude: Option<Entity>,
}

/// A target found by the sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensedTarget {
    pub entity: Entity,
    pub position: Vec3,
    pub distance: f32,
}

pub type SensedTargets = SmallVec<[SensedTarget; 4]>;

#[derive(SystemParam)]
pub struct TargetSensor<'w, 's> {
    targets: Query<'w, 's, (Entity, &'static Hero, &'static Transform)>,
}

impl TargetSensor<'_, '_> {
    /// Live targets within `radius` of `origin`, nearest first. Empty when
    /// nothing is in range.
    pub fn find_damageable_targets_within(
        &self,
        origin: Vec3,
        radius: f32,
        filter: TargetFilter,
    ) -> SensedTargets {
        let mut found: SensedTargets = self
            .targets
            .iter()
            .filter(|(entity, hero, _)| hero.is_alive() && filter.exclude != Some(*entity))
            .map(|(entity, _, transform)| SensedTarget {
                entity,
                position: transform.translation,
                distance: flat_distance(origin, transform.translation),
            })
            .filter(|target| target.distance <= radius)
            .collect();
        found.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        found
    }

    pub fn nearest(&self, origin: Vec3, radius: f32, filter: TargetFilter) -> Option<SensedTarget> {
        self.find_damageable_targets_within(origin, radius, filter)
            .into_iter()
            .next()
    }

    /// Position of a target that still exists and is alive
    pub fn position_of(&self, entity: Entity) -> Option<Vec3> {
        self.targets
            .get(entity)
            .ok()
            .filter(|(_, hero, _)| hero.is_alive())
            .map(|(_, _, transform)| transform.translation)
    }
}
