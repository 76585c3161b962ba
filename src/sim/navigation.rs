//! Navigation
//!
//! The pathfinding collaborator the enemy state machine talks to. The
//! surface itself is pluggable (`NavigationSurface`); the simulation ships
//! `OpenGround`, a bounded plane with circular obstacles that only accepts
//! straight-line paths. Agents never fail on unreachable points: the surface
//! reports `PathStatus::Invalid` and the caller decides what to do.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::components::{Dormant, GameRng};
use super::constants::{ARRIVAL_TOLERANCE, PATROL_SAMPLE_ATTEMPTS};

/// Result of a path query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    /// The destination can be reached
    Complete,
    /// Only part of the way can be travelled
    Partial,
    /// The destination is off the walkable surface
    Invalid,
}

/// A walkable surface answering path and placement queries
pub trait NavigationSurface: Send + Sync + 'static {
    /// Classify the path between two points
    fn compute_path(&self, from: Vec3, to: Vec3) -> PathStatus;

    /// Whether a point is outside the walkable area
    fn blocks(&self, point: Vec3) -> bool;

    /// Random point within `radius` of `center` that `from` can walk to
    fn sample_reachable_point(
        &self,
        from: Vec3,
        center: Vec3,
        radius: f32,
        rng: &mut GameRng,
    ) -> Option<Vec3> {
        (0..PATROL_SAMPLE_ATTEMPTS)
            .map(|_| rng.point_in_disc(center, radius))
            .find(|&candidate| self.compute_path(from, candidate) == PathStatus::Complete)
    }
}

/// Resource holding the active navigation surface
#[derive(Resource)]
pub struct Navigation {
    surface: Box<dyn NavigationSurface>,
}

impl Navigation {
    pub fn new(surface: impl NavigationSurface) -> Self {
        Self {
            surface: Box::new(surface),
        }
    }

    pub fn surface(&self) -> &dyn NavigationSurface {
        self.surface.as_ref()
    }
}

// ============================================================================
// OpenGround
// ============================================================================

/// Circular obstacle on the XZ plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Center as (x, z)
    pub center: [f32; 2],
    pub radius: f32,
}

impl Obstacle {
    fn contains(&self, point: Vec2) -> bool {
        point.distance(Vec2::from_array(self.center)) < self.radius
    }

    /// Whether the segment a-b passes through the obstacle
    fn intersects_segment(&self, a: Vec2, b: Vec2) -> bool {
        let center = Vec2::from_array(self.center);
        let ab = b - a;
        let length_sq = ab.length_squared();
        let t = if length_sq > 0.0 {
            ((center - a).dot(ab) / length_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (a + ab * t).distance(center) < self.radius
    }
}

/// Square walkable plane centred on the origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenGround {
    /// Half the side length of the walkable square
    pub half_extent: f32,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

impl Default for OpenGround {
    fn default() -> Self {
        Self {
            half_extent: 100.0,
            obstacles: Vec::new(),
        }
    }
}

fn flat(point: Vec3) -> Vec2 {
    Vec2::new(point.x, point.z)
}

impl NavigationSurface for OpenGround {
    fn compute_path(&self, from: Vec3, to: Vec3) -> PathStatus {
        if self.blocks(to) {
            return PathStatus::Invalid;
        }
        let (a, b) = (flat(from), flat(to));
        if self.obstacles.iter().any(|o| o.intersects_segment(a, b)) {
            return PathStatus::Partial;
        }
        PathStatus::Complete
    }

    fn blocks(&self, point: Vec3) -> bool {
        let p = flat(point);
        p.x.abs() > self.half_extent
            || p.y.abs() > self.half_extent
            || self.obstacles.iter().any(|o| o.contains(p))
    }
}

// ============================================================================
// NavAgent
// ============================================================================

/// Per-entity navigation state, the agent half of the navigator contract
#[derive(Component, Debug, Clone)]
pub struct NavAgent {
    /// Movement speed in units per second
    pub speed: f32,
    destination: Option<Vec3>,
    last_status: PathStatus,
    remaining_distance: f32,
    path_pending: bool,
    stopped: bool,
    enabled: bool,
}

impl NavAgent {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            destination: None,
            last_status: PathStatus::Complete,
            remaining_distance: 0.0,
            path_pending: false,
            stopped: false,
            enabled: true,
        }
    }

    /// Request a path to `point`. Only complete paths are followed; any other
    /// status leaves the agent without a destination.
    pub fn set_destination(
        &mut self,
        from: Vec3,
        point: Vec3,
        surface: &dyn NavigationSurface,
    ) -> PathStatus {
        if !self.enabled {
            return PathStatus::Invalid;
        }

        let status = surface.compute_path(from, point);
        self.last_status = status;
        if status == PathStatus::Complete {
            self.destination = Some(point);
            self.remaining_distance = flat(from).distance(flat(point));
            self.path_pending = true;
            self.stopped = false;
        } else {
            self.clear_path();
        }
        status
    }

    /// Hold position until the next destination request
    pub fn stop(&mut self) {
        self.clear_path();
        self.stopped = true;
    }

    /// Drop the current path
    pub fn reset_path(&mut self) {
        self.clear_path();
        self.stopped = false;
    }

    fn clear_path(&mut self) {
        self.destination = None;
        self.remaining_distance = 0.0;
        self.path_pending = false;
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn last_status(&self) -> PathStatus {
        self.last_status
    }

    pub fn remaining_distance(&self) -> f32 {
        self.remaining_distance
    }

    /// True between a destination request and the next movement step
    pub fn is_path_pending(&self) -> bool {
        self.path_pending
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// No pending path and nothing left to walk
    pub fn has_arrived(&self) -> bool {
        self.enabled && !self.path_pending && self.remaining_distance <= ARRIVAL_TOLERANCE
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.clear_path();
        }
    }

    /// Advance `position` toward the destination by one step
    pub fn step(&mut self, position: &mut Vec3, dt: f32) {
        self.path_pending = false;
        if !self.enabled || self.stopped {
            return;
        }
        let Some(destination) = self.destination else {
            return;
        };

        let offset = flat(destination) - flat(*position);
        let distance = offset.length();
        let travel = self.speed * dt;
        if distance <= travel || distance <= f32::EPSILON {
            position.x = destination.x;
            position.z = destination.z;
            self.remaining_distance = 0.0;
        } else {
            let direction = offset / distance;
            position.x += direction.x * travel;
            position.z += direction.y * travel;
            self.remaining_distance = distance - travel;
        }
    }
}

/// Moves every active agent along its path
pub fn move_nav_agents(
    time: Res<Time>,
    mut agents: Query<(&mut NavAgent, &mut Transform), Without<Dormant>>,
) {
    let dt = time.delta_secs();
    for (mut agent, mut transform) in agents.iter_mut() {
        agent.step(&mut transform.translation, dt);
    }
}
