//! Transient Effect Entities
//!
//! Short-lived entities spawned by special attacks. Each one owns the job of
//! finding its target and delivering the kit exactly once:
//!
//! - **Projectile**: flies straight; any collision (target, blocked ground,
//!   lifetime) destroys it.
//! - **Wave**: a front sweeping forward; disables itself after the first hit
//!   and lingers until its lifetime ends.
//! - **Area**: waits out its delay, hits everything inside, then despawns.

use std::sync::Arc;

use bevy::prelude::*;

use crate::combat::events::{SpecialAttackCast, SpecialHitEvent};

use super::hero::Hero;
use super::navigation::Navigation;
use super::sensor::{TargetFilter, TargetSensor};
use super::special_attacks::{execute, SpecialAttackDefinition};

/// One of the three effect shapes, ready to spawn
#[derive(Debug)]
pub enum TransientEffect {
    Projectile(Projectile),
    Wave(WaveEffect),
    Area(AreaEffect),
}

#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub definition: Arc<SpecialAttackDefinition>,
    pub caster: Entity,
    pub velocity: Vec3,
    pub hit_radius: f32,
    pub lifetime: f32,
}

#[derive(Component, Debug, Clone)]
pub struct WaveEffect {
    pub definition: Arc<SpecialAttackDefinition>,
    pub caster: Entity,
    pub origin: Vec3,
    /// Unit direction on the ground plane
    pub direction: Vec3,
    pub speed: f32,
    pub width: f32,
    /// Distance the front has travelled from the origin
    pub front: f32,
    pub lifetime: f32,
    /// Set on the first hit; a triggered wave never hits again
    pub triggered: bool,
}

impl WaveEffect {
    /// Whether `point` lies inside the band the front has swept
    pub fn covers(&self, point: Vec3) -> bool {
        let offset = Vec3::new(point.x - self.origin.x, 0.0, point.z - self.origin.z);
        let along = offset.dot(self.direction);
        if along < 0.0 || along > self.front {
            return false;
        }
        let lateral = (offset - self.direction * along).length();
        lateral <= self.width * 0.5
    }
}

#[derive(Component, Debug, Clone)]
pub struct AreaEffect {
    pub definition: Arc<SpecialAttackDefinition>,
    pub caster: Entity,
    pub radius: f32,
    /// Seconds until the blast resolves
    pub delay: f32,
    pub resolved: bool,
}

/// Turn each cast into its effect entity
pub fn dispatch_special_attacks(mut commands: Commands, mut casts: EventReader<SpecialAttackCast>) {
    for cast in casts.read() {
        let spawn = execute(
            &cast.definition,
            cast.caster,
            cast.caster_position,
            cast.target_position,
        );
        let transform = Transform::from_translation(spawn.position);
        match spawn.effect {
            TransientEffect::Projectile(projectile) => {
                commands.spawn((projectile, transform));
            }
            TransientEffect::Wave(wave) => {
                commands.spawn((wave, transform));
            }
            TransientEffect::Area(area) => {
                commands.spawn((area, transform));
            }
        }
        debug!(
            "{} spawned as {} effect",
            cast.definition.name,
            cast.definition.delivery.name()
        );
    }
}

pub fn move_projectiles(
    time: Res<Time>,
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Transform), Without<Hero>>,
    sensor: TargetSensor,
    navigation: Option<Res<Navigation>>,
    mut hits: EventWriter<SpecialHitEvent>,
) {
    let dt = time.delta_secs();
    for (entity, mut projectile, mut transform) in projectiles.iter_mut() {
        projectile.lifetime -= dt;
        if projectile.lifetime <= 0.0 {
            commands.entity(entity).despawn();
            continue;
        }

        transform.translation += projectile.velocity * dt;
        let position = transform.translation;

        if let Some(target) = sensor.nearest(position, projectile.hit_radius, TargetFilter::default()) {
            hits.send(SpecialHitEvent {
                caster: projectile.caster,
                target: target.entity,
                definition: projectile.definition.clone(),
                origin: position,
            });
            commands.entity(entity).despawn();
            continue;
        }

        let blocked = navigation
            .as_ref()
            .map(|nav| nav.surface().blocks(position))
            .unwrap_or(false);
        if blocked {
            commands.entity(entity).despawn();
        }
    }
}

pub fn advance_waves(
    time: Res<Time>,
    mut commands: Commands,
    mut waves: Query<(Entity, &mut WaveEffect, &mut Transform), Without<Hero>>,
    sensor: TargetSensor,
    mut hits: EventWriter<SpecialHitEvent>,
) {
    let dt = time.delta_secs();
    for (entity, mut wave, mut transform) in waves.iter_mut() {
        wave.lifetime -= dt;
        if wave.lifetime <= 0.0 {
            commands.entity(entity).despawn();
            continue;
        }
        if wave.triggered {
            continue;
        }

        wave.front += wave.speed * dt;
        transform.translation = wave.origin + wave.direction * wave.front;

        let reach = wave.front + wave.width;
        let struck = sensor
            .find_damageable_targets_within(wave.origin, reach, TargetFilter::default())
            .into_iter()
            .find(|target| wave.covers(target.position));
        if let Some(target) = struck {
            wave.triggered = true;
            hits.send(SpecialHitEvent {
                caster: wave.caster,
                target: target.entity,
                definition: wave.definition.clone(),
                origin: wave.origin,
            });
        }
    }
}

pub fn resolve_area_effects(
    time: Res<Time>,
    mut commands: Commands,
    mut areas: Query<(Entity, &mut AreaEffect, &Transform), Without<Hero>>,
    sensor: TargetSensor,
    mut hits: EventWriter<SpecialHitEvent>,
) {
    let dt = time.delta_secs();
    for (entity, mut area, transform) in areas.iter_mut() {
        if area.resolved {
            continue;
        }
        area.delay -= dt;
        if area.delay > 0.0 {
            continue;
        }

        let centre = transform.translation;
        for target in sensor.find_damageable_targets_within(centre, area.radius, TargetFilter::default()) {
            hits.send(SpecialHitEvent {
                caster: area.caster,
                target: target.entity,
                definition: area.definition.clone(),
                origin: centre,
            });
        }
        area.resolved = true;
        commands.entity(entity).despawn();
    }
}
