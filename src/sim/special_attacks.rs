//! Special Attacks
//!
//! Elemental kits carried by elite enemies. Definitions are data-driven and
//! loaded from `assets/config/special_attacks.ron`; at runtime they are
//! immutable and shared between every enemy assigned the same kit.
//!
//! Dispatch is a single `execute` over the closed `Delivery` enum. Each call
//! produces exactly one transient effect; the effect entity is then
//! responsible for finding the target and delivering the kit.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use super::components::GameRng;
use super::effects::{AreaEffect, Projectile, TransientEffect, WaveEffect};
use super::status::{StatusEffect, StatusKind};
use super::utils::{flat_direction, parse_ron, read_ron};

/// Built-in definitions, embedded so the simulation never starts without them
const BUILTIN_SPECIAL_ATTACKS: &str = include_str!("../../assets/config/special_attacks.ron");

/// Elemental families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Ice,
    Shadow,
    Earth,
    Storm,
}

impl Element {
    pub fn all() -> [Element; 5] {
        [
            Element::Fire,
            Element::Ice,
            Element::Shadow,
            Element::Earth,
            Element::Storm,
        ]
    }
}

/// What a kit does to whoever it hits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementalKit {
    Fire {
        burn_duration: f32,
        burn_damage_per_second: f32,
    },
    Ice {
        freeze_duration: f32,
        slow_duration: f32,
        /// Movement multiplier while slowed (0.6 = 40% slower)
        slow_multiplier: f32,
    },
    Shadow {
        blind_duration: f32,
        silence_duration: f32,
    },
    Earth {
        root_duration: f32,
        defense_debuff_duration: f32,
        /// Damage taken multiplier while debuffed
        defense_multiplier: f32,
    },
    Storm {
        knockback_distance: f32,
        stun_duration: f32,
    },
}

impl ElementalKit {
    pub fn element(&self) -> Element {
        match self {
            ElementalKit::Fire { .. } => Element::Fire,
            ElementalKit::Ice { .. } => Element::Ice,
            ElementalKit::Shadow { .. } => Element::Shadow,
            ElementalKit::Earth { .. } => Element::Earth,
            ElementalKit::Storm { .. } => Element::Storm,
        }
    }

    /// Debuffs this kit applies, tagged with the attack's name
    pub fn status_effects(&self, source: &str) -> SmallVec<[StatusEffect; 2]> {
        match *self {
            ElementalKit::Fire {
                burn_duration,
                burn_damage_per_second,
            } => smallvec![StatusEffect::new(
                StatusKind::Burn,
                burn_duration,
                burn_damage_per_second,
                source
            )],
            ElementalKit::Ice {
                freeze_duration,
                slow_duration,
                slow_multiplier,
            } => smallvec![
                StatusEffect::new(StatusKind::Freeze, freeze_duration, 0.0, source),
                StatusEffect::new(StatusKind::Slow, slow_duration, slow_multiplier, source),
            ],
            ElementalKit::Shadow {
                blind_duration,
                silence_duration,
            } => smallvec![
                StatusEffect::new(StatusKind::Blind, blind_duration, 0.0, source),
                StatusEffect::new(StatusKind::Silence, silence_duration, 0.0, source),
            ],
            ElementalKit::Earth {
                root_duration,
                defense_debuff_duration,
                defense_multiplier,
            } => smallvec![
                StatusEffect::new(StatusKind::Root, root_duration, 0.0, source),
                StatusEffect::new(
                    StatusKind::DefenseDown,
                    defense_debuff_duration,
                    defense_multiplier,
                    source
                ),
            ],
            ElementalKit::Storm { stun_duration, .. } => {
                smallvec![StatusEffect::new(StatusKind::Stun, stun_duration, 0.0, source)]
            }
        }
    }

    /// Distance the target is pushed away from the effect origin
    pub fn knockback_distance(&self) -> f32 {
        match self {
            ElementalKit::Storm {
                knockback_distance, ..
            } => *knockback_distance,
            _ => 0.0,
        }
    }

    fn validate(&self) -> Result<(), String> {
        let durations: SmallVec<[f32; 2]> = self.status_effects("").iter().map(|e| e.remaining).collect();
        if durations.iter().any(|d| *d < 0.0) {
            return Err("durations must be non-negative".to_string());
        }
        match *self {
            ElementalKit::Fire {
                burn_damage_per_second,
                ..
            } if burn_damage_per_second < 0.0 => {
                Err("burn_damage_per_second must be non-negative".to_string())
            }
            ElementalKit::Ice {
                slow_multiplier, ..
            } if !(0.0..=1.0).contains(&slow_multiplier) => {
                Err(format!("slow_multiplier {} must be within [0, 1]", slow_multiplier))
            }
            ElementalKit::Earth {
                defense_multiplier,
                ..
            } if defense_multiplier < 1.0 => {
                Err(format!("defense_multiplier {} must be at least 1", defense_multiplier))
            }
            ElementalKit::Storm {
                knockback_distance,
                ..
            } if knockback_distance < 0.0 => {
                Err("knockback_distance must be non-negative".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// How the kit reaches its target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Delivery {
    /// Straight-flying missile destroyed on first collision
    Projectile { speed: f32, hit_radius: f32 },
    /// Forward sweep that hits at most once
    Wave { speed: f32, width: f32 },
    /// Delayed blast centred on the target's position at cast time
    GroundArea { radius: f32, delay: f32 },
    /// Delayed blast centred on the caster
    SelfArea { radius: f32, delay: f32 },
}

impl Delivery {
    pub fn name(&self) -> &'static str {
        match self {
            Delivery::Projectile { .. } => "projectile",
            Delivery::Wave { .. } => "wave",
            Delivery::GroundArea { .. } => "ground area",
            Delivery::SelfArea { .. } => "self area",
        }
    }

    fn validate(&self) -> Result<(), String> {
        let ok = match *self {
            Delivery::Projectile { speed, hit_radius } => speed > 0.0 && hit_radius > 0.0,
            Delivery::Wave { speed, width } => speed > 0.0 && width > 0.0,
            Delivery::GroundArea { radius, delay } | Delivery::SelfArea { radius, delay } => {
                radius > 0.0 && delay >= 0.0
            }
        };
        if ok {
            Ok(())
        } else {
            Err(format!("{} delivery has non-positive parameters", self.name()))
        }
    }
}

/// One elemental special attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialAttackDefinition {
    pub name: String,
    pub kit: ElementalKit,
    pub delivery: Delivery,
    /// Share of the target's max health dealt on hit
    pub instant_damage_fraction: f32,
    /// Seconds between casts
    pub cooldown: f32,
    /// Seconds the transient effect lives
    pub lifetime: f32,
    /// Handle of the visual effect a renderer would attach
    #[serde(default)]
    pub visual_effect: Option<String>,
}

impl SpecialAttackDefinition {
    pub fn element(&self) -> Element {
        self.kit.element()
    }

    pub fn validate(&self) -> Result<(), String> {
        let context = |e: String| format!("special attack '{}': {}", self.name, e);
        if self.name.trim().is_empty() {
            return Err("special attack with empty name".to_string());
        }
        if !(0.0..=1.0).contains(&self.instant_damage_fraction) {
            return Err(context(format!(
                "instant_damage_fraction {} must be within [0, 1]",
                self.instant_damage_fraction
            )));
        }
        if self.cooldown < 0.0 {
            return Err(context("cooldown must be non-negative".to_string()));
        }
        if self.lifetime <= 0.0 {
            return Err(context("lifetime must be positive".to_string()));
        }
        self.kit.validate().map_err(context)?;
        self.delivery.validate().map_err(context)
    }
}

/// Root structure for special_attacks.ron
#[derive(Debug, Serialize, Deserialize)]
pub struct SpecialAttacksConfig {
    pub attacks: Vec<SpecialAttackDefinition>,
}

/// Every special attack available to spawners, keyed by name.
///
/// Ordered by name so seeded random picks are reproducible.
#[derive(Resource, Debug, Clone, Default)]
pub struct SpecialAttackLibrary {
    definitions: BTreeMap<String, Arc<SpecialAttackDefinition>>,
}

impl SpecialAttackLibrary {
    /// Build from a loaded config, validating every definition
    pub fn new(config: SpecialAttacksConfig) -> Result<Self, String> {
        let mut definitions = BTreeMap::new();
        for definition in config.attacks {
            definition.validate()?;
            let name = definition.name.clone();
            if definitions.insert(name.clone(), Arc::new(definition)).is_some() {
                return Err(format!("Duplicate special attack '{}'", name));
            }
        }
        Ok(Self { definitions })
    }

    /// The definitions shipped with the crate
    pub fn builtin() -> Result<Self, String> {
        Self::new(parse_ron(BUILTIN_SPECIAL_ATTACKS, "built-in special_attacks.ron")?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let library = Self::new(read_ron(path)?)?;
        info!(
            "Loaded {} special attack definitions from {}",
            library.len(),
            path.display()
        );
        Ok(library)
    }

    pub fn get(&self, name: &str) -> Option<Arc<SpecialAttackDefinition>> {
        self.definitions.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SpecialAttackDefinition>> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Uniformly pick a definition from `pool` (every definition when empty).
    /// Unknown names are logged and ignored; None when nothing remains.
    pub fn pick(&self, pool: &[String], rng: &mut GameRng) -> Option<Arc<SpecialAttackDefinition>> {
        let candidates: Vec<&Arc<SpecialAttackDefinition>> = if pool.is_empty() {
            self.definitions.values().collect()
        } else {
            pool.iter()
                .filter_map(|name| {
                    let found = self.definitions.get(name);
                    if found.is_none() {
                        warn!("Unknown special attack '{}' in pool, skipping", name);
                    }
                    found
                })
                .collect()
        };

        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.random_index(candidates.len())].clone())
    }
}

/// A transient effect ready to be spawned at a position
#[derive(Debug)]
pub struct EffectSpawn {
    pub position: Vec3,
    pub effect: TransientEffect,
}

/// Turn a cast into the transient effect that will deliver it
pub fn execute(
    definition: &Arc<SpecialAttackDefinition>,
    caster: Entity,
    caster_position: Vec3,
    target_position: Vec3,
) -> EffectSpawn {
    let direction = flat_direction(caster_position, target_position);
    match definition.delivery {
        Delivery::Projectile { speed, hit_radius } => EffectSpawn {
            position: caster_position,
            effect: TransientEffect::Projectile(Projectile {
                definition: definition.clone(),
                caster,
                velocity: direction * speed,
                hit_radius,
                lifetime: definition.lifetime,
            }),
        },
        Delivery::Wave { speed, width } => EffectSpawn {
            position: caster_position,
            effect: TransientEffect::Wave(WaveEffect {
                definition: definition.clone(),
                caster,
                origin: caster_position,
                direction,
                speed,
                width,
                front: 0.0,
                lifetime: definition.lifetime,
                triggered: false,
            }),
        },
        Delivery::GroundArea { radius, delay } => EffectSpawn {
            position: target_position,
            effect: TransientEffect::Area(AreaEffect {
                definition: definition.clone(),
                caster,
                radius,
                delay,
                resolved: false,
            }),
        },
        Delivery::SelfArea { radius, delay } => EffectSpawn {
            position: caster_position,
            effect: TransientEffect::Area(AreaEffect {
                definition: definition.clone(),
                caster,
                radius,
                delay,
                resolved: false,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(delivery: Delivery) -> Arc<SpecialAttackDefinition> {
        Arc::new(SpecialAttackDefinition {
            name: "Test".to_string(),
            kit: ElementalKit::Fire {
                burn_duration: 3.0,
                burn_damage_per_second: 4.0,
            },
            delivery,
            instant_damage_fraction: 0.1,
            cooldown: 5.0,
            lifetime: 2.0,
            visual_effect: None,
        })
    }

    #[test]
    fn test_builtin_library_loads_and_covers_every_element() {
        let library = SpecialAttackLibrary::builtin().expect("built-in config should parse");
        assert!(!library.is_empty());

        for element in Element::all() {
            assert!(
                library.iter().any(|d| d.element() == element),
                "{:?} should have at least one built-in attack",
                element
            );
        }
    }

    #[test]
    fn test_builtin_library_covers_every_delivery() {
        let library = SpecialAttackLibrary::builtin().unwrap();
        let deliveries: Vec<&'static str> = library.iter().map(|d| d.delivery.name()).collect();
        for name in ["projectile", "wave", "ground area", "self area"] {
            assert!(deliveries.contains(&name), "missing {} delivery", name);
        }
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let d = (*definition(Delivery::Projectile { speed: 10.0, hit_radius: 1.0 })).clone();
        let config = SpecialAttacksConfig {
            attacks: vec![d.clone(), d],
        };
        assert!(SpecialAttackLibrary::new(config).is_err());
    }

    #[test]
    fn test_out_of_range_fraction_is_rejected() {
        let mut d = (*definition(Delivery::SelfArea { radius: 3.0, delay: 0.5 })).clone();
        d.instant_damage_fraction = 1.5;
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_projectile_flies_toward_target() {
        let def = definition(Delivery::Projectile { speed: 10.0, hit_radius: 1.0 });
        let caster = Entity::from_raw(1);
        let spawn = execute(&def, caster, Vec3::ZERO, Vec3::new(0.0, 0.0, 8.0));

        assert_eq!(spawn.position, Vec3::ZERO);
        match spawn.effect {
            TransientEffect::Projectile(p) => {
                assert_eq!(p.velocity, Vec3::new(0.0, 0.0, 10.0));
                assert_eq!(p.caster, caster);
                assert_eq!(p.lifetime, 2.0);
            }
            other => panic!("expected projectile, got {:?}", other),
        }
    }

    #[test]
    fn test_ground_area_centres_on_target_and_self_area_on_caster() {
        let caster = Entity::from_raw(1);
        let target = Vec3::new(5.0, 0.0, 5.0);

        let ground = execute(
            &definition(Delivery::GroundArea { radius: 3.0, delay: 1.0 }),
            caster,
            Vec3::ZERO,
            target,
        );
        assert_eq!(ground.position, target);
        assert!(matches!(ground.effect, TransientEffect::Area(_)));

        let own = execute(
            &definition(Delivery::SelfArea { radius: 3.0, delay: 1.0 }),
            caster,
            Vec3::ZERO,
            target,
        );
        assert_eq!(own.position, Vec3::ZERO);
    }

    #[test]
    fn test_wave_starts_untriggered() {
        let spawn = execute(
            &definition(Delivery::Wave { speed: 8.0, width: 3.0 }),
            Entity::from_raw(1),
            Vec3::ZERO,
            Vec3::new(4.0, 0.0, 0.0),
        );
        match spawn.effect {
            TransientEffect::Wave(w) => {
                assert!(!w.triggered);
                assert_eq!(w.direction, Vec3::X);
                assert_eq!(w.front, 0.0);
            }
            other => panic!("expected wave, got {:?}", other),
        }
    }

    #[test]
    fn test_kit_effects() {
        let ice = ElementalKit::Ice {
            freeze_duration: 1.0,
            slow_duration: 3.0,
            slow_multiplier: 0.5,
        };
        let effects = ice.status_effects("Frost Wave");
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0].kind, StatusKind::Freeze);
        assert_eq!(effects[1].kind, StatusKind::Slow);
        assert_eq!(effects[1].magnitude, 0.5);

        let storm = ElementalKit::Storm {
            knockback_distance: 4.0,
            stun_duration: 1.5,
        };
        assert_eq!(storm.knockback_distance(), 4.0);
        assert_eq!(ice.knockback_distance(), 0.0);
    }

    #[test]
    fn test_pick_respects_pool_and_ignores_unknown_names() {
        let library = SpecialAttackLibrary::builtin().unwrap();
        let first = library.names().next().unwrap().to_string();
        let mut rng = GameRng::from_seed(3);

        let pool = vec!["No Such Attack".to_string(), first.clone()];
        for _ in 0..20 {
            let picked = library.pick(&pool, &mut rng).unwrap();
            assert_eq!(picked.name, first);
        }

        let empty_result = library.pick(&["Nope".to_string()], &mut rng);
        assert!(empty_result.is_none());
    }
}
