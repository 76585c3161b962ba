//! Enemy Templates
//!
//! Per-kind base stats and rewards, loaded from `assets/config/enemies.ron`.
//! Templates are read-only once loaded; spawners derive each enemy's stats
//! from them exactly once at build time.

use std::collections::BTreeMap;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::constants::PATROL_WAIT_TIME;
use super::enemy::{EnemyStats, Rewards};
use super::utils::{parse_ron, read_ron};

const BUILTIN_ENEMIES: &str = include_str!("../../assets/config/enemies.ron");

/// Base definition of one enemy kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub name: String,
    pub max_health: f32,
    pub attack_power: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub move_speed: f32,
    pub patrol_radius: f32,
    pub detection_range: f32,
    /// Distance at which a chase is given up
    pub chase_abandon_range: f32,
    #[serde(default = "default_patrol_wait_time")]
    pub patrol_wait_time: f32,
    pub experience: u32,
    pub currency: u32,
    /// Probability in [0, 1] of a loot drop on death
    pub drop_chance: f32,
    pub loot_table: String,
}

fn default_patrol_wait_time() -> f32 {
    PATROL_WAIT_TIME
}

impl EnemyTemplate {
    /// Stats for one instance; the multiplier scales health and attack power only
    pub fn stats(&self, multiplier: f32) -> EnemyStats {
        let max_health = self.max_health * multiplier;
        EnemyStats {
            max_health,
            current_health: max_health,
            attack_power: self.attack_power * multiplier,
            attack_range: self.attack_range,
            attack_cooldown: self.attack_cooldown,
            move_speed: self.move_speed,
            patrol_radius: self.patrol_radius,
            detection_range: self.detection_range,
            chase_abandon_range: self.chase_abandon_range,
        }
    }

    pub fn rewards(&self) -> Rewards {
        Rewards {
            experience: self.experience,
            currency: self.currency,
            drop_chance: self.drop_chance,
            loot_table: self.loot_table.clone(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        let context = |e: &str| format!("enemy template '{}': {}", self.name, e);
        if self.max_health <= 0.0 {
            return Err(context("max_health must be positive"));
        }
        if self.attack_cooldown <= 0.0 {
            return Err(context("attack_cooldown must be positive"));
        }
        if self.detection_range < 0.0 || self.attack_range < 0.0 || self.patrol_radius < 0.0 {
            return Err(context("ranges must be non-negative"));
        }
        if self.chase_abandon_range < self.attack_range {
            return Err(context("chase_abandon_range must cover attack_range"));
        }
        Ok(())
    }
}

/// Root structure for enemies.ron
#[derive(Debug, Serialize, Deserialize)]
pub struct EnemyTemplatesConfig {
    pub enemies: Vec<EnemyTemplate>,
}

/// All enemy kinds by name
#[derive(Resource, Debug, Clone, Default)]
pub struct EnemyTemplates {
    templates: BTreeMap<String, EnemyTemplate>,
}

impl EnemyTemplates {
    pub fn new(config: EnemyTemplatesConfig) -> Result<Self, String> {
        let mut templates = BTreeMap::new();
        for template in config.enemies {
            template.validate()?;
            let name = template.name.clone();
            if templates.insert(name.clone(), template).is_some() {
                return Err(format!("Duplicate enemy template '{}'", name));
            }
        }
        Ok(Self { templates })
    }

    pub fn builtin() -> Result<Self, String> {
        Self::new(parse_ron(BUILTIN_ENEMIES, "built-in enemies.ron")?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let templates = Self::new(read_ron(path)?)?;
        info!("Loaded {} enemy templates from {}", templates.len(), path.display());
        Ok(templates)
    }

    pub fn get(&self, name: &str) -> Option<&EnemyTemplate> {
        self.templates.get(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
