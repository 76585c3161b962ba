//! Loot
//!
//! Weighted drop tables and the item entities they place in the world.
//! Enemies only request a spawn; whether an item lands and who picks it up
//! is handled here.

use std::collections::BTreeMap;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::events::LootSpawnRequest;
use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::settings::SimSettings;
use crate::sim::components::GameRng;
use crate::sim::damage::Damageable;
use crate::sim::hero::Hero;
use crate::sim::utils::{flat_distance, parse_ron, read_ron};

use super::equipment::Inventory;

const BUILTIN_LOOT: &str = include_str!("../../assets/config/loot.ron");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item: String,
    pub weight: u32,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootTable {
    pub name: String,
    pub entries: Vec<LootEntry>,
}

impl LootTable {
    fn total_weight(&self) -> u32 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// Weighted pick; None for an empty or zero-weight table
    pub fn roll(&self, rng: &mut GameRng) -> Option<&LootEntry> {
        let total = self.total_weight();
        if total == 0 {
            return None;
        }
        let mut pick = rng.random_index(total as usize) as u32;
        for entry in &self.entries {
            if pick < entry.weight {
                return Some(entry);
            }
            pick -= entry.weight;
        }
        None
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LootTablesConfig {
    pub tables: Vec<LootTable>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct LootTables {
    tables: BTreeMap<String, LootTable>,
}

impl LootTables {
    pub fn new(config: LootTablesConfig) -> Result<Self, String> {
        let mut tables = BTreeMap::new();
        for table in config.tables {
            let name = table.name.clone();
            if tables.insert(name.clone(), table).is_some() {
                return Err(format!("Duplicate loot table '{}'", name));
            }
        }
        Ok(Self { tables })
    }

    pub fn builtin() -> Result<Self, String> {
        Self::new(parse_ron(BUILTIN_LOOT, "built-in loot.ron")?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let tables = Self::new(read_ron(path)?)?;
        info!("Loaded {} loot tables from {}", tables.tables.len(), path.display());
        Ok(tables)
    }

    pub fn get(&self, name: &str) -> Option<&LootTable> {
        self.tables.get(name)
    }
}

/// Whether a kill drops anything; `chance` is clamped to [0, 1]
pub fn roll_drop(chance: f32, rng: &mut GameRng) -> bool {
    rng.chance(chance)
}

/// An item lying on the ground
#[derive(Component, Debug, Clone, PartialEq)]
pub struct DroppedItem {
    pub item: String,
    pub count: u32,
}

/// Place an item for each loot request
pub fn spawn_loot(
    mut commands: Commands,
    mut requests: EventReader<LootSpawnRequest>,
    tables: Res<LootTables>,
    mut rng: ResMut<GameRng>,
    mut combat_log: ResMut<CombatLog>,
) {
    for request in requests.read() {
        let Some(table) = tables.get(&request.table) else {
            warn!("Unknown loot table '{}', nothing dropped", request.table);
            continue;
        };
        let Some(entry) = table.roll(&mut rng) else {
            continue;
        };

        commands.spawn((
            DroppedItem {
                item: entry.item.clone(),
                count: entry.count,
            },
            Transform::from_translation(request.position),
        ));
        combat_log.log(
            CombatLogEventType::Loot,
            format!(
                "{} x{} dropped at ({:.1}, {:.1})",
                entry.item, entry.count, request.position.x, request.position.z
            ),
        );
    }
}

/// Live heroes collect items within the pickup radius
pub fn pickup_items(
    mut commands: Commands,
    heroes: Query<(&Hero, &Transform)>,
    items: Query<(Entity, &DroppedItem, &Transform), Without<Hero>>,
    settings: Res<SimSettings>,
    mut inventory: ResMut<Inventory>,
    mut combat_log: ResMut<CombatLog>,
) {
    for (hero, hero_transform) in heroes.iter() {
        if !hero.is_alive() {
            continue;
        }
        for (entity, dropped, transform) in items.iter() {
            if flat_distance(hero_transform.translation, transform.translation) > settings.item_pickup_radius {
                continue;
            }
            inventory.add(&dropped.item, dropped.count);
            commands.entity(entity).despawn();
            combat_log.log(
                CombatLogEventType::Loot,
                format!("{} picks up {} x{}", hero.name, dropped.item, dropped.count),
            );
        }
    }
}
