//! Save Data
//!
//! A JSON blob holding what progression owns. Each manager copies exactly
//! its own fields in and out; a missing blob is logged and leaves state
//! untouched.

use std::collections::BTreeMap;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::equipment::{Equipment, EquipmentSlot, Inventory, ItemStack};
use super::experience::Progression;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub level: u32,
    pub experience: u32,
    #[serde(default)]
    pub currency: u32,
    #[serde(default)]
    pub equipped: BTreeMap<EquipmentSlot, String>,
    #[serde(default)]
    pub inventory: Vec<ItemStack>,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
            currency: 0,
            equipped: BTreeMap::new(),
            inventory: Vec::new(),
        }
    }
}

impl SaveData {
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read save file {}: {}", path.display(), e))?;
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse save file {}: {}", path.display(), e))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), String> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize save data: {}", e))?;
        std::fs::write(path, contents)
            .map_err(|e| format!("Failed to write save file {}: {}", path.display(), e))?;
        info!("Saved progress to {}", path.display());
        Ok(())
    }

    /// Capture every persistent manager at once
    pub fn capture(progression: &Progression, equipment: &Equipment, inventory: &Inventory) -> Self {
        let mut data = SaveData::default();
        progression.save_to_data(Some(&mut data));
        equipment.save_to_data(Some(&mut data));
        inventory.save_to_data(Some(&mut data));
        data
    }
}

/// A manager that round-trips its own fields through `SaveData`
pub trait Persistent {
    fn load_from_save_data(&mut self, data: Option<&SaveData>);
    fn save_to_data(&self, data: Option<&mut SaveData>);
}

impl Persistent for Progression {
    fn load_from_save_data(&mut self, data: Option<&SaveData>) {
        let Some(data) = data else {
            warn!("No save data for progression, keeping current state");
            return;
        };
        if data.level > self.levels().max_level() {
            warn!(
                "Saved level {} exceeds the level cap {}",
                data.level,
                self.levels().max_level()
            );
        }
        self.level = data.level.max(1);
        self.experience = data.experience;
        self.currency = data.currency;
    }

    fn save_to_data(&self, data: Option<&mut SaveData>) {
        let Some(data) = data else {
            warn!("No save data to write progression into");
            return;
        };
        data.level = self.level;
        data.experience = self.experience;
        data.currency = self.currency;
    }
}

impl Persistent for Equipment {
    fn load_from_save_data(&mut self, data: Option<&SaveData>) {
        let Some(data) = data else {
            warn!("No save data for equipment, keeping current state");
            return;
        };
        self.replace(data.equipped.clone());
    }

    fn save_to_data(&self, data: Option<&mut SaveData>) {
        let Some(data) = data else {
            warn!("No save data to write equipment into");
            return;
        };
        data.equipped = self.slots().clone();
    }
}

impl Persistent for Inventory {
    fn load_from_save_data(&mut self, data: Option<&SaveData>) {
        let Some(data) = data else {
            warn!("No save data for inventory, keeping current state");
            return;
        };
        self.replace(data.inventory.clone());
    }

    fn save_to_data(&self, data: Option<&mut SaveData>) {
        let Some(data) = data else {
            warn!("No save data to write inventory into");
            return;
        };
        data.inventory = self.stacks().to_vec();
    }
}
