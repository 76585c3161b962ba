//! Progression
//!
//! The collaborators enemies report to when they die: experience and
//! currency, loot, the hero's inventory and equipment, and the save data
//! that persists them between runs.

pub mod equipment;
pub mod experience;
pub mod loot;
pub mod save;

pub use equipment::{equip_from_inventory, Equipment, EquipmentSlot, Inventory, ItemStack};
pub use experience::{LevelTable, Progression};
pub use loot::{roll_drop, DroppedItem, LootTables};
pub use save::{Persistent, SaveData};
