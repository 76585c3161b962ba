//! Inventory and Equipment

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Weapon,
    Armor,
    Trinket,
}

impl EquipmentSlot {
    pub fn name(&self) -> &'static str {
        match self {
            EquipmentSlot::Weapon => "Weapon",
            EquipmentSlot::Armor => "Armor",
            EquipmentSlot::Trinket => "Trinket",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: String,
    pub count: u32,
}

/// Carried items, one stack per item id, in pickup order
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    stacks: Vec<ItemStack>,
}

impl Inventory {
    pub fn add(&mut self, item: &str, count: u32) {
        if count == 0 {
            return;
        }
        match self.stacks.iter_mut().find(|stack| stack.item == item) {
            Some(stack) => stack.count = stack.count.saturating_add(count),
            None => self.stacks.push(ItemStack {
                item: item.to_string(),
                count,
            }),
        }
    }

    /// Take `count` of an item; false (and no change) if there are not enough
    pub fn remove(&mut self, item: &str, count: u32) -> bool {
        let Some(index) = self.stacks.iter().position(|stack| stack.item == item) else {
            return false;
        };
        if self.stacks[index].count < count {
            return false;
        }
        self.stacks[index].count -= count;
        if self.stacks[index].count == 0 {
            self.stacks.remove(index);
        }
        true
    }

    pub fn count(&self, item: &str) -> u32 {
        self.stacks
            .iter()
            .find(|stack| stack.item == item)
            .map(|stack| stack.count)
            .unwrap_or(0)
    }

    pub fn stacks(&self) -> &[ItemStack] {
        &self.stacks
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub(crate) fn replace(&mut self, stacks: Vec<ItemStack>) {
        self.stacks = stacks.into_iter().filter(|stack| stack.count > 0).collect();
    }
}

/// Item ids worn per slot
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Equipment {
    slots: BTreeMap<EquipmentSlot, String>,
}

impl Equipment {
    /// Wear an item, returning whatever the slot held before
    pub fn equip(&mut self, slot: EquipmentSlot, item: impl Into<String>) -> Option<String> {
        self.slots.insert(slot, item.into())
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<String> {
        self.slots.remove(&slot)
    }

    pub fn get(&self, slot: EquipmentSlot) -> Option<&str> {
        self.slots.get(&slot).map(String::as_str)
    }

    pub fn slots(&self) -> &BTreeMap<EquipmentSlot, String> {
        &self.slots
    }

    pub(crate) fn replace(&mut self, slots: BTreeMap<EquipmentSlot, String>) {
        self.slots = slots;
    }
}

/// Move one item from the inventory into a slot. The previously worn item
/// goes back into the inventory.
pub fn equip_from_inventory(
    inventory: &mut Inventory,
    equipment: &mut Equipment,
    slot: EquipmentSlot,
    item: &str,
) -> Result<(), String> {
    if !inventory.remove(item, 1) {
        return Err(format!("'{}' is not in the inventory", item));
    }
    if let Some(previous) = equipment.equip(slot, item) {
        inventory.add(&previous, 1);
    }
    info!("Equipped {} in {} slot", item, slot.name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_stacks() {
        let mut inventory = Inventory::default();
        inventory.add("Potion", 2);
        inventory.add("Potion", 3);
        inventory.add("Gem", 1);
        inventory.add("Nothing", 0);

        assert_eq!(inventory.count("Potion"), 5);
        assert_eq!(inventory.stacks().len(), 2);
        assert!(!inventory.remove("Potion", 6));
        assert!(inventory.remove("Potion", 5));
        assert_eq!(inventory.count("Potion"), 0);
        assert_eq!(inventory.stacks().len(), 1);
    }

    #[test]
    fn test_equip_swaps_previous_back() {
        let mut inventory = Inventory::default();
        let mut equipment = Equipment::default();
        inventory.add("Rusty Sword", 1);
        inventory.add("Runed Blade", 1);

        equip_from_inventory(&mut inventory, &mut equipment, EquipmentSlot::Weapon, "Rusty Sword").unwrap();
        equip_from_inventory(&mut inventory, &mut equipment, EquipmentSlot::Weapon, "Runed Blade").unwrap();

        assert_eq!(equipment.get(EquipmentSlot::Weapon), Some("Runed Blade"));
        assert_eq!(inventory.count("Rusty Sword"), 1);
        assert_eq!(inventory.count("Runed Blade"), 0);
    }

    #[test]
    fn test_equip_missing_item_fails_cleanly() {
        let mut inventory = Inventory::default();
        let mut equipment = Equipment::default();
        let result = equip_from_inventory(&mut inventory, &mut equipment, EquipmentSlot::Armor, "Plate");
        assert!(result.is_err());
        assert_eq!(equipment.get(EquipmentSlot::Armor), None);
    }
}
