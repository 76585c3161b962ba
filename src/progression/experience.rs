//! Experience and Levels

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::sim::utils::{parse_ron, read_ron};

const BUILTIN_LEVELS: &str = include_str!("../../assets/config/levels.ron");

/// Experience needed for each level-up.
///
/// `requirements[0]` is the cost of reaching level 2, `requirements[1]`
/// level 3, and so on. The highest reachable level is `len + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTable {
    requirements: Vec<u32>,
}

impl LevelTable {
    pub fn new(requirements: Vec<u32>) -> Result<Self, String> {
        if let Some(pair) = requirements.windows(2).find(|pair| pair[1] < pair[0]) {
            return Err(format!(
                "level requirements must be non-decreasing ({} followed by {})",
                pair[0], pair[1]
            ));
        }
        Ok(Self { requirements })
    }

    pub fn builtin() -> Result<Self, String> {
        let table: LevelTable = parse_ron(BUILTIN_LEVELS, "built-in levels.ron")?;
        Self::new(table.requirements)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let table: LevelTable = read_ron(path)?;
        let table = Self::new(table.requirements)?;
        info!("Loaded {} level requirements from {}", table.requirements.len(), path.display());
        Ok(table)
    }

    pub fn max_level(&self) -> u32 {
        self.requirements.len() as u32 + 1
    }

    /// Experience needed to reach `level` from the one below it.
    /// Zero for level 1 and below, and for anything past the cap.
    pub fn required_experience(&self, level: u32) -> u32 {
        if level <= 1 || level > self.max_level() {
            return 0;
        }
        self.requirements[(level - 2) as usize]
    }
}

/// Hero level, experience and currency
#[derive(Resource, Debug, Clone)]
pub struct Progression {
    pub level: u32,
    /// Experience toward the next level
    pub experience: u32,
    pub currency: u32,
    levels: LevelTable,
}

impl Progression {
    pub fn new(levels: LevelTable) -> Self {
        Self {
            level: 1,
            experience: 0,
            currency: 0,
            levels,
        }
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= self.levels.max_level()
    }

    /// Add experience, carrying surplus across level-ups.
    /// Returns how many levels were gained.
    pub fn gain_experience(&mut self, amount: u32) -> u32 {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while !self.is_max_level() {
            let required = self.levels.required_experience(self.level + 1);
            if self.experience < required {
                break;
            }
            self.experience -= required;
            self.level += 1;
            gained += 1;
        }
        gained
    }

    pub fn gain_currency(&mut self, amount: u32) {
        self.currency = self.currency.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LevelTable {
        LevelTable::new(vec![100, 250, 250, 600]).unwrap()
    }

    #[test]
    fn test_required_experience_bounds() {
        let table = table();
        assert_eq!(table.max_level(), 5);
        assert_eq!(table.required_experience(0), 0);
        assert_eq!(table.required_experience(1), 0);
        assert_eq!(table.required_experience(2), 100);
        assert_eq!(table.required_experience(5), 600);
        assert_eq!(table.required_experience(6), 0);
        assert_eq!(table.required_experience(u32::MAX), 0);
    }

    #[test]
    fn test_required_experience_is_monotonic_over_valid_levels() {
        let table = LevelTable::builtin().expect("built-in levels should parse");
        let valid: Vec<u32> = (2..=table.max_level())
            .map(|level| table.required_experience(level))
            .collect();
        assert!(valid.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_decreasing_table_is_rejected() {
        assert!(LevelTable::new(vec![100, 50]).is_err());
        assert!(LevelTable::new(vec![]).is_ok());
    }

    #[test]
    fn test_gain_experience_carries_surplus() {
        let mut progression = Progression::new(table());
        assert_eq!(progression.gain_experience(90), 0);
        assert_eq!(progression.gain_experience(270), 2);
        assert_eq!(progression.level, 3);
        assert_eq!(progression.experience, 10);
    }

    #[test]
    fn test_experience_keeps_accumulating_at_cap() {
        let mut progression = Progression::new(table());
        progression.gain_experience(10_000);
        assert_eq!(progression.level, 5);
        assert!(progression.is_max_level());
        assert_eq!(progression.experience, 10_000 - 1200);
    }

    #[test]
    fn test_currency() {
        let mut progression = Progression::new(table());
        progression.gain_currency(5);
        progression.gain_currency(7);
        assert_eq!(progression.currency, 12);
    }
}
