//! Simulation settings
//!
//! Tunables that apply to every scenario: tick rate, polling and timers, and
//! optional overrides for the built-in data tables.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::sim::constants::{
    ACTIVATION_POLL_INTERVAL, DEATH_ANIMATION_TIME, DEFAULT_TICK_RATE, ITEM_PICKUP_RADIUS,
};

/// Runtime settings shared by all scenarios
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Fixed ticks per simulated second in headless runs
    pub tick_rate: f32,
    /// Seconds between spawner activation checks
    pub activation_poll_interval: f32,
    /// Seconds a corpse stays before despawning
    pub death_animation_time: f32,
    pub item_pickup_radius: f32,
    /// Replace the built-in tables with files on disk
    pub special_attacks_path: Option<PathBuf>,
    pub enemies_path: Option<PathBuf>,
    pub loot_path: Option<PathBuf>,
    pub levels_path: Option<PathBuf>,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            activation_poll_interval: ACTIVATION_POLL_INTERVAL,
            death_animation_time: DEATH_ANIMATION_TIME,
            item_pickup_radius: ITEM_PICKUP_RADIUS,
            special_attacks_path: None,
            enemies_path: None,
            loot_path: None,
            levels_path: None,
        }
    }
}

impl SimSettings {
    /// Default location next to the working directory
    pub fn settings_path() -> PathBuf {
        PathBuf::from("settings.ron")
    }

    /// Load settings from file, or return defaults if it is missing or broken
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file at {:?}, using defaults", path);
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(contents) => match ron::from_str::<SimSettings>(&contents) {
                Ok(settings) => match settings.validate() {
                    Ok(()) => {
                        info!("Loaded settings from {:?}", path);
                        settings
                    }
                    Err(e) => {
                        warn!("Invalid settings in {:?}: {}", path, e);
                        Self::default()
                    }
                },
                Err(e) => {
                    warn!("Failed to parse settings file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, contents)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tick_rate <= 0.0 {
            return Err(format!("tick_rate must be positive, got {}", self.tick_rate));
        }
        if self.activation_poll_interval <= 0.0 {
            return Err("activation_poll_interval must be positive".to_string());
        }
        if self.death_animation_time < 0.0 || self.item_pickup_radius < 0.0 {
            return Err("death_animation_time and item_pickup_radius must be non-negative".to_string());
        }
        Ok(())
    }

    /// Seconds per headless tick
    pub fn tick_delta(&self) -> f32 {
        1.0 / self.tick_rate
    }
}
