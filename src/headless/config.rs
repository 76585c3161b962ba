//! JSON scenario configuration for headless runs
//!
//! A scenario places the hero, describes the arena and lists the spawners.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sim::hero::HeroConfig;
use crate::sim::navigation::OpenGround;
use crate::sim::spawner::SpawnerConfig;

/// Scenario configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Random seed for reproducible runs
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Simulated seconds before the run is declared timed out (default: 300)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    pub hero: HeroConfig,
    #[serde(default)]
    pub arena: OpenGround,
    #[serde(default)]
    pub spawners: Vec<SpawnerConfig>,
    /// Save file to load progression from before the run
    #[serde(default)]
    pub save_file: Option<PathBuf>,
    /// Custom output path for the combat log
    #[serde(default)]
    pub output_path: Option<String>,
}

fn default_name() -> String {
    "Unnamed scenario".to_string()
}

fn default_max_duration() -> f32 {
    300.0
}

impl ScenarioConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read scenario file: {}", e))?;

        let config: ScenarioConfig = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }
        if self.arena.half_extent <= 0.0 {
            return Err("arena half_extent must be positive".to_string());
        }

        self.hero.validate()?;

        let mut names: Vec<&str> = Vec::with_capacity(self.spawners.len());
        for spawner in &self.spawners {
            spawner.validate()?;
            if names.contains(&spawner.name.as_str()) {
                return Err(format!("Duplicate spawner name '{}'", spawner.name));
            }
            names.push(&spawner.name);
        }

        Ok(())
    }
}
