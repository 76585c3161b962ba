//! Skirmish - enemy AI, group aggro and elemental special attacks
//!
//! A headless simulation core: enemies patrol, spot the hero, pull their
//! group into the fight and use elemental special attacks, while the hero
//! earns experience, currency and loot.
//!
//! This library exposes the simulation for testing and reuse.

pub mod cli;
pub mod combat;
pub mod headless;
pub mod progression;
pub mod settings;
pub mod sim;

// Re-export commonly used types
pub use combat::log::{CombatLog, CombatLogEventType};
pub use headless::{ScenarioConfig, ScenarioResult};
pub use settings::SimSettings;
pub use sim::{ScenarioOutcome, Simulation, SimulationData};
