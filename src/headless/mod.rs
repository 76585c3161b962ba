//! Headless scenario runs
//!
//! Runs a scenario without any graphical output, suitable for automated
//! testing and balancing.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- --scenario scenarios/demo.json --output logs/demo.txt
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "name": "Goblin camp",
//!   "random_seed": 7,
//!   "max_duration_secs": 120,
//!   "hero": {
//!     "max_health": 400, "attack_power": 25, "attack_range": 2.5,
//!     "attack_cooldown": 1.0, "move_speed": 5.0,
//!     "route": [[0, 0, 35]]
//!   },
//!   "spawners": [{
//!     "name": "Camp", "origin": [0, 0, 40], "spawn_radius": 4,
//!     "activation_distance": 50,
//!     "entries": [{"template": "Goblin", "count": 3}]
//!   }]
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::ScenarioConfig;
pub use runner::{run_headless_scenario, run_scenario, ScenarioResult};
