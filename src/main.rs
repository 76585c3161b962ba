//! Skirmish - headless enemy AI simulator
//!
//! Loads a scenario, runs it to completion and reports the outcome.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::process::ExitCode;

use skirmish::cli;
use skirmish::headless::{run_headless_scenario, ScenarioConfig};
use skirmish::settings::SimSettings;

fn main() -> ExitCode {
    let args = cli::parse_args();

    // Installs the global tracing subscriber; the app itself is not run
    App::new().add_plugins(LogPlugin::default());

    let settings_path = args.settings.clone().unwrap_or_else(SimSettings::settings_path);
    let settings = SimSettings::load(&settings_path);

    let mut config = match ScenarioConfig::load_from_file(&args.scenario) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(seed) = args.seed {
        config.random_seed = Some(seed);
    }
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }

    match run_headless_scenario(config, settings, args.output.as_deref(), args.save.as_deref()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Scenario failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
