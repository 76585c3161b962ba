//! Command-line interface for Skirmish
//!
//! Runs a single scenario headlessly. Optional flags override values from
//! the scenario file.

use clap::Parser;
use std::path::PathBuf;

/// Enemy AI and special-attack skirmish simulator
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Enemy AI and special-attack skirmish simulator")]
#[command(version)]
pub struct Args {
    /// Scenario JSON file to run
    #[arg(long, value_name = "FILE")]
    pub scenario: PathBuf,

    /// Simulation settings RON file (defaults to settings.ron)
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Output path for the combat log
    #[arg(long, value_name = "LOG")]
    pub output: Option<PathBuf>,

    /// Write progression to this save file when the run ends
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,

    /// Random seed, overriding the scenario's
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Maximum run duration in simulated seconds, overriding the scenario's
    #[arg(long, value_name = "SECS")]
    pub max_duration: Option<f32>,
}

pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_is_required() {
        assert!(Args::try_parse_from(["skirmish"]).is_err());
    }

    #[test]
    fn test_overrides_parse() {
        let args = Args::try_parse_from([
            "skirmish",
            "--scenario",
            "scenarios/demo.json",
            "--seed",
            "42",
            "--max-duration",
            "90",
        ])
        .unwrap();
        assert_eq!(args.scenario, PathBuf::from("scenarios/demo.json"));
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.max_duration, Some(90.0));
        assert!(args.output.is_none());
        assert!(args.save.is_none());
    }
}
