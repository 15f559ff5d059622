//! Command Line Interface for the AMM network.
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::env;
use std::fs;
use std::path::PathBuf;

mod scenario;

use scenario::{Scenario, ScenarioRunner};

/// Scenario bundled with the binary.
pub(crate) const DEMO_SCENARIO: &str = include_str!("../scenarios/demo.json");

#[derive(Parser)]
#[command(name = "amm-network")]
#[command(about = "Runs liquidity scenarios against an in-memory AMM network", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file
    Run {
        /// Path to the scenario JSON (falls back to AMM_NETWORK_SCENARIO)
        path: Option<PathBuf>,
    },
    /// Run the bundled demo scenario
    Demo,
}

fn load_scenario(path: Option<PathBuf>) -> Result<Scenario> {
    let path = match path {
        Some(path) => path,
        None => env::var("AMM_NETWORK_SCENARIO")
            .map(PathBuf::from)
            .map_err(|_| anyhow!("no scenario path given and AMM_NETWORK_SCENARIO is not set"))?,
    };
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid scenario {}", path.display()))
}

fn run(scenario: &Scenario) -> Result<()> {
    println!("🚀 Running scenario '{}' ({} steps)...", scenario.name, scenario.steps.len());
    let mut runner = ScenarioRunner::for_scenario(scenario)?;
    runner.run(scenario)?;

    println!("\n📊 Pools");
    println!("════════════════════════════════════");
    runner.pool_table().printstd();
    println!("════════════════════════════════════");
    Ok(())
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let scenario = match cli.command {
        Commands::Run { path } => load_scenario(path)?,
        Commands::Demo => serde_json::from_str(DEMO_SCENARIO)?,
    };
    run(&scenario)
}
