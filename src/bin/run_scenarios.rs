//! Run a batch of simulations from a JSON array of configs
//!
//! Writes one summary row per scenario for side-by-side comparison

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use corpus_engine::{RunState, ScenarioRunner, SimulationConfig, SimulationOutput};

#[derive(Parser)]
#[command(name = "run_scenarios", about = "Run a JSON array of simulation configs in parallel")]
struct Args {
    /// JSON file holding an array of configs
    input: PathBuf,
    /// Summary CSV to write
    #[arg(default_value = "scenario_summary.csv")]
    output: PathBuf,
}

/// One summary line per scenario
#[derive(Debug, Serialize)]
struct ScenarioRow {
    scenario: usize,
    kind: &'static str,
    periods: u32,
    final_balance: f64,
    outcome: String,
    error: String,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let input = args.input.display();
    let output_path = args.output.display();

    let start = Instant::now();
    let file = File::open(&args.input).with_context(|| format!("opening {}", input))?;
    let configs: Vec<SimulationConfig> =
        serde_json::from_reader(file).with_context(|| format!("parsing {}", input))?;
    println!("Loaded {} scenarios in {:?}", configs.len(), start.elapsed());

    let run_start = Instant::now();
    let results = ScenarioRunner::new().run_batch(&configs);
    println!("Scenarios complete in {:?}", run_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", output_path))?;

    let mut failures = 0;
    for (index, (config, result)) in configs.iter().zip(&results).enumerate() {
        let kind = match config {
            SimulationConfig::Accumulation(_) => "accumulation",
            SimulationConfig::Decumulation(_) => "decumulation",
        };

        let row = match result {
            Ok(output) => ScenarioRow {
                scenario: index + 1,
                kind,
                periods: output.periods(),
                final_balance: (output.final_balance() * 100.0).round() / 100.0,
                outcome: outcome_label(output),
                error: String::new(),
            },
            Err(err) => {
                failures += 1;
                ScenarioRow {
                    scenario: index + 1,
                    kind,
                    periods: 0,
                    final_balance: 0.0,
                    outcome: String::new(),
                    error: err.to_string(),
                }
            }
        };
        writer.serialize(row)?;
    }
    writer.flush()?;

    println!("Output written to {}", output_path);
    if failures > 0 {
        println!("{} of {} scenarios had invalid configuration", failures, configs.len());
    }
    println!("Total time: {:?}", start.elapsed());
    Ok(())
}

fn outcome_label(output: &SimulationOutput) -> String {
    match output {
        SimulationOutput::Accumulation(_) => "ACCUMULATED".to_string(),
        SimulationOutput::Decumulation(result) => match result.outcome.state {
            RunState::Depleted => "DEPLETED".to_string(),
            RunState::Completed => "COMPLETED".to_string(),
            RunState::Unresolved => "UNRESOLVED".to_string(),
            RunState::Running => "RUNNING".to_string(),
        },
    }
}
