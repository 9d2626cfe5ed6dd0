//! Scenario runner for batch simulations
//!
//! Each config is an independent pure run, so batches fan out across
//! threads with rayon.

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{DecumulationConfig, SimulationConfig, Termination};
use crate::error::ConfigError;
use crate::projection::{
    simulate_accumulation, simulate_decumulation, AccumulationResult, DecumulationResult, RunState,
};

/// Result of either kind of run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationOutput {
    Accumulation(AccumulationResult),
    Decumulation(DecumulationResult),
}

impl SimulationOutput {
    /// Corpus left at the end of the run
    pub fn final_balance(&self) -> f64 {
        match self {
            SimulationOutput::Accumulation(result) => result.terminal_balance,
            SimulationOutput::Decumulation(result) => result.outcome.final_balance,
        }
    }

    pub fn periods(&self) -> u32 {
        match self {
            SimulationOutput::Accumulation(result) => result.ledger.len() as u32,
            SimulationOutput::Decumulation(result) => result.outcome.periods_elapsed,
        }
    }
}

/// Run a single config of either kind
pub fn simulate(config: &SimulationConfig) -> Result<SimulationOutput, ConfigError> {
    match config {
        SimulationConfig::Accumulation(c) => {
            simulate_accumulation(c).map(SimulationOutput::Accumulation)
        }
        SimulationConfig::Decumulation(c) => {
            simulate_decumulation(c).map(SimulationOutput::Decumulation)
        }
    }
}

/// One line of a withdrawal sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub monthly_withdrawal: f64,
    pub state: RunState,
    pub periods_elapsed: u32,
    pub final_balance: f64,
}

/// Runs batches of independent simulations
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner;

impl ScenarioRunner {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self, config: &SimulationConfig) -> Result<SimulationOutput, ConfigError> {
        simulate(config)
    }

    /// Run every config in parallel; results keep input order
    pub fn run_batch(
        &self,
        configs: &[SimulationConfig],
    ) -> Vec<Result<SimulationOutput, ConfigError>> {
        debug!("scenario: running batch of {}", configs.len());
        configs.par_iter().map(simulate).collect()
    }

    /// How long the corpus lasts at each withdrawal level, to depletion
    pub fn withdrawal_sweep(
        &self,
        base: &DecumulationConfig,
        withdrawals: &[f64],
    ) -> Result<Vec<SweepPoint>, ConfigError> {
        base.validate()?;

        withdrawals
            .par_iter()
            .map(|&monthly_withdrawal| {
                let config = DecumulationConfig {
                    monthly_withdrawal,
                    termination: Termination::UntilTarget { target_corpus: 0.0 },
                    ..base.clone()
                };
                let result = simulate_decumulation(&config)?;
                Ok(SweepPoint {
                    monthly_withdrawal,
                    state: result.outcome.state,
                    periods_elapsed: result.outcome.periods_elapsed,
                    final_balance: result.outcome.final_balance,
                })
            })
            .collect()
    }
}
