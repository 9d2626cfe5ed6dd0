//! Corpus Engine - deterministic corpus simulation for financial planning
//!
//! This library provides:
//! - Accumulation runs: growing contributions compounding toward a goal,
//!   with goal deductions and an equity/debt glide path
//! - Decumulation runs: inflation-stepped withdrawals until depletion,
//!   a fixed horizon, or a target corpus
//! - Closed-form annuity solving and goal sizing
//! - Yearly rollups, CSV export, memoization and parallel batch runs

pub mod error;
pub mod allocation;
pub mod inputs;
pub mod config;
pub mod projection;
pub mod annuity;
pub mod report;
pub mod cache;
pub mod scenario;

// Re-export commonly used types
pub use error::ConfigError;
pub use allocation::{BucketBalances, BucketRates, GlidePath};
pub use inputs::{FinancialInputsProvider, GoalObligation, StaticInputs};
pub use config::{AccumulationConfig, DecumulationConfig, SimulationConfig, Termination};
pub use projection::{
    simulate_accumulation, simulate_decumulation, AccumulationResult, DecumulationResult,
    PeriodRow, RunState, TerminationOutcome, YearRow,
};
pub use annuity::{solve_required_contribution, AnnuitySolver};
pub use cache::SimulationCache;
pub use scenario::{simulate, ScenarioRunner, SimulationOutput};
