//! Time-stepped corpus simulation: accumulation and decumulation

mod engine;
mod state;
mod cashflows;
mod accumulation;
mod decumulation;

pub use engine::{CashflowTiming, CompoundingEngine, PeriodStep};
pub use state::{DecumulationState, RunState, TerminationOutcome};
pub use cashflows::{round_to, LedgerSummary, PeriodRow, YearRow};
pub use accumulation::{
    seed_balances, simulate_accumulation, AccumulationResult, AccumulationSimulator,
};
pub use decumulation::{simulate_decumulation, DecumulationResult, DecumulationSimulator};
