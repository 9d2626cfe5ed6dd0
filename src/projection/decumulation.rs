//! Decumulation: inflation-stepped withdrawals drawing a corpus down

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::cashflows::{PeriodRow, YearRow};
use super::engine::{CashflowTiming, CompoundingEngine};
use super::state::{DecumulationState, RunState, TerminationOutcome};
use crate::allocation::{AllocationSplit, BucketBalances, BucketRates, PERIODS_PER_YEAR};
use crate::config::{DecumulationConfig, Termination};
use crate::error::ConfigError;
use crate::report::rollup;

/// Output of a decumulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecumulationResult {
    pub ledger: Vec<PeriodRow>,
    pub yearly_ledger: Vec<YearRow>,
    pub outcome: TerminationOutcome,
}

impl DecumulationResult {
    /// Whether the corpus outlasted the run without depleting
    pub fn survived(&self) -> bool {
        self.outcome.state != RunState::Depleted
    }

    /// Whole years (and leftover months) the corpus lasted
    pub fn duration(&self) -> (u32, u32) {
        let periods = self.outcome.periods_elapsed;
        (periods / PERIODS_PER_YEAR, periods % PERIODS_PER_YEAR)
    }
}

/// Drives the compounding engine forward from retirement
pub struct DecumulationSimulator {
    config: DecumulationConfig,
    engine: CompoundingEngine,
}

impl DecumulationSimulator {
    /// Validates the config up front; no period runs on a malformed config
    pub fn new(config: DecumulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            engine: CompoundingEngine::new(CashflowTiming::EndOfPeriod),
        })
    }

    pub fn config(&self) -> &DecumulationConfig {
        &self.config
    }

    pub fn run(&self) -> DecumulationResult {
        let config = &self.config;
        let rates = BucketRates::uniform(config.annual_rate).per_period();
        let split = AllocationSplit::all_debt();

        let mut starting_balance = config.starting_balance;
        if starting_balance < 0.0 {
            warn!("decumulation: negative starting balance floored at zero");
            starting_balance = 0.0;
        }
        let mut withdrawal = config.monthly_withdrawal;
        if withdrawal < 0.0 {
            warn!("decumulation: negative withdrawal floored at zero");
            withdrawal = 0.0;
        }

        let mut state = DecumulationState::initial(starting_balance, withdrawal);
        let mut ledger = Vec::new();

        debug!(
            "decumulation: corpus {:.2}, withdrawal {:.2}/month, {:?}",
            starting_balance, withdrawal, config.termination
        );

        if let Termination::FixedDuration { years: 0 } = config.termination {
            state.finish(RunState::Completed);
        }

        while !state.run_state.is_terminal() {
            state.advance_period(config.inflation_rate);

            let balances = BucketBalances::pooled(state.balance);
            let period_return = self.engine.growth(&balances, &rates);
            let scheduled = state.scheduled_withdrawal;
            let available = state.balance + period_return;
            let age = config.start_age.saturating_add(state.year() - 1);

            if available < scheduled {
                state.balance = 0.0;
                state.finish(RunState::Depleted);
                ledger.push(PeriodRow::new(
                    state.period,
                    age,
                    scheduled,
                    available,
                    period_return,
                    &BucketBalances::zero(),
                ));
                debug!("decumulation: depleted at period {}", state.period);
                break;
            }

            let step = self.engine.advance_period(&balances, &rates, -scheduled, split);
            state.balance = step.balances.total();
            ledger.push(PeriodRow::new(
                state.period,
                age,
                scheduled,
                -step.cash_flow,
                step.growth,
                &step.balances,
            ));

            if let Some(next) = self.check_termination(&state) {
                state.finish(next);
            }
        }

        let outcome = state.outcome();
        if outcome.state == RunState::Unresolved {
            warn!(
                "decumulation: safety cap of {} periods reached, balance {:.2}",
                config.safety_cap, outcome.final_balance
            );
        }

        DecumulationResult {
            yearly_ledger: rollup(&ledger),
            ledger,
            outcome,
        }
    }

    /// Termination after a non-depleting period; the cap is checked last so
    /// a run that also meets its horizon reports Completed
    fn check_termination(&self, state: &DecumulationState) -> Option<RunState> {
        match self.config.termination {
            Termination::FixedDuration { years } => {
                if state.period >= years.saturating_mul(PERIODS_PER_YEAR) {
                    return Some(RunState::Completed);
                }
            }
            Termination::UntilTarget { target_corpus } => {
                if target_corpus > 0.0 && state.balance <= target_corpus {
                    return Some(RunState::Completed);
                }
            }
        }

        if state.period >= self.config.safety_cap {
            return Some(RunState::Unresolved);
        }
        None
    }
}

/// Validate and run a decumulation
pub fn simulate_decumulation(
    config: &DecumulationConfig,
) -> Result<DecumulationResult, ConfigError> {
    Ok(DecumulationSimulator::new(config.clone())?.run())
}
