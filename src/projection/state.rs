//! Run state tracking for decumulation

use serde::{Deserialize, Serialize};

use crate::allocation::PERIODS_PER_YEAR;

/// Lifecycle of a decumulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Running,
    /// Corpus reached exactly zero
    Depleted,
    /// Horizon or target reached with money left
    Completed,
    /// Safety cap hit before any other condition
    Unresolved,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunState::Running)
    }
}

impl Default for RunState {
    fn default() -> Self {
        RunState::Running
    }
}

/// How and when a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerminationOutcome {
    pub state: RunState,
    pub periods_elapsed: u32,
    pub final_balance: f64,
}

/// Mutable state carried between decumulation periods
#[derive(Debug, Clone)]
pub struct DecumulationState {
    /// Periods simulated so far
    pub period: u32,

    pub balance: f64,

    /// Withdrawal scheduled for the current period
    pub scheduled_withdrawal: f64,

    pub run_state: RunState,
}

impl DecumulationState {
    pub fn initial(balance: f64, monthly_withdrawal: f64) -> Self {
        Self {
            period: 0,
            balance,
            scheduled_withdrawal: monthly_withdrawal,
            run_state: RunState::Running,
        }
    }

    /// Move to the next period, stepping the withdrawal up by inflation at
    /// the first period of every year after the first (13, 25, ...).
    pub fn advance_period(&mut self, inflation_rate: Option<f64>) {
        self.period += 1;

        if let Some(inflation) = inflation_rate {
            if self.period > 1 && (self.period - 1) % PERIODS_PER_YEAR == 0 {
                self.scheduled_withdrawal *= 1.0 + inflation;
            }
        }
    }

    /// Year (1-indexed) the current period falls in
    pub fn year(&self) -> u32 {
        (self.period.max(1) - 1) / PERIODS_PER_YEAR + 1
    }

    pub fn finish(&mut self, state: RunState) {
        self.run_state = state;
    }

    pub fn outcome(&self) -> TerminationOutcome {
        TerminationOutcome {
            state: self.run_state,
            periods_elapsed: self.period,
            final_balance: self.balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inflation_steps_only_at_year_boundaries() {
        let mut state = DecumulationState::initial(1_000_000.0, 1_000.0);

        for _ in 0..12 {
            state.advance_period(Some(0.06));
            assert_eq!(state.scheduled_withdrawal, 1_000.0);
        }

        state.advance_period(Some(0.06));
        assert_eq!(state.period, 13);
        assert!((state.scheduled_withdrawal - 1_060.0).abs() < 1e-9);
        assert_eq!(state.year(), 2);

        for _ in 0..11 {
            state.advance_period(Some(0.06));
        }
        assert!((state.scheduled_withdrawal - 1_060.0).abs() < 1e-9);

        state.advance_period(Some(0.06));
        assert!((state.scheduled_withdrawal - 1_123.6).abs() < 1e-9);
    }

    #[test]
    fn test_no_inflation_keeps_withdrawal_flat() {
        let mut state = DecumulationState::initial(1_000.0, 50.0);
        for _ in 0..40 {
            state.advance_period(None);
        }
        assert_eq!(state.scheduled_withdrawal, 50.0);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!RunState::Running.is_terminal());
        assert!(RunState::Depleted.is_terminal());
        assert!(RunState::Unresolved.is_terminal());
        assert_eq!(RunState::default(), RunState::Running);
    }
}
