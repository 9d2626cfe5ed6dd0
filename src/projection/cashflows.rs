//! Ledger rows produced by the simulators

use serde::{Deserialize, Serialize};

use crate::allocation::BucketBalances;

/// One simulated month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRow {
    /// 1-indexed period number
    pub period: u32,

    /// Age during this period (whole years)
    pub age: u32,

    /// Amount the plan called for (contribution or withdrawal)
    pub scheduled_amount: f64,

    /// Amount actually contributed or withdrawn
    pub actual_amount: f64,

    /// Growth earned this period
    pub return_earned: f64,

    /// Total corpus at end of period
    pub ending_balance: f64,

    // Bucket detail
    pub equity_balance: f64,
    pub debt_balance: f64,
}

impl PeriodRow {
    pub fn new(
        period: u32,
        age: u32,
        scheduled_amount: f64,
        actual_amount: f64,
        return_earned: f64,
        balances: &BucketBalances,
    ) -> Self {
        Self {
            period,
            age,
            scheduled_amount,
            actual_amount,
            return_earned,
            ending_balance: balances.total(),
            equity_balance: balances.equity,
            debt_balance: balances.debt,
        }
    }

    /// Copy with monetary fields rounded for display
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            scheduled_amount: round_to(self.scheduled_amount, decimals),
            actual_amount: round_to(self.actual_amount, decimals),
            return_earned: round_to(self.return_earned, decimals),
            ending_balance: round_to(self.ending_balance, decimals),
            equity_balance: round_to(self.equity_balance, decimals),
            debt_balance: round_to(self.debt_balance, decimals),
            ..self.clone()
        }
    }
}

/// Rollup of up to 12 consecutive period rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRow {
    /// 1-indexed ordinal year
    pub year: u32,

    /// Number of periods in this year (12 except possibly the last)
    pub periods: u32,

    pub total_scheduled: f64,

    /// Total contributed (accumulation) or withdrawn (decumulation)
    pub total_amount: f64,

    pub total_return: f64,

    pub ending_balance: f64,
}

impl YearRow {
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            total_scheduled: round_to(self.total_scheduled, decimals),
            total_amount: round_to(self.total_amount, decimals),
            total_return: round_to(self.total_return, decimals),
            ending_balance: round_to(self.ending_balance, decimals),
            ..self.clone()
        }
    }
}

/// Totals across a whole ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_periods: u32,
    pub total_scheduled: f64,
    pub total_amount: f64,
    pub total_return: f64,
    pub final_balance: f64,
}

impl LedgerSummary {
    pub fn from_rows(rows: &[PeriodRow]) -> Self {
        Self {
            total_periods: rows.len() as u32,
            total_scheduled: rows.iter().map(|r| r.scheduled_amount).sum(),
            total_amount: rows.iter().map(|r| r.actual_amount).sum(),
            total_return: rows.iter().map(|r| r.return_earned).sum(),
            final_balance: rows.last().map(|r| r.ending_balance).unwrap_or(0.0),
        }
    }
}

/// Round half away from zero to `decimals` places, at most `f64::DIGITS`
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(f64::DIGITS) as i32);
    (value * factor).round() / factor
}
