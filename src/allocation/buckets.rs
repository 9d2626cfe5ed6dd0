//! Bucket balances, rates and allocation splits

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_rate, ConfigError};

/// Periods per year used for all monthly stepping
pub const PERIODS_PER_YEAR: u32 = 12;

/// A named sub-pool of the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    /// Growth bucket
    Equity,
    /// Capital-preservation bucket
    Debt,
}

/// Balance held in each bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketBalances {
    pub equity: f64,
    pub debt: f64,
}

impl BucketBalances {
    pub fn new(equity: f64, debt: f64) -> Self {
        Self { equity, debt }
    }

    /// Whole corpus held as a single pool (debt bucket)
    pub fn pooled(balance: f64) -> Self {
        Self { equity: 0.0, debt: balance }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn total(&self) -> f64 {
        self.equity + self.debt
    }

    pub fn get(&self, bucket: Bucket) -> f64 {
        match bucket {
            Bucket::Equity => self.equity,
            Bucket::Debt => self.debt,
        }
    }

    /// Move the whole equity bucket into debt, returning the amount moved
    pub fn liquidate_equity(&mut self) -> f64 {
        let moved = self.equity;
        self.debt += moved;
        self.equity = 0.0;
        moved
    }

    /// Floor each bucket at zero
    pub fn floored(self) -> Self {
        Self {
            equity: self.equity.max(0.0),
            debt: self.debt.max(0.0),
        }
    }

    pub(crate) fn validate(&self, field: &str) -> Result<(), ConfigError> {
        ensure_finite(&format!("{}.equity", field), self.equity)?;
        ensure_finite(&format!("{}.debt", field), self.debt)
    }
}

/// Annual rate of return per bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketRates {
    pub equity: f64,
    pub debt: f64,
}

impl BucketRates {
    pub fn new(equity: f64, debt: f64) -> Self {
        Self { equity, debt }
    }

    /// Same rate in both buckets
    pub fn uniform(annual_rate: f64) -> Self {
        Self {
            equity: annual_rate,
            debt: annual_rate,
        }
    }

    /// Convert annual rates to per-period (monthly) fractions
    pub fn per_period(&self) -> PeriodRates {
        PeriodRates {
            equity: self.equity / PERIODS_PER_YEAR as f64,
            debt: self.debt / PERIODS_PER_YEAR as f64,
        }
    }

    pub(crate) fn validate(&self, field: &str) -> Result<(), ConfigError> {
        ensure_rate(&format!("{}.equity", field), self.equity)?;
        ensure_rate(&format!("{}.debt", field), self.debt)
    }
}

/// Per-period rate per bucket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodRates {
    pub equity: f64,
    pub debt: f64,
}

/// Fractions of a cash flow routed to each bucket
///
/// Only constructible through [`AllocationSplit::from_equity`], so the two
/// fractions always sum to exactly 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationSplit {
    equity: f64,
    debt: f64,
}

impl AllocationSplit {
    /// Split from an equity fraction; clamped into [0, 1]
    pub fn from_equity(equity_fraction: f64) -> Self {
        let equity = equity_fraction.clamp(0.0, 1.0);
        Self {
            equity,
            debt: 1.0 - equity,
        }
    }

    pub fn all_debt() -> Self {
        Self::from_equity(0.0)
    }

    pub fn equity(&self) -> f64 {
        self.equity
    }

    pub fn debt(&self) -> f64 {
        self.debt
    }
}
