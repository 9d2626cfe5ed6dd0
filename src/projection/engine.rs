//! Single-period compounding shared by accumulation and decumulation

use crate::allocation::{AllocationSplit, BucketBalances, PeriodRates};

/// When a period's cash flow is applied relative to its growth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashflowTiming {
    /// Cash flow lands before growth, so contributions earn a full period
    StartOfPeriod,
    /// Growth accrues on the opening balance, then the cash flow settles
    EndOfPeriod,
}

/// Result of advancing one period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodStep {
    /// Balances at end of period
    pub balances: BucketBalances,

    /// Growth earned across all buckets
    pub growth: f64,

    /// Net cash flow actually applied (may be smaller in magnitude than
    /// requested when an outflow exceeds the available balance)
    pub cash_flow: f64,
}

/// Advances multi-bucket balances by one period
#[derive(Debug, Clone, Copy)]
pub struct CompoundingEngine {
    timing: CashflowTiming,
}

impl CompoundingEngine {
    pub fn new(timing: CashflowTiming) -> Self {
        Self { timing }
    }

    pub fn timing(&self) -> CashflowTiming {
        self.timing
    }

    /// Apply `net_cash_flow` (positive = contribution, negative = withdrawal)
    /// across buckets per `split` and grow each bucket by its period rate.
    pub fn advance_period(
        &self,
        balances: &BucketBalances,
        rates: &PeriodRates,
        net_cash_flow: f64,
        split: AllocationSplit,
    ) -> PeriodStep {
        match self.timing {
            CashflowTiming::StartOfPeriod => {
                let (post, applied) = apply_cash_flow(balances, net_cash_flow, split);
                let growth = growth_on(&post, rates);
                PeriodStep {
                    balances: BucketBalances::new(
                        post.equity + post.equity * rates.equity,
                        post.debt + post.debt * rates.debt,
                    ),
                    growth: growth.total(),
                    cash_flow: applied,
                }
            }
            CashflowTiming::EndOfPeriod => {
                let growth = growth_on(balances, rates);
                let grown = BucketBalances::new(
                    balances.equity + growth.equity,
                    balances.debt + growth.debt,
                );
                let (post, applied) = apply_cash_flow(&grown, net_cash_flow, split);
                PeriodStep {
                    balances: post,
                    growth: growth.total(),
                    cash_flow: applied,
                }
            }
        }
    }

    /// Growth the given balances would earn over one period
    pub fn growth(&self, balances: &BucketBalances, rates: &PeriodRates) -> f64 {
        growth_on(balances, rates).total()
    }
}

fn growth_on(balances: &BucketBalances, rates: &PeriodRates) -> BucketBalances {
    BucketBalances::new(balances.equity * rates.equity, balances.debt * rates.debt)
}

/// Route a cash flow into buckets.
///
/// Inflows follow the split exactly. For outflows, a bucket that cannot cover
/// its share passes the deficit to the other bucket; whatever the corpus as a
/// whole cannot cover is not applied. Returns the new balances and the flow
/// actually applied.
fn apply_cash_flow(
    balances: &BucketBalances,
    net_cash_flow: f64,
    split: AllocationSplit,
) -> (BucketBalances, f64) {
    if net_cash_flow >= 0.0 {
        let post = BucketBalances::new(
            balances.equity + net_cash_flow * split.equity(),
            balances.debt + net_cash_flow * split.debt(),
        );
        return (post, net_cash_flow);
    }

    let outflow = -net_cash_flow;
    let available = balances.total().max(0.0);
    if outflow >= available {
        return (BucketBalances::zero(), -available);
    }

    let mut equity = balances.equity - outflow * split.equity();
    let mut debt = balances.debt - outflow * split.debt();
    if equity < 0.0 {
        debt += equity;
        equity = 0.0;
    }
    if debt < 0.0 {
        equity += debt;
        debt = 0.0;
    }

    (BucketBalances::new(equity.max(0.0), debt.max(0.0)), net_cash_flow)
}
