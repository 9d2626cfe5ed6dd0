//! Accumulation: growing contributions compounding toward a future corpus

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::cashflows::{PeriodRow, YearRow};
use super::engine::{CashflowTiming, CompoundingEngine};
use crate::allocation::{BucketBalances, PERIODS_PER_YEAR};
use crate::config::AccumulationConfig;
use crate::error::ConfigError;
use crate::inputs::total_due_in;
use crate::report::rollup;

/// Output of an accumulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulationResult {
    pub ledger: Vec<PeriodRow>,
    pub yearly_ledger: Vec<YearRow>,
    pub terminal_balance: f64,

    /// Terminal balance minus goals falling due after the final year
    pub balance_net_of_future_goals: f64,

    /// Cost of goals due after the final year
    pub future_goal_cost: f64,
}

impl AccumulationResult {
    fn empty(future_goal_cost: f64) -> Self {
        Self {
            ledger: Vec::new(),
            yearly_ledger: Vec::new(),
            terminal_balance: 0.0,
            balance_net_of_future_goals: -future_goal_cost,
            future_goal_cost,
        }
    }
}

/// Drives the compounding engine from start age to end age
pub struct AccumulationSimulator {
    config: AccumulationConfig,
    engine: CompoundingEngine,
}

impl AccumulationSimulator {
    /// Validates the config up front; no period runs on a malformed config
    pub fn new(config: AccumulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            engine: CompoundingEngine::new(CashflowTiming::StartOfPeriod),
        })
    }

    pub fn config(&self) -> &AccumulationConfig {
        &self.config
    }

    pub fn run(&self) -> AccumulationResult {
        let config = &self.config;
        let years = config.years();
        let future_goal_cost: f64 = config
            .goals
            .iter()
            .filter(|g| g.due_year > years)
            .map(|g| g.amount_at_due)
            .sum();

        if years == 0 {
            debug!(
                "accumulation: end age {} before start age {}, nothing to simulate",
                config.end_age, config.start_age
            );
            return AccumulationResult::empty(future_goal_cost);
        }

        let rates = config.rates.per_period();
        let mut balances = config.starting_balances;
        if balances.equity < 0.0 || balances.debt < 0.0 {
            warn!("accumulation: negative starting balance floored at zero");
            balances = balances.floored();
        }

        let mut ledger = Vec::with_capacity(config.period_count().unwrap_or(0) as usize);
        let mut current_net_savings = config.annual_net_savings;
        let mut period = 0;
        let mut shortfall_reported = false;

        debug!(
            "accumulation: {} years from age {}, starting corpus {:.2}",
            years,
            config.start_age,
            balances.total()
        );

        for year in 1..=years {
            let age = config.start_age + (year - 1);

            if year > 1 {
                current_net_savings *= 1.0 + config.savings_growth_rate;
            }

            let goal_cost = total_due_in(&config.goals, year);
            let annual_savings = current_net_savings - goal_cost;
            if annual_savings < 0.0 {
                debug!(
                    "accumulation: year {} goals ({:.2}) exceed savings ({:.2}), drawing on corpus",
                    year, goal_cost, current_net_savings
                );
            }

            if config.glide_path.liquidates_at(age, year == 1) && balances.equity > 0.0 {
                let moved = balances.liquidate_equity();
                debug!("accumulation: age {} moved {:.2} from equity to debt", age, moved);
            }

            let split = config.glide_path.split(age);
            let scheduled = current_net_savings / PERIODS_PER_YEAR as f64;
            let monthly_flow = annual_savings / PERIODS_PER_YEAR as f64;

            for _ in 0..PERIODS_PER_YEAR {
                period += 1;
                let step = self.engine.advance_period(&balances, &rates, monthly_flow, split);
                if step.cash_flow != monthly_flow && !shortfall_reported {
                    warn!(
                        "accumulation: period {} outflow {:.2} exceeded corpus, applied {:.2}",
                        period, -monthly_flow, -step.cash_flow
                    );
                    shortfall_reported = true;
                }
                balances = step.balances;
                ledger.push(PeriodRow::new(
                    period,
                    age,
                    scheduled,
                    step.cash_flow,
                    step.growth,
                    &balances,
                ));
            }
        }

        let terminal_balance = balances.total();
        let yearly_ledger = rollup(&ledger);

        AccumulationResult {
            ledger,
            yearly_ledger,
            terminal_balance,
            balance_net_of_future_goals: terminal_balance - future_goal_cost,
            future_goal_cost,
        }
    }
}

/// Validate and run an accumulation
pub fn simulate_accumulation(
    config: &AccumulationConfig,
) -> Result<AccumulationResult, ConfigError> {
    Ok(AccumulationSimulator::new(config.clone())?.run())
}

/// Starting balances for a run seeded with a single pooled amount split by
/// the glide path at `age`
pub fn seed_balances(config: &AccumulationConfig, amount: f64) -> BucketBalances {
    let split = config.glide_path.split(config.start_age);
    BucketBalances::new(amount * split.equity(), amount * split.debt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{BucketRates, GlidePath};
    use crate::annuity::AnnuitySolver;
    use crate::inputs::GoalObligation;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn base_config() -> AccumulationConfig {
        AccumulationConfig {
            start_age: 30,
            end_age: 39,
            starting_balances: BucketBalances::zero(),
            annual_net_savings: 0.0,
            savings_growth_rate: 0.0,
            rates: BucketRates::uniform(0.12),
            glide_path: GlidePath::BinarySwitch { equity_fraction: 0.6, switch_age: 70 },
            goals: Vec::new(),
        }
    }

    #[test]
    fn test_sip_matches_closed_form() {
        let mut config = base_config();
        config.starting_balances = BucketBalances::new(60_000.0, 40_000.0);
        config.annual_net_savings = 5_000.0 * 12.0;

        let result = simulate_accumulation(&config).unwrap();

        let r: f64 = 0.01;
        let n = 120;
        let expected = 5_000.0 * ((1.0 + r).powi(n) - 1.0) * (1.0 + r) / r
            + 100_000.0 * (1.0 + r).powi(n);

        assert_eq!(result.ledger.len(), 120);
        assert_relative_eq!(result.terminal_balance, expected, max_relative = 1e-9);
        assert_eq!(result.yearly_ledger.len(), 10);
    }

    #[test]
    fn test_zero_contribution_zero_balance_stays_zero() {
        let result = simulate_accumulation(&base_config()).unwrap();
        assert_eq!(result.terminal_balance, 0.0);
        assert!(result.ledger.iter().all(|r| r.ending_balance == 0.0));
    }

    #[test]
    fn test_degenerate_age_range() {
        let mut config = base_config();
        config.start_age = 45;
        config.end_age = 40;
        config.annual_net_savings = 100_000.0;

        let result = simulate_accumulation(&config).unwrap();

        assert!(result.ledger.is_empty());
        assert!(result.yearly_ledger.is_empty());
        assert_eq!(result.terminal_balance, 0.0);
    }

    #[test]
    fn test_oversized_age_span_fails_before_running() {
        let mut config = base_config();
        config.start_age = 0;

        for end_age in [u32::MAX, 400_000_000, 150] {
            config.end_age = end_age;
            let err = simulate_accumulation(&config).unwrap_err();
            assert_eq!(err.field(), Some("end_age"));
        }
    }

    #[test]
    fn test_single_year_at_maximum_age() {
        let mut config = base_config();
        config.start_age = u32::MAX;
        config.end_age = u32::MAX;
        config.annual_net_savings = 12_000.0;

        let result = simulate_accumulation(&config).unwrap();

        assert_eq!(result.ledger.len(), 12);
        assert!(result.ledger.iter().all(|r| r.age == u32::MAX));
    }

    #[test]
    fn test_single_year_when_ages_equal() {
        let mut config = base_config();
        config.end_age = config.start_age;
        config.annual_net_savings = 12_000.0;

        let result = simulate_accumulation(&config).unwrap();
        assert_eq!(result.ledger.len(), 12);
        assert_eq!(result.ledger[0].age, 30);
    }

    #[test]
    fn test_savings_grow_from_second_year() {
        let mut config = base_config();
        config.annual_net_savings = 120_000.0;
        config.savings_growth_rate = 0.10;
        config.rates = BucketRates::uniform(0.0);

        let result = simulate_accumulation(&config).unwrap();

        assert_relative_eq!(result.yearly_ledger[0].total_amount, 120_000.0, max_relative = 1e-12);
        assert_relative_eq!(result.yearly_ledger[1].total_amount, 132_000.0, max_relative = 1e-12);
        assert_relative_eq!(result.yearly_ledger[2].total_amount, 145_200.0, max_relative = 1e-12);
    }

    #[test]
    fn test_goal_reduces_that_year_contribution() {
        let mut config = base_config();
        config.annual_net_savings = 120_000.0;
        config.rates = BucketRates::uniform(0.0);
        config.goals = vec![GoalObligation::new(2, 50_000.0)];

        let result = simulate_accumulation(&config).unwrap();

        assert_relative_eq!(result.yearly_ledger[1].total_amount, 70_000.0, max_relative = 1e-12);
        assert_relative_eq!(
            result.yearly_ledger[1].total_scheduled,
            120_000.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(result.terminal_balance, 1_150_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_goal_exceeding_savings_draws_on_corpus() {
        let mut config = base_config();
        config.annual_net_savings = 120_000.0;
        config.rates = BucketRates::uniform(0.0);
        config.goals = vec![GoalObligation::new(3, 300_000.0)];

        let result = simulate_accumulation(&config).unwrap();

        assert_relative_eq!(result.yearly_ledger[2].total_amount, -180_000.0, max_relative = 1e-12);
        assert_relative_eq!(result.yearly_ledger[2].ending_balance, 60_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_goal_beyond_corpus_floors_balance() {
        let mut config = base_config();
        config.annual_net_savings = 12_000.0;
        config.rates = BucketRates::uniform(0.0);
        config.goals = vec![GoalObligation::new(2, 1_000_000.0)];

        let result = simulate_accumulation(&config).unwrap();

        assert!(result.ledger.iter().all(|r| r.ending_balance >= 0.0));
        assert_eq!(result.yearly_ledger[1].ending_balance, 0.0);

        // corpus is gone after the first month of year 2; later months apply nothing
        assert_relative_eq!(result.ledger[12].actual_amount, -12_000.0, max_relative = 1e-12);
        assert!(result.ledger[13..24].iter().all(|r| r.actual_amount == 0.0));
    }

    #[test]
    fn test_future_goals_disclosed_not_netted() {
        let mut config = base_config();
        config.annual_net_savings = 120_000.0;
        config.rates = BucketRates::uniform(0.0);
        config.goals = vec![
            GoalObligation::new(5, 10_000.0),
            GoalObligation::new(15, 400_000.0),
        ];

        let result = simulate_accumulation(&config).unwrap();

        assert_relative_eq!(result.terminal_balance, 1_190_000.0, max_relative = 1e-12);
        assert_eq!(result.future_goal_cost, 400_000.0);
        assert_relative_eq!(result.balance_net_of_future_goals, 790_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_equity_zero_after_switch() {
        let mut config = base_config();
        config.start_age = 45;
        config.end_age = 60;
        config.starting_balances = BucketBalances::new(500_000.0, 200_000.0);
        config.annual_net_savings = 240_000.0;
        config.rates = BucketRates::new(0.12, 0.07);
        config.glide_path = GlidePath::BinarySwitch { equity_fraction: 0.7, switch_age: 50 };

        let result = simulate_accumulation(&config).unwrap();

        for row in &result.ledger {
            if row.age >= 50 {
                assert_eq!(row.equity_balance, 0.0, "equity left at age {}", row.age);
            } else {
                assert!(row.equity_balance > 0.0);
            }
        }
    }

    #[test]
    fn test_starting_past_switch_liquidates_first_year() {
        let mut config = base_config();
        config.start_age = 58;
        config.end_age = 60;
        config.starting_balances = BucketBalances::new(300_000.0, 100_000.0);
        config.glide_path = GlidePath::BinarySwitch { equity_fraction: 0.6, switch_age: 55 };

        let result = simulate_accumulation(&config).unwrap();
        assert!(result.ledger.iter().all(|r| r.equity_balance == 0.0));
    }

    #[test]
    fn test_liquidation_happens_before_growth() {
        let mut config = base_config();
        config.start_age = 50;
        config.end_age = 50;
        config.starting_balances = BucketBalances::new(100_000.0, 0.0);
        config.rates = BucketRates::new(0.24, 0.0);
        config.glide_path = GlidePath::BinarySwitch { equity_fraction: 0.6, switch_age: 50 };

        let result = simulate_accumulation(&config).unwrap();

        assert_eq!(result.terminal_balance, 100_000.0);
        assert!(result.ledger.iter().all(|r| r.return_earned == 0.0));
    }

    #[test]
    fn test_linear_glide_shifts_new_money() {
        let mut config = base_config();
        config.start_age = 40;
        config.end_age = 60;
        config.annual_net_savings = 12_000.0;
        config.rates = BucketRates::uniform(0.0);
        config.glide_path = GlidePath::LinearGlide {
            equity_fraction: 1.0,
            start_age: 40,
            end_age: 50,
        };

        let result = simulate_accumulation(&config).unwrap();

        // Year at age 45 adds half to equity; from 50 nothing new goes to equity
        let at_45 = &result.yearly_ledger[5];
        let at_44 = &result.yearly_ledger[4];
        let equity_45 = result.ledger[(6 * 12) - 1].equity_balance;
        let equity_44 = result.ledger[(5 * 12) - 1].equity_balance;
        assert_relative_eq!(equity_45 - equity_44, 6_000.0, max_relative = 1e-12);
        assert_relative_eq!(at_45.total_amount, at_44.total_amount, max_relative = 1e-12);

        let equity_at_50 = result.ledger[(11 * 12) - 1].equity_balance;
        let equity_final = result.ledger.last().unwrap().equity_balance;
        assert_eq!(equity_at_50, equity_final);
        assert!(equity_final > 0.0);
    }

    #[test]
    fn test_solved_payment_reproduces_target() {
        let target = 10_000_000.0;
        let payment = AnnuitySolver::solve(target, 0.01, 120);

        let mut config = base_config();
        config.annual_net_savings = payment * 12.0;

        let result = simulate_accumulation(&config).unwrap();
        assert_relative_eq!(result.terminal_balance, target, max_relative = 1e-6);
    }

    #[test]
    fn test_invalid_config_fails_before_running() {
        let mut config = base_config();
        config.annual_net_savings = f64::INFINITY;

        let err = simulate_accumulation(&config).unwrap_err();
        assert_eq!(err.field(), Some("annual_net_savings"));
    }

    #[test]
    fn test_periods_strictly_increasing() {
        let mut config = base_config();
        config.annual_net_savings = 50_000.0;

        let result = simulate_accumulation(&config).unwrap();
        for (index, row) in result.ledger.iter().enumerate() {
            assert_eq!(row.period, index as u32 + 1);
        }
    }

    #[test]
    fn test_seed_balances_follow_glide() {
        let config = base_config();
        let seeded = seed_balances(&config, 100_000.0);
        assert_relative_eq!(seeded.equity, 60_000.0);
        assert_relative_eq!(seeded.total(), 100_000.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_returns_roll_up_without_leakage(
            savings in 0u32..2_000_000,
            equity_start in 0u32..5_000_000,
            debt_start in 0u32..5_000_000,
            equity_bp in -500i32..2000,
            debt_bp in 0i32..1200,
            years in 1u32..30,
            switch_offset in 0u32..40,
            goal_year in 1u32..40,
            goal_amount in 0u32..3_000_000
        ) {
            let mut config = base_config();
            config.start_age = 25;
            config.end_age = 25 + years - 1;
            config.starting_balances = BucketBalances::new(equity_start as f64, debt_start as f64);
            config.annual_net_savings = savings as f64;
            config.savings_growth_rate = 0.05;
            config.rates = BucketRates::new(equity_bp as f64 / 10_000.0, debt_bp as f64 / 10_000.0);
            config.glide_path = GlidePath::BinarySwitch {
                equity_fraction: 0.65,
                switch_age: 25 + switch_offset,
            };
            config.goals = vec![GoalObligation::new(goal_year, goal_amount as f64)];

            let result = simulate_accumulation(&config).unwrap();

            let period_return: f64 = result.ledger.iter().map(|r| r.return_earned).sum();
            let year_return: f64 = result.yearly_ledger.iter().map(|y| y.total_return).sum();
            prop_assert!((period_return - year_return).abs() <= 1e-6 * (1.0 + period_return.abs()));

            for row in &result.ledger {
                prop_assert!(row.ending_balance >= 0.0);
                prop_assert!(row.equity_balance >= 0.0 && row.debt_balance >= 0.0);
                if row.age >= 25 + switch_offset {
                    prop_assert_eq!(row.equity_balance, 0.0);
                }
            }
        }
    }
}
